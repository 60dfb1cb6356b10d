//! Geodesic helpers: distances, random sampling around a point, and
//! geohash cells for coarse (log-safe) location representation.

use std::f64::consts::PI;

use rand::Rng;

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Approximate kilometers per degree used when scattering points.
///
/// Slightly larger than the true meridian degree (~111.195 km), which keeps
/// sampled points inside the requested radius.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Geohash length used when a location appears in logs (~±2.4 km).
pub const LOG_GEOHASH_PRECISION: u8 = 5;

/// Great-circle distance between two coordinates, in kilometers.
///
/// # Examples
///
/// ```
/// use assist_core::location::geo::haversine_km;
///
/// let d = haversine_km(37.7749, -122.4194, 37.7749, -122.4194);
/// assert!(d.abs() < 1e-9);
/// ```
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Draws a point uniformly (by area) inside a disc around `(lat, lon)`.
///
/// Uses polar sampling: the angle is uniform in `[0, 2π)` and the radius is
/// `sqrt(u) * radius_in_degrees`, so density does not concentrate near the
/// center. Returns `(latitude, longitude)` normalized by
/// [`normalize_coordinates`], so points drawn near a pole or the
/// antimeridian are still valid coordinates.
pub fn random_point_within<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> (f64, f64) {
    let radius_in_degrees = radius_km / KM_PER_DEGREE;
    let angle = rng.gen::<f64>() * 2.0 * PI;
    let radius = rng.gen::<f64>().sqrt() * radius_in_degrees;

    normalize_coordinates(lat + radius * angle.cos(), lon + radius * angle.sin())
}

/// Brings a coordinate that overshot a pole or the antimeridian back into
/// `[-90, 90]` x `[-180, 180)`, keeping the same point on the sphere.
///
/// Latitude is reflected across the pole it crossed (which moves the
/// longitude by 180°), then longitude is wrapped.
///
/// # Examples
///
/// ```
/// use assist_core::location::geo::normalize_coordinates;
///
/// let (lat, lon) = normalize_coordinates(90.5, 10.0);
/// assert!((lat - 89.5).abs() < 1e-9);
/// assert!((lon - -170.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn normalize_coordinates(lat: f64, lon: f64) -> (f64, f64) {
    let (lat, lon) = if lat > 90.0 {
        (180.0 - lat, lon + 180.0)
    } else if lat < -90.0 {
        (-180.0 - lat, lon + 180.0)
    } else {
        (lat, lon)
    };
    (lat, (lon + 180.0).rem_euclid(360.0) - 180.0)
}

/// Converts latitude/longitude to a geohash string.
///
/// Returns an empty string for coordinates the encoder rejects (NaN or out
/// of range).
///
/// # Examples
///
/// ```
/// use assist_core::location::geo::location_to_geohash;
///
/// let geohash = location_to_geohash(37.7749, -122.4194, 5);
/// assert_eq!(geohash, "9q8yy");
/// ```
#[must_use]
pub fn location_to_geohash(lat: f64, lon: f64, precision: u8) -> String {
    geohash::encode(geohash::Coord { x: lon, y: lat }, precision as usize)
        .unwrap_or_else(|_| String::new())
}
