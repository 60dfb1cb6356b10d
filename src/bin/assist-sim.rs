//! Runs the assistance core against a simulated device.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assist_core::location::{SimulatedProvider, TrackingMode};
use assist_core::proximity::{Gender, PrivacySettings};
use assist_core::storage::{KeyValueStore, MemoryStore, SqliteStore};
use assist_core::{AssistCore, CoreConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
/// Simulate location tracking, nearby counts and an assistance request
struct Args {
    /// Starting latitude in degrees
    #[arg(long, default_value_t = 37.7749, allow_hyphen_values = true)]
    lat: f64,

    /// Starting longitude in degrees
    #[arg(long, default_value_t = -122.4194, allow_hyphen_values = true)]
    lon: f64,

    /// How long to track before sending, in seconds
    #[arg(long, default_value_t = 90)]
    seconds: u64,

    /// Gender for the local profile (woman, man, non-binary)
    #[arg(long, default_value = "woman")]
    gender: String,

    /// Note attached to the assistance request
    #[arg(long)]
    note: Option<String>,

    /// Skip the assistance request
    #[arg(long)]
    no_alert: bool,

    /// Track at the emergency cadence
    #[arg(long)]
    emergency: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Optional JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist the profile in this SQLite database instead of memory
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => CoreConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => CoreConfig::default(),
    };
    let gender = Gender::parse(&args.gender)
        .ok_or_else(|| format!("unknown gender: {}", args.gender))?;

    let store: Arc<dyn KeyValueStore> = match &args.db {
        Some(path) => Arc::new(SqliteStore::new(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    let provider = Arc::new(match args.seed {
        Some(seed) => SimulatedProvider::with_seed(args.lat, args.lon, seed),
        None => SimulatedProvider::new(args.lat, args.lon),
    });

    let core = match args.seed {
        Some(seed) => AssistCore::with_seed(config, provider, store, seed)?,
        None => AssistCore::new(config, provider, store)?,
    };

    let profile = match core.profiles().user_profile()? {
        Some(profile) => profile,
        None => core
            .profiles()
            .create_user_profile(gender, PrivacySettings::default())?,
    };
    info!(user_id = %profile.user_id, gender = profile.gender.as_str(), "Profile ready");

    if args.emergency {
        core.tracker().set_tracking_mode(TrackingMode::Emergency)?;
    }
    core.start_monitoring()?;

    let mut elapsed = 0;
    while elapsed < args.seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        elapsed += 1;
        if elapsed % 10 == 0 {
            info!(elapsed_s = elapsed, nearby = core.nearby_count(), "Tracking");
        }
    }

    let visible = core.nearby_users_for_profile()?;
    info!(visible = visible.len(), "Nearby users visible to profile");

    if !args.no_alert {
        let outcome = core.request_assistance(args.note.as_deref()).await?;
        println!("{}", outcome.message);

        if let Some(alert) = outcome.alert {
            core.alerts().resolve_alert(&alert.id);
            info!(
                active = core.alerts().active_alerts().len(),
                "Resolved simulated alert"
            );
        }
    }

    core.stop_monitoring();
    Ok(())
}
