//! Tuning settings config store.
//!
//! Serves the current tuning configuration over HTTP so draft controllers
//! can fetch it and submit edits.
//!
//! ```text
//!   settings-cli / view ──▶ DraftController ──▶ HttpConfigService
//!                                                      │
//!                                                      ▼
//!                                     ┌──────────────────────────────┐
//!                                     │  store server (this binary)  │
//!                                     │  GET/POST /api/configs       │
//!                                     │  GET /api/methods, /health   │
//!                                     └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tuning_settings::config::load_or_default;
use tuning_settings::lifecycle::{signals, startup, Shutdown};
use tuning_settings::observability::{logging, metrics};
use tuning_settings::StoreServer;

#[derive(Parser)]
#[command(name = "tuning-settings")]
#[command(about = "Config store for tuning settings", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `store.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.store.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("tuning-settings v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = startup::build_store(&config)?;
    tracing::info!(
        methods = store.registry().len(),
        require_registered = config.registry.require_registered_methods,
        "Config store ready"
    );

    let listener = TcpListener::bind(&config.store.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    StoreServer::new(&config.store, store)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
