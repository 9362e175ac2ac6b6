//! Shift ledger HTTP server.
//!
//! Environment:
//! - `LEDGER_BIND`: listen address, default `0.0.0.0:8080`
//! - `LEDGER_CONFIG_DIR`: directory holding `policy.yaml`, default `./config`
//! - `LEDGER_SEED_FILE`: optional JSON roster/schedule/holiday seed
//! - `RUST_LOG`: tracing filter, default `info`

use std::env;
use std::error::Error;
use std::time::Duration;

use shift_ledger::api::{AppState, create_router};
use shift_ledger::attendance::admin_board;
use shift_ledger::config::ConfigLoader;
use shift_ledger::store::{InMemoryStore, StoreSeed};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(dir: &str) -> ConfigLoader {
    match ConfigLoader::load(dir) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, dir, "Falling back to default policy");
            ConfigLoader::default()
        }
    }
}

fn load_store(seed_file: Option<String>) -> Result<InMemoryStore, Box<dyn Error>> {
    let Some(path) = seed_file else {
        return Ok(InMemoryStore::new());
    };
    let raw = std::fs::read_to_string(&path)?;
    let seed: StoreSeed = serde_json::from_str(&raw)?;
    info!(
        path = %path,
        workers = seed.workers.len(),
        holidays = seed.holiday_rates.len(),
        "Store seeded"
    );
    Ok(InMemoryStore::from_seed(seed))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let bind_addr = env::var("LEDGER_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let config_dir = env::var("LEDGER_CONFIG_DIR").unwrap_or_else(|_| "./config".to_string());

    let config = load_config(&config_dir);
    let store = load_store(env::var("LEDGER_SEED_FILE").ok())?;
    let refresh_every = Duration::from_secs(config.defaults().refresh_interval_secs.max(1));
    let state = AppState::new(config, store);

    let board_state = state.clone();
    let refresh = shift_ledger::refresh::spawn_refresh(refresh_every, move || {
        let state = board_state.clone();
        async move {
            let store = state.store().lock().await;
            let board = admin_board(&*store, state.config().defaults(), state.now());
            info!(
                pending = board.pending.len(),
                archived = board.archive.len(),
                working = board.working.len(),
                "Admin board refreshed"
            );
        }
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Shift ledger listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let ticks = refresh.cancel().await;
    info!(ticks, "Shut down");
    Ok(())
}
