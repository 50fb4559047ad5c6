use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use drivedesk::config::AppConfig;
use drivedesk::ids::UuidGenerator;
use drivedesk::routes;
use drivedesk::services::Scheduler;
use drivedesk::state::AppState;
use drivedesk::store::{BookingStore, InMemoryStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store: Box<dyn BookingStore + Send> = if config.database_url == ":memory:" {
        tracing::info!("using in-memory booking store");
        Box::new(InMemoryStore::new())
    } else {
        tracing::info!("using sqlite booking store at {}", config.database_url);
        Box::new(SqliteStore::open(&config.database_url)?)
    };

    let policy = config.scheduling_policy();
    tracing::info!(
        "conflicts include cancelled: {}, recurrence checks within batch: {}",
        config.conflicts_include_cancelled,
        config.recurrence_check_within_batch
    );

    let state = Arc::new(AppState {
        store: Mutex::new(store),
        config: config.clone(),
        scheduler: Scheduler::new(policy, Box::new(UuidGenerator)),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
