//! Focus Timer - a durable work/break countdown daemon
//! 
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use focus_timer::{
    api::create_router,
    channel::ObserverChannel,
    config::Config,
    state::AppState,
    store::{FileStore, StateStore},
    tasks::{autoplay_task, timer_scheduler_task, TimerScheduler, TICK_PERIOD},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, break={}min",
          config.host, config.port, config.work_minutes, config.break_minutes);

    // Open the durable store; a damaged file must not keep the timer down
    let file_store = match FileStore::open(&config.state_file).await {
        Ok(store) => store,
        Err(e) => {
            warn!("{:#}; starting with an empty store", e);
            FileStore::empty(&config.state_file)
        }
    };
    info!("Timer state persisted to {}", file_store.path().display());
    let store: Arc<dyn StateStore> = Arc::new(file_store);

    // Seed the scheduler and hand it the only mutable copy of the timer
    let durations = config.durations();
    let (channel, commands) = ObserverChannel::new();
    let (scheduler, ticks) = TimerScheduler::restore(
        Arc::clone(&store),
        durations,
        channel.notifier(),
        TICK_PERIOD,
    ).await;
    let scheduler_task = tokio::spawn(timer_scheduler_task(scheduler, ticks, commands));

    if config.autoplay {
        tokio::spawn(autoplay_task(channel.clone()));
    }

    let state = Arc::new(AppState::new(
        channel,
        store,
        durations,
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /command - Send start/pause/reset/switchMode/getState");
    info!("  GET  /state   - Current timer snapshot");
    info!("  GET  /storage - Durable state as displays see it");
    info!("  GET  /events  - Server-sent finished notifications");
    info!("  GET  /status  - Timer and server overview");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    scheduler_task.abort();
    info!("Server shutdown complete");
    Ok(())
}
