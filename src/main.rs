//! Simple Timer - a single countdown timer with sound alerts
//!
//! This is the main entry point for the simple-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use simple_timer::{
    api::create_router,
    config::Config,
    services::{CommandSoundPlayer, FilePreferenceStore},
    state::AppState,
    tasks::display_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("simple_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting simple-timer v{}", env!("CARGO_PKG_VERSION"));

    let prefs_path = config.prefs_path();
    info!(
        "Configuration: host={}, port={}, prefs={}, sound={} {}",
        config.host,
        config.port,
        prefs_path.display(),
        config.sound_command,
        config.sound_file.display()
    );

    // Create application state; the preference is read exactly once here
    let preferences = FilePreferenceStore::new(prefs_path);
    let sound = CommandSoundPlayer::new(config.sound_command.clone(), config.sound_file.clone());
    let state = Arc::new(AppState::new(Box::new(preferences), Arc::new(sound)));

    if !config.headless {
        tokio::spawn(display_task(state.subscribe()));
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start, /pause, /toggle, /reset");
    info!("  POST /minutes, /seconds  - body {{\"value\": n}}");
    info!("  POST /acknowledge        - Close the time's up alert");
    info!("  POST /sound/toggle       - Flip the sound preference");
    info!("  GET  /status             - Current timer");
    info!("  GET  /health             - Health check");

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

    state.shutdown();
    info!("Shutdown complete");
    Ok(())
}
