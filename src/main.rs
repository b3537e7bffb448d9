use anyhow::Result;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use voice_clone_service::config::Config;
use voice_clone_service::health::log_startup_summary;
use voice_clone_service::routes;
use voice_clone_service::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("voice_clone_service=debug,tower_http=debug")),
        )
        .init();

    let config = load_config()?;

    // Job directories are created here
    let scratch_dir = config.paths.scratch_dir();
    std::fs::create_dir_all(&scratch_dir)?;
    std::fs::create_dir_all(&config.paths.models_dir)?;
    info!("Scratch directory: {}", scratch_dir.display());

    let app_state = AppState::new(config.clone());
    log_startup_summary(&app_state.layout, &app_state.profile);

    let app = routes::create_routes(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Try `CONFIG_PATH`, then the usual file names, then fall back to built-in defaults
fn load_config() -> Result<Config> {
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        let config = Config::load(&path)?;
        info!("Loaded configuration from: {}", path);
        return Ok(config);
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    let mut candidates = vec![
        "voice_clone.yaml".to_string(),
        "voice_clone.yml".to_string(),
        "voice_clone.json".to_string(),
    ];
    if let Some(dir) = exe_dir {
        candidates.push(dir.join("voice_clone.yaml").to_string_lossy().into_owned());
    }

    for path in candidates {
        if !std::path::Path::new(&path).exists() {
            continue;
        }
        match Config::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from: {}", path);
                return Ok(config);
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}", path, e);
            }
        }
    }

    info!("No configuration file found, using defaults");
    Ok(Config::default())
}
