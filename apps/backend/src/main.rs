mod error;
mod routes;

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use clipwall_config::AppConfig;
use clipwall_library::VideoRoot;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let app_config = AppConfig::from_env()?;
    info!(?app_config, "loaded configuration");

    let root = VideoRoot::new(app_config.video_root.clone());
    info!(root = %app_config.video_root.display(), "serving videos");

    let state = AppState { root };
    let app = build_router(state, &app_config.public_dir);

    let listener = tokio::net::TcpListener::bind(app_config.addr).await?;
    let api_task = start_api_server(listener, app, app_config.addr);

    signal::ctrl_c().await?;
    info!("shutting down");
    api_task.abort();

    Ok(())
}

/// Used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info,clipwall_backend=debug,clipwall_library=info";

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn start_api_server(
    listener: tokio::net::TcpListener,
    app: Router,
    addr: SocketAddr,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Server running at http://{addr}");

        if let Err(err) = axum::serve(listener, app).await {
            error!("api server error: {err}");
        }
    })
}
