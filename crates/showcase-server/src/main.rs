use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use showcase_api::auth;
use showcase_api::config::ServerConfig;
use showcase_api::router::build_router;
use showcase_api::state::{AppState, AppStateInner};
use showcase_certificate::CertificateRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showcase=debug,showcase_api=debug,showcase_db=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.uses_placeholder_secret() {
        warn!("SHOWCASE_SESSION_SECRET is unset or a placeholder; sessions can be forged");
    }

    // Init database and run the one-time admin bootstrap before any traffic
    let db = showcase_db::Database::open(&config.db_path)?;
    if !auth::bootstrap_admin(&db, &config.admin)? {
        info!("Admin account {} already present", config.admin.email);
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory: {}", config.upload_dir.display());

    let renderer = CertificateRenderer::load(&config.title_font, &config.text_font);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state: AppState = Arc::new(AppStateInner { db, config, renderer });
    let app = build_router(state);

    info!("Showcase server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
