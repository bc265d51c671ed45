use std::sync::Arc;

use showcase_certificate::CertificateRenderer;
use showcase_db::Database;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: ServerConfig,
    pub renderer: CertificateRenderer,
}

/// Run blocking DB work off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> AppResult<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(AppError::Internal)
}
