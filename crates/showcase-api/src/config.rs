use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Longest accepted `SHOWCASE_SESSION_DAYS`, about ten years.
pub const MAX_SESSION_DAYS: i64 = 3650;

/// Placeholder session secrets that only belong on a dev machine.
pub const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "change-me-to-a-random-string"];

/// Server configuration, loaded from `SHOWCASE_*` environment variables.
///
/// | Env Var                     | Default                                               |
/// |-----------------------------|-------------------------------------------------------|
/// | `SHOWCASE_HOST`             | `0.0.0.0`                                             |
/// | `SHOWCASE_PORT`             | `5000`                                                |
/// | `SHOWCASE_DB_PATH`          | `showcase.db`                                         |
/// | `SHOWCASE_UPLOAD_DIR`       | `uploads`                                             |
/// | `SHOWCASE_SESSION_SECRET`   | `dev-secret-change-me`                                |
/// | `SHOWCASE_SESSION_DAYS`     | `30`                                                  |
/// | `SHOWCASE_MAX_UPLOAD_BYTES` | `16777216` (16 MiB)                                   |
/// | `SHOWCASE_TITLE_FONT`       | `/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf` |
/// | `SHOWCASE_TEXT_FONT`        | `/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf`      |
/// | `SHOWCASE_ADMIN_NAME`       | `Admin`                                               |
/// | `SHOWCASE_ADMIN_EMAIL`      | `admin@admin.com`                                     |
/// | `SHOWCASE_ADMIN_ROLL`       | `ADMIN001`                                            |
/// | `SHOWCASE_ADMIN_PASSWORD`   | `admin123`                                            |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub title_font: PathBuf,
    pub text_font: PathBuf,
    pub session: SessionConfig,
    pub admin: AdminAccount,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret for the session JWT.
    pub secret: String,
    pub lifetime_days: i64,
}

/// The account created by the startup bootstrap when it does not exist yet.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            db_path: "showcase.db".into(),
            upload_dir: "uploads".into(),
            max_upload_bytes: 16 * 1024 * 1024,
            title_font: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".into(),
            text_font: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".into(),
            session: SessionConfig {
                secret: "dev-secret-change-me".into(),
                lifetime_days: 30,
            },
            admin: AdminAccount {
                name: "Admin".into(),
                email: "admin@admin.com".into(),
                roll_number: "ADMIN001".into(),
                password: "admin123".into(),
            },
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            host: env_or("SHOWCASE_HOST", defaults.host),
            port: env_parse("SHOWCASE_PORT", defaults.port)?,
            db_path: env_or("SHOWCASE_DB_PATH", defaults.db_path),
            upload_dir: env_or("SHOWCASE_UPLOAD_DIR", defaults.upload_dir),
            max_upload_bytes: env_parse("SHOWCASE_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            title_font: env_or("SHOWCASE_TITLE_FONT", defaults.title_font),
            text_font: env_or("SHOWCASE_TEXT_FONT", defaults.text_font),
            session: SessionConfig {
                secret: env_or("SHOWCASE_SESSION_SECRET", defaults.session.secret),
                lifetime_days: env_parse("SHOWCASE_SESSION_DAYS", defaults.session.lifetime_days)?,
            },
            admin: AdminAccount {
                name: env_or("SHOWCASE_ADMIN_NAME", defaults.admin.name),
                email: env_or("SHOWCASE_ADMIN_EMAIL", defaults.admin.email),
                roll_number: env_or("SHOWCASE_ADMIN_ROLL", defaults.admin.roll_number),
                password: env_or("SHOWCASE_ADMIN_PASSWORD", defaults.admin.password),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_DAYS).contains(&self.session.lifetime_days) {
            anyhow::bail!(
                "SHOWCASE_SESSION_DAYS must be between 1 and {MAX_SESSION_DAYS}, got {}",
                self.session.lifetime_days
            );
        }
        Ok(())
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.session.secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session.secret.as_str())
    }
}

fn env_or<T: From<String>>(key: &str, default: T) -> T {
    std::env::var(key).map(T::from).unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} must be valid, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
