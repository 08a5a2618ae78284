//! Connection source resolution.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgConnectOptions;

/// Where the database connection comes from.
///
/// A caller-supplied pool stays owned by the caller; for a URL or the
/// environment the crate creates (and later closes) its own pool.
#[derive(Debug, Clone)]
pub enum ConnectionSource {
    Pool(PgPool),
    Url(String),
    /// `<PREFIX>_HOST`, `_PORT`, `_USER`, `_PASSWORD`, `_DATABASE` or a full
    /// `<PREFIX>_CONNECTION_STRING`, after loading `.env`.
    Env,
}

impl From<PgPool> for ConnectionSource {
    fn from(pool: PgPool) -> Self {
        ConnectionSource::Pool(pool)
    }
}

impl From<&str> for ConnectionSource {
    fn from(url: &str) -> Self {
        ConnectionSource::Url(url.to_string())
    }
}

impl From<String> for ConnectionSource {
    fn from(url: String) -> Self {
        ConnectionSource::Url(url)
    }
}

pub(crate) struct ResolvedClient {
    pub pool: PgPool,
    /// Whether the crate created the pool and is responsible for closing it.
    pub owned: bool,
}

pub(crate) async fn resolve(source: ConnectionSource, env_prefix: &str) -> Result<ResolvedClient> {
    match source {
        ConnectionSource::Pool(pool) => Ok(ResolvedClient { pool, owned: false }),
        ConnectionSource::Url(url) => {
            let pool = PgPool::connect(&url)
                .await
                .context("failed to connect to database")?;
            Ok(ResolvedClient { pool, owned: true })
        }
        ConnectionSource::Env => {
            let options = connect_options_from_env(env_prefix)?;
            let pool = PgPool::connect_with(options)
                .await
                .context("failed to connect to database from environment")?;
            Ok(ResolvedClient { pool, owned: true })
        }
    }
}

fn connect_options_from_env(prefix: &str) -> Result<PgConnectOptions> {
    dotenv::dotenv().ok();
    let var = |key: &str| {
        std::env::var(format!("{prefix}_{key}"))
            .ok()
            .filter(|value| !value.is_empty())
    };

    if let Some(url) = var("CONNECTION_STRING") {
        return url
            .parse::<PgConnectOptions>()
            .with_context(|| format!("invalid {prefix}_CONNECTION_STRING"));
    }

    let mut options = PgConnectOptions::new();
    if let Some(host) = var("HOST") {
        options = options.host(&host);
    }
    if let Some(port) = var("PORT") {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid {prefix}_PORT"))?;
        options = options.port(port);
    }
    if let Some(user) = var("USER") {
        options = options.username(&user);
    }
    if let Some(password) = var("PASSWORD") {
        options = options.password(&password);
    }
    if let Some(database) = var("DATABASE") {
        options = options.database(&database);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_wins_over_parts() {
        // Process-global environment; use a prefix no other test touches.
        unsafe {
            std::env::set_var("PGMAPTESTA_CONNECTION_STRING", "postgres://u:p@db:5433/app");
            std::env::set_var("PGMAPTESTA_HOST", "ignored");
        }
        let options = connect_options_from_env("PGMAPTESTA").unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 5433);
    }

    #[test]
    fn parts_compose_connect_options() {
        unsafe {
            std::env::set_var("PGMAPTESTB_HOST", "db.internal");
            std::env::set_var("PGMAPTESTB_PORT", "6432");
            std::env::set_var("PGMAPTESTB_USER", "svc");
            std::env::set_var("PGMAPTESTB_DATABASE", "app");
        }
        let options = connect_options_from_env("PGMAPTESTB").unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_username(), "svc");
        assert_eq!(options.get_database(), Some("app"));
    }

    #[test]
    fn bad_port_is_a_configuration_error() {
        unsafe {
            std::env::set_var("PGMAPTESTC_PORT", "not-a-port");
        }
        let err = connect_options_from_env("PGMAPTESTC").unwrap_err();
        assert!(err.to_string().contains("PGMAPTESTC_PORT"));
    }
}
