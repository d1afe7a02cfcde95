use crate::{
    api,
    auth::AuthService,
    password::Argon2Hasher,
    store::{CredentialStore, MemoryStore, PgStore},
    token::TokenCodec,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub jwt_secret: SecretString,
    pub jwt_expiration: Duration,
    pub admin_email: Option<String>,
    pub admin_password: Option<SecretString>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the bootstrap admin
/// cannot be created or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store = connect_store(args.dsn.as_ref()).await?;

    let tokens = Arc::new(TokenCodec::new(&args.jwt_secret, args.jwt_expiration));
    let auth = Arc::new(AuthService::new(
        store,
        Arc::new(Argon2Hasher::default()),
        tokens,
    ));

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        let admin = auth
            .ensure_admin(email, password.expose_secret())
            .await
            .context("Failed to bootstrap admin account")?;
        info!(user_id = admin.id, "Bootstrap admin ready");
    }

    api::new(args.port, auth).await
}

async fn connect_store(dsn: Option<&SecretString>) -> Result<Arc<dyn CredentialStore>> {
    let Some(dsn) = dsn else {
        warn!("No DSN configured, accounts are kept in memory and lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    let store = PgStore::new(pool);
    store
        .apply_schema()
        .await
        .context("Failed to apply database schema")?;

    Ok(Arc::new(store))
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "store",
            args.dsn.as_ref().map_or_else(
                || "memory".to_string(),
                |dsn| redact_dsn(dsn.expose_secret()),
            ),
        ),
        (
            "jwt_expiration",
            format!("{}s", args.jwt_expiration.as_secs()),
        ),
        (
            "admin_email",
            args.admin_email
                .clone()
                .unwrap_or_else(|| "n/a".to_string()),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    let Some((scheme, rest)) = dsn.split_once("://") else {
        return "invalid-dsn".to_string();
    };

    match rest.rsplit_once('@') {
        Some((userinfo, host)) => match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:REDACTED@{host}"),
            None => dsn.to_string(),
        },
        None => dsn.to_string(),
    }
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_hides_password() {
        assert_eq!(
            redact_dsn("postgres://mottu:s3cr3t@db:5432/mottu"),
            "postgres://mottu:REDACTED@db:5432/mottu"
        );
    }

    #[test]
    fn redact_dsn_without_password() {
        assert_eq!(
            redact_dsn("postgres://mottu@db/mottu"),
            "postgres://mottu@db/mottu"
        );
        assert_eq!(redact_dsn("postgres://db/mottu"), "postgres://db/mottu");
        assert_eq!(redact_dsn("not a dsn"), "invalid-dsn");
    }

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
    }

    #[tokio::test]
    async fn connect_store_without_dsn_uses_memory() -> anyhow::Result<()> {
        let store = connect_store(None).await?;
        store.ping().await?;
        assert!(store.list().await?.is_empty());
        Ok(())
    }
}
