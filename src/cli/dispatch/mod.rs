use crate::cli::{
    actions::{server::Args, Action},
    commands::{admin, jwt},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned().map(SecretString::from);

    let jwt_secret = matches
        .get_one::<String>(jwt::ARG_JWT_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --jwt-secret")?;
    let jwt_expiration = matches
        .get_one::<u64>(jwt::ARG_JWT_EXPIRATION_MS)
        .copied()
        .map(Duration::from_millis)
        .context("missing required argument: --jwt-expiration-ms")?;

    let admin_email = matches.get_one::<String>(admin::ARG_ADMIN_EMAIL).cloned();
    let admin_password = matches
        .get_one::<String>(admin::ARG_ADMIN_PASSWORD)
        .cloned()
        .map(SecretString::from);

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret,
        jwt_expiration,
        admin_email,
        admin_password,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_handler_builds_server_args() {
        temp_env::with_vars_unset(["MOTTU_DSN", "MOTTU_ADMIN_EMAIL", "MOTTU_ADMIN_PASSWORD"], || {
            let matches = commands::new().get_matches_from(vec![
                "mottu-auth",
                "--port",
                "9000",
                "--jwt-secret",
                SECRET,
                "--jwt-expiration-ms",
                "2000",
                "--admin-email",
                "admin@mottu.com",
                "--admin-password",
                "admin123",
            ]);

            let Action::Server(args) = handler(&matches).unwrap();
            assert_eq!(args.port, 9000);
            assert!(args.dsn.is_none());
            assert_eq!(args.jwt_secret.expose_secret(), SECRET);
            assert_eq!(args.jwt_expiration, Duration::from_secs(2));
            assert_eq!(args.admin_email.as_deref(), Some("admin@mottu.com"));
            assert_eq!(
                args.admin_password.as_ref().map(|p| p.expose_secret()),
                Some("admin123")
            );
        });
    }
}
