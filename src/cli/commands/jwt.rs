use crate::token::MIN_SECRET_LEN;
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_EXPIRATION_MS: &str = "jwt-expiration-ms";

// Sixty days, same as `token::DEFAULT_TTL_MS`.
const DEFAULT_EXPIRATION_MS: &str = "5184000000";

/// HS256 keys shorter than the hash output are rejected up front.
#[must_use]
pub fn validator_secret() -> ValueParser {
    ValueParser::from(move |secret: &str| -> std::result::Result<String, String> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            ));
        }
        Ok(secret.to_string())
    })
}

/// Tokens carry whole-second timestamps, so the lifetime must be a positive
/// multiple of 1000 ms.
#[must_use]
pub fn validator_expiration_ms() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<u64, String> {
        let ms = value
            .parse::<u64>()
            .map_err(|_| format!("invalid number of milliseconds: {value}"))?;
        if ms < 1000 || ms % 1000 != 0 {
            return Err("JWT expiration must be a positive multiple of 1000 ms".to_string());
        }
        Ok(ms)
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify bearer tokens (HS256)")
                .env("MOTTU_JWT_SECRET")
                .hide_env_values(true)
                .required(true)
                .value_parser(validator_secret()),
        )
        .arg(
            Arg::new(ARG_JWT_EXPIRATION_MS)
                .long(ARG_JWT_EXPIRATION_MS)
                .help("Token lifetime in milliseconds, whole seconds only")
                .env("MOTTU_JWT_EXPIRATION_MS")
                .default_value(DEFAULT_EXPIRATION_MS)
                .value_parser(validator_expiration_ms()),
        )
}
