use clap::{Arg, Command};

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";

/// Optional bootstrap administrator, created on startup when missing.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the ADMIN account to create on startup if it does not exist")
                .env("MOTTU_ADMIN_EMAIL")
                .requires(ARG_ADMIN_PASSWORD),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password of the bootstrap ADMIN account")
                .env("MOTTU_ADMIN_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_ADMIN_EMAIL),
        )
}
