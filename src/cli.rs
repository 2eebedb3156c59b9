//! CLI argument parsing, validation, and startup helpers.

use crate::db::Database;
use clap::Parser;
use tracing::{error, info};

const MIN_SIGNING_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Fleetgate",
    about = "Dual-token authentication gate for the Fleetgate rental API"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7480", env = "FLEETGATE_PORT")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "fleetgate.db", env = "FLEETGATE_DB")]
    pub database: String,

    /// Path to file containing the access-token signing secret.
    /// Prefer using the ACCESS_TOKEN_SECRET env var instead
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh-token signing secret.
    /// Prefer using the REFRESH_TOKEN_SECRET env var instead
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a signing secret from an environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_signing_secret(env_var: &str, secret_file: Option<&str>) -> Option<Vec<u8>> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read signing secret file");
                return None;
            }
        }
    } else {
        error!(
            "{} is required. Set the environment variable (recommended) or pass a secret file",
            env_var
        );
        return None;
    };

    if secret.len() < MIN_SIGNING_SECRET_LENGTH {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            env_var, MIN_SIGNING_SECRET_LENGTH
        );
        return None;
    }

    Some(secret.into_bytes())
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
