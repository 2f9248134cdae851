//! Minimal runtime configuration helpers.
//! Everything comes from the process environment, with local-dev defaults.

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "data/climate.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEED_DATA_PATH: &str = "data/sample_data.json";
pub const DEFAULT_POOL_SIZE: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path (or `:memory:`).
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    /// Seed payload loaded at startup when the store is empty.
    pub seed_data_path: PathBuf,
    /// Number of pooled read connections.
    pub pool_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let port = match std::env::var("PORT") {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a number in 1-65535, got {:?}", s))?,
            _ => DEFAULT_PORT,
        };

        let seed_data_path = std::env::var("SEED_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEED_DATA_PATH));

        let pool_size = match std::env::var("DB_POOL_SIZE") {
            Ok(s) if !s.trim().is_empty() => {
                let parsed = s
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("DB_POOL_SIZE must be a positive number, got {:?}", s))?;
                parsed.max(1)
            }
            _ => DEFAULT_POOL_SIZE,
        };

        Ok(Config {
            database_url,
            bind_addr,
            port,
            seed_data_path,
            pool_size,
        })
    }
}
