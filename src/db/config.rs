use dotenv::{dotenv, from_filename};
use std::env;
use std::time::Duration;

use super::{ErrorKind, Result, ResultExt};

pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Database settings read from the environment.
///
/// `NEWS_API_ENV=test` loads `.env.test` instead of `.env`, which is how the
/// test and development databases are kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub pool_size: u32,
    pub connection_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        match env::var("NEWS_API_ENV") {
            Ok(name) => {
                from_filename(format!(".env.{}", name)).ok();
            }
            Err(_) => {
                dotenv().ok();
            }
        }
        Settings::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ErrorKind::MissingVar("DATABASE_URL"))?;

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .chain_err(|| "DATABASE_POOL_SIZE must be a positive integer")?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err("DATABASE_POOL_SIZE must be a positive integer".into());
        }

        let timeout = match lookup("DATABASE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .chain_err(|| "DATABASE_TIMEOUT_SECS must be a number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Settings {
            database_url,
            pool_size,
            connection_timeout: Duration::from_secs(timeout),
        })
    }
}
