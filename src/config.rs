use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting, 0 turns it off
    pub rate_api_per_min: u32,

    pub db_max_connections: u32,
    pub run_migrations: bool,

    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8000".to_string())?,
            api_prefix: var_or("API_PREFIX", "/api".to_string())?,
            rate_api_per_min: var_or("RATE_API_PER_MIN", 1000)?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: var_or("RUN_MIGRATIONS", true)?,
            log_dir: var_or("LOG_DIR", "logs".to_string())?,
            log_level: var_or("LOG_LEVEL", "info".to_string())?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_DATABASE_URL)
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e).with_context(|| format!("{key} could not be read")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches its own variable names, so they can run in parallel.

    #[test]
    fn missing_variable_falls_back_to_default() {
        let port: u32 = var_or("ATTENDANCE_DESK_TEST_UNSET", 42).unwrap();
        assert_eq!(port, 42);
    }

    #[test]
    fn unparsable_variable_is_an_error_naming_the_key() {
        unsafe { env::set_var("ATTENDANCE_DESK_TEST_BAD_NUM", "lots") };
        let err = var_or::<u32>("ATTENDANCE_DESK_TEST_BAD_NUM", 1).unwrap_err();
        assert!(err.to_string().contains("ATTENDANCE_DESK_TEST_BAD_NUM"));
    }

    #[test]
    fn booleans_parse_from_env() {
        unsafe { env::set_var("ATTENDANCE_DESK_TEST_FLAG", "false") };
        assert!(!var_or("ATTENDANCE_DESK_TEST_FLAG", true).unwrap());
    }
}
