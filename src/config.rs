//! Configuration - command line flags with environment fallbacks
//!
//! Values come from flags, then from the environment (a `.env` file is loaded
//! by the binary before parsing), then from defaults.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::info;

use crate::db::{Database, RestStore, Store, StoreError};

pub const DEFAULT_DB_PATH: &str = "gymlog.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Local SQLite file
    Sqlite,
    /// Hosted PostgREST (Supabase) project
    Rest,
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Where logs are stored
    #[arg(long, env = "GYMLOG_BACKEND", value_enum, default_value = "sqlite", global = true)]
    pub backend: Backend,

    /// SQLite database path
    #[arg(long, env = "GYMLOG_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: String,

    /// Project URL of the hosted backend
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// API key of the hosted backend
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true, global = true)]
    pub supabase_key: Option<String>,

    /// Write tracing output here instead of stderr
    #[arg(long, env = "GYMLOG_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Connect to the configured backend
    pub fn open_store(&self) -> Result<Box<dyn Store>, StoreError> {
        match self.backend {
            Backend::Sqlite => Ok(Box::new(Database::open(&self.db)?)),
            Backend::Rest => {
                let url = self
                    .supabase_url
                    .as_deref()
                    .ok_or_else(|| StoreError::Config("SUPABASE_URL".into()))?;
                let key = self
                    .supabase_key
                    .as_deref()
                    .ok_or_else(|| StoreError::Config("SUPABASE_KEY".into()))?;
                info!(url, "using hosted backend");
                Ok(Box::new(RestStore::new(url, key)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    const VARS: [&str; 5] = [
        "GYMLOG_BACKEND",
        "GYMLOG_DB",
        "SUPABASE_URL",
        "SUPABASE_KEY",
        "GYMLOG_LOG_FILE",
    ];

    fn parse(args: &[&str]) -> Config {
        TestCli::try_parse_from(std::iter::once("gymlog").chain(args.iter().copied()))
            .unwrap()
            .config
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = parse(&[]);
            assert_eq!(config.backend, Backend::Sqlite);
            assert_eq!(config.db, DEFAULT_DB_PATH);
            assert!(config.supabase_url.is_none());
            assert!(config.log_file.is_none());
        });
    }

    #[test]
    fn test_env_fallback() {
        temp_env::with_vars(
            [
                ("GYMLOG_BACKEND", Some("rest")),
                ("SUPABASE_URL", Some("https://abc.supabase.co")),
                ("SUPABASE_KEY", Some("anon")),
                ("GYMLOG_DB", None),
                ("GYMLOG_LOG_FILE", None),
            ],
            || {
                let config = parse(&[]);
                assert_eq!(config.backend, Backend::Rest);
                assert_eq!(config.supabase_url.as_deref(), Some("https://abc.supabase.co"));
                assert_eq!(config.supabase_key.as_deref(), Some("anon"));
            },
        );
    }

    #[test]
    fn test_flag_overrides_env() {
        temp_env::with_vars([("GYMLOG_DB", Some("from-env.db"))], || {
            let config = parse(&["--db", "from-flag.db"]);
            assert_eq!(config.db, "from-flag.db");
        });
    }

    #[test]
    fn test_rest_backend_requires_credentials() {
        temp_env::with_vars_unset(VARS, || {
            let config = parse(&["--backend", "rest", "--supabase-url", "https://abc.supabase.co"]);
            match config.open_store() {
                Err(StoreError::Config(name)) => assert_eq!(name, "SUPABASE_KEY"),
                Err(e) => panic!("unexpected error: {}", e),
                Ok(_) => panic!("expected a configuration error"),
            }
        });
    }

    #[test]
    fn test_sqlite_backend_opens_store() {
        temp_env::with_vars_unset(VARS, || {
            let config = parse(&["--db", ":memory:"]);
            let store = config.open_store().unwrap();
            assert!(store.list_exercises().unwrap().is_empty());
        });
    }
}
