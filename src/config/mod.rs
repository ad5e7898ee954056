use std::path::PathBuf;

use clap::Parser;

/// Policy engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "policr")]
#[command(about = "Policy evaluation engine for expense compliance")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "POLICR_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to the rule set YAML file
    #[arg(long, default_value = "rules.yaml", env = "POLICR_RULES_PATH")]
    pub rules_path: PathBuf,

    /// Postgres URL for the audit store (in-memory store if not set)
    #[arg(long, env = "POLICR_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Minimum database connections
    #[arg(long, default_value = "1", env = "POLICR_DB_MIN_CONNECTIONS")]
    pub db_min_connections: u32,

    /// Maximum database connections
    #[arg(long, default_value = "5", env = "POLICR_DB_MAX_CONNECTIONS")]
    pub db_max_connections: u32,

    /// Number of audit records returned per listing
    #[arg(long, default_value = "10", env = "POLICR_AUDIT_PAGE_SIZE")]
    pub audit_page_size: usize,

    /// Maximum records kept per organization in the in-memory audit store
    #[arg(long, default_value = "200", env = "POLICR_AUDIT_CAP")]
    pub audit_cap: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "POLICR_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            rules_path: PathBuf::from("rules.yaml"),
            database_url: None,
            db_min_connections: 1,
            db_max_connections: 5,
            audit_page_size: 10,
            audit_cap: 200,
            log_level: "info".to_string(),
            graceful_shutdown: true,
        }
    }
}
