//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::Ttl;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default freshness window for cached values
    pub default_duration: Ttl,
    /// HTTP server port
    pub server_port: u16,
    /// Shared secret expected by the revalidation endpoint
    pub revalidation_secret: Option<String>,
    /// Bearer token expected by the admin endpoints
    pub admin_token: Option<String>,
    /// Stale-entry sweep interval in seconds (0 disables the sweep task)
    pub sweep_interval: u64,
    /// Deployment environment name reported by the dashboard
    pub environment: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_CACHE_DURATION` - Duration expression (default: 5m)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REVALIDATION_SECRET` - Revalidation shared secret (default: unset)
    /// - `ADMIN_TOKEN` - Admin bearer token (default: unset)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 0, off)
    /// - `APP_ENV` - Environment name (default: development)
    ///
    /// An unset secret or token rejects every request it guards.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_duration: env::var("DEFAULT_CACHE_DURATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_duration),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            revalidation_secret: non_empty_var("REVALIDATION_SECRET"),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            environment: non_empty_var("APP_ENV").unwrap_or(defaults.environment),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: Ttl::default(),
            server_port: 3000,
            revalidation_secret: None,
            admin_token: None,
            sweep_interval: 0,
            environment: "development".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
