use std::net::SocketAddr;

use crate::application::handlers::RouterLimits;
use crate::domain::services::leaderboard_cache::DEFAULT_CACHE_CAPACITY;
use crate::persistence::DatabaseConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub leaderboard_cache_enabled: bool, // Cache boards per (event, category, apparatus)
    pub leaderboard_cache_capacity: usize,
    pub max_body_bytes: usize,           // Upper bound for a score sheet body
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = RouterLimits::default();
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database: DatabaseConfig::default(),
            leaderboard_cache_enabled: true,
            leaderboard_cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_body_bytes: limits.max_body_bytes,
            max_concurrent_requests: limits.max_concurrent_requests,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ServerConfig {
        let mut config = ServerConfig {
            database: DatabaseConfig::from_env(),
            ..ServerConfig::default()
        };

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(value) => config.bind_addr = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse BIND_ADDR '{}': {}, using default: {}",
                        addr,
                        e,
                        config.bind_addr
                    );
                }
            }
        }

        if let Ok(enabled) = std::env::var("LEADERBOARD_CACHE_ENABLED") {
            config.leaderboard_cache_enabled = parse_flag(&enabled);
        }

        if let Ok(capacity) = std::env::var("LEADERBOARD_CACHE_CAPACITY") {
            match parse_positive(&capacity) {
                Some(value) => config.leaderboard_cache_capacity = value,
                None => {
                    tracing::warn!(
                        "Invalid LEADERBOARD_CACHE_CAPACITY value: {} (must be a positive integer), using default: {}",
                        capacity, config.leaderboard_cache_capacity
                    );
                }
            }
        }

        if let Ok(max_body) = std::env::var("MAX_BODY_BYTES") {
            match max_body.parse::<usize>() {
                Ok(value) if (1024..=1024 * 1024).contains(&value) => {
                    config.max_body_bytes = value;
                }
                _ => {
                    tracing::warn!(
                        "Invalid MAX_BODY_BYTES value: {} (must be between 1024 and 1048576), using default: {}",
                        max_body, config.max_body_bytes
                    );
                }
            }
        }

        if let Ok(max_concurrent) = std::env::var("MAX_CONCURRENT_REQUESTS") {
            match parse_positive(&max_concurrent) {
                Some(value) => config.max_concurrent_requests = value,
                None => {
                    tracing::warn!(
                        "Invalid MAX_CONCURRENT_REQUESTS value: {} (must be a positive integer), using default: {}",
                        max_concurrent, config.max_concurrent_requests
                    );
                }
            }
        }

        config
    }

    pub fn router_limits(&self) -> RouterLimits {
        RouterLimits {
            max_body_bytes: self.max_body_bytes,
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|v| *v > 0)
}
