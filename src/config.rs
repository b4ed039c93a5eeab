use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::game::constants::net::{DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, MAX_BODY_BYTES, MIN_BODY_BYTES};
use crate::game::constants::scoring::DEFAULT_DECAY_RATE;

/// Scoring server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Decay rate for decaying contests that do not carry their own
    pub default_decay_rate: f64,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Port cannot be 0")]
    ZeroPort,
    #[error("Default decay rate must be finite and non-negative, got {0}")]
    InvalidDecayRate(f64),
    #[error("max_body_bytes out of range: {0}")]
    InvalidBodyLimit(usize),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            default_decay_rate: DEFAULT_DECAY_RATE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(rate) = std::env::var("DEFAULT_DECAY_RATE") {
            if let Ok(parsed) = rate.parse::<f64>() {
                if parsed.is_finite() && parsed >= 0.0 {
                    config.default_decay_rate = parsed;
                } else {
                    tracing::warn!("DEFAULT_DECAY_RATE must be >= 0, using default");
                }
            } else {
                tracing::warn!("Invalid DEFAULT_DECAY_RATE '{}', using default", rate);
            }
        }

        if let Ok(limit) = std::env::var("MAX_BODY_BYTES") {
            if let Ok(parsed) = limit.parse::<usize>() {
                if (MIN_BODY_BYTES..=MAX_BODY_BYTES).contains(&parsed) {
                    config.max_body_bytes = parsed;
                } else {
                    tracing::warn!(
                        "MAX_BODY_BYTES must be {}-{}, using default",
                        MIN_BODY_BYTES,
                        MAX_BODY_BYTES
                    );
                }
            } else {
                tracing::warn!("Invalid MAX_BODY_BYTES '{}', using default", limit);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if !self.default_decay_rate.is_finite() || self.default_decay_rate < 0.0 {
            return Err(ConfigError::InvalidDecayRate(self.default_decay_rate));
        }
        if !(MIN_BODY_BYTES..=MAX_BODY_BYTES).contains(&self.max_body_bytes) {
            return Err(ConfigError::InvalidBodyLimit(self.max_body_bytes));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}
