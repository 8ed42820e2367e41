// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use device_ops_model::env::{parse_env, read_env};

use crate::error::ConfigError;
use crate::persistence::DEFAULT_STATS_COLLECTION;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_MAX_REQUEST_CONTENT_LENGTH: usize = 10 * 1024 * 1024; // 10MB in Bytes

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub host: IpAddr,
    /// 0 binds an ephemeral port
    pub port: u16,
    /// SQLite database file. The in-memory store is used when unset.
    pub store_path: Option<PathBuf>,
    pub stats_collection: String,
    pub max_request_content_length: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            store_path: None,
            stats_collection: DEFAULT_STATS_COLLECTION.to_string(),
            max_request_content_length: DEFAULT_MAX_REQUEST_CONTENT_LENGTH,
        }
    }
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            host: parse_env("DEVICE_OPS_HOST")?.unwrap_or(defaults.host),
            port: parse_env("DEVICE_OPS_PORT")?.unwrap_or(defaults.port),
            store_path: read_env("DEVICE_OPS_STORE_PATH").map(PathBuf::from),
            stats_collection: read_env("DEVICE_OPS_STATS_COLLECTION")
                .unwrap_or(defaults.stats_collection),
            max_request_content_length: parse_env("DEVICE_OPS_MAX_REQUEST_BYTES")?
                .unwrap_or(defaults.max_request_content_length),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats_collection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "DEVICE_OPS_STATS_COLLECTION must not be empty".to_string(),
            ));
        }
        if self.max_request_content_length == 0 {
            return Err(ConfigError::Invalid(
                "DEVICE_OPS_MAX_REQUEST_BYTES must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use duplicate::duplicate_item;
    use serial_test::serial;
    use std::env;

    use super::*;

    const VARS: [&str; 5] = [
        "DEVICE_OPS_HOST",
        "DEVICE_OPS_PORT",
        "DEVICE_OPS_STORE_PATH",
        "DEVICE_OPS_STATS_COLLECTION",
        "DEVICE_OPS_MAX_REQUEST_BYTES",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = CollectorConfig::from_env().unwrap();
        assert_eq!(config, CollectorConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8082");
        assert_eq!(config.stats_collection, "StatByDevice");
        assert_eq!(config.host.to_string(), DEFAULT_HOST);
    }

    #[test]
    #[serial]
    fn test_custom_values() {
        clear_env();
        env::set_var("DEVICE_OPS_HOST", "127.0.0.1");
        env::set_var("DEVICE_OPS_PORT", "9000");
        env::set_var("DEVICE_OPS_STORE_PATH", "/tmp/device_ops.db");
        env::set_var("DEVICE_OPS_STATS_COLLECTION", "Stats");
        env::set_var("DEVICE_OPS_MAX_REQUEST_BYTES", "1024");

        let config = CollectorConfig::from_env().unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/device_ops.db")));
        assert_eq!(config.stats_collection, "Stats");
        assert_eq!(config.max_request_content_length, 1024);
        clear_env();
    }

    #[duplicate_item(
        test_name                           var;
        [test_blank_host_uses_default]      ["DEVICE_OPS_HOST"];
        [test_blank_port_uses_default]      ["DEVICE_OPS_PORT"];
        [test_blank_store_path_uses_memory] ["DEVICE_OPS_STORE_PATH"];
        [test_blank_collection_uses_default] ["DEVICE_OPS_STATS_COLLECTION"];
        [test_blank_max_bytes_uses_default] ["DEVICE_OPS_MAX_REQUEST_BYTES"];
    )]
    #[test]
    #[serial]
    fn test_name() {
        clear_env();
        env::set_var(var, "  ");
        assert_eq!(CollectorConfig::from_env().unwrap(), CollectorConfig::default());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_empty_stats_collection() {
        let config = CollectorConfig {
            stats_collection: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[duplicate_item(
        test_name                       var                                 value;
        [test_invalid_port]             ["DEVICE_OPS_PORT"]                 ["not_a_port"];
        [test_port_out_of_range]        ["DEVICE_OPS_PORT"]                 ["70000"];
        [test_invalid_host]             ["DEVICE_OPS_HOST"]                 ["localhost:80"];
        [test_invalid_max_bytes]        ["DEVICE_OPS_MAX_REQUEST_BYTES"]    ["-1"];
        [test_zero_max_bytes]           ["DEVICE_OPS_MAX_REQUEST_BYTES"]    ["0"];
    )]
    #[test]
    #[serial]
    fn test_name() {
        clear_env();
        env::set_var(var, value);
        let config = CollectorConfig::from_env();
        assert!(matches!(config, Err(ConfigError::Invalid(_))));
        clear_env();
    }
}
