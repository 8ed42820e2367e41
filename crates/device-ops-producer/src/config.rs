// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use device_ops_model::env::{parse_env, read_env};

use crate::error::ConfigError;

pub const DEFAULT_DATA_DIR: &str = "./data/";
pub const DEFAULT_COLLECTOR_URL: &str = "http://127.0.0.1:8082";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    pub data_dir: PathBuf,
    /// Base URL of the collector, without a trailing slash
    pub collector_url: String,
    pub request_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            collector_url: DEFAULT_COLLECTOR_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            data_dir: read_env("DEVICE_OPS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            collector_url: read_env("DEVICE_OPS_COLLECTOR_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.collector_url),
            request_timeout: parse_env("DEVICE_OPS_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.collector_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "DEVICE_OPS_COLLECTOR_URL must be an http(s) URL, got {url}"
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "DEVICE_OPS_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "DEVICE_OPS_DATA_DIR must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
