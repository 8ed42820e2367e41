// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Environment variable helpers shared by the producer and collector configurations.
//!
//! Unset and blank variables are treated alike: both fall back to the caller's default.

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name} has an invalid value: {value}")]
pub struct EnvError {
    pub name: String,
    pub value: String,
}

/// Trimmed value of `name`, or `None` when unset or blank.
pub fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads and parses `name`. An unset or blank variable yields `None`.
pub fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, EnvError> {
    match read_env(name) {
        Some(value) => value.parse::<T>().map(Some).map_err(|_| EnvError {
            name: name.to_string(),
            value,
        }),
        None => Ok(None),
    }
}
