// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fmt;
use std::str::FromStr;

/// Which halves of the pipeline this process runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Collector in the background, producer once, then exit.
    #[default]
    All,
    /// Collector only, until interrupted.
    Collector,
    /// Producer only, against a remote collector.
    Producer,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Mode::All),
            "collector" => Ok(Mode::Collector),
            "producer" => Ok(Mode::Producer),
            other => Err(format!(
                "unknown mode '{other}', expected one of: all, collector, producer"
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::All => "all",
            Mode::Collector => "collector",
            Mode::Producer => "producer",
        })
    }
}

impl Mode {
    pub fn from_env() -> Result<Self, String> {
        match env::var("DEVICE_OPS_MODE") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Mode::default()),
        }
    }
}
