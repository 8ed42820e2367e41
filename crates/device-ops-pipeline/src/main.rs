// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use device_ops_collector::config::CollectorConfig;
use device_ops_pipeline::{mode::Mode, runner};
use device_ops_producer::config::ProducerConfig;

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("DEVICE_OPS_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let mode = match Mode::from_env() {
        Ok(mode) => mode,
        Err(e) => {
            error!("Invalid DEVICE_OPS_MODE: {e}");
            return ExitCode::FAILURE;
        }
    };

    // each mode only needs the configuration of the halves it runs
    let collector_config = if mode == Mode::Producer {
        CollectorConfig::default()
    } else {
        match CollectorConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                error!("Error creating collector config: {e}");
                return ExitCode::FAILURE;
            }
        }
    };
    let producer_config = if mode == Mode::Collector {
        ProducerConfig::default()
    } else {
        match ProducerConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                error!("Error creating producer config: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    match runner::run(mode, collector_config, producer_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
