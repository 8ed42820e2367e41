// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Device operation records shared by the producer and the collector.
//!
//! [`record`] holds the in-memory model (and the on-disk log format), [`wire`] holds the request
//! and acknowledgement types exchanged between producer and collector. [`env`] reads the
//! environment variables both sides are configured with.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod env;
pub mod error;
pub mod record;
pub mod wire;

pub use error::ModelError;
pub use record::{Batch, DeviceRecord, Operation, OperationState};
pub use wire::{
    from_wire, to_wire, WireAck, WireDevice, WireOperation, WireRequest, BATCH_ENDPOINT_PATH,
};
