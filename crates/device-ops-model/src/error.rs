// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised when model content cannot be used as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Device names partition storage, so they can never be empty.
    #[error("Device record at position {index} has an empty device name")]
    EmptyDeviceName { index: usize },
}
