// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use device_ops_model::{DeviceRecord, WireAck, WireRequest, BATCH_ENDPOINT_PATH};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::RemoteError;
use crate::transport::Transport;

/// Ships device records to the collector.
///
/// Every call to [`RemoteCallClient::send`] is exactly one request carrying every record it was
/// given. Failures are returned to the caller and never retried.
#[derive(Clone)]
pub struct RemoteCallClient {
    transport: Arc<dyn Transport + Send + Sync>,
    deadline: Duration,
}

impl RemoteCallClient {
    pub fn new(transport: Arc<dyn Transport + Send + Sync>, deadline: Duration) -> Self {
        Self {
            transport,
            deadline,
        }
    }

    pub async fn send(&self, records: &[DeviceRecord]) -> Result<WireAck, RemoteError> {
        let body = WireRequest::from_records(records).to_bytes()?;
        debug!(
            "Sending {} device records ({} bytes) to the collector",
            records.len(),
            body.len()
        );

        let response = self
            .transport
            .call(BATCH_ENDPOINT_PATH, body, self.deadline)
            .await
            .map_err(|e| {
                error!("Error sending data to the collector: {e}");
                RemoteError::from(e)
            })?;

        if !response.is_success() {
            let message = rejection_message(&response.body);
            error!(
                "Collector rejected the batch with status {}: {message}",
                response.status
            );
            return Err(RemoteError::Rejected {
                status: response.status,
                message,
            });
        }

        serde_json::from_slice::<WireAck>(&response.body).map_err(|e| {
            RemoteError::InvalidResponse(format!(
                "expected an empty acknowledgement, got {}: {e}",
                String::from_utf8_lossy(&response.body)
            ))
        })
    }
}

/// The `message` field of a collector error body, or the raw body.
fn rejection_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => Value::Object(map).to_string(),
        },
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}
