// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries one request/response exchange with the collector.
#[async_trait]
pub trait Transport {
    /// Sends `body` to the collector endpoint `method`, failing once `deadline` elapses.
    async fn call(
        &self,
        method: &str,
        body: Vec<u8>,
        deadline: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Builds the reqwest client used to reach the collector. Uses rustls TLS.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Posts JSON bodies to `{base_url}{method}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        body: Vec<u8>,
        deadline: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{method}", self.base_url);
        debug!("Sending {} bytes to {url}", body.len());

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(deadline)
            .body(body)
            .send()
            .await
            .map_err(|e| classify_error(e, deadline))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(e, deadline))?
            .to_vec();
        debug!("Collector answered {url} with status {status}");
        Ok(TransportResponse { status, body })
    }
}

fn classify_error(error: reqwest::Error, deadline: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(deadline)
    } else if error.is_connect() {
        TransportError::Connect(error)
    } else {
        TransportError::Request(error)
    }
}
