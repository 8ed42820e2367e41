// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use device_ops_collector::config::CollectorConfig;
use device_ops_collector::server::CollectorServer;
use device_ops_collector::service::DeviceOpsService;
use http_body_util::{BodyExt, Full};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// A collector serving on an ephemeral loopback port.
pub struct RunningCollector {
    pub addr: SocketAddr,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl RunningCollector {
    pub async fn shutdown(self) {
        self.cancel.cancel();
        timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("collector did not shut down")
            .expect("collector task panicked")
            .expect("collector returned an error");
    }
}

pub fn test_config() -> CollectorConfig {
    CollectorConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        ..Default::default()
    }
}

pub async fn start_collector(
    config: CollectorConfig,
    service: Arc<dyn DeviceOpsService + Send + Sync>,
) -> RunningCollector {
    let bound = CollectorServer::new(Arc::new(config), service)
        .bind()
        .await
        .expect("failed to bind collector");
    let addr = bound.local_addr();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(bound.serve(cancel.clone()));
    RunningCollector {
        addr,
        cancel,
        handle,
    }
}

/// Send an HTTP request over TCP and return the status and body
pub async fn send_tcp_request(
    addr: SocketAddr,
    uri: &str,
    method: &str,
    body: Option<Vec<u8>>,
) -> Result<(StatusCode, Bytes), Box<dyn std::error::Error + Send + Sync>> {
    let stream = timeout(Duration::from_secs(2), tokio::net::TcpStream::connect(addr)).await??;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    tokio::spawn(async move {
        let _ = conn.await;
    });

    let mut request_builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Host", addr.to_string())
        .header("Content-Type", "application/json");

    let body_data = body.unwrap_or_default();
    request_builder = request_builder.header("Content-Length", body_data.len().to_string());
    let request = request_builder.body(Full::new(Bytes::from(body_data)))?;

    let response = timeout(Duration::from_secs(2), sender.send_request(request)).await??;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, bytes))
}
