// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use device_ops_model::{from_wire, WireRequest};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper::{http, Method, Request, Response, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::CollectorConfig;
use crate::error::PersistError;
use crate::http_utils::{
    create_json_response, log_and_create_http_response, verify_request_content_length,
    HttpResponse,
};
use crate::service::DeviceOpsService;

pub use device_ops_model::BATCH_ENDPOINT_PATH;
pub const INFO_ENDPOINT_PATH: &str = "/info";

const BATCH_ERROR_PREFIX: &str = "Error processing device operations batch";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP front of a [`DeviceOpsService`].
pub struct CollectorServer {
    config: Arc<CollectorConfig>,
    service: Arc<dyn DeviceOpsService + Send + Sync>,
}

impl CollectorServer {
    pub fn new(
        config: Arc<CollectorConfig>,
        service: Arc<dyn DeviceOpsService + Send + Sync>,
    ) -> Self {
        Self { config, service }
    }

    /// Binds the listener. Clients may connect as soon as this returns, requests are answered
    /// once [`BoundCollector::serve`] runs.
    pub async fn bind(self) -> io::Result<BoundCollector> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let local_addr = listener.local_addr()?;
        info!("Collector listening on {local_addr}");
        Ok(BoundCollector {
            listener,
            local_addr,
            config: self.config,
            service: self.service,
        })
    }
}

pub struct BoundCollector {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<CollectorConfig>,
    service: Arc<dyn DeviceOpsService + Send + Sync>,
}

impl BoundCollector {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves connections until `cancel` fires. Open connections are aborted on shutdown.
    pub async fn serve(self, cancel: CancellationToken) -> io::Result<()> {
        let BoundCollector {
            listener,
            local_addr,
            config,
            service,
        } = self;

        // report the bound port, which differs from the configured one for port 0
        let mut bound_config = (*config).clone();
        bound_config.port = local_addr.port();
        let endpoint_config = Arc::new(bound_config);

        let service = service_fn(move |req: Request<Incoming>| {
            let endpoint_config = endpoint_config.clone();
            let service = service.clone();
            endpoint_handler(endpoint_config, service, req)
        });

        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let conn = tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Collector on {local_addr} shutting down");
                    joinset.shutdown().await;
                    return Ok(());
                },
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e);
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = hyper_util::rt::TokioIo::new(conn);
            let server = server.clone();
            let service = service.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }
    }
}

/// Routes one request. Generic over the body so handlers can be driven without a socket.
pub async fn endpoint_handler<B>(
    config: Arc<CollectorConfig>,
    service: Arc<dyn DeviceOpsService + Send + Sync>,
    req: Request<B>,
) -> http::Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match (req.method(), req.uri().path()) {
        (&Method::PUT | &Method::POST, BATCH_ENDPOINT_PATH) => {
            batch_handler(&config, service.as_ref(), req).await
        }
        (_, INFO_ENDPOINT_PATH) => info_handler(&config),
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::new())),
    }
}

async fn batch_handler<B>(
    config: &CollectorConfig,
    service: &(dyn DeviceOpsService + Send + Sync),
    req: Request<B>,
) -> http::Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    if let Some(response) = verify_request_content_length(
        &parts.headers,
        config.max_request_content_length,
        BATCH_ERROR_PREFIX,
    ) {
        return response;
    }

    // chunked bodies carry no length up front
    let body = match Limited::new(body, config.max_request_content_length)
        .collect()
        .await
    {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return log_and_create_http_response(
                &format!("{BATCH_ERROR_PREFIX}: Payload too large"),
                StatusCode::PAYLOAD_TOO_LARGE,
            );
        }
        Err(e) => {
            return log_and_create_http_response(
                &format!("{BATCH_ERROR_PREFIX}: Error reading request body: {e}"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let request = match WireRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return log_and_create_http_response(
                &format!("{BATCH_ERROR_PREFIX}: Invalid request body: {e}"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let batch = from_wire(request);
    if let Err(e) = batch.validate() {
        return log_and_create_http_response(
            &format!("{BATCH_ERROR_PREFIX}: {e}"),
            StatusCode::BAD_REQUEST,
        );
    }

    let device_count = batch.len();
    match service.send_batch(batch).await {
        Ok(ack) => {
            debug!("Persisted batch of {device_count} device records");
            create_json_response(&ack, StatusCode::OK)
        }
        Err(e @ PersistError::ReservedDeviceName { .. }) => log_and_create_http_response(
            &format!("{BATCH_ERROR_PREFIX}: {e}"),
            StatusCode::BAD_REQUEST,
        ),
        Err(e) => log_and_create_http_response(
            &format!("{BATCH_ERROR_PREFIX}: {e}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

fn info_handler(config: &CollectorConfig) -> http::Result<HttpResponse> {
    let response_json = json!({
        "endpoints": [BATCH_ENDPOINT_PATH, INFO_ENDPOINT_PATH],
        "config": {
            "host": config.host.to_string(),
            "port": config.port,
            "store": if config.store_path.is_some() { "sqlite" } else { "memory" },
            "stats_collection": config.stats_collection,
            "max_request_content_length": config.max_request_content_length,
        }
    });
    create_json_response(&response_json, StatusCode::OK)
}
