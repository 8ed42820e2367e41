// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use device_ops_model::BATCH_ENDPOINT_PATH;
use device_ops_producer::{
    client::RemoteCallClient,
    error::{RemoteError, TransportError},
    file_source::FsFileSource,
    ingestion,
    transport::{build_client, HttpTransport},
};
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(url: String) -> RemoteCallClient {
    let transport = HttpTransport::new(
        build_client(Duration::from_secs(5)).expect("failed to build client"),
        url,
    );
    RemoteCallClient::new(Arc::new(transport), Duration::from_secs(5))
}

#[tokio::test]
async fn test_directory_is_shipped_in_one_call() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("day1.json"),
        r#"[{"device_name": "sensor1", "operations": [{"type": "CREATE", "has_succeeded": true}]}]"#,
    )
    .unwrap();
    fs::create_dir(dir.path().join("week2")).unwrap();
    fs::write(
        dir.path().join("week2").join("day8.json"),
        r#"[{"device_name": "sensor2", "operations": [{"type": "DELETE", "has_succeeded": false}]}]"#,
    )
    .unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", BATCH_ENDPOINT_PATH)
        .match_body(Matcher::Json(json!({"devices": [
            {"deviceName": "sensor1", "operations": [{"type": "CREATE", "hasSucceeded": true}]},
            {"deviceName": "sensor2", "operations": [{"type": "DELETE", "hasSucceeded": false}]}
        ]})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let records = ingestion::load_dir(&FsFileSource, dir.path()).unwrap();
    client_for(server.url()).send(&records).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_collector_failure_is_reported_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", BATCH_ENDPOINT_PATH)
        .with_status(500)
        .with_body(r#"{"message":"Store unavailable: connection refused"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(server.url()).send(&[]).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        RemoteError::Rejected { status: 500, ref message }
            if message == "Store unavailable: connection refused"
    ));
}

#[tokio::test]
async fn test_unreachable_collector_is_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = client_for(format!("http://127.0.0.1:{port}"))
        .send(&[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RemoteError::Transport(TransportError::Connect(_))
    ));
}
