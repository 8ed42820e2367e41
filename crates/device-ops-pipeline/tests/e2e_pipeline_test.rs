// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use device_ops_collector::config::CollectorConfig;
use device_ops_collector::persistence::DEFAULT_STATS_COLLECTION;
use device_ops_collector::store::{Document, DocumentStore, SqliteStore};
use device_ops_pipeline::{mode::Mode, runner};
use device_ops_producer::config::ProducerConfig;
use serde_json::{json, Value};

fn collector_config(store_path: &Path) -> CollectorConfig {
    CollectorConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        store_path: Some(store_path.to_path_buf()),
        ..Default::default()
    }
}

fn producer_config(data_dir: &Path) -> ProducerConfig {
    ProducerConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

fn write_day_logs(data_dir: &Path) {
    fs::create_dir_all(data_dir).unwrap();
    fs::write(
        data_dir.join("2024-01-01.json"),
        json!([
            {"device_name": "sensor1", "operations": [
                {"type": "CREATE", "has_succeeded": true},
                {"type": "DELETE", "has_succeeded": false}
            ]},
            {"device_name": "sensor2", "operations": []}
        ])
        .to_string(),
    )
    .unwrap();
    fs::write(
        data_dir.join("2024-01-02.json"),
        json!([
            {"device_name": "sensor1", "operations": [{"type": "UPDATE", "has_succeeded": true}]}
        ])
        .to_string(),
    )
    .unwrap();
}

async fn stats(store: &SqliteStore, device: &str) -> Value {
    let mut filter = Document::new();
    filter.insert("name".to_string(), json!(device));
    Value::Object(
        store
            .find_one(DEFAULT_STATS_COLLECTION, &filter)
            .await
            .unwrap()
            .unwrap(),
    )
}

#[tokio::test]
async fn test_files_end_up_as_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store_path = dir.path().join("device_ops.db");
    write_day_logs(&data_dir);

    runner::run(
        Mode::All,
        collector_config(&store_path),
        producer_config(&data_dir),
    )
    .await
    .unwrap();

    let store = SqliteStore::open(&store_path).unwrap();
    assert_eq!(
        stats(&store, "sensor1").await,
        json!({"name": "sensor1", "device": "sensor1", "total": 3, "successful": 2, "failed": 1})
    );
    assert_eq!(
        stats(&store, "sensor2").await,
        json!({"name": "sensor2", "device": "sensor2", "total": 0, "successful": 0, "failed": 0})
    );
    let raw: Vec<Value> = store
        .find_records("sensor1")
        .await
        .unwrap()
        .into_iter()
        .map(Value::Object)
        .collect();
    assert_eq!(
        raw,
        vec![
            json!({"type": "CREATE", "state": "SUCCESS"}),
            json!({"type": "DELETE", "state": "FAILED"}),
            json!({"type": "UPDATE", "state": "SUCCESS"}),
        ]
    );
    assert!(store.find_records("sensor2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_run_accumulates() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store_path = dir.path().join("device_ops.db");
    write_day_logs(&data_dir);

    for _ in 0..2 {
        runner::run(
            Mode::All,
            collector_config(&store_path),
            producer_config(&data_dir),
        )
        .await
        .unwrap();
    }

    let store = SqliteStore::open(&store_path).unwrap();
    let sensor1 = stats(&store, "sensor1").await;
    assert_eq!(sensor1["total"], json!(6));
    assert_eq!(sensor1["successful"], json!(4));
    assert_eq!(sensor1["failed"], json!(2));
    assert_eq!(store.find_records("sensor1").await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_malformed_file_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store_path = dir.path().join("device_ops.db");
    write_day_logs(&data_dir);
    fs::write(data_dir.join("2024-01-03.json"), "{\"device_name\":").unwrap();

    // the producer failure is reported, not fatal
    runner::run(
        Mode::All,
        collector_config(&store_path),
        producer_config(&data_dir),
    )
    .await
    .unwrap();

    let store = SqliteStore::open(&store_path).unwrap();
    assert!(store
        .find_records(DEFAULT_STATS_COLLECTION)
        .await
        .unwrap()
        .is_empty());
    assert!(data_dir.join("2024-01-03.json").exists());
}

#[tokio::test]
async fn test_store_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("missing").join("device_ops.db");

    let result = runner::run(
        Mode::All,
        collector_config(&store_path),
        producer_config(dir.path()),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_producer_mode_without_collector_completes() {
    let dir = tempfile::tempdir().unwrap();
    write_day_logs(dir.path());
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ProducerConfig {
        collector_url: format!("http://127.0.0.1:{port}"),
        ..producer_config(dir.path())
    };

    runner::run(Mode::Producer, CollectorConfig::default(), config)
        .await
        .unwrap();
}
