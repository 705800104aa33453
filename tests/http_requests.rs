//! Status-code contract tests, driven over real HTTP.
//!
//! Each test binds the full router to an ephemeral port and issues requests
//! the way the Sigfox backend does: raw JSON bodies, no Content-Type header.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use sigfox_api_server::{app, config::Config, storage, AppState};

async fn spawn_server() -> Result<String> {
    let config = Arc::new(Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        // One connection so every request sees the same in-memory database.
        db_pool_size: 1,
        devices: vec!["12FED".to_string(), "12FEE".to_string()],
    });

    let db = storage::connect(&config.database_url, config.db_pool_size).await?;
    storage::init(&db).await?;
    storage::seed_devices(&db, &config.devices).await?;

    let state = AppState {
        db,
        config: config.clone(),
    };

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app(state))
            .await
            .expect("server task failed");
    });

    Ok(format!("http://{}", addr))
}

fn frame(ack: bool) -> Value {
    json!({
        "id_modem": "BEF",
        "timestamp": 123456,
        "duplicate": false,
        "snr": 10.23,
        "station": "FED",
        "data_str": "16f000000000000000000000",
        "avg_signal": 10.23,
        "latitude": 2,
        "longitude": 2,
        "rssi": 23.45,
        "seq_number": 12,
        "ack": ack,
        "long_polling": false
    })
}

#[tokio::test]
async fn get_status_codes() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let cases = [
        ("", 200),
        ("/", 200),
        ("/toto", 404),
        ("/Api", 404),
        ("/api", 200),
        ("/api/toto", 200),
    ];

    for (path, expected) in cases {
        let response = client.get(format!("{base}{path}")).send().await?;
        assert_eq!(response.status().as_u16(), expected, "GET {path}");
    }

    Ok(())
}

#[tokio::test]
async fn post_without_body_status_codes() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let cases = [
        ("", 200),
        ("/", 200),
        ("/toto", 404),
        ("/Api", 404),
        ("/api", 400),
        ("/api/toto", 400),
    ];

    for (path, expected) in cases {
        let response = client.post(format!("{base}{path}")).send().await?;
        assert_eq!(response.status().as_u16(), expected, "POST {path}");
    }

    Ok(())
}

#[tokio::test]
async fn post_with_frame_no_ack_status_codes() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let cases = [
        ("", 200),
        ("/", 200),
        ("/toto", 404),
        ("/Api", 404),
        ("/api", 204),
        ("/api/toto", 204),
    ];

    for (path, expected) in cases {
        let response = client
            .post(format!("{base}{path}"))
            .body(frame(false).to_string())
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), expected, "POST {path}");
    }

    Ok(())
}

#[tokio::test]
async fn post_with_frame_ack_status_codes() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let cases = [
        ("", 200),
        ("/", 200),
        ("/toto", 404),
        ("/Api", 404),
        ("/api", 201),
        ("/api/toto", 201),
    ];

    for (path, expected) in cases {
        let response = client
            .post(format!("{base}{path}"))
            .body(frame(true).to_string())
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), expected, "POST {path}");
    }

    Ok(())
}

#[tokio::test]
async fn ingested_frames_are_listed() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api"))
        .body(frame(false).to_string())
        .send()
        .await?;
    client
        .post(format!("{base}/api"))
        .body(frame(true).to_string())
        .send()
        .await?;

    let frames: Vec<Value> = client
        .get(format!("{base}/api"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["id_modem"], "BEF");
    assert_eq!(frames[0]["timestamp"], 123456);
    assert_eq!(frames[0]["data_str"], "16f000000000000000000000");
    assert_eq!(frames[0]["ack"], false);
    assert_eq!(frames[1]["ack"], true);

    // The device listing filters by modem id, unknown devices are empty.
    let frames: Vec<Value> = client
        .get(format!("{base}/api/BEF"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(frames.len(), 2);

    let frames: Vec<Value> = client
        .get(format!("{base}/api/toto"))
        .send()
        .await?
        .json()
        .await?;
    assert!(frames.is_empty());

    Ok(())
}

#[tokio::test]
async fn put_ingests_like_post() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/api"))
        .body(frame(true).to_string())
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .put(format!("{base}/api"))
        .body(frame(false).to_string())
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 204);

    Ok(())
}

#[tokio::test]
async fn delete_removes_device_frames() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api"))
        .body(frame(false).to_string())
        .send()
        .await?;

    let response = client.delete(format!("{base}/api/BEF")).send().await?;
    assert_eq!(response.status().as_u16(), 200);

    let frames: Vec<Value> = client
        .get(format!("{base}/api"))
        .send()
        .await?
        .json()
        .await?;
    assert!(frames.is_empty());

    // Nothing left to delete.
    let response = client.delete(format!("{base}/api/BEF")).send().await?;
    assert_eq!(response.status().as_u16(), 404);

    Ok(())
}

#[tokio::test]
async fn devices_registry_is_seeded() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let devices: Vec<Value> = client
        .get(format!("{base}/api/devices"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id_modem"], "12FED");
    assert_eq!(devices[1]["id_modem"], "12FEE");
    assert_eq!(devices[0]["attribution"], 0);

    Ok(())
}

#[tokio::test]
async fn malformed_frames_are_rejected() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    // Not JSON at all.
    let response = client
        .post(format!("{base}/api"))
        .body("not json")
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);

    // Missing a required field.
    let mut payload = frame(false);
    payload.as_object_mut().unwrap().remove("id_modem");
    let response = client
        .post(format!("{base}/api"))
        .body(payload.to_string())
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);

    // Payload that does not decode as hex.
    let mut payload = frame(false);
    payload
        .as_object_mut()
        .unwrap()
        .insert("data_str".into(), "xyz!".into());
    let response = client
        .post(format!("{base}/api"))
        .body(payload.to_string())
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);

    // Nothing was stored.
    let frames: Vec<Value> = client
        .get(format!("{base}/api"))
        .send()
        .await?
        .json()
        .await?;
    assert!(frames.is_empty());

    Ok(())
}

#[tokio::test]
async fn unsupported_api_method_is_not_implemented() -> Result<()> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let response = client.patch(format!("{base}/api")).send().await?;
    assert_eq!(response.status().as_u16(), 501);

    let response = client.patch(format!("{base}/api/toto")).send().await?;
    assert_eq!(response.status().as_u16(), 501);

    Ok(())
}
