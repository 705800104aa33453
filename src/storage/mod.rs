use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::models::{DeviceRecord, FrameRecord, RawFrame};

/// Schema for the raw frames reported by the Sigfox backend.
const CREATE_RAWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS `raws` (
  `idraws` INTEGER PRIMARY KEY AUTOINCREMENT,
  `time` INTEGER NOT NULL,
  `idmodem` TEXT NOT NULL,
  `snr` REAL NOT NULL,
  `station` TEXT NOT NULL,
  `ack` INTEGER,
  `data` TEXT NOT NULL,
  `data_hex` BLOB NOT NULL,
  `duplicate` INTEGER NOT NULL,
  `avgSignal` REAL NOT NULL,
  `rssi` REAL NOT NULL,
  `lat` INTEGER NOT NULL,
  `lon` INTEGER NOT NULL,
  `seqNumber` INTEGER NOT NULL
)
"#;

/// Schema for the registry of tracked devices.
const CREATE_DEVICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS `devices` (
  `iddevices` INTEGER PRIMARY KEY AUTOINCREMENT,
  `idmodem` TEXT NOT NULL UNIQUE,
  `attribution` INTEGER,
  `timestamp_attribution` INTEGER
)
"#;

const SELECT_RAWS: &str = r#"
SELECT
    `time` AS timestamp,
    `idmodem` AS id_modem,
    `snr`,
    `station`,
    `ack`,
    `data` AS data_str,
    `duplicate`,
    `avgSignal` AS avg_signal,
    `rssi`,
    `lat` AS latitude,
    `lon` AS longitude,
    `seqNumber` AS seq_number
FROM `raws`
"#;

pub async fn connect(database_url: &str, pool_size: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(pool_size)
        .connect(database_url)
        .await
}

/// Create the tables if they do not exist yet.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_RAWS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_DEVICES_TABLE).execute(pool).await?;
    Ok(())
}

/// Register the configured devices. Devices already present from a previous
/// run are left untouched.
pub async fn seed_devices(pool: &SqlitePool, ids: &[String]) -> Result<(), sqlx::Error> {
    for id in ids {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO `devices` (`idmodem`, `attribution`, `timestamp_attribution`) \
             VALUES (?, 0, 0)",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Device {} already registered", id);
        } else {
            info!("Device {} registered", id);
        }
    }
    Ok(())
}

/// Persist one raw frame together with its decoded payload.
pub async fn insert_frame(
    pool: &SqlitePool,
    frame: &RawFrame,
    data_hex: &[u8],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO `raws` \
         (`time`, `idmodem`, `snr`, `station`, `ack`, `data`, `data_hex`, `duplicate`, \
          `avgSignal`, `rssi`, `lat`, `lon`, `seqNumber`) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(frame.timestamp)
    .bind(&frame.id_modem)
    .bind(frame.snr)
    .bind(&frame.station)
    .bind(frame.ack)
    .bind(&frame.data_str)
    .bind(data_hex)
    .bind(frame.duplicate)
    .bind(frame.avg_signal)
    .bind(frame.rssi)
    .bind(frame.latitude)
    .bind(frame.longitude)
    .bind(frame.seq_number)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch stored frames in insertion order, optionally restricted to one
/// device.
pub async fn list_frames(
    pool: &SqlitePool,
    device: Option<&str>,
) -> Result<Vec<FrameRecord>, sqlx::Error> {
    match device {
        Some(id) => {
            sqlx::query_as(&format!(
                "{} WHERE `idmodem` = ? ORDER BY `idraws`",
                SELECT_RAWS
            ))
            .bind(id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as(&format!("{} ORDER BY `idraws`", SELECT_RAWS))
                .fetch_all(pool)
                .await
        }
    }
}

/// Delete all frames reported by one device. Returns the number of rows
/// removed.
pub async fn delete_frames(pool: &SqlitePool, device: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM `raws` WHERE `idmodem` = ?")
        .bind(device)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn list_devices(pool: &SqlitePool) -> Result<Vec<DeviceRecord>, sqlx::Error> {
    sqlx::query_as(
        "SELECT `idmodem` AS id_modem, `attribution`, `timestamp_attribution` \
         FROM `devices` ORDER BY `iddevices`",
    )
    .fetch_all(pool)
    .await
}
