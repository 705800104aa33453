use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a modem identifier (hexadecimal, 4 bytes).
pub const SIGFOX_DEVICE_LENGTH: usize = 8;

/// Maximum length of a base station identifier (hexadecimal, 2 bytes).
pub const SIGFOX_STATION_LENGTH: usize = 4;

/// Maximum length of the user payload as a hex string (12 bytes).
pub const SIGFOX_DATA_STR_LENGTH: usize = 24;

/// Raw frame as posted by the Sigfox backend callback.
///
/// `ack` and `long_polling` are optional in practice; the backend omits them
/// for plain uplink messages. `latitude`/`longitude` are only present when the
/// receiving base station reports its position.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    pub id_modem: String,
    /// Event timestamp, seconds since the Unix epoch.
    pub timestamp: i64,
    /// True when the backend already processed this message through another
    /// base station.
    pub duplicate: bool,
    /// Signal to noise ratio in dB.
    pub snr: f64,
    pub station: String,
    /// User payload as a hex string, up to 12 bytes.
    pub data_str: String,
    /// Average SNR computed by the backend over the last messages, in dB.
    pub avg_signal: f64,
    #[serde(default)]
    pub latitude: i64,
    #[serde(default)]
    pub longitude: i64,
    /// RSSI in dBm.
    pub rssi: f64,
    pub seq_number: i64,
    /// True when the device expects a downlink acknowledgment.
    #[serde(default)]
    pub ack: bool,
    #[serde(default)]
    pub long_polling: bool,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("data_str is not a valid hex payload: {0}")]
    InvalidData(#[from] hex::FromHexError),
}

impl RawFrame {
    /// Caps the identifier fields at the lengths the Sigfox backend
    /// guarantees and decodes the hex payload. Oversized identifiers are
    /// truncated; an undecodable payload is an error.
    pub fn normalize(mut self) -> Result<(RawFrame, Vec<u8>), FrameError> {
        cap(&mut self.id_modem, SIGFOX_DEVICE_LENGTH);
        cap(&mut self.station, SIGFOX_STATION_LENGTH);
        cap(&mut self.data_str, SIGFOX_DATA_STR_LENGTH);

        let data_hex = hex::decode(&self.data_str)?;

        Ok((self, data_hex))
    }
}

/// Truncate to at most `max` bytes without splitting a character.
fn cap(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}

/// Stored frame, as returned by the `/api` listing endpoints.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct FrameRecord {
    pub timestamp: i64,
    pub id_modem: String,
    pub snr: f64,
    pub station: String,
    pub ack: bool,
    pub data_str: String,
    pub duplicate: bool,
    pub avg_signal: f64,
    pub rssi: f64,
    pub latitude: i64,
    pub longitude: i64,
    pub seq_number: i64,
}

/// Tracked device, as returned by `/api/devices`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DeviceRecord {
    pub id_modem: String,
    pub attribution: i64,
    pub timestamp_attribution: i64,
}
