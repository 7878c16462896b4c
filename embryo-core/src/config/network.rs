//! Network and reporting parameters
//!
//! Carried as data for the reporting module; nothing in this crate opens
//! a connection.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum Wi-Fi SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length (WPA2 passphrase limit)
pub const MAX_SECRET_LEN: usize = 64;

/// Maximum API base URL length
pub const MAX_URL_LEN: usize = 96;

/// Maximum user name / batch id length
pub const MAX_NAME_LEN: usize = 32;

/// Length of a `YYYY-MM-DDTHH:MM:SS` timestamp
pub const TIMESTAMP_LEN: usize = 19;

fn text<const N: usize>(value: &str) -> String<N> {
    String::try_from(value).unwrap_or_default()
}

/// Wi-Fi station credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_SECRET_LEN>,
}

/// Remote API endpoint and device account
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApiConfig {
    pub base_url: String<MAX_URL_LEN>,
    /// Account the controller authenticates as (must exist on the API)
    pub username: String<MAX_NAME_LEN>,
    pub password: String<MAX_SECRET_LEN>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: text("https://embryo.outsideagro.tech/api"),
            username: text("processador"),
            password: String::new(),
        }
    }
}

/// Egg batch the machine is processing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatchConfig {
    /// Batch identifier reports are scoped to
    pub lote_id: String<MAX_NAME_LEN>,
    /// End of the batch, `YYYY-MM-DDTHH:MM:SS` as stored by the API
    pub ends_at: String<TIMESTAMP_LEN>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            lote_id: text("FagSummit2025"),
            ends_at: text("2025-12-15T23:59:59"),
        }
    }
}

impl BatchConfig {
    /// Check that `ends_at` has the `YYYY-MM-DDTHH:MM:SS` shape
    pub fn has_valid_end(&self) -> bool {
        let bytes = self.ends_at.as_bytes();
        bytes.len() == TIMESTAMP_LEN
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                10 => *b == b'T',
                13 | 16 => *b == b':',
                _ => b.is_ascii_digit(),
            })
    }
}

/// Network settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    pub wifi: WifiConfig,
    pub api: ApiConfig,
    pub batch: BatchConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let net = NetworkConfig::default();
        assert!(net.wifi.ssid.is_empty());
        assert!(net.api.password.is_empty());
        assert_eq!(net.api.base_url.as_str(), "https://embryo.outsideagro.tech/api");
        assert_eq!(net.batch.lote_id.as_str(), "FagSummit2025");
        assert!(net.batch.has_valid_end());
    }

    #[test]
    fn test_batch_end_shape() {
        let mut batch = BatchConfig::default();
        batch.ends_at = text("2025-12-15 23:59:59");
        assert!(!batch.has_valid_end());

        batch.ends_at = text("2025-12-15");
        assert!(!batch.has_valid_end());
    }
}
