//! TOML machine configuration
//!
//! Any table or key left out falls back to the board defaults, so a
//! config file only has to list what differs from the V2 wiring:
//!
//! ```toml
//! [motion]
//! settle_ms = 8
//!
//! [motion.center]
//! reference = "max"
//! backoff_steps = 120
//!
//! [network.wifi]
//! ssid = "incubadora"
//! password = "..."
//! ```
//!
//! An axis pin table, when present, must list all five pins.

use super::{ConfigError, MachineConfig};

/// Parse and validate a TOML configuration
pub fn parse_config(input: &str) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig = ::toml::from_str(input).map_err(|_| {
        warn!("Config TOML rejected by parser");
        ConfigError::Parse
    })?;
    config.validate()?;
    info!("Loaded configuration v{}", config.version);
    Ok(config)
}

impl MachineConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        parse_config(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisId;
    use crate::config::{LimitEnd, PinConfig};

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn test_shipped_board_file() {
        let config = parse_config(include_str!("../../machine.toml")).unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            [motion]
            settle_ms = 8

            [motion.center]
            reference = "max"
            backoff_steps = 120

            [network.wifi]
            ssid = "incubadora"
            "#,
        )
        .unwrap();

        assert_eq!(config.motion.settle_ms, 8);
        let center = config.axis_motion(AxisId::Center);
        assert_eq!(center.reference, LimitEnd::Max);
        assert_eq!(center.backoff_steps, 120);
        // Untouched keys keep their defaults
        assert_eq!(center.burst_steps, 16);
        assert_eq!(config.motion.left_tower.reference, LimitEnd::Min);
        assert_eq!(config.network.wifi.ssid.as_str(), "incubadora");
        assert_eq!(config.network.batch.lote_id.as_str(), "FagSummit2025");
    }

    #[test]
    fn test_axis_pin_table() {
        let config = parse_config(
            r#"
            [pins.center]
            step = { pin = 21 }
            dir = { pin = 22 }
            enable = { pin = 15, inverted = true }
            min_switch = { pin = 18, inverted = true, pull_up = true }
            max_switch = { pin = 19, inverted = true, pull_up = true }
            "#,
        )
        .unwrap();

        assert_eq!(config.pins.center.step, PinConfig::new(21));
        assert_eq!(config.pins.center.enable, PinConfig::inverted(15));
        assert_eq!(config.pins.right_tower.step.pin, 25);
    }

    #[test]
    fn test_incomplete_axis_pin_table_rejected() {
        let result = parse_config(
            r#"
            [pins.center]
            step = { pin = 21 }
            "#,
        );
        assert_eq!(result, Err(ConfigError::Parse));
    }

    #[test]
    fn test_invalid_wiring_rejected() {
        let result = parse_config(
            r#"
            [pins]
            floor_left = { pin = 12 }
            "#,
        );
        assert_eq!(result, Err(ConfigError::DuplicatePin(12)));
    }

    #[test]
    fn test_malformed_document_rejected() {
        assert_eq!(parse_config("[motion"), Err(ConfigError::Parse));
        assert_eq!(
            parse_config("[motion]\nsettle_ms = \"five\""),
            Err(ConfigError::Parse)
        );
    }
}
