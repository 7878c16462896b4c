//! Configuration types
//!
//! Immutable machine configuration handed to each component at
//! construction. Defaults reproduce the V2 controller board.

pub mod motion;
pub mod network;
pub mod pins;
#[cfg(feature = "config-toml")]
pub mod toml;

pub use motion::*;
pub use network::*;
pub use pins::*;
#[cfg(feature = "config-toml")]
pub use self::toml::parse_config;

use embryo_hal::PinId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::axis::AxisId;

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin assigned to more than one role
    DuplicatePin(PinId),
    /// Output assigned to an input-only GPIO
    InputOnlyPin(PinId),
    /// Internal pull-up requested on a GPIO that has none
    NoPullUp(PinId),
    /// Motion parameters an axis cannot home with
    InvalidMotion(AxisId),
    /// Debounce settle window of zero
    InvalidSettleWindow,
    /// Batch end timestamp not in `YYYY-MM-DDTHH:MM:SS` form
    InvalidBatchEnd,
    /// Config version mismatch
    VersionMismatch(u8),
    /// TOML parsing failed
    Parse,
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Board wiring
    pub pins: PinMap,
    /// Homing and move parameters
    pub motion: MotionConfig,
    /// Wi-Fi, API and batch settings
    pub network: NetworkConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            pins: PinMap::default(),
            motion: MotionConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl MachineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins of a stepper axis
    pub fn axis_pins(&self, axis: AxisId) -> &AxisPins {
        self.pins.axis(axis)
    }

    /// Motion parameters of a stepper axis
    pub fn axis_motion(&self, axis: AxisId) -> &AxisMotionConfig {
        self.motion.axis(axis)
    }

    /// Check the configuration for wiring and parameter errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch(self.version));
        }
        if let Some(pin) = self.pins.find_duplicate() {
            return Err(ConfigError::DuplicatePin(pin));
        }
        if let Some(pin) = self.pins.find_input_only_output() {
            return Err(ConfigError::InputOnlyPin(pin));
        }
        if let Some(pin) = self.pins.find_unsupported_pull_up() {
            return Err(ConfigError::NoPullUp(pin));
        }
        if self.motion.settle_ms == 0 {
            return Err(ConfigError::InvalidSettleWindow);
        }
        if let Some(axis) = AxisId::ALL
            .into_iter()
            .find(|axis| !self.axis_motion(*axis).is_valid())
        {
            return Err(ConfigError::InvalidMotion(axis));
        }
        if !self.network.batch.has_valid_end() {
            return Err(ConfigError::InvalidBatchEnd);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = MachineConfig::new();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut config = MachineConfig::new();
        config.pins.left_tower.dir.pin = config.pins.right_tower.dir.pin;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(26)));
    }

    #[test]
    fn test_input_only_output_rejected() {
        let mut config = MachineConfig::new();
        config.pins.center.enable.pin = 38;
        assert_eq!(config.validate(), Err(ConfigError::InputOnlyPin(38)));
    }

    #[test]
    fn test_pull_up_on_input_only_pin_rejected() {
        let mut config = MachineConfig::new();
        config.pins.right_tower.max_switch.pull_up = true;
        assert_eq!(config.validate(), Err(ConfigError::NoPullUp(34)));
    }

    #[test]
    fn test_invalid_motion_rejected() {
        let mut config = MachineConfig::new();
        config.motion.axis_mut(AxisId::RightTower).burst_steps = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMotion(AxisId::RightTower))
        );

        let mut config = MachineConfig::new();
        config.motion.settle_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSettleWindow));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let config = MachineConfig {
            version: 7,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::VersionMismatch(7)));
    }
}
