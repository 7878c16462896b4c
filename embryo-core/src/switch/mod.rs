//! Limit switches and floor indicators

pub mod debounce;

pub use debounce::Debouncer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{PinConfig, PinMap};

/// Debounced switch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwitchState {
    /// Contact open
    #[default]
    Clear,
    /// Contact closed
    Triggered,
}

impl SwitchState {
    /// Check if the switch is triggered
    pub fn is_triggered(self) -> bool {
        self == SwitchState::Triggered
    }
}

impl From<bool> for SwitchState {
    fn from(triggered: bool) -> Self {
        if triggered {
            SwitchState::Triggered
        } else {
            SwitchState::Clear
        }
    }
}

/// Physical switches on the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwitchId {
    /// Center motor, left position
    CenterLeft,
    /// Center motor, right position
    CenterRight,
    LeftTowerLower,
    LeftTowerUpper,
    RightTowerLower,
    RightTowerUpper,
    /// Center mechanism floor indicator, right side
    FloorRight,
    /// Center mechanism floor indicator, left side
    FloorLeft,
}

impl SwitchId {
    /// Number of switches
    pub const COUNT: usize = 8;

    /// All switches
    pub const ALL: [SwitchId; Self::COUNT] = [
        SwitchId::CenterLeft,
        SwitchId::CenterRight,
        SwitchId::LeftTowerLower,
        SwitchId::LeftTowerUpper,
        SwitchId::RightTowerLower,
        SwitchId::RightTowerUpper,
        SwitchId::FloorRight,
        SwitchId::FloorLeft,
    ];

    /// Dense index for table lookups
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pin this switch is wired to
    pub fn pin(self, pins: &PinMap) -> PinConfig {
        match self {
            SwitchId::CenterLeft => pins.center.min_switch,
            SwitchId::CenterRight => pins.center.max_switch,
            SwitchId::LeftTowerLower => pins.left_tower.min_switch,
            SwitchId::LeftTowerUpper => pins.left_tower.max_switch,
            SwitchId::RightTowerLower => pins.right_tower.min_switch,
            SwitchId::RightTowerUpper => pins.right_tower.max_switch,
            SwitchId::FloorRight => pins.floor_right,
            SwitchId::FloorLeft => pins.floor_left,
        }
    }
}

/// Side of the center mechanism a floor indicator sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FloorSide {
    Left,
    Right,
}

impl FloorSide {
    /// Switch for this side
    pub fn switch(self) -> SwitchId {
        match self {
            FloorSide::Left => SwitchId::FloorLeft,
            FloorSide::Right => SwitchId::FloorRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, id) in SwitchId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_pin_lookup() {
        let pins = PinMap::default();
        assert_eq!(SwitchId::CenterLeft.pin(&pins).pin, 18);
        assert_eq!(SwitchId::RightTowerUpper.pin(&pins).pin, 34);
        assert_eq!(SwitchId::LeftTowerLower.pin(&pins).pin, 39);
        assert_eq!(FloorSide::Right.switch().pin(&pins).pin, 4);
    }

    #[test]
    fn test_state_from_bool() {
        assert!(SwitchState::from(true).is_triggered());
        assert_eq!(SwitchState::default(), SwitchState::Clear);
    }
}
