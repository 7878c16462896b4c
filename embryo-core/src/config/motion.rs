//! Motion and homing parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::axis::AxisId;
use crate::stepper::Direction;

/// Shortest step period the TB6600 accepts reliably
pub const MIN_PULSE_PERIOD_US: u32 = 10;

/// Default debounce settle window
pub const DEFAULT_SETTLE_MS: u32 = 5;

/// End of travel an axis homes against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LimitEnd {
    /// Reverse end (`min_switch`)
    #[default]
    Min,
    /// Forward end (`max_switch`)
    Max,
}

impl LimitEnd {
    /// Stepping direction that approaches this end
    pub fn approach(self) -> Direction {
        match self {
            LimitEnd::Min => Direction::Reverse,
            LimitEnd::Max => Direction::Forward,
        }
    }
}

/// Per-axis motion parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AxisMotionConfig {
    /// Switch that defines position zero
    pub reference: LimitEnd,
    /// Seek and backoff speed (steps/s)
    pub homing_speed_sps: u32,
    /// Default speed for position moves (steps/s)
    pub move_speed_sps: u32,
    /// Seek travel after which a silent switch is declared broken
    ///
    /// Seeking stops here and waits one debounce settle window before the
    /// stall, so a switch closing on the last burst still homes.
    pub max_homing_steps: u32,
    /// Retraction off the reference switch after it triggers
    ///
    /// The seek only stops once the debouncer confirms the switch, about
    /// `settle_ms` worth of bursts past its edge; this must clear that.
    pub backoff_steps: u32,
    /// How long the reference switch may stay closed after backoff
    pub release_timeout_ms: u32,
    /// Travel guard from home for guarded moves
    pub travel_limit_steps: u32,
    /// Maximum pulses per axis per tick
    pub burst_steps: u32,
}

impl Default for AxisMotionConfig {
    fn default() -> Self {
        Self {
            reference: LimitEnd::Min,
            homing_speed_sps: 400,
            move_speed_sps: 800,
            max_homing_steps: 20_000,
            backoff_steps: 200,
            release_timeout_ms: 50,
            travel_limit_steps: 16_000,
            burst_steps: 16,
        }
    }
}

impl AxisMotionConfig {
    /// Step period for a speed, clamped to what the driver accepts
    pub fn pulse_period_us(speed_sps: u32) -> u32 {
        (1_000_000 / speed_sps.max(1)).max(MIN_PULSE_PERIOD_US)
    }

    /// Step period used while homing
    pub fn homing_period_us(&self) -> u32 {
        Self::pulse_period_us(self.homing_speed_sps)
    }

    /// Check the parameters for values the homing sequence cannot run with
    pub fn is_valid(&self) -> bool {
        self.homing_speed_sps > 0
            && self.move_speed_sps > 0
            && self.burst_steps > 0
            && self.travel_limit_steps > 0
            && self.backoff_steps > 0
            && self.backoff_steps < self.max_homing_steps
    }
}

/// Motion parameters for the whole machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Time a switch change must persist before it is reported
    pub settle_ms: u32,
    /// Center mechanism (homes to its left switch)
    pub center: AxisMotionConfig,
    /// Left tower (homes to its lower switch)
    pub left_tower: AxisMotionConfig,
    /// Right tower (homes to its lower switch)
    pub right_tower: AxisMotionConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            center: AxisMotionConfig {
                max_homing_steps: 12_000,
                travel_limit_steps: 9_000,
                ..AxisMotionConfig::default()
            },
            left_tower: AxisMotionConfig::default(),
            right_tower: AxisMotionConfig::default(),
        }
    }
}

impl MotionConfig {
    /// Parameters of one axis
    pub fn axis(&self, axis: AxisId) -> &AxisMotionConfig {
        match axis {
            AxisId::Center => &self.center,
            AxisId::LeftTower => &self.left_tower,
            AxisId::RightTower => &self.right_tower,
        }
    }

    /// Mutable parameters of one axis
    pub fn axis_mut(&mut self, axis: AxisId) -> &mut AxisMotionConfig {
        match axis {
            AxisId::Center => &mut self.center,
            AxisId::LeftTower => &mut self.left_tower,
            AxisId::RightTower => &mut self.right_tower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_period() {
        assert_eq!(AxisMotionConfig::pulse_period_us(1000), 1000);
        assert_eq!(AxisMotionConfig::pulse_period_us(400), 2500);
        // Clamped to the driver limit
        assert_eq!(AxisMotionConfig::pulse_period_us(1_000_000), MIN_PULSE_PERIOD_US);
        // Zero speed does not divide by zero
        assert_eq!(AxisMotionConfig::pulse_period_us(0), 1_000_000);
    }

    #[test]
    fn test_default_is_valid() {
        let motion = MotionConfig::default();
        for axis in AxisId::ALL {
            assert!(motion.axis(axis).is_valid());
        }
        assert_eq!(motion.settle_ms, 5);
    }

    #[test]
    fn test_backoff_must_fit_in_seek() {
        let config = AxisMotionConfig {
            backoff_steps: 500,
            max_homing_steps: 500,
            ..AxisMotionConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_reference_direction() {
        assert_eq!(LimitEnd::Min.approach(), Direction::Reverse);
        assert_eq!(LimitEnd::Max.approach(), Direction::Forward);
    }
}
