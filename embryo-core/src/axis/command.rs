//! Motion command types
//!
//! These types define the command interface between the coordinator
//! and the axes it owns.

use super::AxisId;

/// Request to move one axis to an absolute position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionCommand {
    /// Target axis
    pub axis: AxisId,
    /// Target position in steps from home
    pub target: i32,
    /// Maximum step rate (steps/s)
    pub max_speed_sps: u32,
}

impl MotionCommand {
    /// Create a motion command
    pub const fn new(axis: AxisId, target: i32, max_speed_sps: u32) -> Self {
        Self {
            axis,
            target,
            max_speed_sps,
        }
    }
}

/// One target per axis for a tray cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrayTarget {
    pub center: i32,
    pub left_tower: i32,
    pub right_tower: i32,
}

impl TrayTarget {
    /// Create a tray target
    pub const fn new(center: i32, left_tower: i32, right_tower: i32) -> Self {
        Self {
            center,
            left_tower,
            right_tower,
        }
    }

    /// Target for one axis
    pub fn get(&self, axis: AxisId) -> i32 {
        match axis {
            AxisId::Center => self.center,
            AxisId::LeftTower => self.left_tower,
            AxisId::RightTower => self.right_tower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tray_target_lookup() {
        let target = TrayTarget::new(100, -20, 300);
        assert_eq!(target.get(AxisId::Center), 100);
        assert_eq!(target.get(AxisId::LeftTower), -20);
        assert_eq!(target.get(AxisId::RightTower), 300);
    }
}
