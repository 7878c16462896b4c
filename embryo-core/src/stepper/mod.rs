//! Stepper motor driver abstraction
//!
//! One [`StepperDriver`] per axis drives a step/direction/enable driver
//! (TB6600) through [`embryo_hal::DigitalIo`].

pub mod driver;

pub use driver::StepperDriver;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stepping direction
///
/// `Forward` drives the direction pin to its active level and counts
/// positions up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Toward the `max_switch` end
    Forward,
    /// Toward the `min_switch` end
    Reverse,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Position change per step
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// Direction that moves by a signed delta (`None` for zero)
    pub fn of_delta(delta: i64) -> Option<Self> {
        match delta {
            d if d > 0 => Some(Direction::Forward),
            d if d < 0 => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Move would carry the axis past its travel guard
    TravelLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        assert_eq!(Direction::Forward.opposite(), Direction::Reverse);
        assert_eq!(Direction::Reverse.sign(), -1);
        assert_eq!(Direction::of_delta(5), Some(Direction::Forward));
        assert_eq!(Direction::of_delta(-1), Some(Direction::Reverse));
        assert_eq!(Direction::of_delta(0), None);
    }
}
