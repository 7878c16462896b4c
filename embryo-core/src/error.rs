//! Fault and rejection types
//!
//! Faults are latched in the axis that raised them until an explicit
//! reset. Rejections are returned synchronously and leave every axis
//! untouched.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::axis::AxisId;
use crate::stepper::StepperError;

/// Hardware-level fault latched by an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Fault {
    /// Travel limit exceeded without the expected switch event
    Stall,
    /// Both switches of the axis closed at once
    Conflict,
    /// Reference switch never released after backoff
    SwitchStuck,
}

impl From<StepperError> for Fault {
    fn from(e: StepperError) -> Self {
        match e {
            StepperError::TravelLimit => Fault::Stall,
        }
    }
}

/// Reason a command was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rejection {
    /// Axis is homing or executing a move
    Busy,
    /// Axis has no reference position (or its tower frame has none)
    NotReady,
    /// Axis has a latched fault; reset it first
    ///
    /// Only homing reports this. A faulted axis is unhomed, so moves get
    /// `NotReady`.
    Faulted,
}

/// Rejection of a multi-axis command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandError {
    /// First axis that refused the command
    pub axis: AxisId,
    /// Why it refused
    pub rejection: Rejection,
}

impl CommandError {
    /// Create a command error
    pub const fn new(axis: AxisId, rejection: Rejection) -> Self {
        Self { axis, rejection }
    }
}
