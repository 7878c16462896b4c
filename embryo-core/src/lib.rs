//! Board-agnostic core logic for the egg tray controller firmware
//!
//! This crate contains all tray motion logic that does not depend on
//! specific hardware implementations:
//!
//! - Machine configuration (pin map, motion parameters, network settings)
//! - Stepper driver abstraction over [`embryo_hal::DigitalIo`]
//! - Limit switch debouncing
//! - Per-axis homing state machine
//! - Tri-axis coordinator (startup homing order, tray-cycle commands)
//! - Status events and reports for the display/reporting modules

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "config-toml")]
extern crate alloc;

#[macro_use]
mod fmt;

pub mod axis;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod report;
pub mod stepper;
pub mod switch;

pub use axis::{AxisId, AxisSnapshot, MotionCommand, TrayTarget};
pub use coordinator::{AxisEvent, Coordinator, HomingRequest};
pub use error::{CommandError, Fault, Rejection};
pub use report::{ReportError, StatusReport};
