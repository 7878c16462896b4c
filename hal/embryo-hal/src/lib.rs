//! Embryo Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the tray controller needs
//! from a board. Chip-specific code only has to provide pin access and a
//! millisecond clock; the homing and positioning logic in `embryo-core`
//! never touches registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  embryo-core (coordinator, homing, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embryo-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ PinBank over  │       │ sim::SimBoard │
//! │ embedded-hal  │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalIo`] - Pin-number addressed digital read/write/pulse
//! - [`time::Monotonic`] - Millisecond tick source

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
#[cfg(feature = "sim")]
pub mod sim;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::{DigitalIo, PinBank, PinId};
pub use time::Monotonic;
