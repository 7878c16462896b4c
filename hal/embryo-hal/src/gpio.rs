//! GPIO abstractions
//!
//! Pins are addressed by their board GPIO number, the same numbers the
//! machine configuration carries. Each consumer only touches the pins it
//! was configured with, so a single [`DigitalIo`] can be shared by all
//! axes without locking.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Board GPIO number
pub type PinId = u8;

/// Digital pin access by GPIO number
pub trait DigitalIo {
    /// Read the electrical level of a pin (`true` = high)
    fn digital_read(&mut self, pin: PinId) -> bool;

    /// Drive a pin to the given level
    fn digital_write(&mut self, pin: PinId, high: bool);

    /// Emit one pulse on a pin
    ///
    /// The pin is driven to `active_high` for the first half of
    /// `period_us`, then to the inactive level for the rest, so that
    /// back-to-back pulses are spaced by `period_us`.
    fn pulse(&mut self, pin: PinId, active_high: bool, period_us: u32);
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn digital_read(&mut self, pin: PinId) -> bool {
        (**self).digital_read(pin)
    }

    fn digital_write(&mut self, pin: PinId, high: bool) {
        (**self).digital_write(pin, high)
    }

    fn pulse(&mut self, pin: PinId, active_high: bool, period_us: u32) {
        (**self).pulse(pin, active_high, period_us)
    }
}

/// [`DigitalIo`] built from `embedded-hal` pins
///
/// Chip HALs such as esp-hal expose type-erased `Output`/`Input` pins with
/// an infallible error type; a board hands slices of them here together
/// with a delay provider. Reads of pins not in the bank return low and
/// writes to them are dropped.
pub struct PinBank<'a, O, I, D> {
    outputs: &'a mut [(PinId, O)],
    inputs: &'a mut [(PinId, I)],
    delay: D,
}

impl<'a, O, I, D> PinBank<'a, O, I, D>
where
    O: OutputPin<Error = Infallible>,
    I: InputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Create a pin bank
    pub fn new(outputs: &'a mut [(PinId, O)], inputs: &'a mut [(PinId, I)], delay: D) -> Self {
        Self {
            outputs,
            inputs,
            delay,
        }
    }

    /// Check whether a pin is part of this bank
    pub fn contains(&self, pin: PinId) -> bool {
        self.outputs.iter().any(|(id, _)| *id == pin) || self.inputs.iter().any(|(id, _)| *id == pin)
    }

    fn output(&mut self, pin: PinId) -> Option<&mut O> {
        self.outputs
            .iter_mut()
            .find(|(id, _)| *id == pin)
            .map(|(_, out)| out)
    }

    fn drive(&mut self, pin: PinId, high: bool) {
        if let Some(out) = self.output(pin) {
            match out.set_state(PinState::from(high)) {
                Ok(()) => {}
                Err(never) => match never {},
            }
        }
    }
}

impl<'a, O, I, D> DigitalIo for PinBank<'a, O, I, D>
where
    O: OutputPin<Error = Infallible>,
    I: InputPin<Error = Infallible>,
    D: DelayNs,
{
    fn digital_read(&mut self, pin: PinId) -> bool {
        match self.inputs.iter_mut().find(|(id, _)| *id == pin) {
            Some((_, input)) => match input.is_high() {
                Ok(level) => level,
                Err(never) => match never {},
            },
            None => false,
        }
    }

    fn digital_write(&mut self, pin: PinId, high: bool) {
        self.drive(pin, high);
    }

    fn pulse(&mut self, pin: PinId, active_high: bool, period_us: u32) {
        let high_us = period_us / 2;
        self.drive(pin, active_high);
        self.delay.delay_us(high_us);
        self.drive(pin, !active_high);
        self.delay.delay_us(period_us - high_us);
    }
}
