//! Simulated board for host-side testing
//!
//! [`SimBoard`] implements [`DigitalIo`] over a small mechanical model:
//! carriages advance one step per pulse on their step pin, in the
//! direction given by the level of their direction pin, and their limit
//! switches close when the carriage reaches a configured position.
//! Tests can also force any input to a level to inject glitches or
//! wiring faults, and inspect per-pin activity afterwards.

use core::cell::Cell;

use crate::gpio::{DigitalIo, PinId};
use crate::time::Monotonic;

/// Number of GPIOs on the simulated board (ESP32: GPIO0..=GPIO39)
pub const SIM_PINS: usize = 40;

/// Maximum carriages attached to one board
pub const MAX_CARRIAGES: usize = 4;

/// Position condition under which a simulated switch is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Closed while the carriage position is at or below the value
    AtOrBelow(i32),
    /// Closed while the carriage position is at or above the value
    AtOrAbove(i32),
}

impl Trigger {
    fn closed_at(self, position: i32) -> bool {
        match self {
            Trigger::AtOrBelow(limit) => position <= limit,
            Trigger::AtOrAbove(limit) => position >= limit,
        }
    }
}

/// Limit switch mounted on a simulated carriage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSwitch {
    /// Input pin the switch is wired to
    pub pin: PinId,
    /// Where the switch closes
    pub trigger: Trigger,
    /// Closed switch pulls the line low
    pub active_low: bool,
}

impl SimSwitch {
    /// Active-low switch (normally open contact to ground with pull-up)
    pub const fn active_low(pin: PinId, trigger: Trigger) -> Self {
        Self {
            pin,
            trigger,
            active_low: true,
        }
    }

    /// Active-high switch
    pub const fn active_high(pin: PinId, trigger: Trigger) -> Self {
        Self {
            pin,
            trigger,
            active_low: false,
        }
    }
}

/// Stepper-driven carriage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCarriage {
    step_pin: PinId,
    dir_pin: PinId,
    position: i32,
    switches: [Option<SimSwitch>; 2],
}

impl SimCarriage {
    /// Create a carriage at position 0
    ///
    /// A high direction pin moves the carriage toward positive positions.
    pub const fn new(step_pin: PinId, dir_pin: PinId) -> Self {
        Self {
            step_pin,
            dir_pin,
            position: 0,
            switches: [None, None],
        }
    }

    /// Start the carriage at a position
    pub const fn at(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Mount a switch (at most two per carriage; extras are ignored)
    pub fn with_switch(mut self, switch: SimSwitch) -> Self {
        if let Some(slot) = self.switches.iter_mut().find(|s| s.is_none()) {
            *slot = Some(switch);
        }
        self
    }

    /// Current carriage position in steps
    pub fn position(&self) -> i32 {
        self.position
    }

    fn switch_level(&self, pin: PinId) -> Option<bool> {
        self.switches.iter().flatten().find(|s| s.pin == pin).map(|s| {
            let closed = s.trigger.closed_at(self.position);
            closed != s.active_low
        })
    }
}

/// Handle to a carriage attached to a [`SimBoard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarriageId(usize);

/// Simulated board
#[derive(Debug, Clone)]
pub struct SimBoard {
    levels: [bool; SIM_PINS],
    overrides: [Option<bool>; SIM_PINS],
    pulses: [u32; SIM_PINS],
    writes: [u32; SIM_PINS],
    carriages: [Option<SimCarriage>; MAX_CARRIAGES],
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBoard {
    /// Create a board with every pin low and no carriages
    pub fn new() -> Self {
        Self {
            levels: [false; SIM_PINS],
            overrides: [None; SIM_PINS],
            pulses: [0; SIM_PINS],
            writes: [0; SIM_PINS],
            carriages: [None; MAX_CARRIAGES],
        }
    }

    /// Attach a carriage
    ///
    /// # Panics
    /// If [`MAX_CARRIAGES`] carriages are already attached.
    pub fn attach(&mut self, carriage: SimCarriage) -> CarriageId {
        let index = self
            .carriages
            .iter()
            .position(|c| c.is_none())
            .expect("sim board carriage slots exhausted");
        self.carriages[index] = Some(carriage);
        CarriageId(index)
    }

    /// Inspect an attached carriage
    pub fn carriage(&self, id: CarriageId) -> Option<&SimCarriage> {
        self.carriages[id.0].as_ref()
    }

    /// Current position of an attached carriage
    pub fn carriage_position(&self, id: CarriageId) -> i32 {
        self.carriage(id).map_or(0, |c| c.position)
    }

    /// Teleport a carriage (simulates a belt slip or manual push)
    pub fn set_carriage_position(&mut self, id: CarriageId, position: i32) {
        if let Some(c) = self.carriages[id.0].as_mut() {
            c.position = position;
        }
    }

    /// Set the static level of an input that no carriage drives
    pub fn set_input(&mut self, pin: PinId, high: bool) {
        if let Some(level) = self.levels.get_mut(pin as usize) {
            *level = high;
        }
    }

    /// Force a pin to read a level regardless of the mechanical model
    pub fn force(&mut self, pin: PinId, high: bool) {
        if let Some(o) = self.overrides.get_mut(pin as usize) {
            *o = Some(high);
        }
    }

    /// Remove a forced level
    pub fn release(&mut self, pin: PinId) {
        if let Some(o) = self.overrides.get_mut(pin as usize) {
            *o = None;
        }
    }

    /// Last level driven onto a pin
    pub fn level(&self, pin: PinId) -> bool {
        self.levels.get(pin as usize).copied().unwrap_or(false)
    }

    /// Pulses emitted on a pin
    pub fn pulses(&self, pin: PinId) -> u32 {
        self.pulses.get(pin as usize).copied().unwrap_or(0)
    }

    /// Level writes performed on a pin
    pub fn writes(&self, pin: PinId) -> u32 {
        self.writes.get(pin as usize).copied().unwrap_or(0)
    }

    /// Total output activity (writes and pulses) on a pin
    pub fn activity(&self, pin: PinId) -> u32 {
        self.pulses(pin) + self.writes(pin)
    }

    /// Total output activity on the whole board
    pub fn total_activity(&self) -> u32 {
        self.pulses.iter().sum::<u32>() + self.writes.iter().sum::<u32>()
    }
}

impl DigitalIo for SimBoard {
    fn digital_read(&mut self, pin: PinId) -> bool {
        if let Some(Some(level)) = self.overrides.get(pin as usize) {
            return *level;
        }
        if let Some(level) = self
            .carriages
            .iter()
            .flatten()
            .find_map(|c| c.switch_level(pin))
        {
            return level;
        }
        self.level(pin)
    }

    fn digital_write(&mut self, pin: PinId, high: bool) {
        let index = pin as usize;
        if index >= SIM_PINS {
            return;
        }
        self.levels[index] = high;
        self.writes[index] += 1;
    }

    fn pulse(&mut self, pin: PinId, active_high: bool, _period_us: u32) {
        let index = pin as usize;
        if index >= SIM_PINS {
            return;
        }
        self.pulses[index] += 1;
        self.levels[index] = !active_high;

        let levels = self.levels;
        for carriage in self.carriages.iter_mut().flatten() {
            if carriage.step_pin == pin {
                let forward = levels.get(carriage.dir_pin as usize).copied().unwrap_or(false);
                carriage.position += if forward { 1 } else { -1 };
            }
        }
    }
}

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: Cell<u32>,
}

impl SimClock {
    /// Create a clock starting at `start_ms`
    pub fn new(start_ms: u32) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Advance the clock (wrapping)
    pub fn advance(&self, ms: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(ms));
    }

    /// Jump to an absolute time
    pub fn set(&self, ms: u32) {
        self.now_ms.set(ms);
    }
}

impl Monotonic for SimClock {
    fn now_ms(&self) -> u32 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carriage_follows_direction_pin() {
        let mut board = SimBoard::new();
        let id = board.attach(SimCarriage::new(12, 13));

        board.digital_write(13, true);
        for _ in 0..5 {
            board.pulse(12, true, 100);
        }
        board.digital_write(13, false);
        board.pulse(12, true, 100);

        assert_eq!(board.carriage_position(id), 4);
        assert_eq!(board.pulses(12), 6);
        assert_eq!(board.writes(13), 2);
        // Step pin is left inactive after a pulse
        assert!(!board.level(12));
    }

    #[test]
    fn test_switch_closes_at_position() {
        let mut board = SimBoard::new();
        board.attach(
            SimCarriage::new(25, 26)
                .at(2)
                .with_switch(SimSwitch::active_low(35, Trigger::AtOrBelow(0)))
                .with_switch(SimSwitch::active_high(34, Trigger::AtOrAbove(10))),
        );

        // Open: active-low idles high, active-high idles low
        assert!(board.digital_read(35));
        assert!(!board.digital_read(34));

        board.digital_write(26, false);
        board.pulse(25, true, 100);
        board.pulse(25, true, 100);
        assert!(!board.digital_read(35));
    }

    #[test]
    fn test_force_overrides_model() {
        let mut board = SimBoard::new();
        board.attach(
            SimCarriage::new(25, 26).with_switch(SimSwitch::active_low(35, Trigger::AtOrBelow(-5))),
        );
        assert!(board.digital_read(35));

        board.force(35, false);
        assert!(!board.digital_read(35));

        board.release(35);
        assert!(board.digital_read(35));
    }

    #[test]
    fn test_out_of_range_pins_are_ignored() {
        let mut board = SimBoard::new();
        board.digital_write(200, true);
        board.pulse(200, true, 10);
        assert!(!board.digital_read(200));
        assert_eq!(board.total_activity(), 0);
    }

    #[test]
    fn test_clock_wraps() {
        let clock = SimClock::new(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now_ms(), 1);
    }
}
