//! Step/direction/enable stepper driver
//!
//! Tracks the position it has stepped to and, once the axis has a
//! reference, refuses moves that would leave the travel guard.

use embryo_hal::DigitalIo;

use super::{Direction, StepperError};
use crate::config::{AxisPins, PinConfig};

/// Stepper driver for one axis
#[derive(Debug, Clone)]
pub struct StepperDriver {
    step: PinConfig,
    dir: PinConfig,
    enable: PinConfig,
    /// Steps from the reference (or from power-on before homing)
    position: i32,
    /// Maximum distance from the reference, when one is set
    guard: Option<u32>,
    enabled: bool,
    /// Level last written to the direction pin
    direction: Option<Direction>,
}

impl StepperDriver {
    /// Create a driver for the given pins
    pub fn new(step: PinConfig, dir: PinConfig, enable: PinConfig) -> Self {
        Self {
            step,
            dir,
            enable,
            position: 0,
            guard: None,
            enabled: false,
            direction: None,
        }
    }

    /// Create a driver from an axis pin assignment
    pub fn from_pins(pins: &AxisPins) -> Self {
        Self::new(pins.step, pins.dir, pins.enable)
    }

    /// Drive the outputs to their idle levels (step inactive, disabled)
    pub fn init<G: DigitalIo>(&mut self, io: &mut G) {
        io.digital_write(self.step.pin, !self.step.active_level());
        self.disable(io);
    }

    /// Assert the enable pin (motor holds position)
    pub fn enable<G: DigitalIo>(&mut self, io: &mut G) {
        io.digital_write(self.enable.pin, self.enable.active_level());
        self.enabled = true;
    }

    /// De-assert the enable pin (motor free to turn)
    pub fn disable<G: DigitalIo>(&mut self, io: &mut G) {
        io.digital_write(self.enable.pin, !self.enable.active_level());
        self.enabled = false;
    }

    /// Check if the driver is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current position in steps
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Travel guard, if the axis has a reference
    pub fn guard(&self) -> Option<u32> {
        self.guard
    }

    /// Make the current position the reference and arm the travel guard
    pub fn set_reference(&mut self, travel_limit_steps: u32) {
        self.position = 0;
        self.guard = Some(travel_limit_steps);
    }

    /// Drop the reference; moves are no longer guarded
    pub fn release_reference(&mut self) {
        self.guard = None;
    }

    /// Step `count` times in `direction`, one pulse every `period_us`
    ///
    /// Sets the direction pin and asserts enable before the first pulse.
    /// Enable stays asserted afterwards. Fails without pulsing if a
    /// guarded move would end past the travel guard.
    pub fn step<G: DigitalIo>(
        &mut self,
        io: &mut G,
        direction: Direction,
        count: u32,
        period_us: u32,
    ) -> Result<(), StepperError> {
        if count == 0 {
            return Ok(());
        }

        let target = i64::from(self.position) + i64::from(direction.sign()) * i64::from(count);
        if let Some(limit) = self.guard {
            if target.unsigned_abs() > u64::from(limit) {
                return Err(StepperError::TravelLimit);
            }
        }

        if self.direction != Some(direction) {
            let level = match direction {
                Direction::Forward => self.dir.active_level(),
                Direction::Reverse => !self.dir.active_level(),
            };
            io.digital_write(self.dir.pin, level);
            self.direction = Some(direction);
        }

        if !self.enabled {
            self.enable(io);
        }

        for _ in 0..count {
            io.pulse(self.step.pin, self.step.active_level(), period_us);
        }

        self.position = target.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embryo_hal::sim::{SimBoard, SimCarriage};

    fn driver() -> StepperDriver {
        StepperDriver::new(PinConfig::new(12), PinConfig::new(13), PinConfig::inverted(15))
    }

    #[test]
    fn test_step_moves_carriage() {
        let mut board = SimBoard::new();
        let carriage = board.attach(SimCarriage::new(12, 13));
        let mut stepper = driver();

        stepper.step(&mut board, Direction::Forward, 10, 100).unwrap();
        stepper.step(&mut board, Direction::Reverse, 3, 100).unwrap();

        assert_eq!(stepper.position(), 7);
        assert_eq!(board.carriage_position(carriage), 7);
        assert_eq!(board.pulses(12), 13);
    }

    #[test]
    fn test_enable_asserted_and_held() {
        let mut board = SimBoard::new();
        let mut stepper = driver();
        stepper.init(&mut board);
        // Active-low enable idles high
        assert!(board.level(15));
        assert!(!stepper.is_enabled());

        stepper.step(&mut board, Direction::Forward, 1, 100).unwrap();
        assert!(stepper.is_enabled());
        assert!(!board.level(15));

        // Second burst does not rewrite enable or direction
        let writes = board.writes(15) + board.writes(13);
        stepper.step(&mut board, Direction::Forward, 1, 100).unwrap();
        assert_eq!(board.writes(15) + board.writes(13), writes);

        stepper.disable(&mut board);
        assert!(board.level(15));
    }

    #[test]
    fn test_guard_rejects_without_pulsing() {
        let mut board = SimBoard::new();
        let mut stepper = driver();
        stepper.set_reference(100);

        stepper.step(&mut board, Direction::Forward, 100, 100).unwrap();
        assert_eq!(
            stepper.step(&mut board, Direction::Forward, 1, 100),
            Err(StepperError::TravelLimit)
        );
        assert_eq!(stepper.position(), 100);
        assert_eq!(board.pulses(12), 100);

        // Guard is symmetric around the reference
        stepper.set_reference(10);
        assert_eq!(
            stepper.step(&mut board, Direction::Reverse, 11, 100),
            Err(StepperError::TravelLimit)
        );
    }

    #[test]
    fn test_unguarded_before_reference() {
        let mut board = SimBoard::new();
        let mut stepper = driver();
        stepper.set_reference(5);
        stepper.release_reference();
        assert_eq!(stepper.guard(), None);
        assert!(stepper.step(&mut board, Direction::Reverse, 50, 100).is_ok());
        assert_eq!(stepper.position(), -50);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut board = SimBoard::new();
        let mut stepper = driver();
        stepper.step(&mut board, Direction::Forward, 0, 100).unwrap();
        assert_eq!(board.total_activity(), 0);
        assert!(!stepper.is_enabled());
    }
}
