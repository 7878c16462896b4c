//! Stepper axes
//!
//! An [`Axis`] bundles one stepper driver, its homing state machine and
//! at most one in-flight [`MotionCommand`]. Positions reported here are
//! logical: zero at home, growing away from the reference switch.

pub mod command;
pub mod homing;

pub use command::{MotionCommand, TrayTarget};
pub use homing::{AxisSwitches, HomingMachine, HomingOutcome, HomingState};

use embryo_hal::DigitalIo;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{AxisMotionConfig, AxisPins, LimitEnd};
use crate::coordinator::AxisEvent;
use crate::error::{Fault, Rejection};
use crate::stepper::{Direction, StepperDriver};
use crate::switch::{Debouncer, SwitchId};

/// Axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisId {
    /// Center mechanism (reading system)
    Center,
    /// Left tower
    LeftTower,
    /// Right tower
    RightTower,
}

impl AxisId {
    /// All axes, in tick service order
    pub const ALL: [AxisId; 3] = [AxisId::Center, AxisId::LeftTower, AxisId::RightTower];

    /// Dense index for table lookups
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this axis hangs off the shared tower frame
    pub fn is_tower(self) -> bool {
        matches!(self, AxisId::LeftTower | AxisId::RightTower)
    }

    /// Switches at the (min, max) ends of travel
    pub fn switches(self) -> (SwitchId, SwitchId) {
        match self {
            AxisId::Center => (SwitchId::CenterLeft, SwitchId::CenterRight),
            AxisId::LeftTower => (SwitchId::LeftTowerLower, SwitchId::LeftTowerUpper),
            AxisId::RightTower => (SwitchId::RightTowerLower, SwitchId::RightTowerUpper),
        }
    }
}

/// Coarse axis phase for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AxisPhase {
    Idle,
    Seeking,
    Backoff,
    Homed,
    Moving,
    Fault,
}

/// Externally visible axis state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisSnapshot {
    pub axis: AxisId,
    pub phase: AxisPhase,
    /// Steps from home
    pub position: i32,
    pub homed: bool,
    pub fault: Option<Fault>,
    /// Homing or executing a move
    pub busy: bool,
    /// Holding torque applied
    pub enabled: bool,
}

/// One stepper axis
#[derive(Debug, Clone)]
pub struct Axis {
    id: AxisId,
    config: AxisMotionConfig,
    driver: StepperDriver,
    homing: HomingMachine,
    motion: Option<MotionCommand>,
}

impl Axis {
    /// Create an unhomed axis
    pub fn new(id: AxisId, pins: &AxisPins, config: AxisMotionConfig) -> Self {
        Self {
            id,
            config,
            driver: StepperDriver::from_pins(pins),
            homing: HomingMachine::new(config),
            motion: None,
        }
    }

    /// Wait one switch settle window before a silent seek stalls
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.homing = self.homing.with_grace_ms(settle_ms);
        self
    }

    /// Drive the outputs to their idle levels
    pub fn init<G: DigitalIo>(&mut self, io: &mut G) {
        self.driver.init(io);
    }

    /// Axis identifier
    pub fn id(&self) -> AxisId {
        self.id
    }

    /// Whether the axis has a reference position
    pub fn is_homed(&self) -> bool {
        self.homing.is_homed()
    }

    /// Homing or executing a move
    pub fn is_busy(&self) -> bool {
        self.homing.state().is_active() || self.motion.is_some()
    }

    /// Latched fault, if any
    pub fn fault(&self) -> Option<Fault> {
        self.homing.state().fault()
    }

    /// Motion parameters
    pub fn config(&self) -> &AxisMotionConfig {
        &self.config
    }

    /// Homing state machine
    pub fn homing(&self) -> &HomingMachine {
        &self.homing
    }

    /// Command in flight, if any
    pub fn motion(&self) -> Option<&MotionCommand> {
        self.motion.as_ref()
    }

    /// Direction that moves away from home
    fn away(&self) -> Direction {
        self.config.reference.approach().opposite()
    }

    /// Logical position (steps from home)
    pub fn position(&self) -> i32 {
        self.driver.position().saturating_mul(self.away().sign())
    }

    /// Reference and opposite switch as (reference, opposite)
    fn reference_switches(&self) -> (SwitchId, SwitchId) {
        let (min, max) = self.id.switches();
        match self.config.reference {
            LimitEnd::Min => (min, max),
            LimitEnd::Max => (max, min),
        }
    }

    /// Switch reached by stepping in a direction
    fn end_switch(&self, direction: Direction) -> SwitchId {
        let (min, max) = self.id.switches();
        match direction {
            Direction::Forward => max,
            Direction::Reverse => min,
        }
    }

    /// Current phase
    pub fn phase(&self) -> AxisPhase {
        if self.motion.is_some() {
            return AxisPhase::Moving;
        }
        match self.homing.state() {
            HomingState::Idle => AxisPhase::Idle,
            HomingState::Seeking { .. } => AxisPhase::Seeking,
            HomingState::Backoff { .. } => AxisPhase::Backoff,
            HomingState::Homed => AxisPhase::Homed,
            HomingState::Fault(_) => AxisPhase::Fault,
        }
    }

    /// Externally visible state
    pub fn snapshot(&self) -> AxisSnapshot {
        AxisSnapshot {
            axis: self.id,
            phase: self.phase(),
            position: self.position(),
            homed: self.is_homed(),
            fault: self.fault(),
            busy: self.is_busy(),
            enabled: self.driver.is_enabled(),
        }
    }

    /// Start homing
    pub fn start_homing(&mut self) -> Result<(), Rejection> {
        if self.motion.is_some() {
            return Err(Rejection::Busy);
        }
        self.homing.request(&mut self.driver)
    }

    /// Check whether a move could be accepted
    ///
    /// Any unhomed axis is `NotReady`, whether it is idle, homing or
    /// faulted; `Busy` only comes from a homed axis with a move in flight.
    pub fn can_move(&self) -> Result<(), Rejection> {
        if !self.is_homed() {
            return Err(Rejection::NotReady);
        }
        if self.is_busy() {
            return Err(Rejection::Busy);
        }
        Ok(())
    }

    /// Accept a move
    pub fn begin_move(&mut self, command: MotionCommand) -> Result<(), Rejection> {
        self.can_move()?;
        self.motion = Some(command);
        Ok(())
    }

    /// Stop homing or motion; `homed` keeps its value
    ///
    /// Returns whether anything was stopped. A latched fault stays.
    /// On a homed axis at rest this is a no-op returning `false`, and the
    /// phase stays [`AxisPhase::Homed`].
    pub fn cancel(&mut self) -> bool {
        let had_motion = self.motion.take().is_some();
        let had_homing = self.homing.cancel();
        if had_motion {
            self.homing.idle();
        }
        had_motion || had_homing
    }

    /// Clear a latched fault
    pub fn reset(&mut self) -> bool {
        self.homing.reset()
    }

    /// Release holding torque
    pub fn disable<G: DigitalIo>(&mut self, io: &mut G) -> Result<(), Rejection> {
        if self.is_busy() {
            return Err(Rejection::Busy);
        }
        self.driver.disable(io);
        Ok(())
    }

    fn enter_fault<G: DigitalIo>(&mut self, io: &mut G, fault: Fault) -> AxisEvent {
        self.motion = None;
        self.homing.fault(fault);
        self.driver.disable(io);
        warn!("{:?} fault: {:?}", self.id, fault);
        AxisEvent::Fault {
            axis: self.id,
            fault,
        }
    }

    /// Service the axis for one tick
    ///
    /// Checks for a switch conflict before any stepping, then advances
    /// homing or runs one burst of the active move.
    pub fn tick<G: DigitalIo>(
        &mut self,
        io: &mut G,
        debouncer: &Debouncer,
        now_ms: u32,
    ) -> Option<AxisEvent> {
        if self.fault().is_some() {
            return None;
        }

        let (reference, opposite) = self.reference_switches();
        let switches = AxisSwitches {
            reference: debouncer.read(reference),
            opposite: debouncer.read(opposite),
        };
        if switches.in_conflict() {
            return Some(self.enter_fault(io, Fault::Conflict));
        }

        if self.homing.state().is_active() {
            return match self.homing.advance(io, &mut self.driver, switches, now_ms)? {
                HomingOutcome::Homed { offset } => {
                    info!("{:?} homed (seek offset {})", self.id, offset);
                    Some(AxisEvent::Homed {
                        axis: self.id,
                        offset,
                    })
                }
                HomingOutcome::Faulted(fault) => {
                    // The machine latched the fault; stop holding the motor.
                    self.motion = None;
                    self.driver.disable(io);
                    warn!("{:?} homing fault: {:?}", self.id, fault);
                    Some(AxisEvent::Fault {
                        axis: self.id,
                        fault,
                    })
                }
            };
        }

        self.advance_motion(io, debouncer)
    }

    fn advance_motion<G: DigitalIo>(&mut self, io: &mut G, debouncer: &Debouncer) -> Option<AxisEvent> {
        let command = self.motion?;
        let target = i64::from(command.target) * i64::from(self.away().sign());
        let delta = target - i64::from(self.driver.position());

        let Some(direction) = Direction::of_delta(delta) else {
            return Some(self.complete_move());
        };

        if debouncer.read(self.end_switch(direction)).is_triggered() {
            self.motion = None;
            warn!("{:?} stopped at limit, position {}", self.id, self.position());
            return Some(AxisEvent::LimitReached {
                axis: self.id,
                position: self.position(),
            });
        }

        let burst = u64::from(self.config.burst_steps).min(delta.unsigned_abs()) as u32;
        let period_us = AxisMotionConfig::pulse_period_us(command.max_speed_sps);
        if let Err(e) = self.driver.step(io, direction, burst, period_us) {
            return Some(self.enter_fault(io, e.into()));
        }
        trace!("{:?} at {}", self.id, self.position());

        if i64::from(self.driver.position()) == target {
            return Some(self.complete_move());
        }
        None
    }

    fn complete_move(&mut self) -> AxisEvent {
        self.motion = None;
        info!("{:?} move complete at {}", self.id, self.position());
        AxisEvent::MoveComplete {
            axis: self.id,
            position: self.position(),
        }
    }
}
