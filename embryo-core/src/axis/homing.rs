//! Axis homing state machine
//!
//! Drives a stepper toward its reference switch, backs off, and latches
//! position zero once the switch has released. Every wait is a state
//! persisted between ticks; [`HomingMachine::advance`] emits at most one
//! burst of pulses per call.

use embryo_hal::DigitalIo;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::AxisMotionConfig;
use crate::error::{Fault, Rejection};
use crate::stepper::StepperDriver;
use crate::switch::SwitchState;

/// Homing states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HomingState {
    /// Not homing
    Idle,
    /// Stepping toward the reference switch
    Seeking {
        /// Steps taken since the seek started
        traveled: u32,
        /// When the seek ran out of travel
        exhausted_at_ms: Option<u32>,
    },
    /// Retracting off the triggered switch and waiting for it to release
    Backoff {
        /// Retraction steps left
        remaining: u32,
        /// When the retraction finished
        retracted_at_ms: Option<u32>,
    },
    /// Reference established, position zero latched
    Homed,
    /// Fault detected; stepping stopped until reset
    Fault(Fault),
}

impl HomingState {
    /// Check if a homing sequence is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, HomingState::Seeking { .. } | HomingState::Backoff { .. })
    }

    /// Latched fault, if any
    pub fn fault(&self) -> Option<Fault> {
        match self {
            HomingState::Fault(fault) => Some(*fault),
            _ => None,
        }
    }
}

/// Result of a homing step that ends the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingOutcome {
    /// Zero latched; `offset` is how far the seek travelled
    Homed { offset: u32 },
    /// Sequence aborted
    Faulted(Fault),
}

/// Debounced state of the two switches on an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSwitches {
    /// Switch the axis homes against
    pub reference: SwitchState,
    /// Switch at the other end of travel
    pub opposite: SwitchState,
}

impl AxisSwitches {
    /// Both switches closed: wiring or hardware fault
    pub fn in_conflict(&self) -> bool {
        self.reference.is_triggered() && self.opposite.is_triggered()
    }
}

/// Homing state machine for one axis
#[derive(Debug, Clone)]
pub struct HomingMachine {
    config: AxisMotionConfig,
    state: HomingState,
    homed: bool,
    /// Driver position at which the reference switch confirmed
    candidate_zero: Option<i32>,
    /// Seek distance of the last successful home
    last_offset: Option<u32>,
    /// Wait after the last seek burst before declaring a stall
    grace_ms: u32,
}

impl HomingMachine {
    /// Create an idle, unhomed machine
    pub fn new(config: AxisMotionConfig) -> Self {
        Self {
            config,
            state: HomingState::Idle,
            homed: false,
            candidate_zero: None,
            last_offset: None,
            grace_ms: 0,
        }
    }

    /// Give a switch closing on the last seek burst time to debounce
    pub fn with_grace_ms(mut self, grace_ms: u32) -> Self {
        self.grace_ms = grace_ms;
        self
    }

    /// Current state
    pub fn state(&self) -> HomingState {
        self.state
    }

    /// Whether the axis has a reference
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Seek distance of the last successful home
    pub fn last_offset(&self) -> Option<u32> {
        self.last_offset
    }

    /// Driver position at which the reference switch last confirmed
    pub fn candidate_zero(&self) -> Option<i32> {
        self.candidate_zero
    }

    /// Start a homing sequence
    ///
    /// Allowed from `Idle` and `Homed`. The axis loses its reference
    /// until the new sequence completes.
    pub fn request(&mut self, driver: &mut StepperDriver) -> Result<(), Rejection> {
        match self.state {
            HomingState::Fault(_) => Err(Rejection::Faulted),
            HomingState::Seeking { .. } | HomingState::Backoff { .. } => Err(Rejection::Busy),
            HomingState::Idle | HomingState::Homed => {
                self.homed = false;
                self.candidate_zero = None;
                driver.release_reference();
                self.state = HomingState::Seeking {
                    traveled: 0,
                    exhausted_at_ms: None,
                };
                Ok(())
            }
        }
    }

    /// Advance an active sequence by at most one burst
    ///
    /// Returns an outcome when the sequence finishes or faults.
    pub fn advance<G: DigitalIo>(
        &mut self,
        io: &mut G,
        driver: &mut StepperDriver,
        switches: AxisSwitches,
        now_ms: u32,
    ) -> Option<HomingOutcome> {
        let approach = self.config.reference.approach();
        let period_us = self.config.homing_period_us();

        match self.state {
            HomingState::Seeking {
                traveled,
                exhausted_at_ms,
            } => {
                if switches.reference.is_triggered() {
                    self.candidate_zero = Some(driver.position());
                    self.last_offset = Some(traveled);
                    self.state = HomingState::Backoff {
                        remaining: self.config.backoff_steps,
                        retracted_at_ms: None,
                    };
                    return None;
                }

                if traveled >= self.config.max_homing_steps {
                    let since = exhausted_at_ms.unwrap_or(now_ms);
                    if now_ms.wrapping_sub(since) >= self.grace_ms {
                        return Some(self.fault(Fault::Stall));
                    }
                    self.state = HomingState::Seeking {
                        traveled,
                        exhausted_at_ms: Some(since),
                    };
                    return None;
                }

                let burst = self
                    .config
                    .burst_steps
                    .min(self.config.max_homing_steps - traveled);
                if let Err(e) = driver.step(io, approach, burst, period_us) {
                    return Some(self.fault(e.into()));
                }
                trace!("Seek {} steps", traveled + burst);
                self.state = HomingState::Seeking {
                    traveled: traveled + burst,
                    exhausted_at_ms: None,
                };
                None
            }

            HomingState::Backoff {
                remaining,
                retracted_at_ms,
            } => {
                if remaining > 0 {
                    let burst = self.config.burst_steps.min(remaining);
                    if let Err(e) = driver.step(io, approach.opposite(), burst, period_us) {
                        return Some(self.fault(e.into()));
                    }
                    let remaining = remaining - burst;
                    self.state = HomingState::Backoff {
                        remaining,
                        retracted_at_ms: (remaining == 0).then_some(now_ms),
                    };
                    return None;
                }

                if !switches.reference.is_triggered() {
                    driver.set_reference(self.config.travel_limit_steps);
                    self.homed = true;
                    self.state = HomingState::Homed;
                    return Some(HomingOutcome::Homed {
                        offset: self.last_offset.unwrap_or(0),
                    });
                }

                let since = retracted_at_ms.unwrap_or(now_ms);
                if now_ms.wrapping_sub(since) >= self.config.release_timeout_ms {
                    return Some(self.fault(Fault::SwitchStuck));
                }
                if retracted_at_ms.is_none() {
                    self.state = HomingState::Backoff {
                        remaining: 0,
                        retracted_at_ms: Some(now_ms),
                    };
                }
                None
            }

            HomingState::Idle | HomingState::Homed | HomingState::Fault(_) => None,
        }
    }

    /// Latch a fault; the axis loses its reference
    pub fn fault(&mut self, fault: Fault) -> HomingOutcome {
        self.state = HomingState::Fault(fault);
        self.homed = false;
        HomingOutcome::Faulted(fault)
    }

    /// Abandon an active sequence; `homed` keeps its value
    ///
    /// Returns whether a sequence was in progress.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_active() {
            self.state = HomingState::Idle;
            true
        } else {
            false
        }
    }

    /// Move an axis at rest from `Homed` to `Idle` (motion cancelled)
    pub fn idle(&mut self) {
        if self.state == HomingState::Homed {
            self.state = HomingState::Idle;
        }
    }

    /// Clear a latched fault
    ///
    /// Returns whether a fault was cleared.
    pub fn reset(&mut self) -> bool {
        if self.state.fault().is_some() {
            self.state = HomingState::Idle;
            true
        } else {
            false
        }
    }
}
