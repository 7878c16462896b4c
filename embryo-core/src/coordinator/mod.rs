//! Tri-axis coordinator
//!
//! Owns the GPIO, the switch debouncer and the three axes of the tray
//! mechanism. Commands are validated synchronously; motion happens in
//! [`Coordinator::tick`], which the firmware main loop calls as often as
//! it can.
//!
//! The two towers ride on the frame positioned by the center axis, so
//! tower homing waits for the center to be homed and tower moves are
//! refused until it is.

pub mod events;

pub use events::{AxisEvent, EventLog, EVENT_CAPACITY};

use heapless::String;

use embryo_hal::{DigitalIo, Monotonic};

use crate::axis::{Axis, AxisId, AxisSnapshot, MotionCommand, TrayTarget};
use crate::config::{ConfigError, MachineConfig, MAX_NAME_LEN};
use crate::error::{CommandError, Rejection};
use crate::report::StatusReport;
use crate::switch::{Debouncer, FloorSide, SwitchState};

/// How a homing request was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingRequest {
    /// Sequence started; stepping begins on the next tick
    Started,
    /// Tower queued until the center axis is homed
    Deferred,
}

/// Tray mechanism coordinator
pub struct Coordinator<G: DigitalIo> {
    io: G,
    debouncer: Debouncer,
    axes: [Axis; 3],
    /// Tower homing requests waiting for the center
    pending_home: [bool; 3],
    events: EventLog,
    lote_id: String<MAX_NAME_LEN>,
    first_tick_ms: Option<u32>,
    last_tick_ms: u32,
}

impl<G: DigitalIo> Coordinator<G> {
    /// Create a coordinator and drive every output to its idle level
    pub fn new(mut io: G, config: &MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut axes = AxisId::ALL.map(|id| {
            Axis::new(id, config.axis_pins(id), *config.axis_motion(id))
                .with_settle_ms(config.motion.settle_ms)
        });
        for axis in axes.iter_mut() {
            axis.init(&mut io);
        }

        Ok(Self {
            io,
            debouncer: Debouncer::new(&config.pins, config.motion.settle_ms),
            axes,
            pending_home: [false; 3],
            events: EventLog::new(),
            lote_id: config.network.batch.lote_id.clone(),
            first_tick_ms: None,
            last_tick_ms: 0,
        })
    }

    fn axis(&self, id: AxisId) -> &Axis {
        &self.axes[id.index()]
    }

    fn axis_mut(&mut self, id: AxisId) -> &mut Axis {
        &mut self.axes[id.index()]
    }

    fn center_homed(&self) -> bool {
        self.axis(AxisId::Center).is_homed()
    }

    fn push(&mut self, event: AxisEvent) {
        self.events.push(event);
    }

    /// Home all three axes: the center first, then both towers together
    ///
    /// Nothing is requested unless every axis accepts.
    pub fn start(&mut self) -> Result<(), CommandError> {
        for id in AxisId::ALL {
            self.check_home(id).map_err(|rejection| {
                debug!("Start refused by {:?}: {:?}", id, rejection);
                CommandError::new(id, rejection)
            })?;
        }
        info!("Homing all axes");
        for id in AxisId::ALL {
            self.home(id).map_err(|rejection| CommandError::new(id, rejection))?;
        }
        Ok(())
    }

    fn check_home(&self, id: AxisId) -> Result<(), Rejection> {
        let axis = self.axis(id);
        if axis.fault().is_some() {
            return Err(Rejection::Faulted);
        }
        if axis.is_busy() || self.pending_home[id.index()] {
            return Err(Rejection::Busy);
        }
        // Towers may not step while the center has no reference
        if id == AxisId::Center && self.towers_busy() {
            return Err(Rejection::Busy);
        }
        Ok(())
    }

    fn towers_busy(&self) -> bool {
        [AxisId::LeftTower, AxisId::RightTower]
            .into_iter()
            .any(|tower| self.axis(tower).is_busy())
    }

    /// Request homing of one axis
    ///
    /// A tower requested while the center is unhomed is deferred and
    /// starts on the first tick after the center is homed. The center is
    /// refused with `Busy` while either tower is moving or homing.
    pub fn home(&mut self, id: AxisId) -> Result<HomingRequest, Rejection> {
        if let Err(rejection) = self.check_home(id) {
            debug!("Home {:?} rejected: {:?}", id, rejection);
            return Err(rejection);
        }

        if id.is_tower() && !self.center_homed() {
            self.pending_home[id.index()] = true;
            info!("Homing {:?} deferred until center is homed", id);
            self.push(AxisEvent::HomingDeferred(id));
            return Ok(HomingRequest::Deferred);
        }

        self.axis_mut(id).start_homing()?;
        info!("Homing {:?}", id);
        self.push(AxisEvent::HomingStarted(id));
        Ok(HomingRequest::Started)
    }

    fn check_move(&self, id: AxisId) -> Result<(), Rejection> {
        self.axis(id).can_move()?;
        if id.is_tower() && !self.center_homed() {
            return Err(Rejection::NotReady);
        }
        Ok(())
    }

    /// Move an axis to an absolute position at its configured speed
    pub fn move_to(&mut self, id: AxisId, position: i32) -> Result<(), Rejection> {
        let speed = self.axis(id).config().move_speed_sps;
        self.move_to_with_speed(id, position, speed)
    }

    /// Move an axis to an absolute position at a given maximum speed
    ///
    /// Rejections leave the axis and the pins untouched.
    pub fn move_to_with_speed(&mut self, id: AxisId, position: i32, max_speed_sps: u32) -> Result<(), Rejection> {
        if let Err(rejection) = self.check_move(id) {
            debug!("Move {:?} rejected: {:?}", id, rejection);
            return Err(rejection);
        }
        self.issue(MotionCommand::new(id, position, max_speed_sps))
    }

    fn issue(&mut self, command: MotionCommand) -> Result<(), Rejection> {
        self.axis_mut(command.axis).begin_move(command)?;
        self.push(AxisEvent::MoveStarted {
            axis: command.axis,
            target: command.target,
        });
        Ok(())
    }

    /// Move all three axes to a tray position
    ///
    /// Every axis is checked first; if any refuses, no command is issued
    /// and the first refusing axis is reported.
    pub fn tray_cycle(&mut self, targets: TrayTarget) -> Result<(), CommandError> {
        for id in AxisId::ALL {
            self.check_move(id).map_err(|rejection| {
                debug!("Tray cycle refused by {:?}: {:?}", id, rejection);
                CommandError::new(id, rejection)
            })?;
        }

        for id in AxisId::ALL {
            let speed = self.axis(id).config().move_speed_sps;
            self.issue(MotionCommand::new(id, targets.get(id), speed))
                .map_err(|rejection| CommandError::new(id, rejection))?;
        }
        info!(
            "Tray cycle to {} / {} / {}",
            targets.center,
            targets.left_tower,
            targets.right_tower
        );
        Ok(())
    }

    /// Stop homing or motion on an axis
    ///
    /// Also drops a deferred homing request. Returns whether anything was
    /// stopped. `homed` and any latched fault are left as they are. On a
    /// homed axis at rest this returns `false`, emits no event and the
    /// phase stays `Homed`.
    pub fn cancel(&mut self, id: AxisId) -> bool {
        let was_pending = core::mem::take(&mut self.pending_home[id.index()]);
        let stopped = self.axis_mut(id).cancel() || was_pending;
        if stopped {
            info!("{:?} cancelled", id);
            self.push(AxisEvent::Cancelled(id));
        }
        stopped
    }

    /// Clear a latched fault; the axis must be homed again
    pub fn reset(&mut self, id: AxisId) -> bool {
        let cleared = self.axis_mut(id).reset();
        if cleared {
            info!("{:?} fault cleared", id);
            self.push(AxisEvent::Reset(id));
        }
        cleared
    }

    /// Release holding torque on an axis at rest
    pub fn disable(&mut self, id: AxisId) -> Result<(), Rejection> {
        let axis = &mut self.axes[id.index()];
        axis.disable(&mut self.io)
    }

    /// Externally visible state of an axis
    pub fn state(&self, id: AxisId) -> AxisSnapshot {
        self.axis(id).snapshot()
    }

    /// Whether a tower homing request is waiting for the center
    pub fn is_deferred(&self, id: AxisId) -> bool {
        self.pending_home[id.index()]
    }

    /// Debounced state of a floor indicator
    pub fn floor_indicator(&self, side: FloorSide) -> SwitchState {
        self.debouncer.read(side.switch())
    }

    /// Run one cooperative tick
    pub fn tick(&mut self, now_ms: u32) {
        if self.first_tick_ms.is_none() {
            self.first_tick_ms = Some(now_ms);
        }
        self.last_tick_ms = now_ms;

        self.debouncer.poll(&mut self.io, now_ms);

        if self.center_homed() {
            self.start_deferred();
        }

        for axis in self.axes.iter_mut() {
            if let Some(event) = axis.tick(&mut self.io, &self.debouncer, now_ms) {
                self.events.push(event);
            }
        }
    }

    /// Run one tick at the time given by a clock
    pub fn poll<M: Monotonic>(&mut self, clock: &M) {
        self.tick(clock.now_ms());
    }

    fn start_deferred(&mut self) {
        for id in [AxisId::LeftTower, AxisId::RightTower] {
            if !core::mem::take(&mut self.pending_home[id.index()]) {
                continue;
            }
            match self.axis_mut(id).start_homing() {
                Ok(()) => {
                    info!("Homing {:?}", id);
                    self.push(AxisEvent::HomingStarted(id));
                }
                Err(rejection) => warn!("Deferred homing of {:?} dropped: {:?}", id, rejection),
            }
        }
    }

    /// Take the oldest queued event
    pub fn pop_event(&mut self) -> Option<AxisEvent> {
        self.events.pop()
    }

    /// Queued events
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Snapshot of all axes for the reporting module
    pub fn report(&self) -> StatusReport {
        let uptime_ms = self
            .first_tick_ms
            .map_or(0, |first| self.last_tick_ms.wrapping_sub(first));
        StatusReport {
            lote_id: self.lote_id.clone(),
            uptime_ms,
            axes: AxisId::ALL.map(|id| self.state(id)),
            dropped_events: self.events.dropped(),
        }
    }

    /// Borrow the GPIO
    pub fn io(&self) -> &G {
        &self.io
    }

    /// Mutably borrow the GPIO
    pub fn io_mut(&mut self) -> &mut G {
        &mut self.io
    }

    /// Give the GPIO back
    pub fn release(self) -> G {
        self.io
    }
}
