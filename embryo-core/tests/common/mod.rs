//! Shared rig for coordinator scenario tests

#![allow(dead_code)]

use embryo_core::config::MachineConfig;
use embryo_core::{AxisEvent, AxisId, Coordinator};
use embryo_hal::sim::{CarriageId, SimBoard, SimCarriage, SimClock, SimSwitch, Trigger};

/// Far-end switch positions
pub const CENTER_MAX_AT: i32 = 5_000;
pub const TOWER_MAX_AT: i32 = 20_000;

/// Tick budget for any single scenario phase
pub const MAX_TICKS: u32 = 2_000;

pub struct Rig {
    pub coordinator: Coordinator<SimBoard>,
    pub clock: SimClock,
    pub carriages: [CarriageId; 3],
    pub events: Vec<AxisEvent>,
}

/// Board wired like the default pin map, carriages a short way off home
pub fn board() -> (SimBoard, [CarriageId; 3]) {
    let mut board = SimBoard::new();
    let center = board.attach(
        SimCarriage::new(12, 13)
            .at(300)
            .with_switch(SimSwitch::active_low(18, Trigger::AtOrBelow(0)))
            .with_switch(SimSwitch::active_low(19, Trigger::AtOrAbove(CENTER_MAX_AT))),
    );
    let left = board.attach(
        SimCarriage::new(32, 33)
            .at(400)
            .with_switch(SimSwitch::active_low(39, Trigger::AtOrBelow(0)))
            .with_switch(SimSwitch::active_low(36, Trigger::AtOrAbove(TOWER_MAX_AT))),
    );
    let right = board.attach(
        SimCarriage::new(25, 26)
            .at(500)
            .with_switch(SimSwitch::active_low(35, Trigger::AtOrBelow(0)))
            .with_switch(SimSwitch::active_low(34, Trigger::AtOrAbove(TOWER_MAX_AT))),
    );
    // Floor indicators open (pulled up)
    board.set_input(4, true);
    board.set_input(5, true);
    (board, [center, left, right])
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(&MachineConfig::default())
    }

    pub fn with_config(config: &MachineConfig) -> Self {
        let (board, carriages) = board();
        let coordinator = Coordinator::new(board, config).unwrap();
        Self {
            coordinator,
            clock: SimClock::new(0),
            carriages,
            events: Vec::new(),
        }
    }

    /// Advance the clock by 1 ms and run one tick
    pub fn tick(&mut self) {
        self.clock.advance(1);
        self.coordinator.poll(&self.clock);
        while let Some(event) = self.coordinator.pop_event() {
            self.events.push(event);
        }
    }

    pub fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until `done` holds; panics after [`MAX_TICKS`]
    pub fn run_until(&mut self, mut done: impl FnMut(&Coordinator<SimBoard>) -> bool) {
        for _ in 0..MAX_TICKS {
            if done(&self.coordinator) {
                return;
            }
            self.tick();
        }
        panic!("condition not reached in {} ticks", MAX_TICKS);
    }

    /// Tick until no axis is busy or waiting to home
    pub fn settle(&mut self) {
        self.run_until(|c| {
            AxisId::ALL
                .iter()
                .all(|id| !c.state(*id).busy && !c.is_deferred(*id))
        });
    }

    /// Home every axis from power-on
    pub fn home_all(&mut self) {
        self.coordinator.start().unwrap();
        self.settle();
        for id in AxisId::ALL {
            assert!(self.coordinator.state(id).homed, "{:?} not homed", id);
        }
        self.events.clear();
    }

    pub fn board(&self) -> &SimBoard {
        self.coordinator.io()
    }

    pub fn board_mut(&mut self) -> &mut SimBoard {
        self.coordinator.io_mut()
    }

    pub fn carriage(&self, id: AxisId) -> i32 {
        self.board().carriage_position(self.carriages[id.index()])
    }
}
