//! Limit switch debouncer
//!
//! A raw level change is reported only after it has been observed
//! continuously for the settle window. Callers poll; nothing blocks.

use embryo_hal::DigitalIo;

use super::{SwitchId, SwitchState};
use crate::config::{PinConfig, PinMap};

#[derive(Debug, Clone, Copy)]
struct Channel {
    pin: PinConfig,
    state: SwitchState,
    /// Raw state differing from `state`, and when it was first seen
    pending: Option<(SwitchState, u32)>,
    last_change_ms: Option<u32>,
}

impl Channel {
    fn new(pin: PinConfig) -> Self {
        Self {
            pin,
            state: SwitchState::Clear,
            pending: None,
            last_change_ms: None,
        }
    }

    /// Feed one raw sample; returns true on a confirmed transition
    fn sample(&mut self, raw: SwitchState, now_ms: u32, settle_ms: u32) -> bool {
        if raw == self.state {
            self.pending = None;
            return false;
        }

        match self.pending {
            Some((candidate, since)) if candidate == raw => {
                if now_ms.wrapping_sub(since) >= settle_ms {
                    self.state = raw;
                    self.pending = None;
                    self.last_change_ms = Some(now_ms);
                    return true;
                }
            }
            _ => self.pending = Some((raw, now_ms)),
        }
        false
    }
}

/// Debouncer for all machine switches
///
/// Every switch starts out [`SwitchState::Clear`]; one held closed at
/// power-on is reported once the settle window has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    channels: [Channel; SwitchId::COUNT],
    settle_ms: u32,
}

impl Debouncer {
    /// Create a debouncer for the switches in a pin map
    pub fn new(pins: &PinMap, settle_ms: u32) -> Self {
        Self {
            channels: SwitchId::ALL.map(|id| Channel::new(id.pin(pins))),
            settle_ms,
        }
    }

    /// Settle window in milliseconds
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Sample every switch once
    ///
    /// Returns the number of confirmed transitions.
    pub fn poll<G: DigitalIo>(&mut self, io: &mut G, now_ms: u32) -> usize {
        let mut changed = 0;
        for (id, channel) in SwitchId::ALL.iter().zip(self.channels.iter_mut()) {
            let level = io.digital_read(channel.pin.pin);
            let raw = SwitchState::from(channel.pin.is_active(level));
            if channel.sample(raw, now_ms, self.settle_ms) {
                debug!("Switch {:?} -> {:?}", id, raw);
                changed += 1;
            }
        }
        changed
    }

    /// Debounced state of a switch
    pub fn read(&self, id: SwitchId) -> SwitchState {
        self.channels[id.index()].state
    }

    /// Time of the last confirmed transition, if any
    pub fn last_change_ms(&self, id: SwitchId) -> Option<u32> {
        self.channels[id.index()].last_change_ms
    }
}
