//! Axis events reported by the coordinator

use heapless::Deque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::axis::AxisId;
use crate::error::Fault;

/// Events kept before the oldest is dropped
pub const EVENT_CAPACITY: usize = 32;

/// Something that happened to an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisEvent {
    // Homing
    /// Homing sequence started
    HomingStarted(AxisId),
    /// Tower homing queued until the center axis is homed
    HomingDeferred(AxisId),
    /// Zero latched; `offset` is the distance travelled while seeking
    Homed { axis: AxisId, offset: u32 },

    // Motion
    /// Move accepted
    MoveStarted { axis: AxisId, target: i32 },
    /// Target reached
    MoveComplete { axis: AxisId, position: i32 },
    /// Move stopped by the end switch in the direction of travel
    LimitReached { axis: AxisId, position: i32 },
    /// Homing or motion stopped by command
    Cancelled(AxisId),

    // Faults
    /// Fault latched
    Fault { axis: AxisId, fault: Fault },
    /// Fault cleared
    Reset(AxisId),
}

impl AxisEvent {
    /// Axis the event belongs to
    pub fn axis(&self) -> AxisId {
        match *self {
            AxisEvent::HomingStarted(axis)
            | AxisEvent::HomingDeferred(axis)
            | AxisEvent::Cancelled(axis)
            | AxisEvent::Reset(axis) => axis,
            AxisEvent::Homed { axis, .. }
            | AxisEvent::MoveStarted { axis, .. }
            | AxisEvent::MoveComplete { axis, .. }
            | AxisEvent::LimitReached { axis, .. }
            | AxisEvent::Fault { axis, .. } => axis,
        }
    }

    /// Check if this event reports a fault
    pub fn is_fault(&self) -> bool {
        matches!(self, AxisEvent::Fault { .. })
    }
}

/// Bounded event queue
///
/// When full, pushing drops the oldest event and counts it.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Deque<AxisEvent, EVENT_CAPACITY>,
    dropped: u32,
}

impl EventLog {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Append an event
    pub fn push(&mut self, event: AxisEvent) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above if needed
        let _ = self.events.push_back(event);
    }

    /// Take the oldest event
    pub fn pop(&mut self) -> Option<AxisEvent> {
        self.events.pop_front()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if no events are queued
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events dropped because the log was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Iterate queued events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &AxisEvent> {
        self.events.iter()
    }

    /// Remove all queued events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_axis() {
        assert_eq!(AxisEvent::HomingStarted(AxisId::Center).axis(), AxisId::Center);
        let fault = AxisEvent::Fault {
            axis: AxisId::RightTower,
            fault: Fault::Conflict,
        };
        assert_eq!(fault.axis(), AxisId::RightTower);
        assert!(fault.is_fault());
        assert!(!AxisEvent::Reset(AxisId::LeftTower).is_fault());
    }

    #[test]
    fn test_full_log_drops_oldest() {
        let mut log = EventLog::new();
        for target in 0..EVENT_CAPACITY as i32 + 3 {
            log.push(AxisEvent::MoveStarted {
                axis: AxisId::Center,
                target,
            });
        }

        assert_eq!(log.len(), EVENT_CAPACITY);
        assert_eq!(log.dropped(), 3);
        assert_eq!(
            log.pop(),
            Some(AxisEvent::MoveStarted {
                axis: AxisId::Center,
                target: 3
            })
        );
    }
}
