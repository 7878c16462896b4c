//! Status report for the reporting module
//!
//! A [`StatusReport`] is a point-in-time copy of every axis, tagged with
//! the batch it belongs to. Sending it anywhere is up to the caller.

use heapless::String;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::axis::{AxisId, AxisSnapshot};
use crate::config::MAX_NAME_LEN;

/// Report rendering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Output buffer cannot hold the rendered report
    BufferTooSmall,
}

/// Snapshot of the tray mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StatusReport {
    /// Batch the machine is processing
    pub lote_id: String<MAX_NAME_LEN>,
    /// Time since the first tick
    pub uptime_ms: u32,
    /// Center, left tower, right tower
    pub axes: [AxisSnapshot; 3],
    /// Events lost to a full event log
    pub dropped_events: u32,
}

impl StatusReport {
    /// Snapshot of one axis
    pub fn axis(&self, id: AxisId) -> &AxisSnapshot {
        &self.axes[id.index()]
    }

    /// Check if every axis is homed and none has a fault
    pub fn is_ready(&self) -> bool {
        self.axes.iter().all(|a| a.homed && a.fault.is_none())
    }

    /// Render as JSON into `buf`, returning the number of bytes written
    #[cfg(feature = "report-json")]
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        serde_json_core::to_slice(self, buf).map_err(|_| ReportError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisPhase;
    use crate::error::Fault;

    fn snapshot(axis: AxisId) -> AxisSnapshot {
        AxisSnapshot {
            axis,
            phase: AxisPhase::Homed,
            position: 0,
            homed: true,
            fault: None,
            busy: false,
            enabled: true,
        }
    }

    fn report() -> StatusReport {
        StatusReport {
            lote_id: String::try_from("FagSummit2025").unwrap(),
            uptime_ms: 1500,
            axes: AxisId::ALL.map(snapshot),
            dropped_events: 0,
        }
    }

    #[test]
    fn test_ready_requires_all_axes() {
        let mut report = report();
        assert!(report.is_ready());

        report.axes[2].homed = false;
        report.axes[2].fault = Some(Fault::Conflict);
        assert!(!report.is_ready());
        assert_eq!(report.axis(AxisId::RightTower).fault, Some(Fault::Conflict));
    }

    #[cfg(feature = "report-json")]
    #[test]
    fn test_to_json() {
        let mut report = report();
        report.axes[1].fault = Some(Fault::Stall);
        report.axes[1].phase = AxisPhase::Fault;

        let mut buf = [0u8; 512];
        let len = report.to_json(&mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();

        assert!(json.starts_with(r#"{"lote_id":"FagSummit2025","uptime_ms":1500,"axes":[{"axis":"Center""#));
        assert!(json.contains(r#""axis":"LeftTower","phase":"fault","position":0,"homed":true,"fault":"Stall""#));
        assert!(json.ends_with(r#""dropped_events":0}"#));
    }

    #[cfg(feature = "report-json")]
    #[test]
    fn test_to_json_small_buffer() {
        let mut buf = [0u8; 16];
        assert_eq!(report().to_json(&mut buf), Err(ReportError::BufferTooSmall));
    }
}
