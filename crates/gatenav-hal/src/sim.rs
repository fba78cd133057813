//! In-process simulation drivers for CI/CD testing without a camera or a
//! serial link.
//!
//! [`ScriptedSource`] replays a prepared list of frames (and capture
//! faults); [`SimByteSink`] records every byte into a shared [`SentLog`]
//! that stays readable after the sink has been moved into a loop.
//!
//! # Example
//!
//! ```rust
//! use gatenav_hal::sim::{ScriptedSource, SimByteSink};
//! use gatenav_hal::{ByteSink, MarkerSource};
//!
//! let mut source = ScriptedSource::new("scripted").with_frame(vec![]);
//! let (mut sink, log) = SimByteSink::new("uart");
//!
//! assert!(source.next_frame().unwrap().unwrap().is_empty());
//! sink.send(b'?').unwrap();
//! assert_eq!(log.as_string(), "?");
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use gatenav_types::{GateNavError, Marker};

use crate::sink::ByteSink;
use crate::source::MarkerSource;

// ────────────────────────────────────────────────────────────────────────────
// Scripted source
// ────────────────────────────────────────────────────────────────────────────

/// A simulated detector that replays queued frames, then reports
/// exhaustion.
pub struct ScriptedSource {
    id: String,
    frames: VecDeque<Result<Vec<Marker>, GateNavError>>,
}

impl ScriptedSource {
    /// Create an empty script with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            frames: VecDeque::new(),
        }
    }

    /// Queue a frame of detections.
    pub fn with_frame(mut self, markers: Vec<Marker>) -> Self {
        self.frames.push_back(Ok(markers));
        self
    }

    /// Queue a frame that fails to capture.
    pub fn with_fault(mut self, details: impl Into<String>) -> Self {
        let fault = GateNavError::CaptureFault {
            device: self.id.clone(),
            details: details.into(),
        };
        self.frames.push_back(Err(fault));
        self
    }

    /// Frames still queued.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl MarkerSource for ScriptedSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Marker>>, GateNavError> {
        self.frames.pop_front().transpose()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording sink
// ────────────────────────────────────────────────────────────────────────────

/// Shared record of the bytes a [`SimByteSink`] accepted.
#[derive(Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<u8>>>);

impl SentLog {
    /// Copy of every byte accepted so far, in order.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Accepted bytes as text.  Command bytes are ASCII.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    fn push(&self, byte: u8) {
        if let Ok(mut b) = self.0.lock() {
            b.push(byte);
        }
    }
}

/// A simulated serial link that records bytes and can be told to fail
/// selected sends.  Failed bytes are not recorded.
pub struct SimByteSink {
    id: String,
    log: SentLog,
    attempts: usize,
    fail_on: HashSet<usize>,
}

impl SimByteSink {
    /// Create a sink and the handle to its log.
    pub fn new(id: impl Into<String>) -> (Self, SentLog) {
        let log = SentLog::default();
        let sink = Self {
            id: id.into(),
            log: log.clone(),
            attempts: 0,
            fail_on: HashSet::new(),
        };
        (sink, log)
    }

    /// Make the `n`-th call to [`send`][ByteSink::send] (0-based) fail.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on.insert(n);
        self
    }
}

impl ByteSink for SimByteSink {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&mut self, byte: u8) -> Result<(), GateNavError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on.contains(&attempt) {
            return Err(GateNavError::SinkFault {
                device: self.id.clone(),
                details: format!("simulated failure on send #{attempt}"),
            });
        }
        self.log.push(byte);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gatenav_types::Point2;

    fn dot(id: i32) -> Marker {
        let p = Point2::new(0.0, 0.0);
        Marker::new(id, [p, p, p, p])
    }

    #[test]
    fn scripted_source_replays_in_order() {
        let mut src = ScriptedSource::new("script")
            .with_frame(vec![dot(0)])
            .with_fault("lens cap on")
            .with_frame(vec![dot(1), dot(2)]);
        assert_eq!(src.remaining(), 3);

        assert_eq!(src.next_frame().unwrap().unwrap()[0].id(), 0);
        let err = src.next_frame().unwrap_err();
        assert!(err.to_string().contains("lens cap on"));
        assert_eq!(src.next_frame().unwrap().unwrap().len(), 2);
        assert!(src.next_frame().unwrap().is_none());
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn sim_sink_records_bytes_through_shared_log() {
        let (mut sink, log) = SimByteSink::new("uart");
        sink.send(b'*').unwrap();
        sink.send(b'A').unwrap();
        assert_eq!(log.bytes(), b"*A");
        assert_eq!(log.as_string(), "*A");
    }

    #[test]
    fn sim_sink_fails_selected_sends_only() {
        let (sink, log) = SimByteSink::new("uart");
        let mut sink = sink.failing_on(1);
        sink.send(b'A').unwrap();
        assert!(matches!(sink.send(b'B'), Err(GateNavError::SinkFault { .. })));
        sink.send(b'C').unwrap();
        assert_eq!(log.as_string(), "AC");
    }
}
