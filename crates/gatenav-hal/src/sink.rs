//! Generic `ByteSink` trait for the rover's command channel.

use gatenav_types::GateNavError;

/// A byte-oriented output channel to the rover's motor controller.
///
/// Drivers implement this trait; the navigation loop hands it exactly one
/// byte per processed frame.
pub trait ByteSink: Send {
    /// Stable identifier for this sink, e.g. `"/dev/serial0"`.
    fn id(&self) -> &str;

    /// Transmit a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::SinkFault`] if the byte could not be
    /// delivered.  The caller decides whether to retry; drivers never do.
    fn send(&mut self, byte: u8) -> Result<(), GateNavError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSink {
        id: String,
        sent: Vec<u8>,
    }

    impl ByteSink for MockSink {
        fn id(&self) -> &str {
            &self.id
        }

        fn send(&mut self, byte: u8) -> Result<(), GateNavError> {
            self.sent.push(byte);
            Ok(())
        }
    }

    #[test]
    fn mock_sink_records_bytes() {
        let mut sink = MockSink {
            id: "uart".to_string(),
            sent: Vec::new(),
        };
        assert_eq!(sink.id(), "uart");
        sink.send(b'A').unwrap();
        sink.send(b'?').unwrap();
        assert_eq!(sink.sent, b"A?");
    }
}
