//! [`NavigationLoop`] – frame-by-frame driver around the decision engine.
//!
//! Each [`step`][NavigationLoop::step]:
//!
//! 1. **Capture** – pull the next marker list from the [`MarkerSource`].
//!    A capture fault skips the frame without emitting anything.
//! 2. **Decide** – run [`GateEngine::process`] on the markers.
//! 3. **Report** – log the decision (anomalies, missing gate sides,
//!    pairing fallbacks, passes) and fold it into [`LoopStats`].
//! 4. **Transmit** – hand the command byte to the [`ByteSink`].  A sink fault
//!    is reported and counted; it is not retried and does not affect the
//!    engine.
//!
//! [`run`][NavigationLoop::run] repeats this until the source is exhausted or
//! the shutdown flag is raised.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use gatenav_hal::sim::{ScriptedSource, SimByteSink};
//! use gatenav_perception::{EngineConfig, GateEngine};
//! use gatenav_runtime::NavigationLoop;
//!
//! let engine = GateEngine::new(EngineConfig::default()).unwrap();
//! let source = ScriptedSource::new("script").with_frame(vec![]).with_frame(vec![]);
//! let (sink, log) = SimByteSink::new("uart");
//!
//! let mut nav = NavigationLoop::new(engine, Box::new(source), Box::new(sink));
//! let stats = nav.run(&AtomicBool::new(false));
//!
//! assert_eq!(stats.frames, 2);
//! assert_eq!(log.as_string(), "??");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use gatenav_hal::{ByteSink, MarkerSource};
use gatenav_perception::{Decision, FrameOutcome, GateEngine, UncertainReason};
use gatenav_types::GateNavError;
use tracing::{debug, debug_span, error, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes & statistics
// ─────────────────────────────────────────────────────────────────────────────

/// What happened during one [`NavigationLoop::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The frame was processed and its command byte delivered.
    Emitted(Decision),
    /// The frame was processed but the sink rejected the byte.
    SinkFailed {
        decision: Decision,
        error: GateNavError,
    },
    /// The source could not deliver this frame; nothing was emitted.
    CaptureFailed(GateNavError),
    /// The source has no more frames.
    Exhausted,
}

/// Running totals for one navigation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames that reached the engine.
    pub frames: u64,
    pub bytes_sent: u64,
    pub sink_failures: u64,
    pub capture_failures: u64,
    pub unrecognized_markers: u64,
    pub start_frames: u64,
    pub goal_frames: u64,
    pub uncertain_frames: u64,
    pub gate_frames: u64,
    /// Gate passes counted by the engine so far.
    pub gates_passed: u64,
}

impl LoopStats {
    fn record(&mut self, decision: &Decision) {
        self.frames += 1;
        self.unrecognized_markers += decision.unrecognized as u64;
        match decision.outcome {
            FrameOutcome::StartSeen => self.start_frames += 1,
            FrameOutcome::GoalSeen => self.goal_frames += 1,
            FrameOutcome::Uncertain(_) => self.uncertain_frames += 1,
            FrameOutcome::GateProcessed(reading) => {
                self.gate_frames += 1;
                self.gates_passed = reading.gate_passed_count;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NavigationLoop
// ─────────────────────────────────────────────────────────────────────────────

/// Drives a [`GateEngine`] from a [`MarkerSource`] to a [`ByteSink`].
///
/// The loop is the engine's only owner, so its state always has a single
/// writer even if the loop itself is moved to another thread.
pub struct NavigationLoop {
    engine: GateEngine,
    source: Box<dyn MarkerSource>,
    sink: Box<dyn ByteSink>,
    stats: LoopStats,
    tick: u64,
}

impl NavigationLoop {
    pub fn new(engine: GateEngine, source: Box<dyn MarkerSource>, sink: Box<dyn ByteSink>) -> Self {
        Self {
            engine,
            source,
            sink,
            stats: LoopStats::default(),
            tick: 0,
        }
    }

    pub fn engine(&self) -> &GateEngine {
        &self.engine
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Capture, decide and transmit a single frame.
    pub fn step(&mut self) -> StepOutcome {
        let _span = debug_span!("frame", tick = self.tick).entered();
        self.tick += 1;

        let markers = match self.source.next_frame() {
            Ok(Some(markers)) => markers,
            Ok(None) => {
                info!(source = %self.source.id(), "marker source exhausted");
                return StepOutcome::Exhausted;
            }
            Err(e) => {
                self.stats.capture_failures += 1;
                error!(source = %self.source.id(), error = %e, "frame capture failed; skipping");
                return StepOutcome::CaptureFailed(e);
            }
        };

        let decision = self.engine.process(&markers);
        self.stats.record(&decision);
        self.report(&decision);

        match self.sink.send(decision.command.to_byte()) {
            Ok(()) => {
                self.stats.bytes_sent += 1;
                StepOutcome::Emitted(decision)
            }
            Err(error) => {
                self.stats.sink_failures += 1;
                error!(sink = %self.sink.id(), command = %decision.command, error = %error, "command not delivered");
                StepOutcome::SinkFailed { decision, error }
            }
        }
    }

    /// Step until the source is exhausted or `shutdown` becomes `true`.
    ///
    /// `shutdown` is checked between frames, so a frame already in progress
    /// is always completed.  Returns the statistics of the whole run.
    pub fn run(&mut self, shutdown: &AtomicBool) -> LoopStats {
        info!(
            source = %self.source.id(),
            sink = %self.sink.id(),
            pairing = self.engine.config().pairing.name(),
            pass_detection = self.engine.config().pass_detection.name(),
            "navigation loop started"
        );
        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!("shutdown requested; stopping navigation loop");
                break;
            }
            if self.step() == StepOutcome::Exhausted {
                break;
            }
        }
        info!(
            frames = self.stats.frames,
            gates_passed = self.stats.gates_passed,
            sink_failures = self.stats.sink_failures,
            capture_failures = self.stats.capture_failures,
            "navigation loop finished"
        );
        self.stats.clone()
    }

    fn report(&self, decision: &Decision) {
        if decision.unrecognized > 0 {
            warn!(count = decision.unrecognized, "found markers without a valid marker id");
        }
        match decision.outcome {
            FrameOutcome::StartSeen => debug!("start marker dominates the view"),
            FrameOutcome::GoalSeen => debug!("goal marker dominates the view"),
            FrameOutcome::Uncertain(UncertainReason::NoMarkers) => info!("no markers seen"),
            FrameOutcome::Uncertain(UncertainReason::MissingSide { left, right }) => {
                warn!(left, right, "markers not enough to form a gate pair");
            }
            FrameOutcome::GateProcessed(reading) => {
                if reading.fallback {
                    info!(
                        pairing = self.engine.config().pairing.name(),
                        "no matching gate pair; fell back to the largest markers"
                    );
                }
                if reading.passed {
                    info!(gates_passed = reading.gate_passed_count, "gate passed");
                }
                debug!(
                    g_char = %decision.command,
                    g_passed = reading.gate_passed_count,
                    g_x = reading.center_x,
                    g_w = reading.width,
                    f_w = self.engine.config().frame_width,
                    "gate decision"
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gatenav_hal::sim::{ScriptedSource, SimByteSink};
    use gatenav_perception::EngineConfig;
    use gatenav_types::{Marker, NavCommand, Point2};

    fn square(id: i32, cx: f64, side: f64) -> Marker {
        let h = side / 2.0;
        Marker::new(
            id,
            [
                Point2::new(cx - h, 240.0 - h),
                Point2::new(cx + h, 240.0 - h),
                Point2::new(cx + h, 240.0 + h),
                Point2::new(cx - h, 240.0 + h),
            ],
        )
    }

    fn gate(left_x: f64, right_x: f64, side: f64) -> Vec<Marker> {
        vec![square(0, left_x, side), square(1, right_x, side)]
    }

    fn engine() -> GateEngine {
        GateEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn one_byte_per_processed_frame() {
        let source = ScriptedSource::new("script")
            .with_frame(vec![])
            .with_frame(gate(100.0, 500.0, 80.0))
            .with_frame(gate(200.0, 400.0, 40.0))
            .with_frame(vec![square(2, 320.0, 200.0)])
            .with_frame(vec![square(3, 320.0, 200.0)]);
        let (sink, log) = SimByteSink::new("uart");
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        let stats = nav.run(&AtomicBool::new(false));

        assert_eq!(log.as_string(), "?Mm*@");
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.bytes_sent, 5);
        assert_eq!(stats.uncertain_frames, 1);
        assert_eq!(stats.gate_frames, 2);
        assert_eq!(stats.start_frames, 1);
        assert_eq!(stats.goal_frames, 1);
        assert_eq!(stats.gates_passed, 1);
    }

    #[test]
    fn sink_failure_is_reported_and_next_frame_proceeds() {
        let source = ScriptedSource::new("script")
            .with_frame(gate(100.0, 500.0, 80.0))
            .with_frame(gate(200.0, 400.0, 40.0));
        let (sink, log) = SimByteSink::new("uart");
        let sink = sink.failing_on(0);
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        match nav.step() {
            StepOutcome::SinkFailed { decision, error } => {
                assert_eq!(decision.command, NavCommand::Gate('M'));
                assert!(matches!(error, GateNavError::SinkFault { .. }));
            }
            other => panic!("expected SinkFailed, got {other:?}"),
        }
        // The engine still tracked the first gate, so the second frame
        // registers the pass.
        assert!((nav.engine().state().last_gate_width - 400.0).abs() < 1e-9);
        assert!(matches!(
            nav.step(),
            StepOutcome::Emitted(Decision { command: NavCommand::Gate('m'), .. })
        ));
        assert_eq!(log.as_string(), "m");
        assert_eq!(nav.stats().sink_failures, 1);
        assert_eq!(nav.stats().bytes_sent, 1);
    }

    #[test]
    fn capture_fault_skips_frame_without_output() {
        let source = ScriptedSource::new("script")
            .with_fault("empty frame captured")
            .with_frame(vec![]);
        let (sink, log) = SimByteSink::new("uart");
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        assert!(matches!(nav.step(), StepOutcome::CaptureFailed(_)));
        assert_eq!(log.as_string(), "");
        assert!(matches!(nav.step(), StepOutcome::Emitted(_)));
        assert_eq!(nav.step(), StepOutcome::Exhausted);
        assert_eq!(log.as_string(), "?");
        assert_eq!(nav.stats().capture_failures, 1);
        assert_eq!(nav.stats().frames, 1);
    }

    #[test]
    fn raised_shutdown_flag_stops_before_next_frame() {
        let source = ScriptedSource::new("script")
            .with_frame(vec![])
            .with_frame(vec![]);
        let (sink, log) = SimByteSink::new("uart");
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        let stats = nav.run(&AtomicBool::new(true));
        assert_eq!(stats.frames, 0);
        assert!(log.bytes().is_empty());
    }

    #[test]
    fn unrecognized_markers_are_counted() {
        let mut frame = gate(100.0, 500.0, 80.0);
        frame.push(square(42, 10.0, 5.0));
        frame.push(square(43, 20.0, 5.0));
        let source = ScriptedSource::new("script").with_frame(frame);
        let (sink, log) = SimByteSink::new("uart");
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        let stats = nav.run(&AtomicBool::new(false));
        assert_eq!(stats.unrecognized_markers, 2);
        assert_eq!(log.as_string(), "M");
    }

    struct DeadCamera;

    impl std::io::Read for DeadCamera {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("camera pipe closed"))
        }
    }

    #[test]
    fn broken_detector_input_ends_the_run() {
        let source = gatenav_hal::JsonLinesSource::new(
            "detector",
            std::io::BufReader::new(DeadCamera),
        );
        let (sink, log) = SimByteSink::new("uart");
        let mut nav = NavigationLoop::new(engine(), Box::new(source), Box::new(sink));

        let stats = nav.run(&AtomicBool::new(false));
        assert_eq!(stats.capture_failures, 1);
        assert_eq!(stats.frames, 0);
        assert!(log.bytes().is_empty());
    }
}
