//! [`GateEngine`] – the per-frame navigation decision.
//!
//! ```text
//! markers ─► classify ─► start/goal? ─► pair ─► metrics ─► pass detection ─► encode
//!                            │            │
//!                            ▼            ▼
//!                          * / @          ?
//! ```
//!
//! # Example
//!
//! ```rust
//! use gatenav_perception::{EngineConfig, GateEngine};
//! use gatenav_types::{Marker, NavCommand, Point2};
//!
//! fn square(id: i32, cx: f64, side: f64) -> Marker {
//!     let h = side / 2.0;
//!     Marker::new(id, [
//!         Point2::new(cx - h, 100.0 - h),
//!         Point2::new(cx + h, 100.0 - h),
//!         Point2::new(cx + h, 100.0 + h),
//!         Point2::new(cx - h, 100.0 + h),
//!     ])
//! }
//!
//! let mut engine = GateEngine::new(EngineConfig::default()).unwrap();
//!
//! // Left gate marker at x=200, right at x=440: gate centre 320 → 'N'.
//! let decision = engine.process(&[square(0, 200.0, 40.0), square(1, 440.0, 40.0)]);
//! assert_eq!(decision.command, NavCommand::Gate('N'));
//!
//! assert_eq!(engine.process(&[]).command, NavCommand::Uncertain);
//! ```

use gatenav_types::{GateNavError, Marker, MarkerRole, NavCommand};
use serde::Serialize;

use crate::classify::classify;
use crate::config::EngineConfig;
use crate::encoding::{encode_gate, gate_letter};
use crate::pass_detect::{DropThresholds, EngineState, GateObservation};

// ────────────────────────────────────────────────────────────────────────────
// Decision types
// ────────────────────────────────────────────────────────────────────────────

/// Why no gate could be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UncertainReason {
    /// No marker with a known role was detected.
    NoMarkers,
    /// Gate markers were seen, but not on both sides.
    MissingSide { left: usize, right: usize },
}

/// Measurements of a gate-processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateReading {
    /// Upper-case column letter before case encoding.
    pub letter: char,
    pub center_x: f64,
    pub width: f64,
    pub left_area: f64,
    pub right_area: f64,
    /// The pairing strategy found no match and used the largest markers.
    pub fallback: bool,
    /// A pass event fired on this frame.
    pub passed: bool,
    /// Passes counted so far, including this frame's.
    pub gate_passed_count: u64,
}

/// Which branch the frame took.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FrameOutcome {
    StartSeen,
    GoalSeen,
    Uncertain(UncertainReason),
    GateProcessed(GateReading),
}

/// Result of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    /// The command to transmit.
    pub command: NavCommand,
    pub outcome: FrameOutcome,
    /// Markers with identifiers outside the role table.
    pub unrecognized: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// GateEngine
// ────────────────────────────────────────────────────────────────────────────

/// Stateful gate-navigation decision engine.
///
/// One engine tracks one course.  Its [`EngineState`] changes only on frames
/// where a gate pair was formed; start, goal and uncertain frames leave it
/// untouched.
#[derive(Debug, Clone)]
pub struct GateEngine {
    config: EngineConfig,
    state: EngineState,
}

impl GateEngine {
    /// Create an engine with fresh state.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::InvalidConfig`] if `config` fails
    /// [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> Result<Self, GateNavError> {
        config.validate()?;
        Ok(Self {
            config,
            state: EngineState::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Gate-tracking state after the last processed frame.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Forget all tracked gates, e.g. before a new run of the course.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Decide the command for one frame of detections.
    pub fn process(&mut self, markers: &[Marker]) -> Decision {
        let classified = classify(markers, &self.config.roles);
        let unrecognized = classified.unrecognized;

        let (command, outcome) = match classified.dominant {
            None => (
                NavCommand::Uncertain,
                FrameOutcome::Uncertain(UncertainReason::NoMarkers),
            ),
            Some(MarkerRole::Start) => (NavCommand::Start, FrameOutcome::StartSeen),
            Some(MarkerRole::Goal) => (NavCommand::Goal, FrameOutcome::GoalSeen),
            Some(_) => {
                match self.config.pairing.select(
                    &classified.left,
                    &classified.right,
                    self.config.area_match_threshold,
                ) {
                    None => (
                        NavCommand::Uncertain,
                        FrameOutcome::Uncertain(UncertainReason::MissingSide {
                            left: classified.left.len(),
                            right: classified.right.len(),
                        }),
                    ),
                    Some(pair) => {
                        let letter = gate_letter(pair.center_x(), self.config.frame_width);
                        let observation = GateObservation {
                            left_area: pair.left.area(),
                            right_area: pair.right.area(),
                            width: pair.width(),
                        };
                        let thresholds = self.drop_thresholds();
                        let passed = self.config.pass_detection.observe(
                            &mut self.state,
                            &observation,
                            thresholds,
                        );
                        let reading = GateReading {
                            letter,
                            center_x: pair.center_x(),
                            width: observation.width,
                            left_area: observation.left_area,
                            right_area: observation.right_area,
                            fallback: pair.fallback,
                            passed,
                            gate_passed_count: self.state.gate_passed_count,
                        };
                        (
                            encode_gate(letter, self.state.odd_passes()),
                            FrameOutcome::GateProcessed(reading),
                        )
                    }
                }
            }
        };

        Decision {
            command,
            outcome,
            unrecognized,
        }
    }

    fn drop_thresholds(&self) -> DropThresholds {
        DropThresholds {
            area: self.config.area_drop_threshold,
            width: self.config.width_drop_threshold,
        }
    }
}
