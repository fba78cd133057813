//! Pass-event detection and the persistent gate-tracking state.
//!
//! The rover has driven through a gate when the gate it sees next is
//! noticeably smaller than the one it saw before: the passed gate left the
//! view and a more distant one took its place.

use serde::{Deserialize, Serialize};

/// Pass-detection algorithm, chosen at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassDetection {
    /// Both gate markers shrank by more than the area-drop threshold.
    AreaDrop,
    /// The gate narrowed by more than the width-drop threshold.
    #[default]
    WidthDrop,
}

/// Geometry of the gate selected in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateObservation {
    pub left_area: f64,
    pub right_area: f64,
    pub width: f64,
}

/// Gate-tracking state carried from one gate-processed frame to the next.
///
/// The `last_*` fields start at the `-1.0` sentinel, meaning "no previous
/// gate", which keeps the first gate-processed frame from registering a
/// drop for any non-negative measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineState {
    pub last_left_area: f64,
    pub last_right_area: f64,
    pub last_gate_width: f64,
    pub gate_passed_count: u64,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            last_left_area: -1.0,
            last_right_area: -1.0,
            last_gate_width: -1.0,
            gate_passed_count: 0,
        }
    }
}

impl EngineState {
    /// Fresh state with sentinel measurements and no gates passed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` while an odd number of gates has been passed.
    pub fn odd_passes(&self) -> bool {
        self.gate_passed_count % 2 == 1
    }
}

/// Thresholds consumed by [`PassDetection::observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropThresholds {
    pub area: f64,
    pub width: f64,
}

impl PassDetection {
    /// Configuration name, as written in TOML.
    pub fn name(self) -> &'static str {
        match self {
            PassDetection::AreaDrop => "area-drop",
            PassDetection::WidthDrop => "width-drop",
        }
    }

    /// `true` when `current` shows a pass relative to `state`.
    pub fn fires(self, state: &EngineState, current: &GateObservation, th: DropThresholds) -> bool {
        match self {
            PassDetection::AreaDrop => {
                state.last_left_area - current.left_area > th.area
                    && state.last_right_area - current.right_area > th.area
            }
            PassDetection::WidthDrop => state.last_gate_width - current.width > th.width,
        }
    }

    /// Run detection for one gate-processed frame and fold the observation
    /// into `state`.
    ///
    /// The pass counter is incremented when a pass fires; the `last_*`
    /// measurements are overwritten with `current` either way.  Returns
    /// whether a pass fired.
    pub fn observe(
        self,
        state: &mut EngineState,
        current: &GateObservation,
        th: DropThresholds,
    ) -> bool {
        let passed = self.fires(state, current, th);
        if passed {
            state.gate_passed_count += 1;
        }
        state.last_left_area = current.left_area;
        state.last_right_area = current.right_area;
        state.last_gate_width = current.width;
        passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TH: DropThresholds = DropThresholds {
        area: 1000.0,
        width: 0.0,
    };

    fn obs(left_area: f64, right_area: f64, width: f64) -> GateObservation {
        GateObservation {
            left_area,
            right_area,
            width,
        }
    }

    #[test]
    fn new_state_holds_sentinels() {
        let s = EngineState::new();
        assert_eq!(s.last_left_area, -1.0);
        assert_eq!(s.last_right_area, -1.0);
        assert_eq!(s.last_gate_width, -1.0);
        assert_eq!(s.gate_passed_count, 0);
    }

    #[test]
    fn width_drop_fires_and_updates_state() {
        let mut s = EngineState {
            last_gate_width: 100.0,
            ..EngineState::new()
        };
        let passed = PassDetection::WidthDrop.observe(&mut s, &obs(10.0, 10.0, 80.0), TH);
        assert!(passed);
        assert_eq!(s.gate_passed_count, 1);
        assert_eq!(s.last_gate_width, 80.0);
        assert_eq!(s.last_left_area, 10.0);
        assert_eq!(s.last_right_area, 10.0);
    }

    #[test]
    fn width_drop_needs_strictly_more_than_threshold() {
        let th = DropThresholds { area: 0.0, width: 20.0 };
        let mut s = EngineState {
            last_gate_width: 100.0,
            ..EngineState::new()
        };
        assert!(!PassDetection::WidthDrop.observe(&mut s, &obs(1.0, 1.0, 80.0), th));
        assert_eq!(s.gate_passed_count, 0);
        assert_eq!(s.last_gate_width, 80.0);
    }

    #[test]
    fn width_growth_is_not_a_pass() {
        let mut s = EngineState {
            last_gate_width: 100.0,
            ..EngineState::new()
        };
        assert!(!PassDetection::WidthDrop.observe(&mut s, &obs(1.0, 1.0, 120.0), TH));
        assert_eq!(s.last_gate_width, 120.0);
    }

    #[test]
    fn first_observation_never_fires_for_positive_geometry() {
        for strategy in [PassDetection::AreaDrop, PassDetection::WidthDrop] {
            let mut s = EngineState::new();
            assert!(!strategy.observe(&mut s, &obs(5000.0, 5000.0, 300.0), TH));
            assert_eq!(s.gate_passed_count, 0);
        }
    }

    #[test]
    fn area_drop_requires_both_sides() {
        let mut s = EngineState {
            last_left_area: 5000.0,
            last_right_area: 5000.0,
            ..EngineState::new()
        };
        // Only the left marker shrank enough.
        assert!(!PassDetection::AreaDrop.observe(&mut s, &obs(3000.0, 4500.0, 50.0), TH));
        assert_eq!(s.gate_passed_count, 0);

        let mut s = EngineState {
            last_left_area: 5000.0,
            last_right_area: 5000.0,
            ..EngineState::new()
        };
        assert!(PassDetection::AreaDrop.observe(&mut s, &obs(3000.0, 3500.0, 50.0), TH));
        assert_eq!(s.gate_passed_count, 1);
        assert_eq!(s.last_left_area, 3000.0);
        assert_eq!(s.last_right_area, 3500.0);
    }

    #[test]
    fn area_drop_ignores_width() {
        let mut s = EngineState {
            last_left_area: 100.0,
            last_right_area: 100.0,
            last_gate_width: 500.0,
            gate_passed_count: 0,
        };
        assert!(!PassDetection::AreaDrop.observe(&mut s, &obs(100.0, 100.0, 10.0), TH));
    }

    #[test]
    fn replaying_same_observation_never_fires_twice() {
        for strategy in [PassDetection::AreaDrop, PassDetection::WidthDrop] {
            let mut s = EngineState {
                last_left_area: 9000.0,
                last_right_area: 9000.0,
                last_gate_width: 400.0,
                gate_passed_count: 0,
            };
            let o = obs(2000.0, 2000.0, 100.0);
            assert!(strategy.observe(&mut s, &o, TH));
            assert!(!strategy.observe(&mut s, &o, TH));
            assert_eq!(s.gate_passed_count, 1);
        }
    }

    #[test]
    fn names_match_config_spelling() {
        assert_eq!(PassDetection::AreaDrop.name(), "area-drop");
        assert_eq!(PassDetection::WidthDrop.name(), "width-drop");
        let parsed: PassDetection = serde_json::from_str("\"area-drop\"").unwrap();
        assert_eq!(parsed, PassDetection::AreaDrop);
    }

    #[test]
    fn reset_restores_sentinels() {
        let mut s = EngineState {
            last_left_area: 1.0,
            last_right_area: 2.0,
            last_gate_width: 3.0,
            gate_passed_count: 7,
        };
        assert!(s.odd_passes());
        s.reset();
        assert_eq!(s, EngineState::new());
        assert!(!s.odd_passes());
    }
}
