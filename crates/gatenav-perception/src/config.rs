//! Engine configuration, fixed when a [`GateEngine`][crate::engine::GateEngine]
//! is constructed.
//!
//! Every field has a serde default matching the stock course setup (640 px
//! wide capture, marker ids 0–3), so a TOML `[engine]` table only needs to
//! list what differs.

use std::collections::HashSet;

use gatenav_types::{GateNavError, MarkerRole};
use serde::{Deserialize, Serialize};

use crate::pairing::PairingStrategy;
use crate::pass_detect::PassDetection;

// ────────────────────────────────────────────────────────────────────────────
// Role table
// ────────────────────────────────────────────────────────────────────────────

/// Maps marker identifiers onto their course roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTable {
    pub start: i32,
    pub goal: i32,
    pub gate_left: i32,
    pub gate_right: i32,
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            gate_left: 0,
            gate_right: 1,
            start: 2,
            goal: 3,
        }
    }
}

impl RoleTable {
    /// Resolve the role of `id`.  Identifiers not in the table are
    /// [`MarkerRole::Unrecognized`].
    pub fn classify(&self, id: i32) -> MarkerRole {
        if id == self.start {
            MarkerRole::Start
        } else if id == self.goal {
            MarkerRole::Goal
        } else if id == self.gate_left {
            MarkerRole::GateLeft
        } else if id == self.gate_right {
            MarkerRole::GateRight
        } else {
            MarkerRole::Unrecognized
        }
    }

    fn is_unambiguous(&self) -> bool {
        let ids: HashSet<i32> = [self.start, self.goal, self.gate_left, self.gate_right]
            .into_iter()
            .collect();
        ids.len() == 4
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EngineConfig
// ────────────────────────────────────────────────────────────────────────────

/// Complete configuration of the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the captured frame in pixels.  Must match the capture
    /// pipeline, since gate positions are mapped onto letters relative to it.
    pub frame_width: f64,

    /// Identifier → role mapping.
    pub roles: RoleTable,

    /// How left and right gate markers are paired.
    pub pairing: PairingStrategy,

    /// How a gate pass is inferred from frame-to-frame geometry.
    pub pass_detection: PassDetection,

    /// Maximum area difference (px²) between a left and right marker for them
    /// to be considered the same gate.
    pub area_match_threshold: f64,

    /// Minimum per-side area decrease (px²) for [`PassDetection::AreaDrop`].
    pub area_drop_threshold: f64,

    /// Minimum gate-width decrease (px) for [`PassDetection::WidthDrop`].
    pub width_drop_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_width: 640.0,
            roles: RoleTable::default(),
            pairing: PairingStrategy::default(),
            pass_detection: PassDetection::default(),
            area_match_threshold: 2000.0,
            area_drop_threshold: 1000.0,
            width_drop_threshold: 0.0,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::InvalidConfig`] when the frame width is not a
    /// positive finite number, when two roles share an identifier, or when a
    /// threshold is not finite.
    pub fn validate(&self) -> Result<(), GateNavError> {
        if !(self.frame_width.is_finite() && self.frame_width > 0.0) {
            return Err(GateNavError::InvalidConfig(format!(
                "frame_width must be positive, got {}",
                self.frame_width
            )));
        }
        if !self.roles.is_unambiguous() {
            return Err(GateNavError::InvalidConfig(format!(
                "marker roles must use distinct ids, got {:?}",
                self.roles
            )));
        }
        for (name, value) in [
            ("area_match_threshold", self.area_match_threshold),
            ("area_drop_threshold", self.area_drop_threshold),
            ("width_drop_threshold", self.width_drop_threshold),
        ] {
            if !value.is_finite() {
                return Err(GateNavError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
