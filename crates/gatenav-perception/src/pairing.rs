//! Gate pairing: choose one left and one right marker as the current gate.
//!
//! Two markers *match* when the left one is strictly left of the right one
//! and their areas differ by at most the configured threshold.  Both
//! strategies fall back to the two largest markers when nothing matches, so
//! a pair is always produced as long as each side has a candidate.

use gatenav_types::Marker;
use serde::{Deserialize, Serialize};

/// Pairing algorithm, chosen at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingStrategy {
    /// Try (L0,R0), then (L1,R0), then (L0,R1); first match wins.
    BestOfTwo,
    /// Visit every (left, right) combination; the last match visited wins.
    #[default]
    ExhaustiveScan,
}

/// The left/right markers selected as this frame's gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GatePair {
    pub left: Marker,
    pub right: Marker,
    /// `true` when no candidate matched and the two largest markers were
    /// taken unconditionally.
    pub fallback: bool,
}

impl GatePair {
    /// Horizontal midpoint between the two centroids.
    pub fn center_x(&self) -> f64 {
        (self.left.centroid().x + self.right.centroid().x) / 2.0
    }

    /// Horizontal distance from left centroid to right centroid.  Negative
    /// when a fallback pair is inverted.
    pub fn width(&self) -> f64 {
        self.right.centroid().x - self.left.centroid().x
    }
}

fn is_match(left: &Marker, right: &Marker, area_threshold: f64) -> bool {
    left.centroid().x < right.centroid().x
        && (left.area() - right.area()).abs() <= area_threshold
}

impl PairingStrategy {
    /// Configuration name, as written in TOML.
    pub fn name(self) -> &'static str {
        match self {
            PairingStrategy::BestOfTwo => "best-of-two",
            PairingStrategy::ExhaustiveScan => "exhaustive-scan",
        }
    }

    /// Select a gate from area-sorted candidate lists.
    ///
    /// Returns `None` when either side has no candidate.
    pub fn select(
        self,
        left: &[Marker],
        right: &[Marker],
        area_threshold: f64,
    ) -> Option<GatePair> {
        let (l0, r0) = (left.first()?, right.first()?);

        let chosen = match self {
            PairingStrategy::BestOfTwo => {
                let candidates = [
                    Some((l0, r0)),
                    left.get(1).map(|l1| (l1, r0)),
                    right.get(1).map(|r1| (l0, r1)),
                ];
                candidates
                    .into_iter()
                    .flatten()
                    .find(|(l, r)| is_match(l, r, area_threshold))
            }
            PairingStrategy::ExhaustiveScan => {
                let mut last = None;
                for l in left {
                    for r in right {
                        if is_match(l, r, area_threshold) {
                            last = Some((l, r));
                        }
                    }
                }
                last
            }
        };

        Some(match chosen {
            Some((l, r)) => GatePair {
                left: l.clone(),
                right: r.clone(),
                fallback: false,
            },
            None => GatePair {
                left: l0.clone(),
                right: r0.clone(),
                fallback: true,
            },
        })
    }
}
