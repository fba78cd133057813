//! Marker classification: splits a frame's detections by role.

use gatenav_types::{Marker, MarkerRole};

use crate::config::RoleTable;

/// A frame's markers partitioned by role.
///
/// Each partition is sorted by descending area.  The sort is stable, so
/// markers of equal area keep their detection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedMarkers {
    pub start: Vec<Marker>,
    pub goal: Vec<Marker>,
    pub left: Vec<Marker>,
    pub right: Vec<Marker>,
    /// Markers whose identifier is not in the role table.  They appear in no
    /// partition.
    pub unrecognized: usize,
    /// Role of the single largest classified marker in the frame, if any.
    /// Ties go to the marker detected first.
    pub dominant: Option<MarkerRole>,
}

impl ClassifiedMarkers {
    /// `true` when no marker with a known role was seen.
    pub fn is_empty(&self) -> bool {
        self.dominant.is_none()
    }
}

/// Partition `markers` using `roles`.
pub fn classify(markers: &[Marker], roles: &RoleTable) -> ClassifiedMarkers {
    let mut out = ClassifiedMarkers::default();
    let mut largest: Option<(f64, MarkerRole)> = None;

    for marker in markers {
        let role = roles.classify(marker.id());
        let bucket = match role {
            MarkerRole::Start => &mut out.start,
            MarkerRole::Goal => &mut out.goal,
            MarkerRole::GateLeft => &mut out.left,
            MarkerRole::GateRight => &mut out.right,
            MarkerRole::Unrecognized => {
                out.unrecognized += 1;
                continue;
            }
        };
        bucket.push(marker.clone());

        // Strict comparison keeps the earliest marker on equal areas.
        if largest.is_none_or(|(area, _)| marker.area() > area) {
            largest = Some((marker.area(), role));
        }
    }

    for bucket in [&mut out.start, &mut out.goal, &mut out.left, &mut out.right] {
        sort_by_area_desc(bucket);
    }
    out.dominant = largest.map(|(_, role)| role);
    out
}

fn sort_by_area_desc(markers: &mut [Marker]) {
    markers.sort_by(|a, b| b.area().total_cmp(&a.area()));
}
