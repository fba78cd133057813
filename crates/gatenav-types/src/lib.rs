use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2-D point in image coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

/// Raw detector output for one marker: identifier plus the four corners in
/// contour order.  This is the wire shape; [`Marker`] is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerObservation {
    pub id: i32,
    pub corners: [[f64; 2]; 4],
}

/// A fiducial marker observed in a single frame.
///
/// Centroid and area are derived from the corners when the marker is built
/// and can never drift from them: there are no setters, and deserialising a
/// `Marker` goes through [`MarkerObservation`] so the derived values are
/// recomputed rather than trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MarkerObservation", into = "MarkerObservation")]
pub struct Marker {
    id: i32,
    corners: [Point2; 4],
    centroid: Point2,
    area: f64,
}

impl Marker {
    /// Build a marker from its identifier and four ordered corners.
    pub fn new(id: i32, corners: [Point2; 4]) -> Self {
        let centroid = Point2 {
            x: corners.iter().map(|c| c.x).sum::<f64>() / 4.0,
            y: corners.iter().map(|c| c.y).sum::<f64>() / 4.0,
        };
        // Shoelace formula over the closed contour.
        let twice_signed: f64 = (0..4)
            .map(|i| {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                a.x * b.y - b.x * a.y
            })
            .sum();
        Self {
            id,
            corners,
            centroid,
            area: (twice_signed / 2.0).abs(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn corners(&self) -> &[Point2; 4] {
        &self.corners
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point2 {
        self.centroid
    }

    /// Unsigned polygon area of the corner contour, in square pixels.
    pub fn area(&self) -> f64 {
        self.area
    }
}

impl From<MarkerObservation> for Marker {
    fn from(obs: MarkerObservation) -> Self {
        Marker::new(obs.id, obs.corners.map(Point2::from))
    }
}

impl From<Marker> for MarkerObservation {
    fn from(m: Marker) -> Self {
        MarkerObservation {
            id: m.id,
            corners: m.corners.map(<[f64; 2]>::from),
        }
    }
}

/// The navigation role a marker identifier stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerRole {
    Start,
    Goal,
    GateLeft,
    GateRight,
    /// The identifier is not part of the course; reported and ignored.
    Unrecognized,
}

/// The single command emitted for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "letter")]
pub enum NavCommand {
    /// The start marker dominates the view (`*`).
    Start,
    /// The goal marker dominates the view (`@`).
    Goal,
    /// No gate could be formed this frame (`?`).
    Uncertain,
    /// Horizontal gate position as an ASCII letter.  Upper case while an even
    /// number of gates has been passed, lower case otherwise.
    Gate(char),
}

impl NavCommand {
    /// The byte written to the rover's motor controller.
    pub fn to_byte(self) -> u8 {
        match self {
            NavCommand::Start => b'*',
            NavCommand::Goal => b'@',
            NavCommand::Uncertain => b'?',
            NavCommand::Gate(letter) => letter as u8,
        }
    }
}

impl std::fmt::Display for NavCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}

/// Error type shared by the engine configuration and its collaborators.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateNavError {
    #[error("Sink Fault on {device}: {details}")]
    SinkFault { device: String, details: String },

    #[error("Capture Fault on {device}: {details}")]
    CaptureFault { device: String, details: String },

    #[error("Invalid Configuration: {0}")]
    InvalidConfig(String),
}
