//! Generic `MarkerSource` trait for fiducial-marker detectors.

use gatenav_types::{GateNavError, Marker};

/// A detector that produces the markers seen in each captured frame.
///
/// The camera, capture pipeline and marker decoding all sit behind this
/// trait; the navigation loop only consumes the resulting marker lists.
pub trait MarkerSource: Send {
    /// Stable identifier for this source, e.g. `"front_aruco"`.
    fn id(&self) -> &str;

    /// Return the markers of the next frame.
    ///
    /// `Ok(Some(vec![]))` is a frame in which nothing was detected;
    /// `Ok(None)` means the source is exhausted and no further frames will
    /// follow.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::CaptureFault`] if this frame could not be
    /// captured or decoded.  The source stays usable and the next call moves
    /// on to the following frame.
    fn next_frame(&mut self) -> Result<Option<Vec<Marker>>, GateNavError>;
}
