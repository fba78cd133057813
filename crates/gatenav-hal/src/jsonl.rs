//! Detector bridge that reads marker detections as JSON lines.
//!
//! An external detector process writes one line per captured frame: a JSON
//! array of `{"id": <int>, "corners": [[x, y], [x, y], [x, y], [x, y]]}`
//! objects, corners in contour order.  An empty array or a blank line is a
//! frame without detections.
//!
//! A line that is not valid UTF-8 or not valid JSON is reported as a
//! [`GateNavError::CaptureFault`] and skipped.  Any other read error is
//! reported once, after which the source counts as exhausted.
//!
//! ```text
//! [{"id":0,"corners":[[10,10],[50,10],[50,50],[10,50]]},{"id":1,"corners":[[300,10],[340,10],[340,50],[300,50]]}]
//! []
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Stdin};
use std::path::Path;

use gatenav_types::{GateNavError, Marker};
use tracing::trace;

use crate::source::MarkerSource;

/// [`MarkerSource`] over any buffered reader of JSON lines.
pub struct JsonLinesSource<R> {
    id: String,
    reader: R,
    line_no: u64,
    buf: String,
    closed: bool,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    /// Wrap `reader` under the identifier `id`.
    pub fn new(id: impl Into<String>, reader: R) -> Self {
        Self {
            id: id.into(),
            reader,
            line_no: 0,
            buf: String::new(),
            closed: false,
        }
    }

    fn fault(&self, details: String) -> GateNavError {
        GateNavError::CaptureFault {
            device: self.id.clone(),
            details,
        }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    /// Read detections from the process's standard input.
    pub fn stdin() -> Self {
        Self::new("stdin", BufReader::new(io::stdin()))
    }
}

impl JsonLinesSource<BufReader<File>> {
    /// Read detections from a file or named pipe.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::CaptureFault`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GateNavError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GateNavError::CaptureFault {
            device: path.display().to_string(),
            details: format!("cannot open: {e}"),
        })?;
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead + Send> MarkerSource for JsonLinesSource<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Marker>>, GateNavError> {
        if self.closed {
            return Ok(None);
        }
        self.buf.clear();
        let read = match self.reader.read_line(&mut self.buf) {
            Ok(read) => read,
            // The undecodable line has been consumed; the next one is intact.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                self.line_no += 1;
                return Err(self.fault(format!("line {}: {e}", self.line_no)));
            }
            Err(e) => {
                self.closed = true;
                return Err(self.fault(format!(
                    "read failed after line {}, closing input: {e}",
                    self.line_no
                )));
            }
        };
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let line = self.buf.trim();
        if line.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let markers: Vec<Marker> = serde_json::from_str(line)
            .map_err(|e| self.fault(format!("line {}: {e}", self.line_no)))?;
        trace!(source = %self.id, line = self.line_no, markers = markers.len(), "frame decoded");
        Ok(Some(markers))
    }
}
