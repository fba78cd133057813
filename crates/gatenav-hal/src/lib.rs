//! `gatenav-hal` – collaborator interfaces around the decision engine.
//!
//! The engine only ever sees marker lists and produces bytes.  Everything
//! that touches a device lives here behind two traits, so drivers can be
//! swapped without touching navigation logic.
//!
//! # Modules
//!
//! - [`source`] – [`MarkerSource`][source::MarkerSource]: yields one frame
//!   of detected markers per call.
//! - [`sink`] – [`ByteSink`][sink::ByteSink]: accepts one command byte at a
//!   time.
//! - [`jsonl`] – [`JsonLinesSource`][jsonl::JsonLinesSource]: reads detector
//!   output as one JSON array per line.
//! - [`serial`] – [`SerialSink`][serial::SerialSink]: writes bytes to a
//!   serial device node or stdout.
//! - [`sim`] – scripted source and recording sink for headless tests.

pub mod jsonl;
pub mod serial;
pub mod sim;
pub mod sink;
pub mod source;

pub use jsonl::JsonLinesSource;
pub use serial::{SerialSink, DEFAULT_BAUD_RATE};
pub use sim::{ScriptedSource, SentLog, SimByteSink};
pub use sink::ByteSink;
pub use source::MarkerSource;
