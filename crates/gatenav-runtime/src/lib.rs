//! `gatenav-runtime` – the driver around the decision engine.
//!
//! # Modules
//!
//! - [`nav_loop`] – [`NavigationLoop`][nav_loop::NavigationLoop]: pulls
//!   marker frames from a [`MarkerSource`][gatenav_hal::MarkerSource], runs
//!   the [`GateEngine`][gatenav_perception::GateEngine], logs each decision
//!   and writes the command byte to a [`ByteSink`][gatenav_hal::ByteSink].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: stderr
//!   logs (compact or JSON) plus optional OTLP span export tagged with the
//!   engine's pairing and pass-detection strategies.

pub mod nav_loop;
pub mod telemetry;

pub use nav_loop::{LoopStats, NavigationLoop, StepOutcome};
pub use telemetry::{init_tracing, LogFormat, TracerProviderGuard};
