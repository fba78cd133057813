//! `gatenav-perception` – the gate navigation decision engine.
//!
//! Turns one frame of fiducial-marker detections into one command for the
//! rover's motor controller, tracking gate geometry across frames to notice
//! when a gate has been driven through.  The crate is pure: it performs no
//! I/O and no logging, so callers decide how decisions are transmitted and
//! reported.
//!
//! # Modules
//!
//! - [`classify`] – splits detections into start/goal/left/right partitions
//!   sorted by area and finds the dominant marker.
//! - [`pairing`] – [`PairingStrategy`][pairing::PairingStrategy]: picks one
//!   left and one right marker as the current gate.
//! - [`pass_detect`] – [`PassDetection`][pass_detect::PassDetection] and
//!   [`EngineState`][pass_detect::EngineState]: infers gate passes from
//!   shrinking marker areas or gate width.
//! - [`encoding`] – maps the gate position to a column letter and applies
//!   the pass-parity case.
//! - [`engine`] – [`GateEngine`][engine::GateEngine]: wires the stages
//!   together and owns the state.
//! - [`config`] – [`EngineConfig`][config::EngineConfig] and the marker
//!   [`RoleTable`][config::RoleTable].

pub mod classify;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod pairing;
pub mod pass_detect;

pub use config::{EngineConfig, RoleTable};
pub use engine::{Decision, FrameOutcome, GateEngine, GateReading, UncertainReason};
pub use pairing::{GatePair, PairingStrategy};
pub use pass_detect::{EngineState, PassDetection};
