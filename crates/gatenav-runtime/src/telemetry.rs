//! Log and span output for a GateNav process.
//!
//! [`init_tracing`] installs one subscriber made of:
//!
//! - an [`EnvFilter`] read from `RUST_LOG` (default `info`);
//! - a formatter writing to **stderr**, compact or JSON per [`LogFormat`].
//!   Stdout is left alone because it may be the command byte stream;
//! - when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OTLP/HTTP span exporter
//!   whose resource names the engine's pairing and pass-detection
//!   strategies, so traces from differently configured rovers can be told
//!   apart.
//!
//! The perception crate never logs.  Everything it decides is turned into
//! events by the [`NavigationLoop`][crate::nav_loop::NavigationLoop].

use std::io::{self, IsTerminal};

use gatenav_perception::EngineConfig;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the [`LogFormat`].
pub const LOG_FORMAT_ENV: &str = "GATENAV_LOG_FORMAT";

// ─────────────────────────────────────────────────────────────────────────────
// Log format
// ─────────────────────────────────────────────────────────────────────────────

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Newline-delimited JSON for log collectors.
    Json,
}

impl LogFormat {
    /// `json` (any case) selects [`LogFormat::Json`]; anything else is
    /// compact.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }

    /// Read [`LOG_FORMAT_ENV`].
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialisation
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global subscriber for a run of `engine`.
///
/// Call once, after the configuration is known.  Hold the returned guard
/// until exit; dropping it flushes pending spans.
pub fn init_tracing(service_name: &str, engine: &EngineConfig) -> TracerProviderGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let provider = build_provider(service_name, engine);
    let otel = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("gatenav")));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel)
        .with(fmt_layer(
            LogFormat::from_env(),
            io::stderr,
            io::stderr().is_terminal(),
        ))
        .init();

    TracerProviderGuard(provider)
}

/// Formatter layer for `format` writing through `writer`.  Colour codes are
/// only emitted when `ansi` is set.
fn fmt_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// OTel resource describing this process and the engine it runs.
fn resource(service_name: &str, engine: &EngineConfig) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attributes([
            KeyValue::new("gatenav.pairing", engine.pairing.name()),
            KeyValue::new("gatenav.pass_detection", engine.pass_detection.name()),
            KeyValue::new("gatenav.frame_width", engine.frame_width),
        ])
        .build()
}

/// `None` unless `OTEL_EXPORTER_OTLP_ENDPOINT` is set and the exporter
/// builds.
fn build_provider(service_name: &str, engine: &EngineConfig) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[gatenav] OTLP exporter init failed: {e}"))
        .ok()?;

    // No async runtime here, so spans are exported synchronously.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource(service_name, engine))
            .with_simple_exporter(exporter)
            .build(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Shuts the tracer provider down on drop.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[gatenav] span export shutdown failed: {e}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
