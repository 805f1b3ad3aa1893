//! Logging and OpenTelemetry Integration
//!
//! Installs the `tracing` subscriber: an `EnvFilter` plus a fmt layer, and
//! optionally an OTLP span exporter for any OTLP-compatible backend.
//!
//! Span export is driven by [`TelemetrySettings`] (`OTEL_ENABLED`,
//! `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`). `RUST_LOG` adds to the
//! default `sample_streamer=info` filter.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::infrastructure::config::TelemetrySettings;

/// Flushes exported spans when dropped. Keep it alive until exit.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to flush span exporter on exit: {e}");
        }
    }
}

#[allow(clippy::expect_used)]
fn log_filter() -> EnvFilter {
    ["sample_streamer=info", "hyper=warn", "tungstenite=warn"]
        .into_iter()
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive.parse().expect("static log directive is valid"))
        })
}

/// Build the OTLP exporter if span export is enabled.
///
/// A failed build only disables export; logging still starts.
fn span_exporter(settings: &TelemetrySettings) -> Option<SpanExporter> {
    if !settings.otel_enabled {
        return None;
    }

    SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&settings.otlp_endpoint)
        .build()
        .map_err(|e| eprintln!("Span export disabled, OTLP exporter failed to build: {e}"))
        .ok()
}

/// Install the global subscriber.
#[must_use]
pub fn init(settings: &TelemetrySettings) -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let Some(exporter) = span_exporter(settings) else {
        tracing_subscriber::registry()
            .with(log_filter())
            .with(fmt_layer)
            .init();
        return TelemetryGuard {
            tracer_provider: None,
        };
    };

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_service_name(settings.service_name.clone())
                .build(),
        )
        .build();
    let tracer = tracer_provider.tracer(settings.service_name.clone());

    tracing_subscriber::registry()
        .with(log_filter())
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    TelemetryGuard {
        tracer_provider: Some(tracer_provider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_settings_build_no_exporter() {
        assert!(span_exporter(&TelemetrySettings::default()).is_none());
    }

    #[test]
    fn log_filter_accepts_default_directives() {
        let filter = log_filter().to_string();
        assert!(filter.contains("sample_streamer=info"));
    }
}
