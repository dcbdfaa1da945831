//! OpenTelemetry instrumentation.

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{Config, RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE: &str = "alife-runner";

/// Provider that batches spans to an OTLP collector, or drops them all when
/// no endpoint is configured. Must be called inside a Tokio runtime.
pub fn build_tracer_provider(otel_endpoint: Option<&str>) -> Result<TracerProvider> {
    let Some(endpoint) = otel_endpoint else {
        return Ok(TracerProvider::builder()
            .with_config(Config::default().with_sampler(Sampler::AlwaysOff))
            .build());
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(
            Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new(SERVICE_NAME, SERVICE),
                    KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build())
}

pub fn init_telemetry(otel_endpoint: Option<&str>, json_logs: bool) -> Result<()> {
    let tracer_provider = build_tracer_provider(otel_endpoint)?;
    global::set_tracer_provider(tracer_provider.clone());

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(SERVICE));

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alife_runner=debug,alife_world=info".into()),
        )
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(|| fmt::layer().with_target(true)))
        .with(telemetry_layer)
        .init();

    match otel_endpoint {
        Some(endpoint) => info!("Telemetry initialized, exporting spans over OTLP to {}", endpoint),
        None => info!("Telemetry initialized, OpenTelemetry disabled (no endpoint configured)"),
    }
    Ok(())
}

/// Flush pending span batches and stop the exporter
pub fn shutdown_telemetry() {
    info!("Shutting down telemetry");
    global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{Span, Tracer, TracerProvider as _};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_endpoint_installs_exporting_provider() {
        let provider = build_tracer_provider(Some("http://127.0.0.1:4317")).unwrap();

        let mut span = provider.tracer(SERVICE).start("tick");
        assert!(span.span_context().is_sampled());
        span.end();

        // Nobody listens on the port, so the final export may fail
        let _ = provider.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_endpoint_samples_nothing() {
        let provider = build_tracer_provider(None).unwrap();

        let span = provider.tracer(SERVICE).start("tick");
        assert!(!span.span_context().is_sampled());
    }
}
