//! Log output for the `waymark` binary.
//!
//! Engine events (guard failures, recovered action failures, commits and
//! rollbacks) go to stderr so `--json` output on stdout stays parseable. The
//! `transit` spans of `waymark simulate` can also be exported through
//! OpenTelemetry when `enable_otel` is set in `waymark.toml`.
//!
//! ```no_run
//! use waymark_observe::tracing_setup::{init_tracing, log_filter};
//!
//! // `waymark -v simulate ...`
//! init_tracing(false, &log_filter(false, 1, "warn")).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Kept for [`shutdown_tracing`].
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Filter directive for the CLI verbosity flags.
///
/// `--quiet` wins over `-v`. Without flags the configured filter
/// (`log_filter` in `waymark.toml`) applies; `-v` shows committed
/// transitions and the engine's debug events, `-vv` everything.
pub fn log_filter(quiet: bool, verbose: u8, configured: &str) -> String {
    match verbose {
        _ if quiet => "error".to_string(),
        0 => configured.to_string(),
        1 => "info,waymark=debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `filter`. Closed spans are logged with their timing,
/// which is how `simulate` reports per-transition durations.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(enable_otel: bool, filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let otel_layer = enable_otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("waymark");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush exported spans. No-op unless OpenTelemetry was enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: failed to flush workflow spans: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_follows_verbosity() {
        assert_eq!(log_filter(false, 0, "warn,waymark_core=info"), "warn,waymark_core=info");
        assert_eq!(log_filter(false, 1, "warn"), "info,waymark=debug");
        assert_eq!(log_filter(false, 2, "warn"), "trace");
        assert_eq!(log_filter(false, 5, "warn"), "trace");
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(log_filter(true, 0, "debug"), "error");
        assert_eq!(log_filter(true, 2, "debug"), "error");
    }

    #[test]
    fn test_log_filter_output_parses() {
        for filter in [
            log_filter(false, 0, "warn"),
            log_filter(false, 1, "warn"),
            log_filter(false, 2, "warn"),
            log_filter(true, 0, "warn"),
        ] {
            assert!(EnvFilter::try_new(&filter).is_ok(), "{filter}");
        }
    }
}
