use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "choplink_cache_hit_total",
            Unit::Count,
            "Total number of query cache reads served from a fresh entry."
        );
        describe_counter!(
            "choplink_cache_miss_total",
            Unit::Count,
            "Total number of query cache reads that joined or started a fetch."
        );
        describe_counter!(
            "choplink_cache_fetch_retry_total",
            Unit::Count,
            "Total number of retried query fetches."
        );
        describe_counter!(
            "choplink_cache_invalidated_total",
            Unit::Count,
            "Total number of query cache entries marked invalid by writes."
        );
        describe_counter!(
            "choplink_cache_evict_total",
            Unit::Count,
            "Total number of query cache evictions due to capacity."
        );
        describe_histogram!(
            "choplink_cache_fetch_ms",
            Unit::Milliseconds,
            "Query fetch latency in milliseconds, retries included."
        );
        describe_counter!(
            "choplink_http_requests_total",
            Unit::Count,
            "Total number of requests sent to the Choplink backend."
        );
    });
}
