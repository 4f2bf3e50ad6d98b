//! Structured logging and request correlation.
//!
//! [`init_tracing`] installs the global subscriber (JSON or pretty output,
//! filtered by `RUST_LOG` or the configured level) and bridges `log::`
//! records from SeaORM, sqlx and the seeding code into it.
//! [`trace_context_middleware`] gives every request a trace ID that error
//! bodies and the `x-trace-id` response header carry.

use std::sync::OnceLock;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Header carrying the request correlation ID in both directions.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 128;

/// Correlation data for the request being served.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static REQUEST_TRACE: TraceContext;
}

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("log bridge could not be installed: {0}")]
    LogBridge(#[from] log::SetLoggerError),
    #[error("tracing subscriber could not be installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. Later calls are no-ops, so tests and the
/// binary can both call it.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let output = if config.log_format == "pretty" {
        fmt::layer().pretty().boxed()
    } else {
        fmt::layer().json().flatten_event(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()?;

    let _ = INSTALLED.set(());
    Ok(())
}

/// Runs `future` with `context` as the active request trace.
pub async fn with_trace_context<F>(context: TraceContext, future: F) -> F::Output
where
    F: std::future::Future,
{
    REQUEST_TRACE.scope(context, future).await
}

/// Trace ID of the request the current task is serving, if any.
pub fn current_trace_id() -> Option<String> {
    REQUEST_TRACE.try_with(|ctx| ctx.trace_id.clone()).ok()
}

/// Middleware that establishes the per-request trace context.
///
/// Reuses an incoming `X-Trace-Id` header when it is printable and short,
/// otherwise generates a fresh UUID. The ID is echoed on the response.
pub async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_TRACE_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let context = TraceContext {
        trace_id: trace_id.clone(),
    };
    request.extensions_mut().insert(context.clone());

    let mut response = with_trace_context(context, next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }

    response
}
