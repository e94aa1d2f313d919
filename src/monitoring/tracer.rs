/*!
 * Disposal Tracing
 * Structured tracing for dispose cascades using the tracing crate
 *
 * Features:
 * - Cascade ID generation for correlating nested disposals
 * - JSON-formatted logs for structured parsing
 * - Span hierarchies mirroring owner -> resource cascades
 * - Slow cascade warnings (the engine never times out a release)
 */

use crate::config;
use crate::dispose::DereferenceStats;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Environment variable enabling JSON output
pub const ENV_TRACE_JSON: &str = "DISPOSE_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - DISPOSE_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Dispose tracing initialized");
    }
}

/// Generate a unique cascade ID for correlating nested disposals
pub fn generate_cascade_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one dispose cascade
///
/// Entered for the duration of the cascade so that resources disposed by it
/// nest under their owner. Logs completion on drop.
pub struct DisposeSpan {
    span: Span,
    start: Instant,
    owner: &'static str,
    cascade_id: String,
    traced: bool,
}

impl DisposeSpan {
    /// Open a cascade span, or a disabled one when cascade tracing is off
    pub fn new(owner: &'static str, entries: usize) -> Self {
        if config::current().trace_cascades {
            Self::traced(owner, entries)
        } else {
            Self::disabled(owner)
        }
    }

    /// Open a cascade span with a fresh cascade id
    pub fn traced(owner: &'static str, entries: usize) -> Self {
        let cascade_id = generate_cascade_id();
        let span = span!(
            Level::DEBUG,
            "dispose",
            cascade_id = %cascade_id,
            owner = owner,
            entries = entries,
            released = tracing::field::Empty,
            cleared = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            owner,
            cascade_id,
            traced: true,
        }
    }

    /// Span that records nothing and logs nothing on drop
    pub fn disabled(owner: &'static str) -> Self {
        Self {
            span: Span::none(),
            start: Instant::now(),
            owner,
            cascade_id: String::new(),
            traced: false,
        }
    }

    /// Check if this cascade is traced
    #[inline]
    pub fn is_traced(&self) -> bool {
        self.traced
    }

    /// Cascade ID, empty when cascade tracing is disabled
    pub fn cascade_id(&self) -> &str {
        &self.cascade_id
    }

    /// Owner type being disposed
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record the outcome of the dereference step
    pub fn record_stats(&self, stats: &DereferenceStats) {
        self.span.record("released", stats.released);
        self.span.record("cleared", stats.fields_cleared());
    }
}

impl Drop for DisposeSpan {
    fn drop(&mut self) {
        if !self.is_traced() {
            return;
        }

        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > config::current().slow_dispose_threshold() {
            warn!(
                cascade_id = %self.cascade_id,
                owner = self.owner,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow dispose cascade detected"
            );
        } else {
            debug!(
                cascade_id = %self.cascade_id,
                owner = self.owner,
                duration_us = duration.as_micros() as u64,
                "dispose cascade completed"
            );
        }
    }
}
