/*!
 * Monitoring
 * Structured tracing for dispose cascades
 */

mod tracer;

pub use tracer::{generate_cascade_id, init_tracing, DisposeSpan, ENV_TRACE_JSON};
