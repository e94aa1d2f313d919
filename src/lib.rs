/*!
 * Disposal Kernel Library
 * Exactly-once disposal protocol with ordered, recursive resource release
 */

pub mod config;
pub mod core;
pub mod dispose;
pub mod monitoring;

// Re-exports
pub use config::{DisposeConfig, UnresolvedPolicy};
pub use core::errors::{ConfigError, DisposedError};
pub use core::types::{DisposeResult, DisposeStateKind};
pub use dispose::{
    dereference, dispose_all, dispose_if_disposable, ensure_active, is_disposable, protect,
    protect_async, protect_or_err, DereferenceStats, Disposable, DisposeState, EntryKind,
    EntryOutcome, MethodTable, Owner, ProtectConfig, Protected, ReadinessCheck, ReleaseAction,
    ResourceEntry, Slot, Tracked, TrackedResources,
};
pub use monitoring::init_tracing;
