/*!
 * Core Types
 * Common types used across the disposal engine
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a tracked field, used for logging and per-entry reporting
pub type ResourceKey = &'static str;

/// Timestamp delta in microseconds
pub type Micros = u64;

/// Common result type for guarded operations
pub type DisposeResult<T> = Result<T, super::errors::DisposedError>;

/// Observable lifecycle state of a disposable
///
/// `Active` is the only initial state and `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposeStateKind {
    Active,
    Disposed,
}

impl DisposeStateKind {
    #[inline]
    pub fn is_disposed(self) -> bool {
        matches!(self, DisposeStateKind::Disposed)
    }
}

impl fmt::Display for DisposeStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposeStateKind::Active => write!(f, "active"),
            DisposeStateKind::Disposed => write!(f, "disposed"),
        }
    }
}

/// Last path segment of `T`'s type name, generics stripped
///
/// `my_crate::net::Connection<u8>` becomes `Connection`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
