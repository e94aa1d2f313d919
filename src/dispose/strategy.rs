/*!
 * Release Strategies
 *
 * How a single tracked resource is released, and how to tell that it
 * already was
 */

use super::traits::Disposable;
use std::fmt;
use std::sync::Arc;

/// Named zero-argument methods a resource type exposes to the engine
///
/// Lets a registration say "call `close`" or "check `is_closed`" by name.
/// Names are resolved once, when the strategy is built, never at dispose
/// time. A name the table does not know resolves to nothing.
///
/// # Example
///
/// ```ignore
/// impl MethodTable for Connection {
///     fn release_method(name: &str) -> Option<fn(&Self)> {
///         match name {
///             "close" => Some(Connection::close),
///             _ => None,
///         }
///     }
///
///     fn status_method(name: &str) -> Option<fn(&Self) -> bool> {
///         match name {
///             "is_closed" => Some(Connection::is_closed),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait MethodTable: Sized {
    /// Resolve a release method by name
    fn release_method(name: &str) -> Option<fn(&Self)> {
        let _ = name;
        None
    }

    /// Resolve a status method or property by name
    ///
    /// The resolved function returns `true` when the resource is already
    /// released.
    fn status_method(name: &str) -> Option<fn(&Self) -> bool> {
        let _ = name;
        None
    }
}

/// The operation that releases a resource
pub enum ReleaseAction<T> {
    /// Free-standing function receiving the resource
    Call(Arc<dyn Fn(&T) + Send + Sync>),
    /// Method on the resource, resolved by name at registration
    ///
    /// `op` is `None` when the name did not resolve. Such a release is
    /// skipped and the field is still cleared.
    Method {
        name: &'static str,
        op: Option<fn(&T)>,
    },
}

impl<T> ReleaseAction<T> {
    /// Release through a free-standing function
    pub fn call<F>(f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        ReleaseAction::Call(Arc::new(f))
    }

    /// Release through a named method of the resource type
    pub fn method(name: &'static str) -> Self
    where
        T: MethodTable,
    {
        ReleaseAction::Method {
            name,
            op: T::release_method(name),
        }
    }

    /// Release by disposing the resource
    pub fn dispose() -> Self
    where
        T: Disposable + 'static,
    {
        ReleaseAction::call(|resource: &T| resource.dispose())
    }

    /// Check whether the action can actually be invoked
    pub fn is_resolved(&self) -> bool {
        match self {
            ReleaseAction::Call(_) => true,
            ReleaseAction::Method { op, .. } => op.is_some(),
        }
    }

    /// Method name, if the action is a method reference
    pub fn method_name(&self) -> Option<&'static str> {
        match self {
            ReleaseAction::Call(_) => None,
            ReleaseAction::Method { name, .. } => Some(*name),
        }
    }

    /// Invoke the action
    ///
    /// Returns `false` without doing anything when the method did not resolve.
    pub(crate) fn apply(&self, resource: &T) -> bool {
        match self {
            ReleaseAction::Call(f) => {
                f(resource);
                true
            }
            ReleaseAction::Method { op: Some(op), .. } => {
                op(resource);
                true
            }
            ReleaseAction::Method { op: None, .. } => false,
        }
    }
}

impl<T> Clone for ReleaseAction<T> {
    fn clone(&self) -> Self {
        match self {
            ReleaseAction::Call(f) => ReleaseAction::Call(Arc::clone(f)),
            ReleaseAction::Method { name, op } => ReleaseAction::Method {
                name: *name,
                op: *op,
            },
        }
    }
}

impl<T> fmt::Debug for ReleaseAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseAction::Call(_) => f.write_str("Call(<fn>)"),
            ReleaseAction::Method { name, op } => f
                .debug_struct("Method")
                .field("name", name)
                .field("resolved", &op.is_some())
                .finish(),
        }
    }
}

/// Decides whether a resource still needs releasing
///
/// Every check answers "already released?"; `false` means release is needed.
pub enum ReadinessCheck<T> {
    /// No check, release is always needed
    AlwaysNeeded,
    /// Free-standing predicate receiving the resource
    Predicate(Arc<dyn Fn(&T) -> bool + Send + Sync>),
    /// Method or property of the resource, resolved by name at registration
    ///
    /// An unresolved name behaves like [`ReadinessCheck::AlwaysNeeded`].
    Method {
        name: &'static str,
        probe: Option<fn(&T) -> bool>,
    },
}

impl<T> ReadinessCheck<T> {
    /// Check through a free-standing predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        ReadinessCheck::Predicate(Arc::new(f))
    }

    /// Check through a named status method or property of the resource type
    pub fn method(name: &'static str) -> Self
    where
        T: MethodTable,
    {
        ReadinessCheck::Method {
            name,
            probe: T::status_method(name),
        }
    }

    /// Check through the resource's own disposed flag
    pub fn disposed() -> Self
    where
        T: Disposable + 'static,
    {
        ReadinessCheck::predicate(|resource: &T| resource.is_disposed())
    }

    /// Check whether the resource still needs releasing
    pub fn needs_release(&self, resource: &T) -> bool {
        match self {
            ReadinessCheck::AlwaysNeeded => true,
            ReadinessCheck::Predicate(released) => !released(resource),
            ReadinessCheck::Method {
                probe: Some(released),
                ..
            } => !released(resource),
            ReadinessCheck::Method { probe: None, .. } => true,
        }
    }
}

impl<T> Default for ReadinessCheck<T> {
    fn default() -> Self {
        ReadinessCheck::AlwaysNeeded
    }
}

impl<T> Clone for ReadinessCheck<T> {
    fn clone(&self) -> Self {
        match self {
            ReadinessCheck::AlwaysNeeded => ReadinessCheck::AlwaysNeeded,
            ReadinessCheck::Predicate(f) => ReadinessCheck::Predicate(Arc::clone(f)),
            ReadinessCheck::Method { name, probe } => ReadinessCheck::Method {
                name: *name,
                probe: *probe,
            },
        }
    }
}

impl<T> fmt::Debug for ReadinessCheck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessCheck::AlwaysNeeded => f.write_str("AlwaysNeeded"),
            ReadinessCheck::Predicate(_) => f.write_str("Predicate(<fn>)"),
            ReadinessCheck::Method { name, probe } => f
                .debug_struct("Method")
                .field("name", name)
                .field("resolved", &probe.is_some())
                .finish(),
        }
    }
}
