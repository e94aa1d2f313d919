/*!
 * Disposal Traits
 *
 * Capability contracts consumed by the engine
 */

use crate::core::types::short_type_name;
use std::sync::Arc;

/// Core disposal contract
///
/// Anything implementing this is released by the engine through `dispose`
/// and skipped once `is_disposed` reports true.
///
/// # Contract
///
/// - `is_disposed` is side-effect free and never reverts from `true` to `false`
/// - `dispose` is idempotent: only the first call runs release logic, even
///   when several threads call it at once
pub trait Disposable: Send + Sync {
    /// Check whether the value has been disposed
    fn is_disposed(&self) -> bool;

    /// Dispose the value, releasing everything it owns
    fn dispose(&self);

    /// Type name reported in refusals
    fn type_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
    #[inline]
    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }

    #[inline]
    fn dispose(&self) {
        (**self).dispose()
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

/// Values that may sit in a tracked field
///
/// Answers the capability question "does this value take part in the
/// disposal protocol" without inspecting its shape at runtime. Every
/// [`Disposable`] answers `Some`; plain data answers `None` and is merely
/// cleared when its owner disposes.
pub trait Tracked {
    /// View the value as a disposable, if it is one
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }

    /// Best-effort release of the value's own fields
    ///
    /// Only consulted for values that are not disposable, when a caller asks
    /// for fallback dereferencing. Plain aggregates override this to run
    /// [`dereference`](super::dereference) over their slots.
    fn dereference_fields(&self) {}
}

impl<T: Disposable> Tracked for T {
    #[inline]
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

macro_rules! plain_tracked {
    ($($ty:ty),* $(,)?) => {
        $(impl Tracked for $ty {})*
    };
}

plain_tracked!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    std::path::PathBuf,
    std::time::Duration,
    std::time::Instant,
    std::time::SystemTime,
);

impl Tracked for Arc<str> {}

impl<T: Tracked> Tracked for Option<T> {
    #[inline]
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        self.as_ref().and_then(|value| value.as_disposable())
    }

    fn dereference_fields(&self) {
        if let Some(value) = self {
            value.dereference_fields();
        }
    }
}

impl<T> Tracked for Vec<T> {}
impl<T> Tracked for std::collections::VecDeque<T> {}
impl<K, V, S> Tracked for std::collections::HashMap<K, V, S> {}
impl<K, V> Tracked for std::collections::BTreeMap<K, V> {}
impl<T, S> Tracked for std::collections::HashSet<T, S> {}
impl<T> Tracked for std::collections::BTreeSet<T> {}

/// Check whether a value implements the disposal contract
#[inline]
pub fn is_disposable<T: Tracked + ?Sized>(value: &T) -> bool {
    value.as_disposable().is_some()
}

/// Dispose a value if it takes part in the protocol
///
/// Disposable values are disposed unless already disposed. Other values are
/// left alone, unless `fallback_dereference` is set, in which case their own
/// fields are released through [`Tracked::dereference_fields`].
pub fn dispose_if_disposable<T: Tracked + ?Sized>(value: &T, fallback_dereference: bool) {
    match value.as_disposable() {
        Some(disposable) => {
            if !disposable.is_disposed() {
                disposable.dispose();
            }
        }
        None if fallback_dereference => value.dereference_fields(),
        None => {}
    }
}

/// Dispose every value of a sequence in order, skipping disposed ones
///
/// Returns how many values were disposed by this call.
pub fn dispose_all<'a, I, D>(values: I) -> usize
where
    I: IntoIterator<Item = &'a D>,
    D: Disposable + ?Sized + 'a,
{
    let mut disposed = 0;
    for value in values {
        if !value.is_disposed() {
            value.dispose();
            disposed += 1;
        }
    }
    disposed
}
