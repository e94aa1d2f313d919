/*!
 * Tracked Field Slots
 *
 * Interior-mutable cell backing each tracked field of an owner
 */

use parking_lot::Mutex;
use std::fmt;

/// A tracked field that can be cleared through a shared reference
///
/// Owners are disposed through `&self`, so every field the engine clears
/// lives in a slot. `None` is the absent state.
///
/// # Locking
///
/// Closures passed to [`Slot::with`] and [`Slot::map`] run with the slot
/// locked and must not touch the same slot again.
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    /// Create a slot holding a value
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }

    /// Create an absent slot
    #[inline]
    pub fn empty() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Check if the slot is absent
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.value.lock().is_none()
    }

    /// Check if the slot holds a value
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Store a value, returning the previous one
    pub fn set(&self, value: T) -> Option<T> {
        self.value.lock().replace(value)
    }

    /// Move the value out, leaving the slot absent
    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    /// Run a closure with the current value
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let guard = self.value.lock();
        f(guard.as_ref())
    }

    /// Map the current value, if present
    pub fn map<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.value.lock().as_ref().map(f)
    }

    /// Consume the slot, returning its value
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T: Clone> Slot<T> {
    /// Clone the current value out of the slot
    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<T> for Slot<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(value: Option<T>) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.try_lock() {
            Some(value) => f.debug_tuple("Slot").field(&*value).finish(),
            None => f.write_str("Slot(<locked>)"),
        }
    }
}
