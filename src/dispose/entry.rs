/*!
 * Resource Entries
 *
 * One tracked field of an owner plus the strategy that releases it
 */

use super::slot::Slot;
use super::strategy::{ReadinessCheck, ReleaseAction};
use super::traits::{Disposable, Tracked};
use crate::config::{self, UnresolvedPolicy};
use crate::core::types::ResourceKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration shape of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Field only; disposable values are disposed, anything else is cleared
    Plain,
    /// Field with an explicit release action and readiness check
    Aliased,
}

/// What happened to one entry during dereferencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Field was already absent, nothing touched
    Absent,
    /// Release operation ran, field cleared
    Released,
    /// Resource reported itself released, field cleared
    AlreadyReleased,
    /// Plain non-disposable value, field cleared
    Cleared,
    /// Release method name did not resolve, field cleared
    Unresolved,
}

impl EntryOutcome {
    /// Check if the owner's field was cleared by this entry
    #[inline]
    pub fn cleared_field(self) -> bool {
        !matches!(self, EntryOutcome::Absent)
    }
}

type ReleaseFn<O> = Box<dyn Fn(&O) -> EntryOutcome + Send + Sync>;

/// One tracked field of an owner `O`
///
/// Built from a typed accessor, so a registration can only name fields that
/// exist and release strategies that fit the field's type.
///
/// # Release Order
///
/// The value is moved out of its slot first, released, then dropped. The
/// slot is absent afterwards whatever the outcome.
pub struct ResourceEntry<O> {
    key: ResourceKey,
    kind: EntryKind,
    release: ReleaseFn<O>,
}

impl<O: 'static> ResourceEntry<O> {
    /// Plain entry: dispose the value if it is a live disposable, then clear
    pub fn plain<T>(key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: Tracked + 'static,
    {
        Self {
            key,
            kind: EntryKind::Plain,
            release: Box::new(move |owner| {
                let Some(resource) = accessor(owner).take() else {
                    return EntryOutcome::Absent;
                };

                match resource.as_disposable() {
                    Some(disposable) if !disposable.is_disposed() => {
                        disposable.dispose();
                        EntryOutcome::Released
                    }
                    Some(_) => EntryOutcome::AlreadyReleased,
                    None => EntryOutcome::Cleared,
                }
            }),
        }
    }

    /// Plain entry for a value with no release path: drop it and clear
    ///
    /// For shared or foreign values that cannot implement [`Tracked`], such
    /// as `Arc<Settings>`. Other holders of a shared value are unaffected.
    pub fn field<T>(key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: 'static,
    {
        Self {
            key,
            kind: EntryKind::Plain,
            release: Box::new(move |owner| match accessor(owner).take() {
                Some(_) => EntryOutcome::Cleared,
                None => EntryOutcome::Absent,
            }),
        }
    }

    /// Aliased entry: run `check`, release through `action` if needed, then clear
    pub fn aliased<T>(
        key: ResourceKey,
        accessor: fn(&O) -> &Slot<T>,
        action: ReleaseAction<T>,
        check: ReadinessCheck<T>,
    ) -> Self
    where
        T: 'static,
    {
        Self {
            key,
            kind: EntryKind::Aliased,
            release: Box::new(move |owner| {
                let Some(resource) = accessor(owner).take() else {
                    return EntryOutcome::Absent;
                };

                if !check.needs_release(&resource) {
                    return EntryOutcome::AlreadyReleased;
                }

                if action.apply(&resource) {
                    return EntryOutcome::Released;
                }

                if config::current().unresolved_release == UnresolvedPolicy::Warn {
                    tracing::warn!(
                        key,
                        method = action.method_name().unwrap_or("<unknown>"),
                        "release method did not resolve, field cleared without release"
                    );
                }
                EntryOutcome::Unresolved
            }),
        }
    }

    /// Aliased entry releasing through `action`, with no readiness check
    pub fn with_release<T>(
        key: ResourceKey,
        accessor: fn(&O) -> &Slot<T>,
        action: ReleaseAction<T>,
    ) -> Self
    where
        T: 'static,
    {
        Self::aliased(key, accessor, action, ReadinessCheck::AlwaysNeeded)
    }

    /// Aliased entry that disposes a disposable unless it already is
    pub fn disposable<T>(key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: Disposable + 'static,
    {
        Self::aliased(
            key,
            accessor,
            ReleaseAction::dispose(),
            ReadinessCheck::disposed(),
        )
    }
}

impl<O> ResourceEntry<O> {
    /// Field name
    #[inline]
    pub fn key(&self) -> ResourceKey {
        self.key
    }

    /// Registration shape
    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Release and clear this entry's field on `owner`
    pub fn release(&self, owner: &O) -> EntryOutcome {
        (self.release)(owner)
    }
}

impl<O> fmt::Debug for ResourceEntry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}
