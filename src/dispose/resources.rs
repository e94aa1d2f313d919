/*!
 * Tracked Resource Lists
 * Ordered, immutable registration of an owner's tracked fields
 */

use super::dereference::{dereference, DereferenceStats};
use super::entry::ResourceEntry;
use super::slot::Slot;
use super::strategy::{ReadinessCheck, ReleaseAction};
use super::traits::{Disposable, Tracked};
use crate::core::types::ResourceKey;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Ordered list of an owner's tracked fields
///
/// Immutable once built and cheap to clone, so one list can be shared by
/// every instance of an owner type (typically from a `static OnceLock`).
pub struct TrackedResources<O> {
    entries: Arc<[ResourceEntry<O>]>,
}

impl<O: 'static> TrackedResources<O> {
    /// Start building a list
    pub fn builder() -> TrackedResourcesBuilder<O> {
        TrackedResourcesBuilder::new()
    }
}

impl<O> TrackedResources<O> {
    /// List with no entries
    pub fn empty() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }

    /// Number of tracked fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked field names in release order
    pub fn keys(&self) -> Vec<ResourceKey> {
        self.entries.iter().map(|e| e.key()).collect()
    }

    /// Release and clear every tracked field of `owner`
    pub fn release_all(&self, owner: &O) -> DereferenceStats {
        dereference(owner, &self.entries)
    }
}

impl<O> Deref for TrackedResources<O> {
    type Target = [ResourceEntry<O>];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<O> Clone for TrackedResources<O> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<O> Default for TrackedResources<O> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<O> fmt::Debug for TrackedResources<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// Builder for [`TrackedResources`]
///
/// Entries release in the order they are added.
pub struct TrackedResourcesBuilder<O> {
    entries: Vec<ResourceEntry<O>>,
}

impl<O: 'static> TrackedResourcesBuilder<O> {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a prebuilt entry
    pub fn entry(mut self, entry: ResourceEntry<O>) -> Self {
        if self.entries.iter().any(|e| e.key() == entry.key()) {
            log::warn!(
                "Field '{}' tracked twice - the later entry only sees an absent value",
                entry.key()
            );
        }
        self.entries.push(entry);
        self
    }

    /// Track a plain field
    pub fn plain<T>(self, key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: Tracked + 'static,
    {
        self.entry(ResourceEntry::plain(key, accessor))
    }

    /// Track a field that is only dropped and cleared
    pub fn field<T>(self, key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: 'static,
    {
        self.entry(ResourceEntry::field(key, accessor))
    }

    /// Track a field with an explicit release action and readiness check
    pub fn aliased<T>(
        self,
        key: ResourceKey,
        accessor: fn(&O) -> &Slot<T>,
        action: ReleaseAction<T>,
        check: ReadinessCheck<T>,
    ) -> Self
    where
        T: 'static,
    {
        self.entry(ResourceEntry::aliased(key, accessor, action, check))
    }

    /// Track a field released by `action` with no readiness check
    pub fn with_release<T>(
        self,
        key: ResourceKey,
        accessor: fn(&O) -> &Slot<T>,
        action: ReleaseAction<T>,
    ) -> Self
    where
        T: 'static,
    {
        self.entry(ResourceEntry::with_release(key, accessor, action))
    }

    /// Track a disposable field
    pub fn disposable<T>(self, key: ResourceKey, accessor: fn(&O) -> &Slot<T>) -> Self
    where
        T: Disposable + 'static,
    {
        self.entry(ResourceEntry::disposable(key, accessor))
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the list
    pub fn build(self) -> TrackedResources<O> {
        log::debug!("Built tracked resource list with {} entries", self.entries.len());
        TrackedResources {
            entries: Arc::from(self.entries),
        }
    }
}

impl<O: 'static> Default for TrackedResourcesBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}
