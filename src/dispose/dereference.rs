/*!
 * Dereference Algorithm
 * Ordered release-and-clear over an owner's tracked entries
 */

use super::entry::{EntryOutcome, ResourceEntry};
use crate::core::types::{Micros, ResourceKey};
use serde::Serialize;
use std::time::Instant;

/// Dereference statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DereferenceStats {
    pub visited: usize,
    pub released: usize,
    pub already_released: usize,
    pub cleared: usize,
    pub unresolved: usize,
    pub absent: usize,
    pub duration_micros: Micros,
    pub outcomes: Vec<(ResourceKey, EntryOutcome)>,
}

impl DereferenceStats {
    /// Create new stats with timing
    #[inline]
    pub fn with_timing<F>(f: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        let start = Instant::now();
        let mut stats = f();
        stats.duration_micros = start.elapsed().as_micros() as u64;
        stats
    }

    /// Record the outcome of one entry
    pub fn record(&mut self, key: ResourceKey, outcome: EntryOutcome) {
        self.visited += 1;
        match outcome {
            EntryOutcome::Absent => self.absent += 1,
            EntryOutcome::Released => self.released += 1,
            EntryOutcome::AlreadyReleased => self.already_released += 1,
            EntryOutcome::Cleared => self.cleared += 1,
            EntryOutcome::Unresolved => self.unresolved += 1,
        }
        self.outcomes.push((key, outcome));
    }

    /// Merge another stats into this one
    pub fn merge(&mut self, other: DereferenceStats) {
        self.visited += other.visited;
        self.released += other.released;
        self.already_released += other.already_released;
        self.cleared += other.cleared;
        self.unresolved += other.unresolved;
        self.absent += other.absent;
        self.duration_micros += other.duration_micros;
        self.outcomes.extend(other.outcomes);
    }

    /// Number of fields cleared, whatever their outcome
    #[inline]
    pub fn fields_cleared(&self) -> usize {
        self.visited - self.absent
    }

    /// First recorded outcome for a field
    pub fn outcome_of(&self, key: &str) -> Option<EntryOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, outcome)| *outcome)
    }
}

/// Release and clear every entry's field on `owner`, in order
///
/// For each entry: an absent field is skipped untouched; otherwise the
/// value is released according to the entry's strategy (if it still needs
/// it) and the field is left absent.
///
/// Order matters when two fields share one underlying resource: the first
/// entry releases it, the second sees it already released and only clears.
pub fn dereference<O>(owner: &O, entries: &[ResourceEntry<O>]) -> DereferenceStats {
    DereferenceStats::with_timing(|| {
        let mut stats = DereferenceStats::default();

        for entry in entries {
            let outcome = entry.release(owner);
            tracing::trace!(key = entry.key(), ?outcome, "dereferenced");
            stats.record(entry.key(), outcome);
        }

        stats
    })
}
