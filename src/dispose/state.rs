/*!
 * Dispose State Machine
 *
 * `Active -> Disposed`, decided by a single atomic flip
 */

use super::dereference::DereferenceStats;
use super::resources::TrackedResources;
use super::traits::Disposable;
use crate::core::types::{short_type_name, DisposeStateKind, Micros};
use crate::monitoring::DisposeSpan;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Per-object disposed flag
///
/// Starts `Active`; [`DisposeState::try_begin`] moves it to `Disposed`
/// exactly once, no matter how many callers race on it.
pub struct DisposeState {
    disposed: AtomicBool,
    created_at: Instant,
}

impl DisposeState {
    /// Create an active state
    #[inline]
    pub fn new() -> Self {
        Self {
            disposed: AtomicBool::new(false),
            created_at: Instant::now(),
        }
    }

    /// Check if disposed
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Current state
    #[inline]
    pub fn kind(&self) -> DisposeStateKind {
        if self.is_disposed() {
            DisposeStateKind::Disposed
        } else {
            DisposeStateKind::Active
        }
    }

    /// Flip to `Disposed`
    ///
    /// Returns `true` only for the caller that performed the flip; that
    /// caller owns the release work.
    #[inline]
    pub fn try_begin(&self) -> bool {
        self.disposed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Microseconds since creation
    #[inline]
    pub fn lifetime_micros(&self) -> Micros {
        self.created_at.elapsed().as_micros() as u64
    }
}

impl Default for DisposeState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DisposeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeState")
            .field("state", &self.kind())
            .finish()
    }
}

/// An object that owns tracked resources and takes part in the protocol
///
/// Implementing this is enough to get [`Disposable`]: the blanket impl runs
/// the state machine, the tracked-resource cascade, then [`Owner::release`].
///
/// # Example
///
/// ```ignore
/// struct Pool {
///     state: DisposeState,
///     conn: Slot<Connection>,
/// }
///
/// impl Owner for Pool {
///     fn dispose_state(&self) -> &DisposeState {
///         &self.state
///     }
///
///     fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
///         Some(&POOL_RESOURCES)
///     }
///
///     fn release(&self) {
///         // tracked fields are already absent here
///     }
/// }
/// ```
pub trait Owner: Send + Sync + Sized + 'static {
    /// The owner's disposed flag
    fn dispose_state(&self) -> &DisposeState;

    /// Tracked fields, released in order on disposal
    fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
        None
    }

    /// Owner-specific release logic
    ///
    /// Runs exactly once, after every tracked field was released and cleared.
    fn release(&self) {}

    /// Type name reported in logs and refusals
    fn type_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Dispose and report what the cascade did
    ///
    /// Returns `None` when the owner was already disposed.
    fn dispose_with_report(&self) -> Option<DereferenceStats> {
        dispose_owner(self)
    }
}

/// Run the dispose state machine for an owner
///
/// Only the caller that flips the state runs the cascade; everyone else
/// gets `None` immediately. Re-entrant calls from inside the cascade are
/// no-ops for the same reason.
pub fn dispose_owner<O: Owner>(owner: &O) -> Option<DereferenceStats> {
    let state = owner.dispose_state();
    if !state.try_begin() {
        tracing::trace!(owner = Owner::type_name(owner), "already disposed");
        return None;
    }

    let resources = owner.tracked_resources();
    let span = DisposeSpan::new(Owner::type_name(owner), resources.map_or(0, |r| r.len()));
    let _entered = span.enter();

    let stats = match resources {
        Some(resources) => resources.release_all(owner),
        None => DereferenceStats::default(),
    };
    span.record_stats(&stats);

    owner.release();

    tracing::debug!(
        owner = Owner::type_name(owner),
        released = stats.released,
        cleared = stats.fields_cleared(),
        lifetime_micros = state.lifetime_micros(),
        "disposed"
    );

    Some(stats)
}

impl<O: Owner> Disposable for O {
    #[inline]
    fn is_disposed(&self) -> bool {
        self.dispose_state().is_disposed()
    }

    #[inline]
    fn dispose(&self) {
        let _ = dispose_owner(self);
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        Owner::type_name(self)
    }
}
