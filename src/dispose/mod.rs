/*!
 * Disposal Engine
 *
 * Exactly-once disposal with recursive release of owned resources.
 *
 * ## Design Principles
 *
 * 1. **Exactly Once**: A single atomic flip decides which caller runs release logic
 * 2. **Ordered**: Tracked resources release in registration order, then owner logic
 * 3. **Typed Registration**: Field accessors and release strategies are checked at compile time
 * 4. **Lenient Cleanup**: Absent or already released resources are skipped, never reported as failures
 * 5. **Guarded Use**: Operations on a disposed owner are refused or become no-ops
 *
 * ## Pieces
 *
 * - **ReleaseAction / ReadinessCheck**: How one resource is released
 * - **ResourceEntry**: One tracked field plus its release strategy
 * - **dereference**: Walks entries in order, releasing and clearing each
 * - **DisposeState / Owner**: The `Active -> Disposed` state machine
 * - **protect / Protected**: Invocation guards
 *
 * ## Example
 *
 * ```rust
 * use disposal_kernel::dispose::*;
 * use std::sync::OnceLock;
 *
 * struct Session {
 *     state: DisposeState,
 *     name: Slot<String>,
 * }
 *
 * impl Owner for Session {
 *     fn dispose_state(&self) -> &DisposeState {
 *         &self.state
 *     }
 *
 *     fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
 *         static TRACKED: OnceLock<TrackedResources<Session>> = OnceLock::new();
 *         Some(TRACKED.get_or_init(|| {
 *             TrackedResources::<Session>::builder().plain("name", |s| &s.name).build()
 *         }))
 *     }
 * }
 *
 * let session = Session { state: DisposeState::new(), name: Slot::new("x".into()) };
 * session.dispose();
 * assert!(session.is_disposed());
 * assert!(session.name.is_absent());
 * ```
 */

mod dereference;
mod entry;
mod guard;
mod resources;
mod slot;
mod state;
mod strategy;
mod traits;

pub use dereference::{dereference, DereferenceStats};
pub use entry::{EntryKind, EntryOutcome, ResourceEntry};
pub use guard::{
    ensure_active, invoke, is_refused, protect, protect_async, protect_or_err, ProtectConfig,
    Protected,
};
pub use resources::{TrackedResources, TrackedResourcesBuilder};
pub use slot::Slot;
pub use state::{dispose_owner, DisposeState, Owner};
pub use strategy::{MethodTable, ReadinessCheck, ReleaseAction};
pub use traits::{dispose_all, dispose_if_disposable, is_disposable, Disposable, Tracked};
