/*!
 * Dereference Algorithm Tests
 *
 * External handles mocked with mockall, fallback dereferencing of plain
 * aggregates, and the unresolved-release policy
 */

use disposal_kernel::config::{self, DisposeConfig, UnresolvedPolicy};
use disposal_kernel::dispose::*;
use mockall::automock;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

#[automock]
trait Handle {
    fn close(&self);
    fn is_closed(&self) -> bool;
}

impl MethodTable for MockHandle {
    fn release_method(name: &str) -> Option<fn(&Self)> {
        match name {
            "close" => Some(|h: &MockHandle| h.close()),
            _ => None,
        }
    }

    fn status_method(name: &str) -> Option<fn(&Self) -> bool> {
        match name {
            "is_closed" => Some(|h: &MockHandle| h.is_closed()),
            _ => None,
        }
    }
}

struct Pool {
    handle: Slot<MockHandle>,
}

fn handle_entries() -> Vec<ResourceEntry<Pool>> {
    vec![ResourceEntry::aliased(
        "handle",
        |p: &Pool| &p.handle,
        ReleaseAction::method("close"),
        ReadinessCheck::method("is_closed"),
    )]
}

#[test]
fn test_closed_handle_is_not_closed_again() {
    let mut handle = MockHandle::new();
    handle.expect_is_closed().times(1).return_const(true);
    handle.expect_close().never();

    let pool = Pool {
        handle: Slot::new(handle),
    };

    let stats = dereference(&pool, &handle_entries());
    assert_eq!(stats.outcome_of("handle"), Some(EntryOutcome::AlreadyReleased));
    assert!(pool.handle.is_absent());
}

#[test]
fn test_open_handle_is_closed_once() {
    let mut handle = MockHandle::new();
    handle.expect_is_closed().times(1).return_const(false);
    handle.expect_close().times(1).return_const(());

    let pool = Pool {
        handle: Slot::new(handle),
    };
    let entries = handle_entries();

    let first = dereference(&pool, &entries);
    assert_eq!(first.released, 1);
    assert!(pool.handle.is_absent());

    let second = dereference(&pool, &entries);
    assert_eq!(second.absent, 1);
    assert_eq!(second.released, 0);
}

/// Aggregate that is not disposable but knows how to drop its own fields
struct Bag {
    label: Slot<String>,
    child: Slot<Arc<Leaf>>,
}

impl Tracked for Bag {
    fn dereference_fields(&self) {
        static FIELDS: OnceLock<TrackedResources<Bag>> = OnceLock::new();
        FIELDS
            .get_or_init(|| {
                TrackedResources::<Bag>::builder()
                    .plain("label", |b| &b.label)
                    .plain("child", |b| &b.child)
                    .build()
            })
            .release_all(self);
    }
}

struct Leaf {
    state: DisposeState,
    releases: AtomicUsize,
}

impl Owner for Leaf {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn leaf() -> Arc<Leaf> {
    Arc::new(Leaf {
        state: DisposeState::new(),
        releases: AtomicUsize::new(0),
    })
}

#[test]
fn test_fallback_dereference_of_plain_aggregate() {
    let child = leaf();
    let bag = Bag {
        label: Slot::new("bag".into()),
        child: Slot::new(child.clone()),
    };

    assert!(!is_disposable(&bag));

    dispose_if_disposable(&bag, false);
    assert!(bag.label.is_present());

    dispose_if_disposable(&bag, true);
    assert!(bag.label.is_absent());
    assert!(bag.child.is_absent());
    assert!(child.is_disposed());
    assert_eq!(child.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dispose_if_disposable_skips_disposed() {
    let child = leaf();
    child.dispose();

    dispose_if_disposable(&child, true);
    assert_eq!(child.releases.load(Ordering::SeqCst), 1);
}

struct Tagged {
    tag: Slot<u64>,
}

fn unresolved_entries() -> Vec<ResourceEntry<Tagged>> {
    vec![ResourceEntry::with_release(
        "tag",
        |t: &Tagged| &t.tag,
        ReleaseAction::Method {
            name: "free",
            op: None,
        },
    )]
}

#[test]
#[serial]
fn test_unresolved_release_lenient_by_default() {
    config::reset();
    assert_eq!(config::current().unresolved_release, UnresolvedPolicy::Ignore);

    let tagged = Tagged { tag: Slot::new(7) };
    let stats = dereference(&tagged, &unresolved_entries());

    assert_eq!(stats.outcome_of("tag"), Some(EntryOutcome::Unresolved));
    assert!(tagged.tag.is_absent());
}

#[test]
#[serial]
fn test_unresolved_release_warns_under_strict_config() {
    config::install(DisposeConfig::strict());

    let tagged = Tagged { tag: Slot::new(7) };
    let stats = dereference(&tagged, &unresolved_entries());

    // still non-fatal: cleared, counted, never an error
    assert_eq!(stats.unresolved, 1);
    assert!(tagged.tag.is_absent());

    config::reset();
}

#[test]
#[serial]
fn test_unresolved_policy_from_environment() {
    std::env::set_var(config::ENV_UNRESOLVED_RELEASE, "warn");
    config::reset();
    assert_eq!(config::current().unresolved_release, UnresolvedPolicy::Warn);

    // invalid values fall back to defaults instead of failing
    std::env::set_var(config::ENV_UNRESOLVED_RELEASE, "loud");
    config::reset();
    assert_eq!(config::current().unresolved_release, UnresolvedPolicy::Ignore);

    std::env::remove_var(config::ENV_UNRESOLVED_RELEASE);
    config::reset();
    assert_eq!(config::current().unresolved_release, UnresolvedPolicy::Ignore);
}

struct Settings {
    retries: u32,
}

struct Client {
    state: DisposeState,
    settings: Slot<Arc<Settings>>,
    peer: Slot<Option<Arc<Leaf>>>,
}

impl Owner for Client {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }

    fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
        static TRACKED: OnceLock<TrackedResources<Client>> = OnceLock::new();
        Some(TRACKED.get_or_init(|| {
            TrackedResources::<Client>::builder()
                .field("settings", |c| &c.settings)
                .plain("peer", |c| &c.peer)
                .build()
        }))
    }
}

#[test]
fn test_shared_settings_cleared_without_release() {
    let settings = Arc::new(Settings { retries: 3 });
    let peer = leaf();
    let client = Client {
        state: DisposeState::new(),
        settings: Slot::new(settings.clone()),
        peer: Slot::new(Some(peer.clone())),
    };

    let stats = client.dispose_with_report().unwrap();

    assert_eq!(stats.outcome_of("settings"), Some(EntryOutcome::Cleared));
    assert_eq!(stats.outcome_of("peer"), Some(EntryOutcome::Released));
    assert!(client.settings.is_absent());
    assert_eq!(Arc::strong_count(&settings), 1);
    assert_eq!(settings.retries, 3);
    assert!(peer.is_disposed());
}
