/*!
 * Disposal Scenario Tests
 *
 * End-to-end owner scenarios: plain fields, aliased handles, guards
 */

use disposal_kernel::dispose::*;
use disposal_kernel::DisposedError;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// External handle with a `close` method and an `is_closed` status
struct Connection {
    closes: Arc<AtomicUsize>,
    reports_closed: bool,
}

impl Connection {
    fn new(closes: Arc<AtomicUsize>, reports_closed: bool) -> Self {
        Self {
            closes,
            reports_closed,
        }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.reports_closed
    }
}

impl MethodTable for Connection {
    fn release_method(name: &str) -> Option<fn(&Self)> {
        match name {
            "close" => Some(Connection::close),
            _ => None,
        }
    }

    fn status_method(name: &str) -> Option<fn(&Self) -> bool> {
        match name {
            "is_closed" => Some(Connection::is_closed),
            _ => None,
        }
    }
}

struct NamedFixture {
    state: DisposeState,
    name: Slot<String>,
    age: Slot<u32>,
}

impl NamedFixture {
    fn new(name: &str, age: u32) -> Self {
        Self {
            state: DisposeState::new(),
            name: Slot::new(name.to_string()),
            age: Slot::new(age),
        }
    }
}

impl Owner for NamedFixture {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }

    fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
        static TRACKED: OnceLock<TrackedResources<NamedFixture>> = OnceLock::new();
        Some(TRACKED.get_or_init(|| {
            TrackedResources::<NamedFixture>::builder()
                .plain("name", |f| &f.name)
                .plain("age", |f| &f.age)
                .build()
        }))
    }
}

/// Owner whose connection registration is chosen per instance
struct ConnFixture {
    state: DisposeState,
    conn: Slot<Connection>,
    tracked: TrackedResources<ConnFixture>,
}

impl ConnFixture {
    fn new(conn: Connection, tracked: TrackedResources<ConnFixture>) -> Self {
        Self {
            state: DisposeState::new(),
            conn: Slot::new(conn),
            tracked,
        }
    }
}

impl Owner for ConnFixture {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }

    fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
        Some(&self.tracked)
    }
}

fn conn_resources(
    action: ReleaseAction<Connection>,
    check: ReadinessCheck<Connection>,
) -> TrackedResources<ConnFixture> {
    TrackedResources::<ConnFixture>::builder()
        .aliased("conn", |f| &f.conn, action, check)
        .build()
}

#[test]
fn test_plain_fields_are_dereferenced() {
    let f = NamedFixture::new("x", 32);
    assert_eq!(f.name.get().as_deref(), Some("x"));

    f.dispose();

    assert!(f.name.is_absent());
    assert!(f.age.is_absent());
    assert!(f.is_disposed());
}

#[test]
fn test_alias_check_reports_closed_skips_close() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), true),
        conn_resources(
            ReleaseAction::method("close"),
            ReadinessCheck::method("is_closed"),
        ),
    );

    f.dispose();
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    f.dispose();
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_alias_check_reports_open_closes_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), false),
        conn_resources(
            ReleaseAction::method("close"),
            ReadinessCheck::method("is_closed"),
        ),
    );

    let stats = f.dispose_with_report().unwrap();
    assert_eq!(stats.outcome_of("conn"), Some(EntryOutcome::Released));
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    f.dispose();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_alias_close_without_check() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), true),
        conn_resources(ReleaseAction::method("close"), ReadinessCheck::AlwaysNeeded),
    );

    f.dispose();
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    f.dispose();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_function_check_skips_release() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), false),
        conn_resources(
            ReleaseAction::method("close"),
            ReadinessCheck::predicate(|_: &Connection| true),
        ),
    );

    f.dispose();
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_function_release_receives_resource() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), false),
        conn_resources(
            ReleaseAction::call(|conn: &Connection| conn.close()),
            ReadinessCheck::AlwaysNeeded,
        ),
    );

    f.dispose();
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    f.dispose();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unresolved_release_is_skipped_and_cleared() {
    let closes = Arc::new(AtomicUsize::new(0));
    let f = ConnFixture::new(
        Connection::new(closes.clone(), false),
        conn_resources(
            ReleaseAction::method("shutdown"),
            ReadinessCheck::method("is_closed"),
        ),
    );

    let stats = f.dispose_with_report().unwrap();
    assert_eq!(stats.unresolved, 1);
    assert!(f.conn.is_absent());
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

struct Counter {
    state: DisposeState,
    calls: Arc<AtomicUsize>,
}

impl Owner for Counter {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }
}

impl Counter {
    fn exec(&self) -> disposal_kernel::DisposeResult<()> {
        protect_or_err(self, || {
            self.calls.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[test]
fn test_guarded_exec_raises_after_dispose() {
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Counter {
        state: DisposeState::new(),
        calls: calls.clone(),
    };

    assert!(f.exec().is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    f.dispose();

    assert_eq!(f.exec(), Err(DisposedError::new("Counter")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Disposable resource shared with the test body
struct Resource {
    state: DisposeState,
    calls: Arc<AtomicUsize>,
}

impl Resource {
    fn call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Owner for Resource {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }
}

struct Service {
    state: DisposeState,
    res: Slot<Arc<Resource>>,
    released: AtomicBool,
}

impl Service {
    fn exec(&self) {
        protect(self, || self.res.map(|r| r.call()));
    }
}

impl Owner for Service {
    fn dispose_state(&self) -> &DisposeState {
        &self.state
    }

    fn tracked_resources(&self) -> Option<&TrackedResources<Self>> {
        static TRACKED: OnceLock<TrackedResources<Service>> = OnceLock::new();
        Some(TRACKED.get_or_init(|| {
            TrackedResources::<Service>::builder()
                .plain("res", |s| &s.res)
                .build()
        }))
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_owner_cascades_into_disposable_field() {
    let calls = Arc::new(AtomicUsize::new(0));
    let res = Arc::new(Resource {
        state: DisposeState::new(),
        calls: calls.clone(),
    });
    let service = Service {
        state: DisposeState::new(),
        res: Slot::new(res.clone()),
        released: AtomicBool::new(false),
    };

    service.exec();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    service.dispose();

    // silent guard: no panic, no call
    service.exec();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(service.res.is_absent());
    assert!(res.is_disposed());
    assert!(service.released.load(Ordering::SeqCst));
}
