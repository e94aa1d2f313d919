/*!
 * Invocation Guards
 *
 * Refuse, or turn into no-ops, operations on a disposed owner
 */

use super::traits::{Disposable, Tracked};
use crate::core::errors::DisposedError;
use crate::core::types::DisposeResult;
use futures::future::{self, Either, FutureExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// How a guarded operation reacts once its owner is disposed
///
/// - `is_async`: refusal is a failed future; `err` is ignored
/// - `err`: refusal is a synchronous `Err(DisposedError)`
/// - neither: refusal is a silent no-op
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectConfig {
    pub err: bool,
    pub is_async: bool,
}

impl ProtectConfig {
    /// Silently skip the operation
    pub const fn silent() -> Self {
        Self {
            err: false,
            is_async: false,
        }
    }

    /// Fail with `DisposedError`
    pub const fn raise() -> Self {
        Self {
            err: true,
            is_async: false,
        }
    }

    /// Fail the returned future with `DisposedError`
    pub const fn asynchronous() -> Self {
        Self {
            err: false,
            is_async: true,
        }
    }

    /// Check if a refusal surfaces as an error
    #[inline]
    pub fn refuses_with_error(&self) -> bool {
        self.is_async || self.err
    }
}

/// Check if calls on `owner` must be refused
///
/// Owners that do not take part in the protocol are never disposed.
#[inline]
pub fn is_refused<O: Tracked + ?Sized>(owner: &O) -> bool {
    disposed_owner(owner).is_some()
}

/// The owner's disposable view, if it is disposed
#[inline]
fn disposed_owner<O: Tracked + ?Sized>(owner: &O) -> Option<&dyn Disposable> {
    owner
        .as_disposable()
        .filter(|disposable| disposable.is_disposed())
}

fn refusal(owner: &dyn Disposable) -> DisposedError {
    let err = DisposedError::new(owner.type_name());
    log::debug!("Refused call on disposed {}", err.type_name);
    err
}

/// Fail with `DisposedError` if `owner` is disposed
///
/// For the top of a method body: `ensure_active(self)?;`
#[inline]
pub fn ensure_active<O: Tracked + ?Sized>(owner: &O) -> DisposeResult<()> {
    match disposed_owner(owner) {
        Some(disposed) => Err(refusal(disposed)),
        None => Ok(()),
    }
}

/// Run `op` unless `owner` is disposed, silently skipping it otherwise
pub fn protect<O, R, F>(owner: &O, op: F) -> Option<R>
where
    O: Tracked + ?Sized,
    F: FnOnce() -> R,
{
    match disposed_owner(owner) {
        Some(disposed) => {
            log::debug!("Skipped call on disposed {}", disposed.type_name());
            None
        }
        None => Some(op()),
    }
}

/// Run `op` unless `owner` is disposed, failing with `DisposedError` otherwise
pub fn protect_or_err<O, R, F>(owner: &O, op: F) -> DisposeResult<R>
where
    O: Tracked + ?Sized,
    F: FnOnce() -> R,
{
    ensure_active(owner)?;
    Ok(op())
}

/// Start the async operation `op` unless `owner` is disposed
///
/// The disposed check happens at call time. A refused call returns an
/// already failed future and `op` is never invoked.
pub fn protect_async<O, F, Fut>(owner: &O, op: F) -> impl Future<Output = DisposeResult<Fut::Output>>
where
    O: Tracked + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future,
{
    match disposed_owner(owner) {
        Some(disposed) => Either::Left(future::ready(Err(refusal(disposed)))),
        None => Either::Right(op().map(Ok::<Fut::Output, DisposedError>)),
    }
}

/// Run `op` under a guard configuration
///
/// - `Ok(Some(r))`: the operation ran
/// - `Ok(None)`: refused silently
/// - `Err(_)`: refused with an error (`err` or `is_async` set)
pub fn invoke<O, R, F>(owner: &O, config: ProtectConfig, op: F) -> DisposeResult<Option<R>>
where
    O: Tracked + ?Sized,
    F: FnOnce() -> R,
{
    let Some(disposed) = disposed_owner(owner) else {
        return Ok(Some(op()));
    };

    if config.refuses_with_error() {
        Err(refusal(disposed))
    } else {
        log::debug!("Skipped call on disposed {}", disposed.type_name());
        Ok(None)
    }
}

/// An operation bound to its owner and guarded against use after disposal
///
/// # Example
///
/// ```ignore
/// let exec = Protected::new(session.clone(), |s: &Session, cmd: &str| s.run(cmd))
///     .with_config(ProtectConfig::raise());
///
/// exec.invoke("ls")?;
/// session.dispose();
/// assert!(exec.invoke("ls").is_err());
/// ```
pub struct Protected<O: ?Sized, F> {
    owner: Arc<O>,
    op: F,
    config: ProtectConfig,
}

impl<O: Tracked + ?Sized, F> Protected<O, F> {
    /// Guard `op`, silently skipping it once `owner` is disposed
    pub fn new(owner: Arc<O>, op: F) -> Self {
        Self {
            owner,
            op,
            config: ProtectConfig::silent(),
        }
    }

    /// Set the refusal behavior
    pub fn with_config(mut self, config: ProtectConfig) -> Self {
        self.config = config;
        self
    }

    /// The guarded owner
    pub fn owner(&self) -> &Arc<O> {
        &self.owner
    }

    /// Current refusal behavior
    pub fn config(&self) -> ProtectConfig {
        self.config
    }

    /// Check if the next call would be refused
    pub fn is_refused(&self) -> bool {
        is_refused(&*self.owner)
    }

    /// Invoke the operation with `args`
    pub fn invoke<A, R>(&self, args: A) -> DisposeResult<Option<R>>
    where
        F: Fn(&O, A) -> R,
    {
        invoke(&*self.owner, self.config, || (self.op)(&*self.owner, args))
    }

    /// Invoke the async operation with `args`
    ///
    /// Refusals are always failed futures, whatever the configuration.
    pub fn invoke_async<A, Fut>(&self, args: A) -> impl Future<Output = DisposeResult<Fut::Output>>
    where
        F: Fn(&O, A) -> Fut,
        Fut: Future,
    {
        match disposed_owner(&*self.owner) {
            Some(disposed) => Either::Left(future::ready(Err(refusal(disposed)))),
            None => {
                Either::Right((self.op)(&*self.owner, args).map(Ok::<Fut::Output, DisposedError>))
            }
        }
    }
}
