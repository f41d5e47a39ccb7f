//! One-shot dispatch of operations and their joint cancellation.
//!
//! # Design
//! A [`Session`] is the lifetime scope of a screen (or any other owner): it
//! runs each submitted operation once on a [`Dispatcher`] worker, delivers
//! the outcome to a callback at most once, and cancels everything still in
//! flight when it is told to or dropped. A failed delivery carries a
//! [`Retry`] handle that resubmits the same operation and callback, so the
//! presentation layer can offer "try again" without knowing what it was.
//!
//! Operations are blocking (see [`Transport`](crate::transport::Transport)),
//! so they run under `spawn_blocking` on tokio runtime handles.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::error::ApiError;

/// Priority class an operation is dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    UserInitiated,
    Background,
}

/// Shared cancellation flag for one operation invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runtime handles that operations are dispatched onto, per priority.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    user_initiated: Handle,
    background: Handle,
}

impl Dispatcher {
    /// Run every priority class on `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            user_initiated: handle.clone(),
            background: handle,
        }
    }

    /// Route background-priority work to its own runtime.
    pub fn with_background(mut self, handle: Handle) -> Self {
        self.background = handle;
        self
    }

    fn handle(&self, priority: Priority) -> &Handle {
        match priority {
            Priority::UserInitiated => &self.user_initiated,
            Priority::Background => &self.background,
        }
    }
}

type Job<T> = Arc<dyn Fn(&CancelToken) -> Result<T, ApiError> + Send + Sync>;
type Callback<T> = Arc<dyn Fn(Result<T, Failure>) + Send + Sync>;

/// A failed operation together with the means to run it again.
pub struct Failure {
    pub error: ApiError,
    pub retry: Retry,
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Zero-argument thunk that resubmits a failed operation with the same
/// arguments and callback into the session it came from.
#[derive(Clone)]
pub struct Retry {
    resubmit: Arc<dyn Fn() -> Option<CancelToken> + Send + Sync>,
}

impl Retry {
    /// Resubmit the operation. Returns `None` once the owning session is
    /// gone or closed.
    pub fn retry(&self) -> Option<CancelToken> {
        (self.resubmit)()
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Retry")
    }
}

struct SessionInner {
    dispatcher: Dispatcher,
    in_flight: Mutex<HashMap<u64, CancelToken>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Owns a group of in-flight operations.
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                dispatcher,
                in_flight: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Run `job` once at `priority` and deliver its outcome to
    /// `on_complete`, unless the returned token is cancelled first.
    pub fn submit<T, F, C>(&self, priority: Priority, job: F, on_complete: C) -> CancelToken
    where
        T: Send + 'static,
        F: Fn(&CancelToken) -> Result<T, ApiError> + Send + Sync + 'static,
        C: Fn(Result<T, Failure>) + Send + Sync + 'static,
    {
        SessionInner::submit(&self.inner, priority, Arc::new(job), Arc::new(on_complete))
    }

    /// Number of operations that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.inner.lock_in_flight().len()
    }

    /// Cancel every outstanding operation. The session stays usable.
    pub fn cancel_all(&self) {
        self.inner.cancel_all(false);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.cancel_all(true);
    }
}

impl SessionInner {
    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<u64, CancelToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel everything in flight; with `close`, also refuse later submits.
    fn cancel_all(&self, close: bool) {
        let cancelled: Vec<CancelToken> = {
            let mut in_flight = self.lock_in_flight();
            if close {
                self.closed.store(true, Ordering::SeqCst);
            }
            in_flight.drain().map(|(_, token)| token).collect()
        };
        if !cancelled.is_empty() {
            debug!(count = cancelled.len(), "cancelling in-flight operations");
        }
        for token in cancelled {
            token.cancel();
        }
    }

    fn submit<T: Send + 'static>(
        this: &Arc<Self>,
        priority: Priority,
        job: Job<T>,
        callback: Callback<T>,
    ) -> CancelToken {
        let token = CancelToken::new();
        let id = this.next_id.fetch_add(1, Ordering::Relaxed);
        {
            // `closed` only changes while this lock is held
            let mut in_flight = this.lock_in_flight();
            if this.closed.load(Ordering::SeqCst) {
                token.cancel();
                return token;
            }
            in_flight.insert(id, token.clone());
        }

        let session = Arc::downgrade(this);
        let task_token = token.clone();
        this.dispatcher.handle(priority).spawn_blocking(move || {
            let outcome = job(&task_token);
            if let Some(inner) = session.upgrade() {
                inner.lock_in_flight().remove(&id);
            }
            if task_token.is_cancelled() {
                trace!(id, "dropping outcome of cancelled operation");
                return;
            }
            let delivered = outcome.map_err(|error| Failure {
                error,
                retry: Retry::new(session, priority, job.clone(), callback.clone()),
            });
            callback(delivered);
        });
        token
    }
}

impl Retry {
    fn new<T: Send + 'static>(
        session: Weak<SessionInner>,
        priority: Priority,
        job: Job<T>,
        callback: Callback<T>,
    ) -> Self {
        Self {
            resubmit: Arc::new(move || {
                let inner = session.upgrade()?;
                if inner.closed.load(Ordering::SeqCst) {
                    return None;
                }
                Some(SessionInner::submit(&inner, priority, job.clone(), callback.clone()))
            }),
        }
    }
}
