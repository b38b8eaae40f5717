/*!
The double-checked initialization protocol behind every holder in this crate.

`InitCell<T, E>` stores at most one `T`, constructed by the first caller that reaches it.
Callers that find the value already stored return immediately without taking any lock.
Callers that find it empty queue on a mutex (the init guard), check again once they hold
it, and only then construct.

# Internal States

- **Empty**: nothing is stored and no construction is running.
- **Constructing**: a thread holds the init guard and is running the constructor.
- **Ready**: the value is stored. Through a shared reference it never changes again.

A failed construction returns the cell to **Empty**, so the next caller may retry.

# Memory Ordering

Storage is a `std::sync::OnceLock<T>`. Publishing into it is a release operation and
`OnceLock::get` is an acquire operation, so a thread that observes **Ready** on the fast
path also observes every write the constructor made. The init guard serializes all
writers; the counters are only written while it is held.

# Failure Reporting

The most recent failure is kept inside the init guard as an `Arc<E>`. A thread that was
queued on the guard while an attempt failed receives that same error as
[`InitError::ConcurrentFailure`] instead of silently retrying on the failing thread's
behalf. A thread that arrives after the failure has been recorded starts a fresh attempt.
*/

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::logging;
use crate::stats::{InitStats, InstanceState};

/// Error returned when constructing the shared instance fails.
///
/// The constructor's error is shared between every caller that observes the failed
/// attempt, so it is carried as an `Arc<E>`.
///
/// # Examples
///
/// ```
/// use lazy_shared::{FallibleSharedInstance, InitError};
///
/// static PORT: FallibleSharedInstance<u16, String> =
///     FallibleSharedInstance::new(|| Err("no port configured".to_string()));
///
/// match PORT.get() {
///     Err(InitError::Construction(e)) => assert_eq!(*e, "no port configured"),
///     other => panic!("unexpected {other:?}"),
/// }
/// // Nothing was stored, so the next call tries again.
/// assert!(!PORT.is_initialized());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum InitError<E> {
    /// This caller ran the constructor and it failed.
    #[error("construction of the shared instance failed: {0}")]
    Construction(Arc<E>),
    /// This caller was waiting for another thread's construction, which failed.
    #[error("construction of the shared instance failed on another thread: {0}")]
    ConcurrentFailure(Arc<E>),
}

impl<E> InitError<E> {
    /// The error produced by the constructor.
    pub fn cause(&self) -> &E {
        match self {
            InitError::Construction(e) | InitError::ConcurrentFailure(e) => e,
        }
    }

    /// Consumes the error, returning the shared constructor error.
    pub fn into_cause(self) -> Arc<E> {
        match self {
            InitError::Construction(e) | InitError::ConcurrentFailure(e) => e,
        }
    }

    /// Returns `true` if the failing attempt belonged to another thread.
    pub fn is_concurrent(&self) -> bool {
        matches!(self, InitError::ConcurrentFailure(_))
    }
}

/// A cell that is written at most once, by whichever caller wins the init guard.
pub(crate) struct InitCell<T, E> {
    value: OnceLock<T>,
    /// The init guard. Holds the most recent construction failure.
    guard: Mutex<Option<Arc<E>>>,
    attempts: AtomicUsize,
    failures: AtomicUsize,
    constructing: AtomicBool,
}

impl<T, E> InitCell<T, E> {
    pub(crate) const fn new() -> Self {
        InitCell {
            value: OnceLock::new(),
            guard: Mutex::new(None),
            attempts: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            constructing: AtomicBool::new(false),
        }
    }

    /// Returns the stored value, if any. Never blocks and never constructs.
    pub(crate) fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the stored value, running `f` to construct it if the cell is empty.
    ///
    /// `f` runs at most once per call, and only while the init guard is held.
    pub(crate) fn get_or_try_init<F>(&self, f: F) -> Result<&T, InitError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        self.initialize(f)
    }

    #[cold]
    fn initialize<F>(&self, f: F) -> Result<&T, InitError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // failures recorded after this load happened while we were queued on the guard
        let failures_before = self.failures.load(Ordering::Acquire);
        // a constructor that panicked left nothing behind, so poisoning carries no information
        let mut last_failure = self.guard.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if self.failures.load(Ordering::Relaxed) != failures_before {
            if let Some(error) = last_failure.as_ref() {
                logging::waiter_observed_failure::<T>();
                return Err(InitError::ConcurrentFailure(Arc::clone(error)));
            }
        }

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        // lowered only after the value is published or the failure recorded
        let _constructing = ConstructingFlag::raise(&self.constructing);
        match f() {
            Ok(value) => {
                *last_failure = None;
                logging::constructed::<T>(attempt);
                Ok(self.value.get_or_init(|| value))
            }
            Err(error) => {
                let error = Arc::new(error);
                *last_failure = Some(Arc::clone(&error));
                self.failures.fetch_add(1, Ordering::Release);
                logging::construction_failed::<T>(attempt);
                Err(InitError::Construction(error))
            }
        }
    }

    pub(crate) fn state(&self) -> InstanceState {
        // read the flag first: a lowered flag after a success implies the value is visible
        let constructing = self.constructing.load(Ordering::Acquire);
        if self.value.get().is_some() {
            InstanceState::Ready
        } else if constructing {
            InstanceState::Constructing
        } else {
            InstanceState::Empty
        }
    }

    pub(crate) fn stats(&self) -> InitStats {
        InitStats::new(
            self.state(),
            self.attempts.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        )
    }

    /// Empties the cell and clears its history, returning the stored value.
    pub(crate) fn take(&mut self) -> Option<T> {
        *self.guard.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
        *self.attempts.get_mut() = 0;
        *self.failures.get_mut() = 0;
        let value = self.value.take();
        if value.is_some() {
            logging::reset::<T>();
        }
        value
    }
}

/// Marks the cell as constructing for as long as it lives, including during unwinding.
struct ConstructingFlag<'a>(&'a AtomicBool);

impl<'a> ConstructingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Relaxed);
        ConstructingFlag(flag)
    }
}

impl Drop for ConstructingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
