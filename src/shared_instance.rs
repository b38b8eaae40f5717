//! The holders: [`LazySharedInstance`] for constructors that cannot fail, and
//! [`FallibleSharedInstance`] for constructors that can.
//!
//! Both are meant to live in a `static`. The constructor is a plain function pointer so
//! the holder can be built in a `const` context; non-capturing closures coerce to it.
//!
//! Neither holder implements `Clone` or `Copy`, a `static` cannot be moved out of, and
//! `get()` hands out `&T`, so the one stored value is the only one that can exist.
//!
//! ```compile_fail
//! use lazy_shared::LazySharedInstance;
//!
//! fn assert_clone<C: Clone>() {}
//! // the holder itself is never `Clone`, even when the value is
//! assert_clone::<LazySharedInstance<u8>>();
//! ```
//!
//! ```compile_fail
//! use lazy_shared::FallibleSharedInstance;
//!
//! fn assert_clone<C: Clone>() {}
//! assert_clone::<FallibleSharedInstance<u8, String>>();
//! ```
//!
//! ```compile_fail
//! use lazy_shared::LazySharedInstance;
//!
//! struct Registry;
//! static REGISTRY: LazySharedInstance<Registry> = LazySharedInstance::new(|| Registry);
//! let owned: Registry = *REGISTRY.get();
//! ```
//!
//! ```compile_fail
//! use lazy_shared::LazySharedInstance;
//!
//! struct Registry;
//! static REGISTRY: LazySharedInstance<Registry> = LazySharedInstance::new(|| Registry);
//! REGISTRY.take();
//! ```

use std::convert::Infallible;
use std::fmt;
use std::ops::Deref;

use crate::init_cell::{InitCell, InitError};
use crate::stats::{InitStats, InstanceState};

/// A lazily constructed value shared by every caller.
///
/// The constructor runs on the first call to [`get`](Self::get), exactly once, no matter
/// how many threads call `get` at the same moment. Every call returns a reference to the
/// same value.
///
/// # Teardown
///
/// Rust does not run destructors for `static` items, so a value held in a `static`
/// holder is never dropped. It stays valid until the process exits and there is no
/// ordering between the destructors of different holders to worry about. A holder that
/// is not `static` drops its value with itself, like any other owned field.
///
/// # Examples
///
/// ```
/// use lazy_shared::LazySharedInstance;
/// use std::collections::HashMap;
///
/// static UNITS: LazySharedInstance<HashMap<&'static str, u32>> = LazySharedInstance::new(|| {
///     HashMap::from([("kb", 1_000), ("mb", 1_000_000)])
/// });
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| std::thread::spawn(|| UNITS.get() as *const _ as usize))
///     .collect();
/// let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
/// assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
///
/// // `Deref` goes through `get`.
/// assert_eq!(UNITS["mb"], 1_000_000);
/// ```
pub struct LazySharedInstance<T> {
    cell: InitCell<T, Infallible>,
    init: fn() -> T,
}

impl<T> LazySharedInstance<T> {
    /// Creates an empty holder that will construct its value with `init`.
    pub const fn new(init: fn() -> T) -> Self {
        LazySharedInstance {
            cell: InitCell::new(),
            init,
        }
    }

    /// Returns the shared value, constructing it first if no call has yet.
    ///
    /// Once the value exists this never blocks. While another thread is constructing it,
    /// this waits for that construction to finish and returns its result.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the constructor. The holder stays empty in that case and
    /// a later call runs the constructor again. Calling `get` on the same holder from
    /// inside its own constructor deadlocks or panics.
    pub fn get(&self) -> &T {
        let init = self.init;
        match self.cell.get_or_try_init(|| Ok(init())) {
            Ok(value) => value,
            Err(e) => match *e.cause() {},
        }
    }

    /// Returns the shared value if it has been constructed, without constructing it.
    ///
    /// ```
    /// use lazy_shared::LazySharedInstance;
    ///
    /// static ID: LazySharedInstance<u64> = LazySharedInstance::new(|| 42);
    /// assert_eq!(ID.get_if_initialized(), None);
    /// ID.get();
    /// assert_eq!(ID.get_if_initialized(), Some(&42));
    /// ```
    pub fn get_if_initialized(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn state(&self) -> InstanceState {
        self.cell.state()
    }

    pub fn stats(&self) -> InitStats {
        self.cell.stats()
    }

    /// Empties the holder, returning the value it held.
    ///
    /// The next [`get`](Self::get) constructs a new value. This takes `&mut self`, so it
    /// can never run concurrently with `get`, and it cannot be called on a `static`.
    /// It exists for holders owned by tests and other short-lived scopes.
    ///
    /// ```
    /// use lazy_shared::LazySharedInstance;
    ///
    /// let mut holder = LazySharedInstance::new(|| vec![1, 2, 3]);
    /// assert_eq!(holder.take(), None);
    /// holder.get();
    /// assert_eq!(holder.take(), Some(vec![1, 2, 3]));
    /// assert!(!holder.is_initialized());
    /// ```
    pub fn take(&mut self) -> Option<T> {
        self.cell.take()
    }
}

impl<T: Default> LazySharedInstance<T> {
    /// Creates an empty holder that will construct its value with `T::default()`.
    ///
    /// ```
    /// use lazy_shared::LazySharedInstance;
    /// use std::sync::Mutex;
    ///
    /// static LOG: LazySharedInstance<Mutex<Vec<String>>> = LazySharedInstance::with_default();
    /// LOG.lock().unwrap().push("started".into());
    /// assert_eq!(LOG.lock().unwrap().len(), 1);
    /// ```
    pub const fn with_default() -> Self {
        Self::new(T::default)
    }
}

impl<T: Default> Default for LazySharedInstance<T> {
    fn default() -> Self {
        Self::with_default()
    }
}

impl<T> Deref for LazySharedInstance<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySharedInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySharedInstance")
            .field("state", &self.cell.state())
            .field("value", &self.cell.get())
            .finish()
    }
}

/// A lazily constructed shared value whose constructor can fail.
///
/// Behaves like [`LazySharedInstance`], except that [`get`](Self::get) returns the
/// constructor's error instead of a value when construction fails. A failed attempt
/// stores nothing; the next call tries again.
///
/// Threads that were waiting for an attempt that failed receive the same error, as
/// [`InitError::ConcurrentFailure`]. They do not retry on the failing thread's behalf.
///
/// # Examples
///
/// ```
/// use lazy_shared::FallibleSharedInstance;
///
/// fn read_limit() -> Result<usize, std::num::ParseIntError> {
///     "64".parse()
/// }
///
/// static LIMIT: FallibleSharedInstance<usize, std::num::ParseIntError> =
///     FallibleSharedInstance::new(read_limit);
///
/// assert_eq!(*LIMIT.get().unwrap(), 64);
/// ```
pub struct FallibleSharedInstance<T, E> {
    cell: InitCell<T, E>,
    init: fn() -> Result<T, E>,
}

impl<T, E> FallibleSharedInstance<T, E> {
    /// Creates an empty holder that will construct its value with `init`.
    pub const fn new(init: fn() -> Result<T, E>) -> Self {
        FallibleSharedInstance {
            cell: InitCell::new(),
            init,
        }
    }

    /// Returns the shared value, constructing it first if no call has succeeded yet.
    ///
    /// # Errors
    ///
    /// - [`InitError::Construction`] if this call ran the constructor and it failed.
    /// - [`InitError::ConcurrentFailure`] if this call waited on another thread's
    ///   construction and that failed.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the constructor, leaving the holder empty.
    pub fn get(&self) -> Result<&T, InitError<E>> {
        self.cell.get_or_try_init(self.init)
    }

    /// Returns the shared value if it has been constructed, without constructing it.
    pub fn get_if_initialized(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn state(&self) -> InstanceState {
        self.cell.state()
    }

    pub fn stats(&self) -> InitStats {
        self.cell.stats()
    }

    /// Empties the holder and forgets its failure history, returning the value it held.
    ///
    /// See [`LazySharedInstance::take`].
    pub fn take(&mut self) -> Option<T> {
        self.cell.take()
    }
}

impl<T: fmt::Debug, E> fmt::Debug for FallibleSharedInstance<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallibleSharedInstance")
            .field("state", &self.cell.state())
            .field("value", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_call_returns_same_reference_without_constructing() {
        static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
        static HOLDER: LazySharedInstance<Vec<u8>> = LazySharedInstance::new(|| {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        });

        let first: *const Vec<u8> = HOLDER.get();
        let second: *const Vec<u8> = HOLDER.get();
        assert_eq!(first, second);
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_does_not_construct() {
        let holder = LazySharedInstance::new(|| 5u8);
        assert_eq!(
            format!("{holder:?}"),
            "LazySharedInstance { state: Empty, value: None }"
        );
        assert!(!holder.is_initialized());
        holder.get();
        assert_eq!(
            format!("{holder:?}"),
            "LazySharedInstance { state: Ready, value: Some(5) }"
        );
    }

    #[test]
    fn default_holder_uses_default_value() {
        let holder: LazySharedInstance<String> = LazySharedInstance::default();
        assert_eq!(holder.get(), "");
        assert_eq!(holder.state(), InstanceState::Ready);
    }

    #[test]
    fn fallible_holder_reports_then_recovers() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let holder: FallibleSharedInstance<&'static str, String> =
            FallibleSharedInstance::new(|| {
                if CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("warming up".to_string())
                } else {
                    Ok("ready")
                }
            });

        let err = holder.get().unwrap_err();
        assert!(matches!(err, InitError::Construction(_)));
        assert_eq!(
            err.to_string(),
            "construction of the shared instance failed: warming up"
        );
        assert_eq!(holder.get_if_initialized(), None);

        assert_eq!(*holder.get().unwrap(), "ready");
        assert_eq!(holder.stats(), InitStats::new(InstanceState::Ready, 2, 1));
    }
}
