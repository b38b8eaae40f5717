//! Point-in-time views of a holder's lifecycle.
//!
//! These types never force construction. They exist so an embedding program can report
//! whether its shared instances have been built yet, and how many attempts it took,
//! without touching the values themselves. Both serialize with serde for that purpose.

/// Where a holder is in its lifecycle.
///
/// Transitions are `Empty -> Constructing -> Ready`, or `Constructing -> Empty` when a
/// construction attempt fails. `Ready` is permanent for a holder in static storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceState {
    /// No value is stored and no thread is constructing one.
    Empty,
    /// A thread is currently running the constructor.
    Constructing,
    /// The shared value is stored.
    Ready,
}

/// Snapshot of a holder's state and construction history.
///
/// # Examples
///
/// ```
/// use lazy_shared::{InstanceState, LazySharedInstance};
///
/// static GREETING: LazySharedInstance<String> = LazySharedInstance::new(|| "hello".into());
///
/// assert_eq!(GREETING.stats().state(), InstanceState::Empty);
/// GREETING.get();
/// let stats = GREETING.stats();
/// assert!(stats.is_ready());
/// assert_eq!(stats.attempts(), 1);
/// assert_eq!(stats.failures(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitStats {
    state: InstanceState,
    attempts: usize,
    failures: usize,
}

impl InitStats {
    pub(crate) fn new(state: InstanceState, attempts: usize, failures: usize) -> Self {
        InitStats {
            state,
            attempts,
            failures,
        }
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Number of times the constructor has been started.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Number of construction attempts that returned an error.
    ///
    /// A constructor that panics is counted in [`attempts`](Self::attempts) but not here.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn is_ready(&self) -> bool {
        self.state == InstanceState::Ready
    }
}
