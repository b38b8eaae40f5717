//! Lifecycle logging for shared instances.
//!
//! Every log call site in the crate goes through this module. With the `logwise` feature
//! enabled, events are written through logwise; without it these functions compile to
//! nothing.
//!
//! Events are emitted only on the slow path. Once a holder is ready, `get()` logs nothing.
//!
//! # Events
//!
//! - construction won: the winning thread stored the value
//! - construction failed: the constructor returned an error, the holder is empty again
//! - waiter observed failure: a queued thread is reporting another thread's failure
//! - reset: a holder was emptied through `take`

/// The winning thread stored the value on its `attempt`th try.
pub(crate) fn constructed<T>(attempt: usize) {
    #[cfg(feature = "logwise")]
    {
        let type_name = std::any::type_name::<T>();
        logwise::info_sync!(
            "lazy_shared: constructed {type_name} on attempt {attempt}",
            type_name=logwise::privacy::LogIt(&type_name),
            attempt=logwise::privacy::LogIt(&attempt)
        );
    }
    #[cfg(not(feature = "logwise"))]
    {
        let _ = attempt;
    }
}

pub(crate) fn construction_failed<T>(attempt: usize) {
    #[cfg(feature = "logwise")]
    {
        let type_name = std::any::type_name::<T>();
        logwise::warn_sync!(
            "lazy_shared: constructing {type_name} failed on attempt {attempt}",
            type_name=logwise::privacy::LogIt(&type_name),
            attempt=logwise::privacy::LogIt(&attempt)
        );
    }
    #[cfg(not(feature = "logwise"))]
    {
        let _ = attempt;
    }
}

pub(crate) fn waiter_observed_failure<T>() {
    #[cfg(feature = "logwise")]
    {
        let type_name = std::any::type_name::<T>();
        logwise::warn_sync!(
            "lazy_shared: waited on {type_name} but its construction failed",
            type_name=logwise::privacy::LogIt(&type_name)
        );
    }
}

pub(crate) fn reset<T>() {
    #[cfg(feature = "logwise")]
    {
        let type_name = std::any::type_name::<T>();
        logwise::info_sync!(
            "lazy_shared: reset {type_name}",
            type_name=logwise::privacy::LogIt(&type_name)
        );
    }
}
