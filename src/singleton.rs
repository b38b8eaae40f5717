//! Declaring process-wide singletons.
//!
//! A singleton needs exactly one holder, and that holder must itself be unique. Putting
//! the holder in a `static` settles both. [`shared_instance!`](crate::shared_instance)
//! writes that `static` for you, either as a named item or hidden inside a
//! [`Singleton::instance`] implementation.

/// A type with one process-wide instance, reachable through [`instance`](Self::instance).
///
/// Implement it with [`shared_instance!`](crate::shared_instance), which backs the
/// instance with a [`LazySharedInstance`](crate::LazySharedInstance) in static storage.
///
/// # Examples
///
/// ```
/// use lazy_shared::{shared_instance, Singleton};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct RequestIds {
///     next: AtomicU64,
/// }
///
/// shared_instance! {
///     impl Singleton for RequestIds = RequestIds { next: AtomicU64::new(1) };
/// }
///
/// let a = RequestIds::instance().next.fetch_add(1, Ordering::Relaxed);
/// let b = RequestIds::instance().next.fetch_add(1, Ordering::Relaxed);
/// assert_eq!((a, b), (1, 2));
/// assert!(std::ptr::eq(RequestIds::instance(), RequestIds::instance()));
/// ```
pub trait Singleton: Sync + 'static {
    /// Returns the one instance, constructing it on first call.
    fn instance() -> &'static Self;
}

/// Declares lazily constructed shared instances in static storage.
///
/// Two forms are accepted.
///
/// A named `static` holding a [`LazySharedInstance`](crate::LazySharedInstance), which
/// derefs to the value:
///
/// ```
/// use lazy_shared::shared_instance;
///
/// shared_instance! {
///     /// Words nobody may use as an identifier.
///     pub static RESERVED: Vec<&'static str> = vec!["fn", "let", "match"];
///     static EMPTY: String = String::new();
/// }
///
/// assert!(RESERVED.contains(&"let"));
/// assert!(EMPTY.is_empty());
/// ```
///
/// An implementation of [`Singleton`](crate::Singleton) for a type, whose holder is a
/// `static` private to the generated `instance` function:
///
/// ```
/// use lazy_shared::{shared_instance, Singleton};
///
/// struct Clock {
///     epoch: u64,
/// }
///
/// shared_instance! {
///     impl Singleton for Clock = Clock { epoch: 1_700_000_000 };
/// }
///
/// assert_eq!(Clock::instance().epoch, 1_700_000_000);
/// ```
#[macro_export]
macro_rules! shared_instance {
    (impl Singleton for $ty:ty = $init:expr;) => {
        impl $crate::Singleton for $ty {
            fn instance() -> &'static Self {
                static INSTANCE: $crate::LazySharedInstance<$ty> =
                    $crate::LazySharedInstance::new(|| $init);
                INSTANCE.get()
            }
        }
    };
    ($($(#[$meta:meta])* $vis:vis static $name:ident : $ty:ty = $init:expr;)+) => {
        $(
            $(#[$meta])*
            $vis static $name: $crate::LazySharedInstance<$ty> =
                $crate::LazySharedInstance::new(|| $init);
        )+
    };
}
