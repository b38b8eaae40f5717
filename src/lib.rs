/*!
A lazily constructed, process-wide shared instance.

lazy_shared provides one guarantee: a single shared value is created on first access,
every later access gets that same value, and it is never constructed twice, even when
many threads ask for it at the same moment.

# Overview

[`LazySharedInstance<T>`] holds the value. Put it in a `static`, call
[`get`](LazySharedInstance::get), and you get `&T`. The first call constructs the value;
every other call, from any thread, returns a reference to it.

```
use lazy_shared::LazySharedInstance;
use std::sync::atomic::{AtomicUsize, Ordering};

static BUILT: AtomicUsize = AtomicUsize::new(0);

struct Catalog {
    entries: Vec<&'static str>,
}

static CATALOG: LazySharedInstance<Catalog> = LazySharedInstance::new(|| {
    BUILT.fetch_add(1, Ordering::SeqCst);
    Catalog { entries: vec!["alpha", "beta"] }
});

let threads: Vec<_> = (0..8)
    .map(|_| std::thread::spawn(|| CATALOG.get().entries.len()))
    .collect();
for t in threads {
    assert_eq!(t.join().unwrap(), 2);
}
assert_eq!(BUILT.load(Ordering::SeqCst), 1);
```

# How it works

Every holder runs double-checked initialization:

1. **Fast path**: if the value is stored, return it. This is a single acquire load and
   never blocks.
2. **Slow path**: otherwise lock the holder's init guard.
3. Check again under the guard. Another thread may have finished while this one waited.
4. Still empty: run the constructor, publish the value with release ordering, unlock.

Publication goes through `std::sync::OnceLock`, so a thread that sees the value also sees
everything the constructor wrote. The crate contains no `unsafe` code.

# Fallible construction

[`FallibleSharedInstance<T, E>`] takes a constructor returning `Result<T, E>`. A failed
attempt stores nothing and the next call retries. Threads that were queued behind the
failing attempt receive its error as [`InitError::ConcurrentFailure`].

```
use lazy_shared::{FallibleSharedInstance, InitError};
use std::sync::atomic::{AtomicBool, Ordering};

static READY: AtomicBool = AtomicBool::new(false);

static SOCKET_PATH: FallibleSharedInstance<String, &'static str> =
    FallibleSharedInstance::new(|| {
        if READY.load(Ordering::SeqCst) {
            Ok("/run/app.sock".to_string())
        } else {
            Err("runtime directory not mounted")
        }
    });

assert!(matches!(SOCKET_PATH.get(), Err(InitError::Construction(_))));
READY.store(true, Ordering::SeqCst);
assert_eq!(SOCKET_PATH.get().unwrap(), "/run/app.sock");
```

# Declaring singletons

The [`shared_instance!`] macro declares holders in static storage, either as named
`static` items or as an implementation of the [`Singleton`] trait.

# Lifetime

Values held in a `static` are never dropped; Rust does not run destructors for statics.
The value stays valid until the process exits, and there is no teardown ordering between
holders. [`LazySharedInstance::take`] empties a holder you own by value, such as one
created inside a test.

# Feature Flags

- `logwise` (default) - Logs construction, construction failures and resets through the
  logwise logging framework.

# Module Organization

- [`LazySharedInstance`], [`FallibleSharedInstance`] - the holders
- [`InitError`] - construction failures
- [`InstanceState`], [`InitStats`] - lifecycle snapshots that never force construction
- [`Singleton`], [`shared_instance!`] - declaring singletons
*/
#![forbid(unsafe_code)]

mod init_cell;
mod logging;
mod shared_instance;
mod singleton;
mod stats;

pub use init_cell::InitError;
pub use shared_instance::{FallibleSharedInstance, LazySharedInstance};
pub use singleton::Singleton;
pub use stats::{InitStats, InstanceState};
