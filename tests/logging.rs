//! Lifecycle events reach logwise's global loggers.
#![cfg(feature = "logwise")]

use lazy_shared::FallibleSharedInstance;
use logwise::{LogRecord, Logger};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Keeps every finished record as text.
#[derive(Debug, Default)]
struct CapturingLogger {
    records: Mutex<Vec<String>>,
}

impl Logger for CapturingLogger {
    fn finish_log_record(&self, record: LogRecord) {
        self.records.lock().unwrap().push(record.to_string());
    }

    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>> {
        Box::pin(async move { self.finish_log_record(record) })
    }

    fn prepare_to_die(&self) {}
}

#[test]
fn failed_and_successful_constructions_are_logged() {
    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
    static HOLDER: FallibleSharedInstance<u8, &'static str> = FallibleSharedInstance::new(|| {
        if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
            Err("cold start")
        } else {
            Ok(1)
        }
    });

    let logger = Arc::new(CapturingLogger::default());
    logwise::add_global_logger(logger.clone());

    assert!(HOLDER.get().is_err());
    assert_eq!(*HOLDER.get().unwrap(), 1);

    let records = logger.records.lock().unwrap();
    assert!(
        records
            .iter()
            .any(|r| r.contains("lazy_shared: constructing") && r.contains("failed on attempt")),
        "no failure record in {records:?}"
    );
    assert!(
        records.iter().any(|r| r.contains("lazy_shared: constructed")),
        "no construction record in {records:?}"
    );
}
