use std::sync::{Mutex, MutexGuard};

/// Take a lock even if a previous holder panicked. Every critical section in
/// this crate leaves its state consistent before it can panic, so the data
/// behind a poisoned lock is still usable.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(context, "mutex poisoned; recovering");
        poisoned.into_inner()
    })
}
