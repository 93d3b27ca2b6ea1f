//! Whether a diagnosed failure ends the tool or reaches the caller as is.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;

static SHARED: Lazy<Arc<ExitPolicy>> = Lazy::new(|| Arc::new(ExitPolicy::new()));

/// Suppression depth per thread of control.
///
/// While a thread holds at least one [`Suppression`], diagnosed failures on
/// that thread are returned as the original primitive error instead of a
/// tool exit. Other threads are unaffected.
#[derive(Debug, Default)]
pub struct ExitPolicy {
    depths: Mutex<HashMap<ThreadId, usize>>,
}

impl ExitPolicy {
    pub fn new() -> Self { Self::default() }

    /// The process-wide policy used when no other one is configured.
    pub fn shared() -> Arc<Self> { Arc::clone(&SHARED) }

    fn depths(&self) -> MutexGuard<'_, HashMap<ThreadId, usize>> {
        self.depths.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter a suppressed scope that lasts until the guard is dropped.
    pub fn suppress(&self) -> Suppression<'_> {
        let thread = thread::current().id();
        *self.depths().entry(thread).or_insert(0) += 1;
        Suppression {
            policy: self,
            thread,
            _not_send: PhantomData,
        }
    }

    /// Run `body` inside a suppressed scope.
    pub fn run_suppressed<T>(&self, body: impl FnOnce() -> T) -> T {
        let _scope = self.suppress();
        body()
    }

    /// Current suppression depth of the calling thread.
    pub fn depth(&self) -> usize {
        self.depths()
            .get(&thread::current().id())
            .copied()
            .unwrap_or(0)
    }

    pub fn should_convert_to_fatal(&self) -> bool { self.depth() == 0 }

    fn release(&self, thread: ThreadId) {
        let mut depths = self.depths();
        if let Some(depth) = depths.get_mut(&thread) {
            *depth = depth.saturating_sub(1);
            if *depth == 0 {
                depths.remove(&thread);
            }
        }
    }
}

/// Scope guard returned by [`ExitPolicy::suppress`].
///
/// Not `Send`: a scope belongs to the thread that opened it.
#[must_use = "suppression ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct Suppression<'a> {
    policy:    &'a ExitPolicy,
    thread:    ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl Drop for Suppression<'_> {
    fn drop(&mut self) { self.policy.release(self.thread); }
}
