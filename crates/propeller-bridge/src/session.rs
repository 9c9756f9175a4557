// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slot holding the listener of the current SDK session.
//
// SDK bindings keep the listener here between a launch and the callback that
// ends the session. The slot lock is never held while the listener runs.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::LOG_TARGET;
use crate::traits::SdkListener;

#[derive(Default)]
pub struct SessionSlot {
    listener: Mutex<Option<Arc<dyn SdkListener>>>,
}

impl SessionSlot {
    pub const fn new() -> Self {
        Self { listener: Mutex::new(None) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn SdkListener>>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, listener: Arc<dyn SdkListener>) {
        *self.lock() = Some(listener);
    }

    pub fn current(&self) -> Option<Arc<dyn SdkListener>> {
        self.lock().clone()
    }

    pub fn clear(&self) -> Option<Arc<dyn SdkListener>> {
        self.lock().take()
    }

    /// Clear the slot if it still holds `listener`. Returns whether it did.
    pub fn detach(&self, listener: &Arc<dyn SdkListener>) -> bool {
        let mut slot = self.lock();
        let ours = slot
            .as_ref()
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(listener)));
        if ours {
            slot.take();
        }
        ours
    }

    /// Run `f` against the session listener, leaving it registered.
    pub fn deliver<R>(&self, what: &'static str, f: impl FnOnce(&dyn SdkListener) -> R) -> Option<R> {
        Self::run(what, self.current(), f)
    }

    /// Run `f` for a callback that ends the session. The listener is removed
    /// first, so a relaunch from inside `f` registers a fresh one.
    pub fn finish<R>(&self, what: &'static str, f: impl FnOnce(&dyn SdkListener) -> R) -> Option<R> {
        Self::run(what, self.clear(), f)
    }

    fn run<R>(
        what: &'static str,
        listener: Option<Arc<dyn SdkListener>>,
        f: impl FnOnce(&dyn SdkListener) -> R,
    ) -> Option<R> {
        match listener {
            Some(listener) => Some(f(&*listener)),
            None => {
                trace!(target: LOG_TARGET, what, "no session listener, dropping SDK upcall");
                None
            }
        }
    }
}
