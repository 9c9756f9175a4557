// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ownership of the native peer.
//
// Every downcall into the native core runs while holding the read side of
// the slot. Teardown takes the write side, so it waits for deliveries in
// flight, empties the slot and then calls `release_bridge_resources` once.
// Anything arriving afterwards is discarded.
//
// A teardown started from inside a downcall cannot take the write side on
// that thread. It marks the slot released and leaves the release to the
// outer delivery, which runs it once its read guard is gone.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, trace};

use crate::traits::NativeCore;

thread_local! {
    /// Slots this thread is currently delivering into, innermost last.
    static DELIVERING: RefCell<Vec<*const PeerSlot>> = const { RefCell::new(Vec::new()) };
}

/// Marks the current thread as inside a delivery for as long as it lives.
struct Delivering(*const PeerSlot);

impl Delivering {
    fn enter(slot: &PeerSlot) -> Self {
        let slot: *const PeerSlot = slot;
        DELIVERING.with_borrow_mut(|active| active.push(slot));
        Self(slot)
    }

    fn active(slot: &PeerSlot) -> bool {
        let slot: *const PeerSlot = slot;
        DELIVERING.with_borrow(|active| active.contains(&slot))
    }
}

impl Drop for Delivering {
    fn drop(&mut self) {
        DELIVERING.with_borrow_mut(|active| {
            if let Some(at) = active.iter().rposition(|slot| *slot == self.0) {
                active.remove(at);
            }
        });
    }
}

/// Slot holding the native core for as long as the bridge is attached to it.
pub struct PeerSlot {
    peer: RwLock<Option<Box<dyn NativeCore>>>,
    released: AtomicBool,
    /// Teardown was requested from inside a downcall on this slot.
    deferred: AtomicBool,
}

impl PeerSlot {
    pub fn new(peer: Box<dyn NativeCore>) -> Self {
        Self {
            peer: RwLock::new(Some(peer)),
            released: AtomicBool::new(false),
            deferred: AtomicBool::new(false),
        }
    }

    /// Run `f` against the native core unless teardown already happened.
    ///
    /// `what` names the downcall for the discard trace.
    pub fn deliver<R>(&self, what: &'static str, f: impl FnOnce(&dyn NativeCore) -> R) -> Option<R> {
        if self.is_released() {
            trace!(call = what, "bridge torn down, discarding downcall");
            return None;
        }
        let guard = self.peer.read().unwrap_or_else(PoisonError::into_inner);
        let out = match guard.as_deref() {
            Some(peer) => {
                let _delivering = Delivering::enter(self);
                f(peer)
            }
            None => {
                trace!(call = what, "bridge torn down, discarding downcall");
                return None;
            }
        };
        drop(guard);

        // An outer delivery on this thread still holds the read side.
        if !Delivering::active(self) && self.deferred.swap(false, Ordering::AcqRel) {
            debug!(call = what, "running teardown requested during downcall");
            self.release();
        }
        Some(out)
    }

    /// Lock-free check, safe to call from inside a downcall.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Detach the native core and let it drop its references to the bridge.
    ///
    /// From inside a downcall on this slot the release happens as soon as
    /// that downcall returns. Returns `false` if teardown already happened.
    pub fn teardown(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        if Delivering::active(self) {
            self.deferred.store(true, Ordering::Release);
            debug!("teardown requested from inside a downcall, deferring release");
        } else {
            self.release();
        }
        true
    }

    fn release(&self) {
        let peer = self
            .peer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(peer) = peer {
            info!("releasing native bridge resources");
            peer.release_bridge_resources();
        }
    }
}
