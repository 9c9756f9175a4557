// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pairing of SDK social requests with the game's completion calls.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use propeller_core::SocialKind;
use propeller_core::error::{BridgeError, Result};

/// Social requests the native core accepted but has not completed yet.
///
/// At most one request per kind is outstanding. An accepted request stays
/// outstanding across session ends until the game completes it, so a game
/// that never completes one gets every later request of that kind refused
/// until teardown.
#[derive(Debug, Default)]
pub struct PendingSocial {
    pending: Mutex<HashSet<SocialKind>>,
}

impl PendingSocial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as outstanding. Returns `false` if one already is.
    pub fn begin(&self, kind: SocialKind) -> bool {
        self.lock().insert(kind)
    }

    /// Forget a request the native core declined.
    pub fn cancel(&self, kind: SocialKind) {
        self.lock().remove(&kind);
    }

    /// Match a completion against the outstanding request of `kind`.
    pub fn complete(&self, kind: SocialKind) -> Result<()> {
        if self.lock().remove(&kind) {
            Ok(())
        } else {
            Err(BridgeError::NoPendingSocial(kind))
        }
    }

    pub fn is_pending(&self, kind: SocialKind) -> bool {
        self.lock().contains(&kind)
    }

    /// Outstanding kinds, in `SocialKind::ALL` order.
    pub fn pending(&self) -> Vec<SocialKind> {
        let pending = self.lock();
        SocialKind::ALL.into_iter().filter(|kind| pending.contains(kind)).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SocialKind>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
