// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridge object shared by the SDK (as its listener) and the native core
// (as the target of its operations).
//
// Operations live in `facade`, SDK callbacks in `dispatcher`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};

use propeller_core::SdkConfig;
use propeller_core::error::{BridgeError, Result};

use crate::LOG_TARGET;
use crate::lifetime::PeerSlot;
use crate::social::PendingSocial;
use crate::traits::{NativeCore, PropellerSdk, SdkListener};

/// Mutable bookkeeping guarded by a single lock.
#[derive(Debug, Default)]
pub(crate) struct BridgeState {
    pub(crate) config: SdkConfig,
    pub(crate) initialized: bool,
    /// A launch succeeded and no exit, match or failure has arrived since.
    pub(crate) session_live: bool,
}

/// Adapter between one SDK instance and one native game core.
///
/// Always handled through an `Arc`: the SDK keeps a clone as its listener for
/// the duration of a session, which keeps the bridge reachable until the SDK
/// lets go of it.
pub struct NativeBridge {
    pub(crate) sdk: Arc<dyn PropellerSdk>,
    pub(crate) peer: PeerSlot,
    pub(crate) social: PendingSocial,
    state: Mutex<BridgeState>,
    this: Weak<NativeBridge>,
}

impl NativeBridge {
    pub fn new(sdk: Arc<dyn PropellerSdk>, core: Box<dyn NativeCore>) -> Arc<Self> {
        debug!("creating native bridge");
        Arc::new_cyclic(|this| Self {
            sdk,
            peer: PeerSlot::new(core),
            social: PendingSocial::new(),
            state: Mutex::new(BridgeState::default()),
            this: this.clone(),
        })
    }

    /// Detach from the native core, calling its `release_bridge_resources`
    /// exactly once. SDK callbacks that arrive afterwards are ignored and
    /// every operation fails with [`BridgeError::TornDown`].
    ///
    /// Called from inside a native-core callback, the release runs once that
    /// callback returns.
    pub fn teardown(&self) -> bool {
        let released = self.peer.teardown();
        if released {
            self.social.clear();
            self.state().session_live = false;
            if let Ok(listener) = self.listener() {
                self.sdk.detach(&listener);
            }
            info!("native bridge torn down");
        }
        released
    }

    pub fn is_torn_down(&self) -> bool {
        self.peer.is_released()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn is_session_live(&self) -> bool {
        self.state().session_live
    }

    /// Snapshot of the configuration handed to the SDK so far.
    pub fn config(&self) -> SdkConfig {
        self.state().config.clone()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn listener(&self) -> Result<Arc<dyn SdkListener>> {
        let this: Arc<dyn SdkListener> = self.this.upgrade().ok_or(BridgeError::TornDown)?;
        Ok(this)
    }

    pub(crate) fn ensure_attached(&self) -> Result<()> {
        if self.is_torn_down() {
            Err(BridgeError::TornDown)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        self.ensure_attached()?;
        if self.is_initialized() {
            Ok(())
        } else {
            Err(BridgeError::NotInitialized)
        }
    }

    /// Close the current session after a terminal SDK callback.
    pub(crate) fn end_session(&self, reason: &'static str) {
        {
            let mut state = self.state();
            if state.session_live {
                state.session_live = false;
                debug!(reason, "SDK session ended");
            }
        }
        let unfinished = self.social.pending();
        if !unfinished.is_empty() {
            warn!(
                target: LOG_TARGET,
                reason,
                ?unfinished,
                "session ended with social requests never completed; further requests of these kinds stay refused"
            );
        }
    }
}
