// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub SDK for desktop/CI builds where the Propeller SDK is unavailable.
//
// Every operation returns `PlatformUnavailable`; the real binding lives in
// the `android` module.

use std::sync::Arc;

use propeller_core::error::{BridgeError, Result};
use propeller_core::{Bundle, Orientation};

use crate::traits::{PropellerSdk, SdkListener};

/// No-op SDK returned on platforms without the Propeller SDK.
pub struct StubSdk;

impl PropellerSdk for StubSdk {
    fn initialize(&self, _game_id: &str, _game_secret: &str, _aux_data: Option<&str>) -> Result<()> {
        tracing::warn!("PropellerSdk::initialize called on stub SDK");
        Err(BridgeError::PlatformUnavailable)
    }

    fn use_sandbox(&self) -> Result<()> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn set_notification_token(&self, _token: &str) -> Result<()> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn set_orientation(&self, _orientation: Orientation) -> Result<()> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn launch(&self, _listener: Arc<dyn SdkListener>) -> Result<bool> {
        tracing::warn!("PropellerSdk::launch called on stub SDK");
        Err(BridgeError::PlatformUnavailable)
    }

    fn launch_with_tournament(&self, _tournament_id: &str, _listener: Arc<dyn SdkListener>) -> Result<bool> {
        tracing::warn!("PropellerSdk::launch_with_tournament called on stub SDK");
        Err(BridgeError::PlatformUnavailable)
    }

    fn launch_with_match_result(&self, _result: &Bundle, _listener: Arc<dyn SdkListener>) -> Result<bool> {
        tracing::warn!("PropellerSdk::launch_with_match_result called on stub SDK");
        Err(BridgeError::PlatformUnavailable)
    }

    fn social_login_completed(&self, _result: &str) -> Result<bool> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn social_invite_completed(&self) -> Result<bool> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn social_share_completed(&self) -> Result<bool> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn sync_challenge_counts(&self) -> Result<()> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn challenge_counts(&self) -> Result<i32> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn detach(&self, _listener: &Arc<dyn SdkListener>) {}
}
