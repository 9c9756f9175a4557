// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits at the three seams of the bridge: the SDK's downcalls,
// the SDK's listener upcalls, and the native game core.

use std::ffi::c_void;
use std::sync::Arc;

use propeller_core::error::Result;
use propeller_core::{
    Bundle, FailureEvent, MatchStartEvent, Orientation, ResultBag, SocialMessage, SocialRequest,
};

/// Operations the Propeller SDK offers to the bridge.
///
/// Launch variants take the listener the SDK will call back into for the
/// resulting session; the SDK keeps that reference until the session ends.
pub trait PropellerSdk: Send + Sync {
    fn initialize(&self, game_id: &str, game_secret: &str, aux_data: Option<&str>) -> Result<()>;

    /// Switch to test endpoints. Only effective before `initialize`.
    fn use_sandbox(&self) -> Result<()>;

    fn set_notification_token(&self, token: &str) -> Result<()>;

    fn set_orientation(&self, orientation: Orientation) -> Result<()>;

    /// Show the SDK UI. Returns `true` if it is now on screen.
    fn launch(&self, listener: Arc<dyn SdkListener>) -> Result<bool>;

    fn launch_with_tournament(&self, tournament_id: &str, listener: Arc<dyn SdkListener>) -> Result<bool>;

    /// Relaunch the SDK UI reporting a played match. `result` carries the
    /// `tournamentID`, `matchID` and `score` entries.
    fn launch_with_match_result(&self, result: &Bundle, listener: Arc<dyn SdkListener>) -> Result<bool>;

    fn social_login_completed(&self, result: &str) -> Result<bool>;

    fn social_invite_completed(&self) -> Result<bool>;

    fn social_share_completed(&self) -> Result<bool>;

    fn sync_challenge_counts(&self) -> Result<()>;

    /// Last known challenge count. Must not block.
    fn challenge_counts(&self) -> Result<i32>;

    /// Drop `listener` if a session still refers to it. Called on teardown
    /// so the SDK no longer keeps the bridge alive.
    fn detach(&self, listener: &Arc<dyn SdkListener>);
}

/// Callbacks the SDK delivers for a live session.
///
/// Nothing here reports errors back to the SDK.
pub trait SdkListener: Send + Sync {
    /// The session ended without a match.
    fn completed_with_exit(&self);

    /// The session ended with a match to play. `details` carries
    /// `tournamentID`, `matchID` and `paramsJSON`.
    fn completed_with_match(&self, details: &Bundle);

    /// The session ended with an unrecoverable error.
    fn failed(&self, message: &str, result: &ResultBag);

    /// Returns `true` if the game will perform the login.
    fn social_login(&self, context: &HostContext, allow_cache: bool) -> bool;

    fn social_invite(&self, context: &HostContext, message: &SocialMessage) -> bool;

    fn social_share(&self, context: &HostContext, message: &SocialMessage) -> bool;
}

/// Downcalls into the native game core.
///
/// String arguments are only borrowed for the duration of the call.
pub trait NativeCore: Send + Sync {
    fn on_exit(&self);

    fn on_match(&self, event: &MatchStartEvent);

    fn on_failure(&self, failure: &FailureEvent);

    /// Ask the game to perform a social action. Returns `true` if it will,
    /// in which case it owes the bridge the matching completion.
    fn request_social(&self, request: &SocialRequest) -> bool;

    /// Last call the core ever receives from a bridge.
    fn release_bridge_resources(&self);
}

/// Opaque host handle (an Android `Context` on device) that accompanies
/// social requests. The bridge never hands it to the native core.
#[derive(Debug, Clone, Copy)]
pub struct HostContext {
    raw: *mut c_void,
}

impl HostContext {
    pub fn null() -> Self {
        Self { raw: std::ptr::null_mut() }
    }

    pub fn from_raw(raw: *mut c_void) -> Self {
        Self { raw }
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}
