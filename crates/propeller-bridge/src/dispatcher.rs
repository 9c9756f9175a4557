// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SDK callbacks, republished to the native core.
//
// Each callback turns into at most one downcall, delivered on the SDK's
// callback thread in the order the SDK emits them. Nothing is reported back
// to the SDK except the boolean answers to social requests.

use tracing::{debug, info, trace, warn};

use propeller_core::{
    Bundle, FailureEvent, ResultBag, SocialMessage, SocialRequest, decode_match_bundle,
};

use crate::LOG_TARGET;
use crate::bridge::NativeBridge;
use crate::traits::{HostContext, SdkListener};

impl NativeBridge {
    fn discarding(&self, callback: &'static str) -> bool {
        let torn_down = self.is_torn_down();
        if torn_down {
            trace!(callback, "bridge torn down, ignoring SDK callback");
        }
        torn_down
    }

    /// Forward a social request, keeping at most one outstanding per kind.
    ///
    /// The request is marked outstanding before the native core is asked so
    /// a completion issued from inside its handler still finds it.
    fn request_social(&self, request: SocialRequest) -> bool {
        if self.discarding("request_social") {
            return false;
        }
        let kind = request.kind();
        if !self.social.begin(kind) {
            warn!(target: LOG_TARGET, %kind, "refusing social request: previous one not completed");
            return false;
        }

        let accepted = self
            .peer
            .deliver("request_social", |core| core.request_social(&request))
            .unwrap_or(false);
        if !accepted {
            self.social.cancel(kind);
        }
        info!(%kind, accepted, "social request forwarded to native core");
        accepted
    }
}

impl SdkListener for NativeBridge {
    fn completed_with_exit(&self) {
        if self.discarding("completed_with_exit") {
            return;
        }
        self.end_session("exit");
        self.peer.deliver("on_exit", |core| core.on_exit());
    }

    fn completed_with_match(&self, details: &Bundle) {
        if self.discarding("completed_with_match") {
            return;
        }
        self.end_session("match");

        match decode_match_bundle(details) {
            Ok(event) => {
                debug!(
                    tournament_id = %event.tournament_id,
                    match_id = %event.match_id,
                    seed = event.seed,
                    round = event.round,
                    game_type = event.game_type,
                    "match start decoded"
                );
                self.peer.deliver("on_match", |core| core.on_match(&event));
            }
            Err(e) => {
                warn!(target: LOG_TARGET, error = %e, "dropping match with malformed envelope");
            }
        }
    }

    fn failed(&self, message: &str, result: &ResultBag) {
        if self.discarding("failed") {
            return;
        }
        self.end_session("failure");
        warn!(target: LOG_TARGET, reason = message, entries = result.len(), "SDK session failed");
        let failure = FailureEvent {
            message: message.to_owned(),
            result: result.clone(),
        };
        self.peer.deliver("on_failure", |core| core.on_failure(&failure));
    }

    fn social_login(&self, _context: &HostContext, allow_cache: bool) -> bool {
        self.request_social(SocialRequest::Login { allow_cache })
    }

    fn social_invite(&self, _context: &HostContext, message: &SocialMessage) -> bool {
        self.request_social(SocialRequest::Invite(message.clone()))
    }

    fn social_share(&self, _context: &HostContext, message: &SocialMessage) -> bool {
        self.request_social(SocialRequest::Share(message.clone()))
    }
}
