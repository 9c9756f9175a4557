// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operations the native core invokes on the bridge.
//
// Each one validates its inputs, then hands off to the SDK. Configuration
// setters may run before or after `initialize`; launches, challenge counts
// and completions need an initialized SDK.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use propeller_core::error::{BridgeError, Result};
use propeller_core::{MatchResult, Orientation, SdkConfig, SocialKind};

use crate::bridge::NativeBridge;
use crate::traits::{PropellerSdk, SdkListener};

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        Err(BridgeError::InvalidArgument(format!("{what} is empty")))
    } else {
        Ok(())
    }
}

impl NativeBridge {
    /// Initialize the SDK with the game's credentials.
    ///
    /// Calling it again re-initializes the SDK with the new values.
    #[instrument(skip_all, fields(game_id = game_id))]
    pub fn initialize(&self, game_id: &str, game_secret: &str, aux_data: Option<&str>) -> Result<()> {
        self.ensure_attached()?;

        let mut config = self.config();
        config.game_id = game_id.to_owned();
        config.game_secret = game_secret.to_owned();
        config.aux_data = aux_data.map(str::to_owned);
        config.validate()?;

        self.sdk.initialize(game_id, game_secret, aux_data)?;

        let mut state = self.state();
        if state.initialized {
            debug!("SDK re-initialized");
        }
        state.config = config;
        state.initialized = true;
        info!(sandbox = state.config.sandbox, "Propeller SDK initialized");
        Ok(())
    }

    /// Apply every setting in `config`, then initialize.
    pub fn initialize_with_config(&self, config: &SdkConfig) -> Result<()> {
        config.validate()?;
        if config.sandbox {
            self.use_sandbox()?;
        }
        if let Some(token) = &config.notification_token {
            self.set_notification_token(token)?;
        }
        if let Some(orientation) = config.orientation {
            self.set_orientation(orientation)?;
        }
        self.initialize(&config.game_id, &config.game_secret, config.aux_data.as_deref())
    }

    /// Point the SDK at its test endpoints.
    pub fn use_sandbox(&self) -> Result<()> {
        self.ensure_attached()?;
        if self.is_initialized() {
            warn!("use_sandbox after initialize only applies once the SDK is re-initialized");
        }
        self.sdk.use_sandbox()?;
        self.state().config.sandbox = true;
        debug!("sandbox endpoints selected");
        Ok(())
    }

    pub fn set_notification_token(&self, token: &str) -> Result<()> {
        self.ensure_attached()?;
        self.sdk.set_notification_token(token)?;
        self.state().config.notification_token = Some(token.to_owned());
        debug!("notification token updated");
        Ok(())
    }

    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.ensure_attached()?;
        self.sdk.set_orientation(orientation)?;
        self.state().config.orientation = Some(orientation);
        debug!(%orientation, "orientation updated");
        Ok(())
    }

    /// Like [`set_orientation`](Self::set_orientation) with the wire name
    /// (`"landscape"` or `"portrait"`). Anything else leaves the SDK untouched.
    pub fn set_orientation_str(&self, orientation: &str) -> Result<()> {
        self.set_orientation(orientation.parse()?)
    }

    /// Show the SDK UI. `Ok(true)` means a session is now live.
    pub fn launch(&self) -> Result<bool> {
        self.start_session("launch", |sdk, listener| sdk.launch(listener))
    }

    pub fn launch_with_tournament(&self, tournament_id: &str) -> Result<bool> {
        require(tournament_id, "tournament id")?;
        self.start_session("launch_with_tournament", |sdk, listener| {
            sdk.launch_with_tournament(tournament_id, listener)
        })
    }

    /// Report a played match and show the SDK UI again.
    pub fn launch_with_match_result(&self, tournament_id: &str, match_id: &str, score: i64) -> Result<bool> {
        require(tournament_id, "tournament id")?;
        require(match_id, "match id")?;
        let result = MatchResult::new(tournament_id, match_id, score);
        debug!(tournament_id, match_id, score, "submitting match result");
        self.start_session("launch_with_match_result", |sdk, listener| {
            sdk.launch_with_match_result(&result.to_bundle(), listener)
        })
    }

    /// Hand the SDK the outcome of the social login it asked for.
    pub fn social_login_completed(&self, result: &str) -> Result<bool> {
        self.complete_social(SocialKind::Login, |sdk| sdk.social_login_completed(result))
    }

    pub fn social_invite_completed(&self) -> Result<bool> {
        self.complete_social(SocialKind::Invite, |sdk| sdk.social_invite_completed())
    }

    pub fn social_share_completed(&self) -> Result<bool> {
        self.complete_social(SocialKind::Share, |sdk| sdk.social_share_completed())
    }

    /// Ask the SDK to refresh the challenge counts in the background.
    pub fn sync_challenge_counts(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.sdk.sync_challenge_counts()
    }

    /// Last challenge count the SDK knows about. Never blocks.
    pub fn challenge_counts(&self) -> Result<i32> {
        self.ensure_initialized()?;
        self.sdk.challenge_counts()
    }

    /// Open a session, rolling the live flag back if the SDK stays hidden.
    ///
    /// The flag is raised before the SDK is called so a callback delivered
    /// synchronously during the launch closes the right session.
    fn start_session(
        &self,
        what: &'static str,
        start: impl FnOnce(&dyn PropellerSdk, Arc<dyn SdkListener>) -> Result<bool>,
    ) -> Result<bool> {
        self.ensure_attached()?;
        let listener = self.listener()?;
        {
            let mut state = self.state();
            if !state.initialized {
                return Err(BridgeError::NotInitialized);
            }
            if state.session_live {
                return Err(BridgeError::SessionActive);
            }
            state.session_live = true;
        }

        let outcome = start(&*self.sdk, listener);
        match &outcome {
            Ok(true) => info!(launch = what, "SDK session started"),
            Ok(false) => {
                self.state().session_live = false;
                warn!(launch = what, "SDK declined to show its UI");
            }
            Err(e) => {
                self.state().session_live = false;
                warn!(launch = what, error = %e, "SDK launch failed");
            }
        }
        outcome
    }

    /// Pass a completion to the SDK if a request of `kind` is outstanding.
    fn complete_social(
        &self,
        kind: SocialKind,
        forward: impl FnOnce(&dyn PropellerSdk) -> Result<bool>,
    ) -> Result<bool> {
        self.ensure_attached()?;
        self.social.complete(kind)?;
        let accepted = forward(&*self.sdk)?;
        debug!(%kind, accepted, "social completion handed to SDK");
        Ok(accepted)
    }
}
