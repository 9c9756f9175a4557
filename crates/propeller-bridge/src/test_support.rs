// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording doubles for the SDK and the native core, shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use propeller_core::error::Result;
use propeller_core::{
    Bundle, FailureEvent, KEY_MATCH_ID, KEY_PARAMS_JSON, KEY_TOURNAMENT_ID, MatchStartEvent,
    Orientation, ResultBag, SocialMessage, SocialRequest,
};

use crate::session::SessionSlot;
use crate::traits::{NativeCore, PropellerSdk, SdkListener};

/// One downcall observed by [`RecordingCore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downcall {
    Exit,
    Match(MatchStartEvent),
    Failure(String, ResultBag),
    SocialLogin(bool),
    SocialInvite(SocialMessage),
    SocialShare(SocialMessage),
    Release,
}

type RequestHook = Box<dyn Fn() + Send + Sync>;

/// Native core double that records every downcall.
#[derive(Clone)]
pub struct RecordingCore {
    calls: Arc<Mutex<Vec<Downcall>>>,
    answer: Arc<AtomicBool>,
    on_request: Arc<Mutex<Option<RequestHook>>>,
}

impl RecordingCore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            answer: Arc::new(AtomicBool::new(true)),
            on_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> Vec<Downcall> {
        self.calls.lock().unwrap().clone()
    }

    /// Answer social requests with `answer` from now on.
    pub fn answer_requests(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    /// Run `hook` inside every social request, before answering.
    pub fn on_request(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_request.lock().unwrap() = Some(Box::new(hook));
    }

    fn record(&self, call: Downcall) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(&self, call: Downcall) -> bool {
        self.record(call);
        if let Some(hook) = self.on_request.lock().unwrap().as_ref() {
            hook();
        }
        self.answer.load(Ordering::SeqCst)
    }
}

impl NativeCore for RecordingCore {
    fn on_exit(&self) {
        self.record(Downcall::Exit);
    }

    fn on_match(&self, event: &MatchStartEvent) {
        self.record(Downcall::Match(event.clone()));
    }

    fn on_failure(&self, failure: &FailureEvent) {
        self.record(Downcall::Failure(failure.message.clone(), failure.result.clone()));
    }

    fn request_social(&self, request: &SocialRequest) -> bool {
        self.answer(match request {
            SocialRequest::Login { allow_cache } => Downcall::SocialLogin(*allow_cache),
            SocialRequest::Invite(message) => Downcall::SocialInvite(message.clone()),
            SocialRequest::Share(message) => Downcall::SocialShare(message.clone()),
        })
    }

    fn release_bridge_resources(&self) {
        self.record(Downcall::Release);
    }
}

/// One SDK operation observed by [`FakeSdk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Initialize {
        game_id: String,
        game_secret: String,
        aux_data: Option<String>,
    },
    UseSandbox,
    NotificationToken(String),
    Orientation(Orientation),
    Launch,
    LaunchWithTournament(String),
    LaunchWithMatchResult(Bundle),
    LoginCompleted(String),
    InviteCompleted,
    ShareCompleted,
    SyncChallengeCounts,
    ChallengeCounts,
}

/// In-memory SDK that records operations and keeps the session listener.
#[derive(Clone)]
pub struct FakeSdk {
    calls: Arc<Mutex<Vec<SdkCall>>>,
    show_ui: Arc<AtomicBool>,
    accept_completions: Arc<AtomicBool>,
    challenge_count: Arc<AtomicI32>,
    session: Arc<SessionSlot>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            show_ui: Arc::new(AtomicBool::new(true)),
            accept_completions: Arc::new(AtomicBool::new(true)),
            challenge_count: Arc::new(AtomicI32::new(0)),
            session: Arc::new(SessionSlot::new()),
        }
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn show_ui(&self, shown: bool) {
        self.show_ui.store(shown, Ordering::SeqCst);
    }

    pub fn accept_completions(&self, accept: bool) {
        self.accept_completions.store(accept, Ordering::SeqCst);
    }

    pub fn set_challenge_count(&self, count: i32) {
        self.challenge_count.store(count, Ordering::SeqCst);
    }

    /// Listener registered by the last successful launch.
    pub fn listener(&self) -> Arc<dyn SdkListener> {
        self.session.current().expect("no listener registered")
    }

    pub fn has_listener(&self) -> bool {
        self.session.current().is_some()
    }

    /// Let go of the session listener, as the SDK does once its UI closes.
    pub fn drop_listener(&self) {
        self.session.clear();
    }

    fn record(&self, call: SdkCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn start(&self, call: SdkCall, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.record(call);
        let shown = self.show_ui.load(Ordering::SeqCst);
        if shown {
            self.session.register(listener);
        }
        Ok(shown)
    }

    fn complete(&self, call: SdkCall) -> Result<bool> {
        self.record(call);
        Ok(self.accept_completions.load(Ordering::SeqCst))
    }
}

impl PropellerSdk for FakeSdk {
    fn initialize(&self, game_id: &str, game_secret: &str, aux_data: Option<&str>) -> Result<()> {
        self.record(SdkCall::Initialize {
            game_id: game_id.into(),
            game_secret: game_secret.into(),
            aux_data: aux_data.map(str::to_owned),
        });
        Ok(())
    }

    fn use_sandbox(&self) -> Result<()> {
        self.record(SdkCall::UseSandbox);
        Ok(())
    }

    fn set_notification_token(&self, token: &str) -> Result<()> {
        self.record(SdkCall::NotificationToken(token.into()));
        Ok(())
    }

    fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.record(SdkCall::Orientation(orientation));
        Ok(())
    }

    fn launch(&self, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.start(SdkCall::Launch, listener)
    }

    fn launch_with_tournament(&self, tournament_id: &str, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.start(SdkCall::LaunchWithTournament(tournament_id.into()), listener)
    }

    fn launch_with_match_result(&self, result: &Bundle, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.start(SdkCall::LaunchWithMatchResult(result.clone()), listener)
    }

    fn social_login_completed(&self, result: &str) -> Result<bool> {
        self.complete(SdkCall::LoginCompleted(result.into()))
    }

    fn social_invite_completed(&self) -> Result<bool> {
        self.complete(SdkCall::InviteCompleted)
    }

    fn social_share_completed(&self) -> Result<bool> {
        self.complete(SdkCall::ShareCompleted)
    }

    fn sync_challenge_counts(&self) -> Result<()> {
        self.record(SdkCall::SyncChallengeCounts);
        Ok(())
    }

    fn challenge_counts(&self) -> Result<i32> {
        self.record(SdkCall::ChallengeCounts);
        Ok(self.challenge_count.load(Ordering::SeqCst))
    }

    fn detach(&self, listener: &Arc<dyn SdkListener>) {
        self.session.detach(listener);
    }
}

/// Match bundle as the SDK delivers it.
pub fn match_bundle(tournament_id: &str, match_id: &str, params_json: &str) -> Bundle {
    let mut bundle = Bundle::new();
    bundle.insert(KEY_TOURNAMENT_ID.into(), tournament_id.into());
    bundle.insert(KEY_MATCH_ID.into(), match_id.into());
    bundle.insert(KEY_PARAMS_JSON.into(), params_json.into());
    bundle
}

pub fn invite_message() -> SocialMessage {
    SocialMessage {
        subject: "Join me".into(),
        long_message: "Come play a tournament with me".into(),
        short_message: "Play?".into(),
        link_url: "https://example.com/game".into(),
    }
}
