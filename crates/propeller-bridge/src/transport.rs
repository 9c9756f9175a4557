// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C ABI function table through which the bridge reaches the native core.
//
// Every string handed across is a NUL-terminated UTF-8 buffer owned by the
// bridge and valid only for the duration of the call. The native core copies
// anything it wants to keep. Failure result bags travel as an array of
// key/value string pairs plus a length, valid under the same rule.

use std::ffi::{CString, c_char, c_void};

use tracing::warn;

use propeller_core::error::{BridgeError, Result};
use propeller_core::{FailureEvent, MatchStartEvent, SocialMessage, SocialRequest};

use crate::traits::NativeCore;

pub type ExitFn = unsafe extern "C" fn(user_data: *mut c_void);

pub type MatchFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    tournament_id: *const c_char,
    match_id: *const c_char,
    seed: i64,
    round: i32,
    game_type: i32,
);

pub type FailureFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    message: *const c_char,
    entries: *const BagEntry,
    len: usize,
);

pub type SocialLoginFn = unsafe extern "C" fn(user_data: *mut c_void, allow_cache: bool) -> bool;

pub type SocialMessageFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    subject: *const c_char,
    long_message: *const c_char,
    short_message: *const c_char,
    link_url: *const c_char,
) -> bool;

pub type ReleaseFn = unsafe extern "C" fn(user_data: *mut c_void);

/// One entry of a failure result bag.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BagEntry {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Function table registered by the native core.
///
/// Every entry is mandatory; `user_data` is passed back untouched as the
/// first argument of each call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NativeCoreTable {
    pub user_data: *mut c_void,
    pub on_exit: Option<ExitFn>,
    pub on_match: Option<MatchFn>,
    pub on_failure: Option<FailureFn>,
    pub request_social_login: Option<SocialLoginFn>,
    pub request_social_invite: Option<SocialMessageFn>,
    pub request_social_share: Option<SocialMessageFn>,
    pub release_bridge_resources: Option<ReleaseFn>,
}

/// [`NativeCore`] backed by a validated [`NativeCoreTable`].
pub struct CallbackTable {
    user_data: *mut c_void,
    on_exit: ExitFn,
    on_match: MatchFn,
    on_failure: FailureFn,
    request_social_login: SocialLoginFn,
    request_social_invite: SocialMessageFn,
    request_social_share: SocialMessageFn,
    release_bridge_resources: ReleaseFn,
}

// SAFETY: the native core registering the table guarantees that its
// functions may be called from any thread and that `user_data` stays valid
// until `release_bridge_resources` returns.
unsafe impl Send for CallbackTable {}
unsafe impl Sync for CallbackTable {}

fn missing(entry: &str) -> BridgeError {
    BridgeError::InvalidArgument(format!("native core table has no `{entry}` function"))
}

impl CallbackTable {
    pub fn new(table: &NativeCoreTable) -> Result<Self> {
        Ok(Self {
            user_data: table.user_data,
            on_exit: table.on_exit.ok_or_else(|| missing("on_exit"))?,
            on_match: table.on_match.ok_or_else(|| missing("on_match"))?,
            on_failure: table.on_failure.ok_or_else(|| missing("on_failure"))?,
            request_social_login: table
                .request_social_login
                .ok_or_else(|| missing("request_social_login"))?,
            request_social_invite: table
                .request_social_invite
                .ok_or_else(|| missing("request_social_invite"))?,
            request_social_share: table
                .request_social_share
                .ok_or_else(|| missing("request_social_share"))?,
            release_bridge_resources: table
                .release_bridge_resources
                .ok_or_else(|| missing("release_bridge_resources"))?,
        })
    }

    fn social(&self, call: &'static str, f: SocialMessageFn, message: &SocialMessage) -> bool {
        let Some([subject, long_message, short_message, link_url]) = c_strings(
            call,
            [
                message.subject.as_str(),
                message.long_message.as_str(),
                message.short_message.as_str(),
                message.link_url.as_str(),
            ],
        ) else {
            return false;
        };
        // SAFETY: all four buffers outlive the call; see `CallbackTable`.
        unsafe {
            f(
                self.user_data,
                subject.as_ptr(),
                long_message.as_ptr(),
                short_message.as_ptr(),
                link_url.as_ptr(),
            )
        }
    }
}

/// Convert strings for a downcall, or drop the call if one holds a NUL byte.
fn c_strings<const N: usize>(call: &'static str, values: [&str; N]) -> Option<[CString; N]> {
    let mut converted = Vec::with_capacity(N);
    for value in values {
        match CString::new(value) {
            Ok(c) => converted.push(c),
            Err(_) => {
                warn!(call, "string argument contains a NUL byte, dropping downcall");
                return None;
            }
        }
    }
    converted.try_into().ok()
}

impl NativeCore for CallbackTable {
    fn on_exit(&self) {
        // SAFETY: see `CallbackTable`.
        unsafe { (self.on_exit)(self.user_data) }
    }

    fn on_match(&self, event: &MatchStartEvent) {
        let Some([tournament_id, match_id]) =
            c_strings("on_match", [event.tournament_id.as_str(), event.match_id.as_str()])
        else {
            return;
        };
        // SAFETY: both buffers outlive the call; see `CallbackTable`.
        unsafe {
            (self.on_match)(
                self.user_data,
                tournament_id.as_ptr(),
                match_id.as_ptr(),
                event.seed,
                event.round,
                event.game_type,
            )
        }
    }

    fn on_failure(&self, failure: &FailureEvent) {
        let Some([message]) = c_strings("on_failure", [failure.message.as_str()]) else {
            return;
        };
        let mut pairs = Vec::with_capacity(failure.result.len());
        for (key, value) in &failure.result {
            let Some([key, value]) = c_strings("on_failure", [key.as_str(), value.as_str()]) else {
                return;
            };
            pairs.push((key, value));
        }
        let entries: Vec<BagEntry> = pairs
            .iter()
            .map(|(key, value)| BagEntry {
                key: key.as_ptr(),
                value: value.as_ptr(),
            })
            .collect();

        // SAFETY: `message`, `pairs` and `entries` outlive the call; see
        // `CallbackTable`.
        unsafe {
            (self.on_failure)(self.user_data, message.as_ptr(), entries.as_ptr(), entries.len())
        }
    }

    fn request_social(&self, request: &SocialRequest) -> bool {
        match request {
            // SAFETY: see `CallbackTable`.
            SocialRequest::Login { allow_cache } => unsafe {
                (self.request_social_login)(self.user_data, *allow_cache)
            },
            SocialRequest::Invite(message) => {
                self.social("request_social_invite", self.request_social_invite, message)
            }
            SocialRequest::Share(message) => {
                self.social("request_social_share", self.request_social_share, message)
            }
        }
    }

    fn release_bridge_resources(&self) {
        // SAFETY: see `CallbackTable`.
        unsafe { (self.release_bridge_resources)(self.user_data) }
    }
}
