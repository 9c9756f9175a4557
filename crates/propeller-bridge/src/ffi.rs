// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C entry points for the native game core.
//
// The core creates a bridge with its function table, drives it through the
// operations below and finally frees it, which also tears it down. Strings
// are borrowed NUL-terminated UTF-8; the bridge copies what it keeps. Errors
// never cross the boundary: they are logged and reported as `false` / `0`.

use std::ffi::{CStr, c_char};
use std::sync::Arc;

use tracing::{debug, warn};

use propeller_core::SdkConfig;
use propeller_core::error::{BridgeError, Result};

use crate::bridge::NativeBridge;
use crate::logging;
use crate::platform_sdk;
use crate::transport::{CallbackTable, NativeCoreTable};

/// Opaque bridge handle owned by the native core.
pub struct BridgeHandle {
    bridge: Arc<NativeBridge>,
}

pub(crate) fn into_handle(bridge: Arc<NativeBridge>) -> *mut BridgeHandle {
    Box::into_raw(Box::new(BridgeHandle { bridge }))
}

fn report<T>(op: &'static str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(BridgeError::NoPendingSocial(kind)) => {
            debug!(op, %kind, "completion without a pending request");
            fallback
        }
        Err(e) => {
            warn!(op, error = %e, "bridge operation failed");
            fallback
        }
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
unsafe fn with_bridge<T>(
    handle: *const BridgeHandle,
    op: &'static str,
    fallback: T,
    f: impl FnOnce(&NativeBridge) -> Result<T>,
) -> T {
    // SAFETY: guaranteed by the caller.
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        warn!(op, "null bridge handle");
        return fallback;
    };
    report(op, f(&handle.bridge), fallback)
}

/// # Safety
/// `ptr` is null or a NUL-terminated string valid for `'a`.
unsafe fn arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(BridgeError::InvalidArgument(format!("{what} is null")));
    }
    // SAFETY: guaranteed by the caller.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| BridgeError::InvalidArgument(format!("{what} is not UTF-8")))
}

/// # Safety
/// Same as [`arg`]; null maps to `None`.
unsafe fn optional_arg<'a>(ptr: *const c_char, what: &str) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        Ok(None)
    } else {
        // SAFETY: guaranteed by the caller.
        unsafe { arg(ptr, what) }.map(Some)
    }
}

/// Install the default log subscriber. `default_filter` may be null
/// (meaning `"info"`); `RUST_LOG` takes precedence.
///
/// # Safety
/// `default_filter` is null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_init_logging(default_filter: *const c_char) -> bool {
    // SAFETY: guaranteed by the caller.
    let filter = unsafe { optional_arg(default_filter, "log filter") }
        .ok()
        .flatten()
        .unwrap_or("info");
    logging::init_tracing(filter)
}

/// Create a bridge that reports to the functions in `table`.
///
/// Returns null if the table is null or incomplete, or if the platform SDK
/// cannot be reached.
///
/// # Safety
/// `table` is null or points to a valid [`NativeCoreTable`]. Its functions
/// and `user_data` must stay usable until `release_bridge_resources` is
/// called.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_new(table: *const NativeCoreTable) -> *mut BridgeHandle {
    // SAFETY: guaranteed by the caller.
    let Some(table) = (unsafe { table.as_ref() }) else {
        warn!("propeller_bridge_new: null function table");
        return std::ptr::null_mut();
    };
    let created = CallbackTable::new(table)
        .and_then(|core| Ok(NativeBridge::new(platform_sdk()?, Box::new(core))));
    match created {
        Ok(bridge) => into_handle(bridge),
        Err(e) => {
            warn!(error = %e, "propeller_bridge_new failed");
            std::ptr::null_mut()
        }
    }
}

/// Detach the bridge from the native core. `release_bridge_resources` runs
/// once; later SDK callbacks are dropped. Returns `false` if already torn
/// down.
///
/// Called from inside one of the table's functions, `release_bridge_resources`
/// runs right after that function returns.
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_teardown(handle: *mut BridgeHandle) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe { with_bridge(handle, "teardown", false, |bridge| Ok(bridge.teardown())) }
}

/// Tear down (if still attached) and release the handle.
///
/// May be called from inside one of the table's functions; see
/// [`propeller_bridge_teardown`].
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`]; it is
/// invalid afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_free(handle: *mut BridgeHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: guaranteed by the caller; ownership returns to Rust here.
    let handle = unsafe { Box::from_raw(handle) };
    handle.bridge.teardown();
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_use_sandbox(handle: *mut BridgeHandle) {
    // SAFETY: guaranteed by the caller.
    unsafe { with_bridge(handle, "use_sandbox", (), |bridge| bridge.use_sandbox()) }
}

/// `aux_data` may be null.
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`]; the
/// strings are null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_initialize(
    handle: *mut BridgeHandle,
    game_id: *const c_char,
    game_secret: *const c_char,
    aux_data: *const c_char,
) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "initialize", false, |bridge| {
            let game_id = arg(game_id, "game id")?;
            let game_secret = arg(game_secret, "game secret")?;
            let aux_data = optional_arg(aux_data, "aux data")?;
            bridge.initialize(game_id, game_secret, aux_data).map(|()| true)
        })
    }
}

/// Initialize from a JSON-encoded configuration (see `SdkConfig`).
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`];
/// `config_json` is null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_initialize_with_config(
    handle: *mut BridgeHandle,
    config_json: *const c_char,
) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "initialize_with_config", false, |bridge| {
            let config = SdkConfig::from_json(arg(config_json, "config")?)?;
            bridge.initialize_with_config(&config).map(|()| true)
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`]; `token`
/// is null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_set_notification_token(
    handle: *mut BridgeHandle,
    token: *const c_char,
) {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "set_notification_token", (), |bridge| {
            bridge.set_notification_token(arg(token, "notification token")?)
        })
    }
}

/// `orientation` is `"landscape"` or `"portrait"`; anything else is ignored.
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`];
/// `orientation` is null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_set_orientation(
    handle: *mut BridgeHandle,
    orientation: *const c_char,
) {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "set_orientation", (), |bridge| {
            bridge.set_orientation_str(arg(orientation, "orientation")?)
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_launch(handle: *mut BridgeHandle) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe { with_bridge(handle, "launch", false, |bridge| bridge.launch()) }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`];
/// `tournament_id` is null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_launch_with_tournament(
    handle: *mut BridgeHandle,
    tournament_id: *const c_char,
) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "launch_with_tournament", false, |bridge| {
            bridge.launch_with_tournament(arg(tournament_id, "tournament id")?)
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`]; the
/// strings are null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_launch_with_match_result(
    handle: *mut BridgeHandle,
    tournament_id: *const c_char,
    match_id: *const c_char,
    score: i64,
) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "launch_with_match_result", false, |bridge| {
            let tournament_id = arg(tournament_id, "tournament id")?;
            let match_id = arg(match_id, "match id")?;
            bridge.launch_with_match_result(tournament_id, match_id, score)
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`];
/// `result` is null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_social_login_completed(
    handle: *mut BridgeHandle,
    result: *const c_char,
) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "social_login_completed", false, |bridge| {
            bridge.social_login_completed(arg(result, "login result")?)
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_social_invite_completed(handle: *mut BridgeHandle) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "social_invite_completed", false, |bridge| {
            bridge.social_invite_completed()
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_social_share_completed(handle: *mut BridgeHandle) -> bool {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "social_share_completed", false, |bridge| {
            bridge.social_share_completed()
        })
    }
}

/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_sync_challenge_counts(handle: *mut BridgeHandle) {
    // SAFETY: guaranteed by the caller.
    unsafe {
        with_bridge(handle, "sync_challenge_counts", (), |bridge| {
            bridge.sync_challenge_counts()
        })
    }
}

/// Last known challenge count, `0` if unavailable.
///
/// # Safety
/// `handle` is null or a live pointer from [`propeller_bridge_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn propeller_bridge_get_challenge_counts(handle: *mut BridgeHandle) -> i32 {
    // SAFETY: guaranteed by the caller.
    unsafe { with_bridge(handle, "get_challenge_counts", 0, |bridge| bridge.challenge_counts()) }
}

#[cfg(test)]
mod tests {
    use std::ffi::{CString, c_void};
    use std::ptr;
    use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use propeller_core::ResultBag;

    use super::*;
    use crate::test_support::{FakeSdk, SdkCall, match_bundle};
    use crate::traits::HostContext;
    use crate::transport::tests::{Seen, recording_table};

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    /// Bridge over a fake SDK whose downcalls land in `seen`.
    fn handle(seen: &Seen, sdk: &FakeSdk) -> *mut BridgeHandle {
        let core = CallbackTable::new(&recording_table(seen)).unwrap();
        into_handle(NativeBridge::new(Arc::new(sdk.clone()), Box::new(core)))
    }

    fn launched(seen: &Seen, sdk: &FakeSdk) -> *mut BridgeHandle {
        let h = handle(seen, sdk);
        unsafe {
            assert!(propeller_bridge_initialize(h, c("game").as_ptr(), c("secret").as_ptr(), ptr::null()));
            assert!(propeller_bridge_launch(h));
        }
        h
    }

    #[test]
    fn happy_match_reaches_native_core() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);

        let params = r#"{"seed":"42","round":"3","options":"{\"gametype\":\"7\"}"}"#;
        sdk.listener().completed_with_match(&match_bundle("t1", "m1", params));
        assert_eq!(seen.calls(), vec!["match t1 m1 42 3 7"]);

        unsafe { propeller_bridge_free(h) };
    }

    #[test]
    fn malformed_options_emit_nothing() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);

        let params = r#"{"seed":"42","round":"3","options":"{not json}"}"#;
        sdk.listener().completed_with_match(&match_bundle("t1", "m1", params));
        assert!(seen.calls().is_empty());

        unsafe { propeller_bridge_free(h) };
    }

    #[test]
    fn social_login_round_trip() {
        let seen = Seen {
            answer: true,
            ..Default::default()
        };
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);

        assert!(sdk.listener().social_login(&HostContext::null(), false));
        let result = c(r#"{"user":"u"}"#);
        unsafe {
            assert!(propeller_bridge_social_login_completed(h, result.as_ptr()));
            assert!(!propeller_bridge_social_login_completed(h, result.as_ptr()));
        }
        assert_eq!(seen.calls(), vec!["login false"]);
        assert_eq!(
            sdk.calls().iter().filter(|call| matches!(call, SdkCall::LoginCompleted(_))).count(),
            1
        );

        unsafe { propeller_bridge_free(h) };
    }

    #[test]
    fn failure_forwarded() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);

        let mut bag = ResultBag::new();
        bag.insert("code".into(), "E_NET".into());
        sdk.listener().failed("network down", &bag);
        assert_eq!(seen.calls(), vec!["failure network down code=E_NET"]);

        unsafe { propeller_bridge_free(h) };
    }

    #[test]
    fn quiet_after_teardown() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);
        let listener = sdk.listener();

        unsafe {
            assert!(propeller_bridge_teardown(h));
            assert!(!propeller_bridge_teardown(h));
        }
        listener.completed_with_exit();
        assert_eq!(seen.calls(), vec!["release"]);

        // Freeing an already torn-down bridge does not release twice.
        unsafe { propeller_bridge_free(h) };
        assert_eq!(seen.calls(), vec!["release"]);
    }

    /// Native core that frees its bridge when the SDK session exits.
    #[derive(Default)]
    struct FreeOnExit {
        handle: AtomicPtr<BridgeHandle>,
        released: AtomicBool,
    }

    unsafe extern "C" fn free_on_exit(user_data: *mut c_void) {
        let core = unsafe { &*(user_data as *const FreeOnExit) };
        unsafe { propeller_bridge_free(core.handle.load(Ordering::SeqCst)) };
    }

    unsafe extern "C" fn note_release(user_data: *mut c_void) {
        let core = unsafe { &*(user_data as *const FreeOnExit) };
        core.released.store(true, Ordering::SeqCst);
    }

    #[test]
    fn free_from_inside_exit_callback() {
        let seen = Seen::default();
        let core = FreeOnExit::default();
        let mut table = recording_table(&seen);
        table.user_data = &core as *const FreeOnExit as *mut c_void;
        table.on_exit = Some(free_on_exit);
        table.release_bridge_resources = Some(note_release);

        let sdk = FakeSdk::new();
        let callbacks = CallbackTable::new(&table).unwrap();
        let h = into_handle(NativeBridge::new(Arc::new(sdk.clone()), Box::new(callbacks)));
        core.handle.store(h, Ordering::SeqCst);
        unsafe {
            assert!(propeller_bridge_initialize(h, c("game").as_ptr(), c("secret").as_ptr(), ptr::null()));
            assert!(propeller_bridge_launch(h));
        }

        let listener = sdk.listener();
        let (done_tx, done_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            listener.completed_with_exit();
            // Late callbacks on the freed bridge are dropped.
            listener.failed("late", &ResultBag::new());
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(Duration::from_secs(3))
            .expect("freeing from inside on_exit did not return");
        worker.join().unwrap();
        assert!(core.released.load(Ordering::SeqCst));
        assert!(!sdk.has_listener());
        assert!(seen.calls().is_empty());
    }

    #[test]
    fn late_callbacks_after_free_reach_nobody() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);
        let listener = sdk.listener();

        unsafe { propeller_bridge_free(h) };
        assert!(!sdk.has_listener());

        // The SDK let go of the bridge; a callback already in flight still
        // lands on a torn-down bridge and stops there.
        listener.completed_with_match(&match_bundle("t1", "m1", "{}"));
        assert!(!listener.social_login(&HostContext::null(), true));
        assert_eq!(seen.calls(), vec!["release"]);
    }

    #[test]
    fn handle_survives_sdk_dropping_listener() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = launched(&seen, &sdk);

        sdk.listener().completed_with_exit();
        sdk.drop_listener();
        assert!(!sdk.has_listener());

        // The handle owns the bridge; relaunching registers it again.
        unsafe { assert!(propeller_bridge_launch(h)) };
        assert!(sdk.has_listener());
        sdk.listener().completed_with_exit();
        assert_eq!(seen.calls(), vec!["exit", "exit"]);

        unsafe { propeller_bridge_free(h) };
    }

    #[test]
    fn free_releases_resources() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = handle(&seen, &sdk);
        unsafe { propeller_bridge_free(h) };
        assert_eq!(seen.calls(), vec!["release"]);
    }

    #[test]
    fn match_result_and_counts() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = handle(&seen, &sdk);
        sdk.set_challenge_count(9);

        unsafe {
            assert_eq!(propeller_bridge_get_challenge_counts(h), 0);
            propeller_bridge_set_orientation(h, c("portrait").as_ptr());
            propeller_bridge_set_notification_token(h, c("token").as_ptr());
            assert!(propeller_bridge_initialize_with_config(
                h,
                c(r#"{"game_id":"g","game_secret":"s"}"#).as_ptr()
            ));
            propeller_bridge_sync_challenge_counts(h);
            assert_eq!(propeller_bridge_get_challenge_counts(h), 9);
            assert!(propeller_bridge_launch_with_match_result(
                h,
                c("t1").as_ptr(),
                c("m1").as_ptr(),
                1234
            ));
            propeller_bridge_free(h);
        }

        assert!(sdk.calls().contains(&SdkCall::Orientation(propeller_core::Orientation::Portrait)));
        assert!(matches!(sdk.calls().last(), Some(SdkCall::LaunchWithMatchResult(_))));
    }

    #[test]
    fn bad_arguments_report_false() {
        let seen = Seen::default();
        let sdk = FakeSdk::new();
        let h = handle(&seen, &sdk);
        let not_utf8 = [0xffu8, 0xfe, 0];

        unsafe {
            assert!(!propeller_bridge_initialize(h, ptr::null(), c("s").as_ptr(), ptr::null()));
            assert!(!propeller_bridge_initialize(
                h,
                not_utf8.as_ptr().cast(),
                c("s").as_ptr(),
                ptr::null()
            ));
            assert!(!propeller_bridge_launch(h));
            assert!(!propeller_bridge_launch(ptr::null_mut()));
            assert!(!propeller_bridge_social_invite_completed(h));
            assert!(!propeller_bridge_social_share_completed(h));
            assert_eq!(propeller_bridge_get_challenge_counts(ptr::null_mut()), 0);
            propeller_bridge_free(ptr::null_mut());
            propeller_bridge_free(h);
        }
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn new_rejects_bad_tables() {
        let seen = Seen::default();
        let mut table = recording_table(&seen);
        table.release_bridge_resources = None;

        unsafe {
            assert!(propeller_bridge_new(ptr::null()).is_null());
            assert!(propeller_bridge_new(&table).is_null());
        }
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn new_uses_stub_sdk_off_device() {
        let seen = Seen::default();
        let table = recording_table(&seen);

        unsafe {
            let h = propeller_bridge_new(&table);
            assert!(!h.is_null());
            assert!(!propeller_bridge_initialize(h, c("g").as_ptr(), c("s").as_ptr(), ptr::null()));
            propeller_bridge_free(h);
        }
        assert_eq!(seen.calls(), vec!["release"]);
    }
}
