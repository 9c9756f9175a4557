// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android SDK binding via JNI.
//
// The Java side is `org.grantoo.bestgame.NativeBridge`, a
// `PropellerSDKListener` subclass that forwards to
// `org.grantoo.lib.propeller.PropellerSDK` and declares the `native*`
// methods exported at the bottom of this file. One instance is created per
// `JniPropellerSdk` and passed to the SDK as the session listener; its
// upcalls are routed to the Rust listener registered by the last launch.
//
// Match envelopes are not decoded in Java: `nativeSdkCompletedWithMatch`
// receives the raw `android.os.Bundle`. The Java class ships with this crate
// under `android/`; see `android/ANDROID-INTEGRATION.md`.
//
// The session listener is dropped when the session ends (exit, match or
// failure) and when the bridge is torn down, so the static never keeps a
// finished bridge alive.

#![cfg(target_os = "android")]

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::sync::Arc;

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, info, warn};

use propeller_core::error::{BridgeError, Result};
use propeller_core::{
    Bundle, BundleValue, KEY_MATCH_ID, KEY_SCORE, KEY_TOURNAMENT_ID, Orientation, ResultBag,
    SocialMessage,
};

use crate::LOG_TARGET;
use crate::session::SessionSlot;
use crate::traits::{HostContext, PropellerSdk, SdkListener};

/// Java listener class, loaded through the activity's class loader.
const BRIDGE_CLASS: &str = "org.grantoo.bestgame.NativeBridge";

const SIG_STRING_VOID: &str = "(Ljava/lang/String;)V";
const SIG_STRING_BOOL: &str = "(Ljava/lang/String;)Z";

/// Listener for the current SDK session, reached by the JNI exports.
static SESSION: SessionSlot = SessionSlot::new();

fn jni_err(context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Platform(format!("{context}: {e}"))
}

/// Map a failed call, clearing any pending Java exception so the JVM stays
/// usable for the next call.
fn java_failure(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> BridgeError {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    jni_err(context, e)
}

fn load_class<'local>(env: &mut JNIEnv<'local>, context: *mut c_void, name: &str) -> Result<JClass<'local>> {
    if context.is_null() {
        return Err(BridgeError::Platform("Android context is null".into()));
    }
    // SAFETY: the NDK glue stores a global reference to the hosting Activity.
    let activity = unsafe { JObject::from_raw(context.cast()) };
    let loader = env
        .call_method(&activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(|e| java_failure(env, "getClassLoader", e))?;
    let j_name = env.new_string(name).map_err(|e| jni_err("new_string(class)", e))?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&j_name)],
        )
        .and_then(|v| v.l())
        .map_err(|e| java_failure(env, "loadClass", e))?;
    Ok(JClass::from(class))
}

fn java_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> jni::errors::Result<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    Ok(env.get_string(value)?.into())
}

/// Flatten an `android.os.Bundle` into strings with `String.valueOf`.
fn read_bag(env: &mut JNIEnv<'_>, bundle: &JObject<'_>) -> jni::errors::Result<ResultBag> {
    let mut bag = BTreeMap::new();
    if bundle.is_null() {
        return Ok(bag);
    }
    let keys = env.call_method(bundle, "keySet", "()Ljava/util/Set;", &[])?.l()?;
    let iter = env.call_method(&keys, "iterator", "()Ljava/util/Iterator;", &[])?.l()?;
    while env.call_method(&iter, "hasNext", "()Z", &[])?.z()? {
        let key = env.call_method(&iter, "next", "()Ljava/lang/Object;", &[])?.l()?;
        let value = env
            .call_method(bundle, "get", "(Ljava/lang/String;)Ljava/lang/Object;", &[JValue::Object(&key)])?
            .l()?;
        let text = env
            .call_static_method(
                "java/lang/String",
                "valueOf",
                "(Ljava/lang/Object;)Ljava/lang/String;",
                &[JValue::Object(&value)],
            )?
            .l()?;
        let key = JString::from(key);
        let text = JString::from(text);
        bag.insert(java_string(env, &key)?, java_string(env, &text)?);
        env.delete_local_ref(key)?;
        env.delete_local_ref(text)?;
        env.delete_local_ref(value)?;
    }
    Ok(bag)
}

fn read_message(
    env: &mut JNIEnv<'_>,
    subject: &JString<'_>,
    long_message: &JString<'_>,
    short_message: &JString<'_>,
    link_url: &JString<'_>,
) -> jni::errors::Result<SocialMessage> {
    Ok(SocialMessage {
        subject: java_string(env, subject)?,
        long_message: java_string(env, long_message)?,
        short_message: java_string(env, short_message)?,
        link_url: java_string(env, link_url)?,
    })
}

fn host_context() -> HostContext {
    HostContext::from_raw(ndk_context::android_context().context())
}

fn to_jboolean(value: bool) -> jboolean {
    if value { JNI_TRUE } else { JNI_FALSE }
}

/// Propeller SDK reached through the Java `NativeBridge` listener object.
pub struct JniPropellerSdk {
    vm: JavaVM,
    class: GlobalRef,
    listener: GlobalRef,
}

impl JniPropellerSdk {
    /// Attach to the process JVM and create the Java listener object.
    pub fn new() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` is the `JavaVM*` set by the NDK glue code and
        // stays valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|e| jni_err("JavaVM", e))?;

        let (class, listener) = {
            let mut env = vm
                .attach_current_thread_permanently()
                .map_err(|e| jni_err("attach_current_thread", e))?;
            let class = load_class(&mut env, ctx.context(), BRIDGE_CLASS)?;
            let object = env
                .new_object(&class, "()V", &[])
                .map_err(|e| java_failure(&mut env, "new NativeBridge", e))?;
            let class = env.new_global_ref(&class).map_err(|e| jni_err("new_global_ref(class)", e))?;
            let listener = env
                .new_global_ref(object)
                .map_err(|e| jni_err("new_global_ref(listener)", e))?;
            (class, listener)
        };

        info!("Android: Propeller SDK binding ready");
        Ok(Self { vm, class, listener })
    }

    /// Run `call` on an attached JNI environment with the Java class and
    /// listener object.
    fn invoke<T>(
        &self,
        what: &str,
        call: impl FnOnce(&mut JNIEnv<'_>, &JClass<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    ) -> Result<T> {
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("attach_current_thread", e))?;
        let class = <&JClass>::from(self.class.as_obj());
        let result = call(&mut env, class, self.listener.as_obj());
        result.map_err(|e| java_failure(&mut env, what, e))
    }

    /// Launch with `listener` as the session target. The slot is cleared
    /// again if the SDK stays hidden.
    fn start(
        &self,
        what: &str,
        listener: Arc<dyn SdkListener>,
        call: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<bool>,
    ) -> Result<bool> {
        SESSION.register(listener);
        let shown = self.invoke(what, |env, _, bridge| call(env, bridge));
        if !matches!(shown, Ok(true)) {
            SESSION.clear();
        }
        shown
    }
}

impl PropellerSdk for JniPropellerSdk {
    fn initialize(&self, game_id: &str, game_secret: &str, aux_data: Option<&str>) -> Result<()> {
        self.invoke("initialize", |env, class, _| {
            let j_id = env.new_string(game_id)?;
            let j_secret = env.new_string(game_secret)?;
            let j_aux = match aux_data {
                Some(aux) => JObject::from(env.new_string(aux)?),
                None => JObject::null(),
            };
            env.call_static_method(
                class,
                "initialize",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V",
                &[JValue::Object(&j_id), JValue::Object(&j_secret), JValue::Object(&j_aux)],
            )?
            .v()
        })
    }

    fn use_sandbox(&self) -> Result<()> {
        self.invoke("useSandbox", |env, class, _| {
            env.call_static_method(class, "useSandbox", "()V", &[])?.v()
        })
    }

    fn set_notification_token(&self, token: &str) -> Result<()> {
        self.invoke("setNotificationToken", |env, class, _| {
            let j_token = env.new_string(token)?;
            env.call_static_method(class, "setNotificationToken", SIG_STRING_VOID, &[JValue::Object(&j_token)])?
                .v()
        })
    }

    fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.invoke("setOrientation", |env, _, bridge| {
            let j_orientation = env.new_string(orientation.as_str())?;
            env.call_method(bridge, "setOrientation", SIG_STRING_VOID, &[JValue::Object(&j_orientation)])?
                .v()
        })
    }

    fn launch(&self, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.start("launch", listener, |env, bridge| {
            env.call_method(bridge, "launch", "()Z", &[])?.z()
        })
    }

    fn launch_with_tournament(&self, tournament_id: &str, listener: Arc<dyn SdkListener>) -> Result<bool> {
        self.start("launchWithTournament", listener, |env, bridge| {
            let j_id = env.new_string(tournament_id)?;
            env.call_method(bridge, "launchWithTournament", SIG_STRING_BOOL, &[JValue::Object(&j_id)])?
                .z()
        })
    }

    fn launch_with_match_result(&self, result: &Bundle, listener: Arc<dyn SdkListener>) -> Result<bool> {
        let text = |key: &'static str| {
            result
                .get(key)
                .and_then(BundleValue::as_str)
                .ok_or_else(|| BridgeError::InvalidArgument(format!("match result lacks {key}")))
        };
        let tournament_id = text(KEY_TOURNAMENT_ID)?;
        let match_id = text(KEY_MATCH_ID)?;
        let score = result
            .get(KEY_SCORE)
            .and_then(BundleValue::as_long)
            .ok_or_else(|| BridgeError::InvalidArgument(format!("match result lacks {KEY_SCORE}")))?;

        self.start("launchWithMatchResult", listener, |env, bridge| {
            let j_tournament = env.new_string(tournament_id)?;
            let j_match = env.new_string(match_id)?;
            env.call_method(
                bridge,
                "launchWithMatchResult",
                "(Ljava/lang/String;Ljava/lang/String;J)Z",
                &[
                    JValue::Object(&j_tournament),
                    JValue::Object(&j_match),
                    JValue::Long(score),
                ],
            )?
            .z()
        })
    }

    fn social_login_completed(&self, result: &str) -> Result<bool> {
        self.invoke("sdkSocialLoginCompleted", |env, _, bridge| {
            let j_result = env.new_string(result)?;
            env.call_method(bridge, "sdkSocialLoginCompleted", SIG_STRING_BOOL, &[JValue::Object(&j_result)])?
                .z()
        })
    }

    fn social_invite_completed(&self) -> Result<bool> {
        self.invoke("sdkSocialInviteCompleted", |env, _, bridge| {
            env.call_method(bridge, "sdkSocialInviteCompleted", "()Z", &[])?.z()
        })
    }

    fn social_share_completed(&self) -> Result<bool> {
        self.invoke("sdkSocialShareCompleted", |env, _, bridge| {
            env.call_method(bridge, "sdkSocialShareCompleted", "()Z", &[])?.z()
        })
    }

    fn sync_challenge_counts(&self) -> Result<()> {
        self.invoke("syncChallengeCounts", |env, _, bridge| {
            env.call_method(bridge, "syncChallengeCounts", "()V", &[])?.v()
        })
    }

    fn challenge_counts(&self) -> Result<i32> {
        self.invoke("getChallengeCounts", |env, _, bridge| {
            env.call_method(bridge, "getChallengeCounts", "()I", &[])?.i()
        })
    }

    fn detach(&self, listener: &Arc<dyn SdkListener>) {
        if SESSION.detach(listener) {
            debug!("Android: session listener detached");
        }
    }
}

// ---------------------------------------------------------------------------
// Java upcalls (org.grantoo.bestgame.NativeBridge native methods)
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkCompletedWithExit(
    _env: JNIEnv<'_>,
    _this: JObject<'_>,
) {
    SESSION.finish("completed_with_exit", |listener| listener.completed_with_exit());
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkCompletedWithMatch(
    mut env: JNIEnv<'_>,
    _this: JObject<'_>,
    details: JObject<'_>,
) {
    match read_bag(&mut env, &details) {
        Ok(bag) => {
            let bundle: Bundle = bag
                .into_iter()
                .map(|(key, value)| (key, BundleValue::String(value)))
                .collect();
            SESSION.finish("completed_with_match", |listener| listener.completed_with_match(&bundle));
        }
        Err(e) => {
            let e = java_failure(&mut env, "read match bundle", e);
            warn!(target: LOG_TARGET, error = %e, "dropping unreadable match bundle");
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkFailed(
    mut env: JNIEnv<'_>,
    _this: JObject<'_>,
    message: JString<'_>,
    result: JObject<'_>,
) {
    let read = java_string(&mut env, &message).and_then(|message| Ok((message, read_bag(&mut env, &result)?)));
    match read {
        Ok((message, bag)) => {
            SESSION.finish("failed", |listener| listener.failed(&message, &bag));
        }
        Err(e) => {
            let e = java_failure(&mut env, "read failure", e);
            warn!(target: LOG_TARGET, error = %e, "reporting failure without details");
            SESSION.finish("failed", |listener| listener.failed("", &ResultBag::new()));
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkSocialLogin(
    _env: JNIEnv<'_>,
    _this: JObject<'_>,
    allow_cache: jboolean,
) -> jboolean {
    let allow_cache = allow_cache != JNI_FALSE;
    let accepted = SESSION.deliver("social_login", |listener| {
        listener.social_login(&host_context(), allow_cache)
    });
    to_jboolean(accepted.unwrap_or(false))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkSocialInvite(
    mut env: JNIEnv<'_>,
    _this: JObject<'_>,
    subject: JString<'_>,
    long_message: JString<'_>,
    short_message: JString<'_>,
    link_url: JString<'_>,
) -> jboolean {
    let message = match read_message(&mut env, &subject, &long_message, &short_message, &link_url) {
        Ok(message) => message,
        Err(e) => {
            let e = java_failure(&mut env, "read invite", e);
            warn!(target: LOG_TARGET, error = %e, "declining unreadable social invite");
            return JNI_FALSE;
        }
    };
    let accepted = SESSION.deliver("social_invite", |listener| {
        listener.social_invite(&host_context(), &message)
    });
    to_jboolean(accepted.unwrap_or(false))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_grantoo_bestgame_NativeBridge_nativeSdkSocialShare(
    mut env: JNIEnv<'_>,
    _this: JObject<'_>,
    subject: JString<'_>,
    long_message: JString<'_>,
    short_message: JString<'_>,
    link_url: JString<'_>,
) -> jboolean {
    let message = match read_message(&mut env, &subject, &long_message, &short_message, &link_url) {
        Ok(message) => message,
        Err(e) => {
            let e = java_failure(&mut env, "read share", e);
            warn!(target: LOG_TARGET, error = %e, "declining unreadable social share");
            return JNI_FALSE;
        }
    };
    let accepted = SESSION.deliver("social_share", |listener| {
        listener.social_share(&host_context(), &message)
    });
    to_jboolean(accepted.unwrap_or(false))
}
