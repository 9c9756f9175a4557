// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Propeller bridge: adapter between the Propeller tournament SDK and a
// native game core.
//
// The SDK talks to the bridge through the `SdkListener` capability and is
// reached through `PropellerSdk`. The native core is reached through a C ABI
// function table (`transport`) and drives the bridge through the `ffi` entry
// points. On Android the SDK binding goes through JNI; elsewhere a stub SDK
// keeps the crate buildable for desktop and CI.

pub mod bridge;
pub mod dispatcher;
pub mod facade;
pub mod ffi;
pub mod lifetime;
pub mod logging;
pub mod session;
pub mod social;
pub mod traits;
pub mod transport;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use propeller_core::error::Result;

pub use bridge::NativeBridge;
pub use traits::{HostContext, NativeCore, PropellerSdk, SdkListener};
pub use transport::{BagEntry, CallbackTable, NativeCoreTable};

/// Log target for diagnostics about SDK traffic.
pub const LOG_TARGET: &str = "propeller";

/// Builds the SDK binding for the target operating system.
pub fn platform_sdk() -> Result<Arc<dyn PropellerSdk>> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni` calls into org.grantoo.lib.propeller.PropellerSDK.
        Ok(Arc::new(android::JniPropellerSdk::new()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: every SDK operation reports PlatformUnavailable.
        Ok(Arc::new(stub::StubSdk))
    }
}
