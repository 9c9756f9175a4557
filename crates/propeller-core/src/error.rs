// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Propeller bridge.

use thiserror::Error;

use crate::envelope::EnvelopeError;
use crate::types::SocialKind;

/// Top-level error type for all bridge operations.
///
/// None of these ever reach the SDK. The C ABI layer logs them and turns
/// them into `false` / `0` for the native core.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Lifecycle --
    #[error("SDK has not been initialized")]
    NotInitialized,

    #[error("an SDK session is already live")]
    SessionActive,

    #[error("bridge has been torn down")]
    TornDown,

    // -- Arguments --
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid orientation {0:?}: expected \"landscape\" or \"portrait\"")]
    InvalidOrientation(String),

    // -- Social flow --
    #[error("no pending social {0} request")]
    NoPendingSocial(SocialKind),

    // -- Payloads --
    #[error("match envelope rejected: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Platform(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
