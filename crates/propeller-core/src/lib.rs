// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Propeller bridge: core types, configuration, errors and the match
// envelope decoder shared by the platform bridge.

pub mod config;
pub mod envelope;
pub mod error;
pub mod types;

pub use config::SdkConfig;
pub use envelope::{EnvelopeError, decode_match, decode_match_bundle};
pub use error::{BridgeError, Result};
pub use types::*;
