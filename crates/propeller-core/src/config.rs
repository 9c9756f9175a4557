// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SDK configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::Orientation;

/// Settings handed to the SDK at initialization.
///
/// Only `notification_token` and `orientation` may change after the SDK has
/// been initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub game_id: String,
    pub game_secret: String,
    /// JSON-encoded auxiliary data, forwarded untouched.
    pub aux_data: Option<String>,
    /// Use the SDK's test endpoints.
    pub sandbox: bool,
    /// Push registration id identifying this device.
    pub notification_token: Option<String>,
    pub orientation: Option<Orientation>,
}

impl SdkConfig {
    pub fn new(game_id: impl Into<String>, game_secret: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            game_secret: game_secret.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields the SDK requires before initialization.
    pub fn validate(&self) -> Result<()> {
        if self.game_id.is_empty() {
            return Err(BridgeError::InvalidArgument("game id is empty".into()));
        }
        if self.game_secret.is_empty() {
            return Err(BridgeError::InvalidArgument("game secret is empty".into()));
        }
        if let Some(aux) = self.aux_data.as_deref().filter(|aux| !aux.is_empty()) {
            serde_json::from_str::<serde_json::Value>(aux).map_err(|e| {
                BridgeError::InvalidArgument(format!("aux data is not valid JSON: {e}"))
            })?;
        }
        Ok(())
    }
}
