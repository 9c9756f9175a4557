// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types exchanged between the SDK, the bridge and the native core.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Bag key holding the tournament id in match and match-result bundles.
pub const KEY_TOURNAMENT_ID: &str = "tournamentID";
/// Bag key holding the match id in match and match-result bundles.
pub const KEY_MATCH_ID: &str = "matchID";
/// Bag key holding the double-encoded match parameters.
pub const KEY_PARAMS_JSON: &str = "paramsJSON";
/// Bag key holding the score in a match-result bundle.
pub const KEY_SCORE: &str = "score";

/// Opaque string-keyed result bag attached to SDK failures.
pub type ResultBag = BTreeMap<String, String>;

/// Key/value bundle exchanged with the SDK (the `android.os.Bundle` shape).
pub type Bundle = BTreeMap<String, BundleValue>;

/// Value stored in a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleValue {
    String(String),
    Long(i64),
}

impl BundleValue {
    /// String payload, if this entry holds one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Long(_) => None,
        }
    }

    /// Integer payload, if this entry holds one.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::String(_) => None,
        }
    }
}

impl From<&str> for BundleValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for BundleValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for BundleValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

/// Screen orientation of the SDK activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Wire name understood by the SDK.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            other => Err(BridgeError::InvalidOrientation(other.to_owned())),
        }
    }
}

/// A finished match reported back to the SDK on relaunch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub tournament_id: String,
    pub match_id: String,
    pub score: i64,
}

impl MatchResult {
    pub fn new(tournament_id: impl Into<String>, match_id: impl Into<String>, score: i64) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            match_id: match_id.into(),
            score,
        }
    }

    /// Build the bundle the SDK expects for `launchWithMatchResult`.
    pub fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.insert(KEY_TOURNAMENT_ID.into(), self.tournament_id.as_str().into());
        bundle.insert(KEY_MATCH_ID.into(), self.match_id.as_str().into());
        bundle.insert(KEY_SCORE.into(), self.score.into());
        bundle
    }
}

/// A match the SDK asked the game to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStartEvent {
    pub tournament_id: String,
    pub match_id: String,
    /// Random seed shared by every player of the match.
    pub seed: i64,
    pub round: i32,
    pub game_type: i32,
}

/// Unrecoverable SDK session error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub message: String,
    pub result: ResultBag,
}

/// Kind of social action the SDK can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialKind {
    Login,
    Invite,
    Share,
}

impl SocialKind {
    pub const ALL: [SocialKind; 3] = [Self::Login, Self::Invite, Self::Share];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Invite => "invite",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for SocialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text of a social invite or share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMessage {
    pub subject: String,
    pub long_message: String,
    pub short_message: String,
    /// Where the game can be obtained.
    pub link_url: String,
}

/// A social action requested by the SDK, awaiting a completion from the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialRequest {
    /// `allow_cache == false` means cached credentials must not be used
    /// (e.g. when switching users).
    Login { allow_cache: bool },
    Invite(SocialMessage),
    Share(SocialMessage),
}

impl SocialRequest {
    pub fn kind(&self) -> SocialKind {
        match self {
            Self::Login { .. } => SocialKind::Login,
            Self::Invite(_) => SocialKind::Invite,
            Self::Share(_) => SocialKind::Share,
        }
    }
}
