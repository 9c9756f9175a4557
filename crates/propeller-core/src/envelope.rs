// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Match envelope decoding.
//
// The SDK hands over match parameters as a JSON object whose `options` field
// is itself a JSON document encoded as a string:
//
//     {"seed":"42","round":"3","options":"{\"gametype\":\"7\"}"}
//
// The double encoding is part of the wire format and is kept as-is. Numeric
// fields arrive as decimal strings; plain JSON integers are accepted too.
// Unknown fields at either level are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Bundle, KEY_MATCH_ID, KEY_PARAMS_JSON, KEY_TOURNAMENT_ID, MatchStartEvent};

const FIELD_SEED: &str = "seed";
const FIELD_ROUND: &str = "round";
const FIELD_OPTIONS: &str = "options";
const FIELD_GAME_TYPE: &str = "gametype";

/// Reasons a match envelope is rejected.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` is not a string")]
    NotAString(&'static str),

    #[error("field `{field}` is not a decimal integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("options: {0}")]
    Options(Box<EnvelopeError>),
}

/// Decode the parameters of a match the SDK wants played.
pub fn decode_match(
    tournament_id: &str,
    match_id: &str,
    params_json: &str,
) -> Result<MatchStartEvent, EnvelopeError> {
    let params = parse_object(params_json)?;

    let seed = integer_field::<i64>(&params, FIELD_SEED)?;
    let round = integer_field::<i32>(&params, FIELD_ROUND)?;

    let options_json = match params.get(FIELD_OPTIONS) {
        Some(Value::String(s)) => s,
        Some(_) => return Err(EnvelopeError::NotAString(FIELD_OPTIONS)),
        None => return Err(EnvelopeError::MissingField(FIELD_OPTIONS)),
    };
    let options = parse_object(options_json).map_err(|e| EnvelopeError::Options(Box::new(e)))?;
    let game_type = integer_field::<i32>(&options, FIELD_GAME_TYPE)
        .map_err(|e| EnvelopeError::Options(Box::new(e)))?;

    Ok(MatchStartEvent {
        tournament_id: tournament_id.to_owned(),
        match_id: match_id.to_owned(),
        seed,
        round,
        game_type,
    })
}

/// Decode a match bundle carrying `tournamentID`, `matchID` and `paramsJSON`.
pub fn decode_match_bundle(bundle: &Bundle) -> Result<MatchStartEvent, EnvelopeError> {
    let tournament_id = bundle_string(bundle, KEY_TOURNAMENT_ID)?;
    let match_id = bundle_string(bundle, KEY_MATCH_ID)?;
    let params_json = bundle_string(bundle, KEY_PARAMS_JSON)?;
    decode_match(tournament_id, match_id, params_json)
}

fn bundle_string<'a>(bundle: &'a Bundle, key: &'static str) -> Result<&'a str, EnvelopeError> {
    bundle
        .get(key)
        .ok_or(EnvelopeError::MissingField(key))?
        .as_str()
        .ok_or(EnvelopeError::NotAString(key))
}

fn parse_object(json: &str) -> Result<Map<String, Value>, EnvelopeError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => Ok(map),
        _ => Err(EnvelopeError::NotAnObject),
    }
}

fn integer_field<T>(object: &Map<String, Value>, field: &'static str) -> Result<T, EnvelopeError>
where
    T: std::str::FromStr + TryFrom<i64>,
{
    let invalid = |value: String| EnvelopeError::InvalidNumber { field, value };

    match object.get(field) {
        Some(Value::String(s)) => s.trim().parse::<T>().map_err(|_| invalid(s.clone())),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| invalid(n.to_string())),
        Some(_) => Err(EnvelopeError::NotAString(field)),
        None => Err(EnvelopeError::MissingField(field)),
    }
}
