//! Offline session checks against the locally stored bearer token.
//!
//! Only the token's shape and `exp` claim are inspected; the signature is
//! never verified here; the backend re-checks the token on every call.

use crate::error::AppError;
use crate::storage::KeyValueStore;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "JWT_TOKEN";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Missing,
    Malformed,
    MalformedPayload,
    Expired { exp: i64 },
    Valid { exp: i64 },
}

impl TokenStatus {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Classifies a raw token without touching storage.
pub fn inspect_token(token: Option<&str>, now: i64) -> TokenStatus {
    let token = match token {
        Some(value) if !value.is_empty() => value,
        _ => return TokenStatus::Missing,
    };

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return TokenStatus::Malformed;
    }

    let exp = match decode_exp(parts[1]) {
        Ok(exp) => exp,
        Err(err) => {
            debug!(error = %err, "token payload could not be decoded");
            return TokenStatus::MalformedPayload;
        }
    };

    if exp <= now {
        TokenStatus::Expired { exp }
    } else {
        TokenStatus::Valid { exp }
    }
}

fn decode_exp(segment: &str) -> Result<i64, AppError> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
        .map_err(|err| AppError::invalid_data(format!("malformed payload: {err}")))?;
    let payload: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|err| AppError::invalid_data(format!("malformed payload: {err}")))?;
    let claims = payload
        .as_object()
        .ok_or_else(|| AppError::invalid_data("malformed payload: not an object"))?;

    Ok(claims.get("exp").map(claim_as_seconds).unwrap_or(0))
}

fn claim_as_seconds(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs as i64))
            .unwrap_or(0),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Checks the stored token, deleting it when it has expired.
pub fn check_session(store: &mut dyn KeyValueStore, now: i64) -> TokenStatus {
    let token = match store.get(TOKEN_KEY) {
        Ok(token) => token,
        Err(err) => {
            warn!(error = %err, "could not read stored session");
            return TokenStatus::Missing;
        }
    };

    let status = inspect_token(token.as_deref(), now);
    if let TokenStatus::Expired { exp } = status {
        info!(exp, "stored session expired, removing token");
        if let Err(err) = store.remove(TOKEN_KEY) {
            warn!(error = %err, "could not remove expired token");
        }
    }
    status
}

pub fn is_session_valid(store: &mut dyn KeyValueStore, now: i64) -> bool {
    check_session(store, now).is_valid()
}

pub fn is_session_valid_now(store: &mut dyn KeyValueStore) -> bool {
    is_session_valid(store, now_epoch_seconds())
}

pub fn now_epoch_seconds() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub fn store_token(store: &mut dyn KeyValueStore, token: &str) -> Result<(), AppError> {
    store.put(TOKEN_KEY, token)
}

pub fn stored_token(store: &dyn KeyValueStore) -> Result<Option<String>, AppError> {
    Ok(store.get(TOKEN_KEY)?.filter(|token| !token.is_empty()))
}

pub fn clear_session(store: &mut dyn KeyValueStore) -> Result<(), AppError> {
    store.remove(TOKEN_KEY)
}

#[cfg(test)]
pub(crate) fn token_with_payload(payload: &serde_json::Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}
