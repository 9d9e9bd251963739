use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::storage::{SessionStorage, AUTH_TOKEN_KEY};

/// Claims we care about in the login token. The signature is the
/// backend's business; the client only reads the expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>, // User ID
    #[serde(default)]
    pub exp: Option<i64>, // Expiration time
}

/// Decode claims without verifying the signature.
/// Returns None for tokens that are not JWTs.
pub fn read_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// True when the token carries an `exp` claim at or before `now`
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    read_claims(token)
        .and_then(|claims| claims.exp)
        .is_some_and(|exp| exp <= now.timestamp())
}

/// The stored bearer token, unless it has already expired
pub fn usable_token(storage: &dyn SessionStorage, now: DateTime<Utc>) -> Option<String> {
    let token = storage.get(AUTH_TOKEN_KEY)?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if is_expired_at(token, now) {
        tracing::debug!("Stored auth token has expired, continuing anonymously");
        return None;
    }
    Some(token.to_string())
}
