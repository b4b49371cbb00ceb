// Bearer credential handling for the AV Ops console
// Token capture from login responses, masking, and JWT claim inspection

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Development placeholder used until the user sets a token or logs in.
pub const DEFAULT_TOKEN: &str = "dev-placeholder-token";

/// Response field holding the credential returned by the login endpoint.
pub const ACCESS_TOKEN_FIELD: &str = "access_token";

/// Pull the access token out of a login response body.
pub fn extract_access_token(body: &Value) -> Option<String> {
    body.get(ACCESS_TOKEN_FIELD)
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Short form for display: first 18 and last 10 characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 28 {
        let head: String = chars.iter().take(4).collect();
        return format!("{}…", head);
    }
    let head: String = chars[..18].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Claims read from a JWT payload, when the token is one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Decode the payload of a JWT. The signature is not checked.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    // base64url without padding
    let decoded = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let json: Value = serde_json::from_slice(&decoded).ok()?;

    let subject = json.get("sub").and_then(|sub| match sub {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let expires_at = json
        .get("exp")
        .and_then(|exp| exp.as_i64())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

    Some(TokenClaims { subject, expires_at })
}
