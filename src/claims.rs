//! Diagnostic decoding of identity-token claims.
//!
//! Claim reading is diagnostic only and must never block sign-in: any
//! malformed input degrades to the unknown view instead of propagating an
//! error. Verifying the token's signature is the backend's job.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;

/// Claims decoded from an identity token's payload segment.
///
/// All fields are optional; the "unknown" view (all `None`) is returned for
/// tokens that cannot be decoded. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    pub aud: Option<String>,
    pub iss: Option<String>,
    /// Expiry rendered as `%Y-%m-%d %H:%M:%S UTC`.
    pub exp: Option<String>,
    pub email: Option<String>,
}

impl IdentityClaims {
    /// The degraded view returned for tokens that do not decode.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.aud.is_none() && self.iss.is_none() && self.exp.is_none() && self.email.is_none()
    }
}

impl fmt::Display for IdentityClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aud={} iss={} exp={} email={}",
            self.aud.as_deref().unwrap_or("unknown"),
            self.iss.as_deref().unwrap_or("unknown"),
            self.exp.as_deref().unwrap_or("unknown"),
            self.email.as_deref().unwrap_or("unknown"),
        )
    }
}

/// Decode the claims embedded in `identity_token` without verifying it.
///
/// Returns [`IdentityClaims::unknown`] for anything that does not decode:
/// fewer than two dot-segments, invalid base64url, invalid JSON.
pub fn read_claims(identity_token: &str) -> IdentityClaims {
    let mut segments = identity_token.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return IdentityClaims::unknown();
    };
    decode_payload(payload).unwrap_or_else(IdentityClaims::unknown)
}

fn decode_payload(segment: &str) -> Option<IdentityClaims> {
    // Padding-tolerant: strip any trailing `=` before the no-pad decode.
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    let doc: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let text = |key: &str| doc.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let exp = doc.get("exp").and_then(|v| v.as_i64()).and_then(format_epoch);
    Some(IdentityClaims {
        aud: text("aud"),
        iss: text("iss"),
        exp,
        email: text("email"),
    })
}

fn format_epoch(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use base64::Engine;
    use pretty_assertions::assert_eq;

    fn token_with_payload(payload: &str) -> String {
        format!("header.{}", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn decodes_well_formed_claims() {
        let token =
            token_with_payload(r#"{"aud":"X","iss":"Y","exp":1700000000,"email":"u@x.com"}"#);
        let claims = read_claims(&token);
        assert_eq!(claims.aud.as_deref(), Some("X"));
        assert_eq!(claims.iss.as_deref(), Some("Y"));
        assert_eq!(claims.exp.as_deref(), Some("2023-11-14 22:13:20 UTC"));
        assert_eq!(claims.email.as_deref(), Some("u@x.com"));
    }

    #[test]
    fn tolerates_padded_base64() {
        let payload = URL_SAFE.encode(r#"{"aud":"X"}"#);
        let claims = read_claims(&format!("h.{payload}"));
        assert_eq!(claims.aud.as_deref(), Some("X"));
    }

    #[test]
    fn single_segment_degrades_to_unknown() {
        assert!(read_claims("not-a-jwt").is_unknown());
    }

    #[test]
    fn empty_input_degrades_to_unknown() {
        assert!(read_claims("").is_unknown());
    }

    #[test]
    fn invalid_base64_degrades_to_unknown() {
        assert!(read_claims("a.!!!.c").is_unknown());
    }

    #[test]
    fn invalid_json_degrades_to_unknown() {
        let token = token_with_payload("not json");
        assert!(read_claims(&token).is_unknown());
    }

    #[test]
    fn missing_fields_stay_unresolved() {
        let token = token_with_payload(r#"{"iss":"Y"}"#);
        let claims = read_claims(&token);
        assert!(claims.aud.is_none());
        assert!(claims.email.is_none());
        assert_eq!(claims.iss.as_deref(), Some("Y"));
    }

    #[test]
    fn non_numeric_exp_stays_unresolved() {
        let token = token_with_payload(r#"{"exp":"soon","aud":"X"}"#);
        let claims = read_claims(&token);
        assert!(claims.exp.is_none());
        assert_eq!(claims.aud.as_deref(), Some("X"));
    }

    #[test]
    fn display_renders_unknown_fields() {
        let rendered = IdentityClaims::unknown().to_string();
        assert_eq!(rendered, "aud=unknown iss=unknown exp=unknown email=unknown");
    }
}
