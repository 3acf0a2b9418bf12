//! JWT inspection for display.
//!
//! Nothing here verifies a signature. A [`DecodedToken`] tells you what a
//! token *claims*, never whether those claims are genuine, and every rendering
//! says so.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

pub const UNVERIFIED_BANNER: &str = "Decoded for inspection only. Signature NOT verified.";
pub const NO_TOKEN: &str = "no token";

/// Claim keys with this prefix are namespaced custom claims.
pub const CUSTOM_CLAIM_PREFIX: &str = "https://";

/// Header, payload and raw signature of a three-segment token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
    pub signature: String,
}

/// A namespaced claim such as `https://example.com/roles`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomClaim {
    pub key: String,
    /// Last path segment of the key (`roles` above).
    pub short_name: String,
    pub value: Value,
}

/// Split `token` on `.` and decode the header and payload.
///
/// Returns `None` unless there are exactly three non-empty segments and the
/// first two are base64 (standard or URL-safe, padding optional) encoded JSON
/// objects. The signature segment is returned untouched.
pub fn decode(token: &str) -> Option<DecodedToken> {
    let mut segments = token.trim().split('.');
    let (header, payload, signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || [header, payload, signature].iter().any(|s| s.is_empty()) {
        return None;
    }

    Some(DecodedToken {
        header: decode_segment(header)?,
        payload: decode_segment(payload)?,
        signature: signature.to_string(),
    })
}

fn decode_segment(segment: &str) -> Option<Map<String, Value>> {
    let bytes = STANDARD_LENIENT
        .decode(segment)
        .or_else(|_| URL_SAFE_LENIENT.decode(segment))
        .ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

impl DecodedToken {
    /// Algorithm named in the header, if any.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Namespaced custom claims, sorted by key.
    pub fn custom_claims(&self) -> Vec<CustomClaim> {
        self.payload
            .iter()
            .filter(|(key, _)| key.starts_with(CUSTOM_CLAIM_PREFIX))
            .map(|(key, value)| CustomClaim {
                key: key.clone(),
                short_name: key.rsplit('/').next().unwrap_or(key).to_string(),
                value: value.clone(),
            })
            .collect()
    }
}

impl fmt::Display for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", UNVERIFIED_BANNER)?;
        writeln!(f, "Header:")?;
        writeln!(f, "{}", pretty(&self.header))?;
        writeln!(f, "Payload:")?;
        writeln!(f, "{}", pretty(&self.payload))?;
        writeln!(f, "Signature (raw, unverified):")?;
        write!(f, "{}", self.signature)?;

        let claims = self.custom_claims();
        if !claims.is_empty() {
            write!(f, "\nCustom claims:")?;
            for claim in claims {
                let value = match &claim.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                write!(f, "\n  {}: {}", claim.short_name, value)?;
            }
        }
        Ok(())
    }
}

fn pretty(map: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(map).unwrap_or_else(|_| Value::Object(map.clone()).to_string())
}

/// Human-readable view of any token string.
///
/// Decodable tokens are shown with the unverified banner; anything else is
/// echoed raw, and an empty input shows [`NO_TOKEN`].
pub fn render_inspection(token: &str) -> String {
    let token = token.trim();
    if token.is_empty() {
        return NO_TOKEN.to_string();
    }
    match decode(token) {
        Some(decoded) => decoded.to_string(),
        None => format!("Raw token (not decodable as a JWT):\n{}", token),
    }
}
