//! Compact JWS parsing: `header.payload.signature`.
//!
//! Parsing only establishes structure. Nothing here is trusted until the signature
//! verifier has accepted the exact bytes this module split apart.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::services::auth::claims::Claims;

/// Default size cap; tokens larger than the configured cap are rejected before any decoding.
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedToken {
    #[error("token exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("expected 3 segments")]
    SegmentCount,
    #[error("{0} segment is not base64url")]
    Base64(&'static str),
    #[error("{0} segment is not a JSON object")]
    Json(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
}

/// A structurally valid, not yet verified token.
///
/// Borrows the raw input so the signing input stays byte-identical to what was sent.
pub struct ParsedToken<'a> {
    raw: &'a str,
    pub header: TokenHeader,
    pub claims: Claims,
}

// The raw token is a bearer credential; keep it out of Debug output.
impl fmt::Debug for ParsedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

impl<'a> ParsedToken<'a> {
    pub fn parse(raw: &'a str, max_bytes: usize) -> Result<Self, MalformedToken> {
        if raw.len() > max_bytes {
            return Err(MalformedToken::TooLarge { limit: max_bytes });
        }

        let mut parts = raw.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(MalformedToken::SegmentCount);
        };

        let header_bytes = decode_segment(header_b64, "header")?;
        let payload_bytes = decode_segment(payload_b64, "payload")?;
        // The signature itself is checked by the verifier; here we only require it to be well-formed.
        decode_segment(signature_b64, "signature")?;

        let header: TokenHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| MalformedToken::Json("header"))?;
        let claims: Claims =
            serde_json::from_slice(&payload_bytes).map_err(|_| MalformedToken::Json("payload"))?;

        Ok(Self {
            raw,
            header,
            claims,
        })
    }

    /// The full token as received.
    pub fn raw(&self) -> &'a str {
        self.raw
    }
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, MalformedToken> {
    if segment.is_empty() {
        return Err(MalformedToken::Base64(name));
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| MalformedToken::Base64(name))
}
