//! GitHub webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA1 over the raw request body and
//! sends the digest in the `X-Hub-Signature` header as `<algorithm>=<hex>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the sender's digest.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Ways a delivery can fail authentication.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature header")]
    MissingSignature,

    #[error("malformed signature header, expected <algorithm>=<hex digest>")]
    MalformedHeader,

    #[error("signature digest is not valid hex: {0}")]
    MalformedEncoding(#[from] hex::FromHexError),

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook delivery against the shared secret.
///
/// `body` must be the exact bytes the sender signed, not a re-serialized
/// form. Pure function: no side effects, same result for same inputs.
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::MissingSignature)?;

    // "sha1=<hex>"; the digest comparison is what authenticates, the
    // algorithm label is not checked separately.
    let (_algorithm, digest) = header
        .split_once('=')
        .ok_or(SignatureError::MalformedHeader)?;

    let claimed = hex::decode(digest)?;

    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    if constant_time_compare(&claimed, computed.as_slice()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Constant-time byte comparison to prevent timing attacks.
///
/// Must not short-circuit on the first differing byte.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
