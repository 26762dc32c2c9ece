//! Payload signatures
//!
//! Receivers authenticate webhook bodies via an HMAC-SHA256 signature in the
//! `x-hub-signature-256` header, keyed by the shared secret. The signed
//! bytes are exactly the request body, so producers must serialize payloads
//! with a stable key order.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Header carrying the body signature on every webhook POST.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

type HmacSha256 = Hmac<Sha256>;

/// `"sha256=" + lowercase-hex(HMAC-SHA256(key=secret, message=payload))`.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a received signature against the payload.
pub fn verify(payload: &[u8], secret: &str, signature: &str) -> bool {
    sign(payload, secret)
        .as_bytes()
        .ct_eq(signature.as_bytes())
        .into()
}
