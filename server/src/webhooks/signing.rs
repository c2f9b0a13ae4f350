//! HMAC-SHA256 Webhook Signatures
//!
//! The platform signs every callback body with the app secret and sends the
//! result as `X-Hub-Signature-256: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

/// Sign a payload with HMAC-SHA256 and return the hex-encoded signature.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Full header value (`sha256=<hex>`) for a payload.
pub fn signature_header_value(secret: &str, payload: &[u8]) -> String {
    format!("{SIGNATURE_PREFIX}{}", sign_payload(secret, payload))
}

/// Verify a `sha256=<hex>` header value against a payload.
///
/// The comparison runs in constant time.
pub fn verify_signature(secret: &str, payload: &[u8], header_value: &str) -> bool {
    let Some(hex_sig) = header_value.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let mut mac = mac_for(secret);
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let secret = "test_secret_12345";
        let payload = b"hello world";
        let header = signature_header_value(secret, payload);
        assert!(header.starts_with("sha256="));
        assert!(verify_signature(secret, payload, &header));
        assert!(!verify_signature("wrong_secret", payload, &header));
        assert!(!verify_signature(secret, b"wrong payload", &header));
    }

    #[test]
    fn rejects_malformed_header() {
        let secret = "s";
        let sig = sign_payload(secret, b"x");
        // Bare hex without the algorithm prefix
        assert!(!verify_signature(secret, b"x", &sig));
        assert!(!verify_signature(secret, b"x", "sha256=zz"));
        assert!(!verify_signature(secret, b"x", "sha1=abcd"));
        assert!(!verify_signature(secret, b"x", ""));
    }

    #[test]
    fn signature_is_stable_hex() {
        let sig = sign_payload("key", b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }
}
