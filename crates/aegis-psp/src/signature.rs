//! Webhook signature verification (§4.4, §9 "Signature comparison").
//!
//! HMAC-SHA512 over the *raw, unmodified* request body, compared in constant time via `hmac`'s
//! `verify_slice` (which is itself constant-time, unlike a `==` on decoded bytes) to avoid timing
//! side channels.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// `signature` is the hex-encoded HMAC-SHA512 digest from the `x-paystack-signature` header.
pub fn verify(payload: &[u8], signature_hex: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_a_correctly_signed_payload() {
        let secret = "whsec_test";
        let payload = br#"{"event":"charge.success"}"#;

        let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        let digest = hex::encode(mac.finalize().into_bytes());

        assert!(verify(payload, &digest, secret));
    }

    #[test]
    fn rejects_a_mismatched_signature() {
        let payload = br#"{"event":"charge.success"}"#;
        assert!(!verify(payload, "deadbeef", "whsec_test"));
    }

    #[test]
    fn rejects_non_hex_signature() {
        let payload = b"body";
        assert!(!verify(payload, "not-hex!!", "secret"));
    }

    #[test]
    fn rejects_payload_tampering() {
        let secret = "whsec_test";
        let original = br#"{"event":"charge.success","amount":100}"#;
        let tampered = br#"{"event":"charge.success","amount":999}"#;

        let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(original);
        let digest = hex::encode(mac.finalize().into_bytes());

        assert!(!verify(tampered, &digest, secret));
    }
}
