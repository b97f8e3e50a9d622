//! Payment signature computation and verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use bazaar_core::{OrderId, PaymentId};

use super::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature for a payment.
///
/// # Errors
///
/// Returns `GatewayError::Config` if the key cannot initialize the MAC.
pub fn sign(order_id: &OrderId, payment_id: &PaymentId, secret: &str) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Config(e.to_string()))?;

    mac.update(order_id.as_str().as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_str().as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a payment signature in constant time.
///
/// # Errors
///
/// Returns `GatewayError::InvalidSignature` on any mismatch, including a
/// malformed signature. No further detail is given.
pub fn verify(
    order_id: &OrderId,
    payment_id: &PaymentId,
    signature: &str,
    secret: &str,
) -> Result<(), GatewayError> {
    let expected = sign(order_id, payment_id, secret).map_err(|_| GatewayError::InvalidSignature)?;

    if !constant_time_compare(&expected, signature.trim()) {
        return Err(GatewayError::InvalidSignature);
    }

    Ok(())
}

/// Constant-time string comparison to prevent timing attacks.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret_value";

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_sign_matches_reference_hmac() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let order = OrderId::new("The quick brown fox");
        let payment = PaymentId::new("jumps over the lazy dog");
        let sig = sign(&order, &payment, "key").unwrap();

        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"The quick brown fox|jumps over the lazy dog");
        assert_eq!(sig, hex::encode(mac.finalize().into_bytes()));
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let order = OrderId::new("order_NQ1");
        let payment = PaymentId::new("pay_NQ1");
        let sig = sign(&order, &payment, SECRET).unwrap();

        assert!(verify(&order, &payment, &sig, SECRET).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let order = OrderId::new("order_NQ1");
        let payment = PaymentId::new("pay_NQ1");
        let sig = sign(&order, &payment, SECRET).unwrap();

        let other_payment = PaymentId::new("pay_NQ2");
        assert!(matches!(
            verify(&order, &other_payment, &sig, SECRET),
            Err(GatewayError::InvalidSignature)
        ));
        assert!(verify(&order, &payment, &sig, "another_secret").is_err());
        assert!(verify(&order, &payment, "deadbeef", SECRET).is_err());
        assert!(verify(&order, &payment, "", SECRET).is_err());
    }
}
