//! HMAC-SHA512 request signer
//!
//! Produces the lowercase hex digest the gateway appends as `vnp_SecureHash`.
//! Deterministic: same key and message always yield the same digest.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Sign a canonical message with the shared secret
pub fn sign(secret_key: &str, message: &str) -> String {
    let mut mac = HmacSha512::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a claimed digest in constant time.
///
/// Comparison is case-insensitive on the hex since some gateways return
/// uppercase digests.
pub fn verify(secret_key: &str, message: &str, claimed_hex: &str) -> bool {
    let expected = sign(secret_key, message);
    let claimed = claimed_hex.to_ascii_lowercase();
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}
