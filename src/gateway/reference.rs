//! Transaction reference generation

use rand::Rng;

/// Generate an 8-digit numeric reference.
///
/// Uniqueness is probabilistic; the gateway contract puts collision handling
/// on the merchant and none is attempted here.
pub fn random_reference() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
