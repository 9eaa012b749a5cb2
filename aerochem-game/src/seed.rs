//! Deterministic random streams derived from a session seed.
//!
//! Each concern draws from its own stream so adding a draw in one place never
//! shifts the sequence seen by another.
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

use crate::constants::SESSION_ID_LEN;

pub(crate) const STREAM_PLACEMENT: &[u8] = b"placement";
pub(crate) const STREAM_EVENTS: &[u8] = b"events";

/// Derive an independent stream seed from the user-visible seed.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// A seeded RNG for one named stream.
#[must_use]
pub fn stream_rng(user_seed: u64, domain_tag: &[u8]) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(user_seed, domain_tag))
}

/// A fresh alphanumeric session identifier.
pub fn generate_session_code<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
