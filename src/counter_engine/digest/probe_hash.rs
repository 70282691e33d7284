use xxhash_rust::xxh3::xxh3_64;

use super::home_hash::HASH_MASK;
use crate::counter_engine::error::{Error, Result};

/// Computes the 31-bit probe displacement for retry `step`.
///
/// A copy of the key is mutated before hashing: its final two bytes are
/// reinterpreted as a big-endian 16-bit counter, advanced by `step`
/// (wrapping), and written back. The mutated copy is then hashed with XXH3.
/// Because the result depends on `step`, every failed probe attempt yields a
/// different displacement, approximating double hashing while staying fully
/// deterministic and replayable for reads.
///
/// Keys shorter than two bytes cannot be mutated safely and fail with
/// [`Error::InvalidKeyLength`].
pub fn probe_hash(key: &[u8], step: u32) -> Result<u32> {
    if key.len() < 2 {
        return Err(Error::InvalidKeyLength {
            expected: 2,
            actual: key.len(),
        });
    }

    let mut probe_key = key.to_vec();
    let tail_at = probe_key.len() - 2;
    let tail = u16::from_be_bytes([probe_key[tail_at], probe_key[tail_at + 1]]);
    let advanced = tail.wrapping_add(step as u16);
    probe_key[tail_at..].copy_from_slice(&advanced.to_be_bytes());

    Ok((xxh3_64(&probe_key) as u32) & HASH_MASK)
}
