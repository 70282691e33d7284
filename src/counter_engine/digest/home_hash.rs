/// Mask clearing the top bit so slot arithmetic stays inside 31 bits.
pub const HASH_MASK: u32 = 0x7FFF_FFFF;

/// Computes the 31-bit home hash for a key using CRC32 (IEEE).
///
/// The home hash selects the first slot a key is looked up in; the probe
/// displacement comes from an independent function
/// ([`probe_hash`](super::probe_hash)). CRC32 is hardware-accelerated where
/// available, depends on every input byte, and distributes byte-similar keys
/// well, which keeps probe chains short.
#[inline]
pub fn home_hash(key: &[u8]) -> u32 {
    crc32fast::hash(key) & HASH_MASK
}
