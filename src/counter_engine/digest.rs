mod home_hash;
pub use home_hash::{home_hash, HASH_MASK};

mod probe_hash;
pub use probe_hash::probe_hash;
