mod format_bytes;
pub use format_bytes::format_bytes;

mod hex;
pub use hex::{decode_hex, encode_hex};
