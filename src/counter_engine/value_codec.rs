use crate::counter_engine::constants::*;
use crate::counter_engine::error::{Error, Result};

/// Encodes a counter vector into a value-region image of exactly
/// `capacity` bytes.
///
/// Each integer is emitted as base-128 variable-byte groups, least
/// significant 7 bits first, every byte but the last tagged with
/// [`CONTINUATION_BIT`]. The stream is then padded with continuation-tagged
/// zero bytes to a multiple of [`GROUP_ALIGNMENT`]. If the padded stream is
/// shorter than the region, the region's final byte becomes a length
/// descriptor: high nibble [`DESCRIPTOR_TAG`], low nibble `len - 1`. A stream
/// that exactly fills the region carries no descriptor.
///
/// The 4-bit descriptor caps describable streams at [`MAX_DESCRIBED_LEN`]
/// bytes; anything longer that is not an exact fit fails with
/// [`Error::EncodingOverflow`] and nothing is written anywhere.
pub fn encode_counters(values: &[i32], capacity: usize) -> Result<Vec<u8>> {
    if values.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut stream = Vec::with_capacity(capacity);
    for &value in values {
        let mut v = value as u32;
        while v >= CONTINUATION_BIT as u32 {
            stream.push(v as u8 | CONTINUATION_BIT);
            v >>= 7;
        }
        stream.push(v as u8);
    }
    while stream.len() % GROUP_ALIGNMENT != 0 {
        stream.push(CONTINUATION_BIT);
    }

    let describable = stream.len() <= MAX_DESCRIBED_LEN;
    if stream.len() > capacity || (stream.len() < capacity && !describable) {
        return Err(Error::EncodingOverflow {
            encoded_len: stream.len(),
            capacity,
        });
    }

    let mut region = vec![0u8; capacity];
    region[..stream.len()].copy_from_slice(&stream);
    if stream.len() < capacity {
        region[capacity - 1] = DESCRIPTOR_TAG | (stream.len() - 1) as u8;
    }
    Ok(region)
}

/// Decodes a value region back into a counter vector.
///
/// An empty or all-zero region means the slot holds no data yet and decodes
/// to a zero vector of `field_count` entries. Otherwise the region's final
/// byte is inspected: a [`DESCRIPTOR_TAG`] high nibble declares the encoded
/// stream length (low nibble + 1); any other final byte means the whole
/// region is the stream.
///
/// Trailing alignment padding (pure continuation-tagged zero bytes) is
/// discarded; a trailing group that carries payload bits but never
/// terminates fails with [`Error::Codec`].
pub fn decode_counters(region: &[u8], field_count: usize) -> Result<Vec<i32>> {
    if region.is_empty() || region.iter().all(|&b| b == 0) {
        return Ok(vec![0; field_count]);
    }

    let descriptor = region[region.len() - 1];
    let stream = if descriptor & DESCRIPTOR_TAG == DESCRIPTOR_TAG {
        let declared = (descriptor & 0x0F) as usize + 1;
        if declared > region.len() {
            return Err(Error::Codec("length descriptor exceeds region"));
        }
        &region[..declared]
    } else {
        region
    };

    let mut counters = Vec::with_capacity(field_count);
    let mut acc: u32 = 0;
    let mut shift: u32 = 0;
    let mut pending = false;
    let mut pending_is_padding = true;

    for &byte in stream {
        if byte & CONTINUATION_BIT != 0 {
            if shift < 32 {
                acc |= ((byte & !CONTINUATION_BIT) as u32) << shift;
            }
            shift += 7;
            pending = true;
            if byte != CONTINUATION_BIT {
                pending_is_padding = false;
            }
        } else {
            if shift < 32 {
                acc |= (byte as u32) << shift;
            }
            counters.push(acc as i32);
            acc = 0;
            shift = 0;
            pending = false;
            pending_is_padding = true;
        }
    }

    if pending && !pending_is_padding {
        return Err(Error::Codec("unterminated variable-byte group"));
    }
    Ok(counters)
}
