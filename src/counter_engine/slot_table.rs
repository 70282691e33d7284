use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::info;

use crate::counter_engine::constants::{EMPTY_KEY_BYTE, TOMBSTONE_KEY_BYTE};
use crate::counter_engine::error::{Error, Result};

/// Fixed geometry of the mapped slot array.
///
/// Slot `i` occupies file offset `i * slot_size()`; the file holds exactly
/// `item_max_count` slots and is never resized, compacted, or rehashed. The
/// geometry is not stored in the file itself; any reader must know it out of
/// band to interpret the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Raw key width in bytes.
    pub key_length: usize,
    /// Value region width in bytes.
    pub max_value_length: usize,
    /// Total slot count; a hard ceiling on stored keys.
    pub item_max_count: usize,
    /// Upper bound on displacement steps during a probe walk.
    pub max_search_depth: usize,
}

impl Geometry {
    /// Bytes occupied by one slot: key region followed by value region.
    #[inline]
    pub fn slot_size(&self) -> usize {
        self.key_length + self.max_value_length
    }

    /// Total backing-file size in bytes.
    #[inline]
    pub fn file_size(&self) -> usize {
        self.item_max_count * self.slot_size()
    }
}

/// One of the three states a slot's key region can be in.
///
/// The state is derived from the key region's bytes only; the value region
/// is never consulted. A real key whose bytes happen to equal one of the
/// sentinel patterns is indistinguishable from that sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// All-zero key region; the slot has never held a key.
    Empty,
    /// All-`0xFF` key region; the slot's key was deleted and the slot may be
    /// reclaimed by a later write.
    Tombstone,
    /// Any other byte pattern; the key region holds a stored key.
    Occupied,
}

/// The memory-mapped array of fixed-size slots.
///
/// This is the only type that touches the mapped bytes directly; everything
/// above it works in terms of slot offsets, [`SlotState`], and key/value
/// regions. No synchronization happens at this level; callers serialize
/// access (see [`CounterStore`](crate::counter_engine::CounterStore)).
pub struct SlotTable {
    map: MmapMut,
    geometry: Geometry,
}

impl SlotTable {
    /// Opens the backing file and maps it read-write.
    ///
    /// A missing file is created zero-filled at the full table size. An
    /// existing file is mapped as-is: its bytes are reinterpreted under the
    /// current geometry without any structural validation (a short file is
    /// grown so every slot offset stays inside the mapping).
    pub fn open(path: &Path, geometry: Geometry) -> Result<Self> {
        validate_geometry(&geometry)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(Error::StorageInit)?;

        let expected = geometry.file_size() as u64;
        let current = file.metadata().map_err(Error::StorageInit)?.len();
        if current < expected {
            file.set_len(expected).map_err(Error::StorageInit)?;
            info!(
                path = %path.display(),
                slots = geometry.item_max_count,
                bytes = expected,
                "sized slot table"
            );
        }

        let map = unsafe { MmapMut::map_mut(&file).map_err(Error::StorageInit)? };
        Ok(Self { map, geometry })
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Byte offset of slot `index`.
    #[inline]
    pub fn slot_offset(&self, index: usize) -> usize {
        index * self.geometry.slot_size()
    }

    /// Classifies the slot at `offset` from its key region.
    ///
    /// Single authority for the three-state classification; nothing else in
    /// the crate re-derives state from raw bytes.
    pub fn state_at(&self, offset: usize) -> SlotState {
        let key = self.key_at(offset);
        if key.iter().all(|&b| b == EMPTY_KEY_BYTE) {
            SlotState::Empty
        } else if key.iter().all(|&b| b == TOMBSTONE_KEY_BYTE) {
            SlotState::Tombstone
        } else {
            SlotState::Occupied
        }
    }

    /// Key region of the slot at `offset`.
    #[inline]
    pub fn key_at(&self, offset: usize) -> &[u8] {
        &self.map[offset..offset + self.geometry.key_length]
    }

    /// Value region of the slot at `offset`.
    #[inline]
    pub fn value_at(&self, offset: usize) -> &[u8] {
        let start = offset + self.geometry.key_length;
        &self.map[start..start + self.geometry.max_value_length]
    }

    /// Writes a full slot: key region plus encoded value region.
    pub fn write_entry(&mut self, offset: usize, key: &[u8], value_region: &[u8]) {
        debug_assert_eq!(key.len(), self.geometry.key_length);
        debug_assert_eq!(value_region.len(), self.geometry.max_value_length);
        self.map[offset..offset + key.len()].copy_from_slice(key);
        self.write_value(offset, value_region);
    }

    /// Overwrites only the value region of the slot at `offset`.
    pub fn write_value(&mut self, offset: usize, value_region: &[u8]) {
        debug_assert_eq!(value_region.len(), self.geometry.max_value_length);
        let start = offset + self.geometry.key_length;
        self.map[start..start + value_region.len()].copy_from_slice(value_region);
    }

    /// Resets the value region of the slot at `offset` to all-zero bytes
    /// ("no data yet"). The key region is untouched.
    pub fn clear_value(&mut self, offset: usize) {
        let start = offset + self.geometry.key_length;
        self.map[start..start + self.geometry.max_value_length].fill(0);
    }

    /// Overwrites the key region at `offset` with the tombstone pattern.
    /// The value region is left as-is; a tombstoned key no longer matches
    /// any lookup, so its stale value bytes are unreachable.
    pub fn write_tombstone(&mut self, offset: usize) {
        self.map[offset..offset + self.geometry.key_length].fill(TOMBSTONE_KEY_BYTE);
    }

    /// Asks the OS to write dirty pages back to the file.
    pub fn flush(&self) -> io::Result<()> {
        self.map.flush()
    }
}

fn validate_geometry(geometry: &Geometry) -> Result<()> {
    if geometry.key_length < 2
        || geometry.max_value_length == 0
        || geometry.item_max_count == 0
        || geometry.max_search_depth == 0
    {
        return Err(Error::StorageInit(io::Error::new(
            io::ErrorKind::InvalidInput,
            "table geometry fields must be positive (key length at least 2)",
        )));
    }
    Ok(())
}
