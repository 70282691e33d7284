use crate::counter_engine::digest::{home_hash, probe_hash};
use crate::counter_engine::error::{Error, Result};
use crate::counter_engine::slot_table::{SlotState, SlotTable};

/// Why a slot is being resolved. Writes may reclaim tombstones on their probe
/// path; reads walk straight through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Read,
    Write,
}

/// Resolves `key` to its authoritative slot offset.
///
/// The home slot is `home_hash(key) mod item_max_count`; each retry `step`
/// adds an independent displacement `probe_hash(key, step)` before reducing
/// modulo the table size. The walk stops at the first slot whose key region
/// matches `key` or is empty.
///
/// For [`Intent::Write`], the earliest tombstone on the path is remembered
/// but not returned immediately: the walk continues so a matching key
/// further along is still updated in place rather than duplicated. The
/// remembered tombstone wins over a later empty slot and over depth
/// exhaustion, which keeps the table dense across delete/insert cycles.
///
/// Errors: [`Error::InvalidKeyLength`] for a mis-sized key,
/// [`Error::NotFound`] when a read exhausts the depth limit, and
/// [`Error::WriteFailed`] when a write exhausts it with nothing reusable.
pub fn locate(table: &SlotTable, key: &[u8], intent: Intent) -> Result<usize> {
    let geometry = *table.geometry();
    if key.len() != geometry.key_length {
        return Err(Error::InvalidKeyLength {
            expected: geometry.key_length,
            actual: key.len(),
        });
    }

    let h1 = home_hash(key) as usize;
    let slot_size = geometry.slot_size();
    let mut offset = h1 % geometry.item_max_count * slot_size;
    let mut reclaimable: Option<usize> = None;

    // step 0 inspects the home slot; steps 1..=max_search_depth walk the
    // displacement chain
    for step in 0..=geometry.max_search_depth {
        if step > 0 {
            let displacement = probe_hash(key, step as u32)? as usize;
            offset = (h1 + displacement) % geometry.item_max_count * slot_size;
        }

        match table.state_at(offset) {
            SlotState::Occupied if table.key_at(offset) == key => return Ok(offset),
            SlotState::Occupied => {}
            SlotState::Empty => {
                return match (intent, reclaimable) {
                    (Intent::Write, Some(tombstone)) => Ok(tombstone),
                    _ => Ok(offset),
                };
            }
            SlotState::Tombstone => {
                if intent == Intent::Write && reclaimable.is_none() {
                    reclaimable = Some(offset);
                }
            }
        }
    }

    match (intent, reclaimable) {
        (Intent::Write, Some(tombstone)) => Ok(tombstone),
        (Intent::Write, None) => Err(Error::WriteFailed),
        (Intent::Read, _) => Err(Error::NotFound),
    }
}
