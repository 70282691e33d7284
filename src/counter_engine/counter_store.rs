use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::counter_engine::error::{Error, Result};
use crate::counter_engine::field_schema::FieldSchema;
use crate::counter_engine::probe::{locate, Intent};
use crate::counter_engine::slot_table::{Geometry, SlotState, SlotTable};
use crate::counter_engine::value_codec::{decode_counters, encode_counters};

/// Name of the synthetic sum entry added to every snapshot.
const TOTAL_FIELD: &str = "Total";

/// Persistent, fixed-schema counter store over a memory-mapped slot table.
///
/// Each key owns one vector of `i32` counters, one per configured field,
/// packed into a bounded slot by the variable-byte codec. The mapped region
/// is process-wide shared mutable state; a single mutex is held for the full
/// probe + decode + mutate + encode + write sequence of every operation, so
/// connection handlers running in parallel never observe a torn slot.
pub struct CounterStore {
    table: Mutex<SlotTable>,
    schema: FieldSchema,
    geometry: Geometry,
    overflow_discards: AtomicU64,
    path: PathBuf,
}

impl CounterStore {
    /// Opens (or creates) the backing file and maps it for the process
    /// lifetime. Startup failures are meant to be fatal: nothing should
    /// serve requests against a store that failed to map.
    pub fn open(path: &Path, geometry: Geometry, schema: FieldSchema) -> Result<Self> {
        let table = SlotTable::open(path, geometry)?;
        Ok(Self {
            table: Mutex::new(table),
            schema,
            geometry,
            overflow_discards: AtomicU64::new(0),
            path: path.to_path_buf(),
        })
    }

    #[inline]
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seeds or replaces the full counter vector for a key.
    ///
    /// This is the only operation that allocates: the probe walk runs with
    /// write intent, so a first write lands in a fresh slot and later writes
    /// prefer reclaiming a tombstone on the path. The vector is encoded
    /// before the slot is touched; on [`Error::EncodingOverflow`] or
    /// [`Error::WriteFailed`] the table is left unmodified.
    pub fn put(&self, key: &[u8], values: &[i32]) -> Result<()> {
        let mut counters = values.to_vec();
        counters.resize(self.schema.len(), 0);

        let mut table = self.table.lock().unwrap();
        let offset = locate(&table, key, Intent::Write)?;
        let region = encode_counters(&counters, self.geometry.max_value_length)?;
        table.write_entry(offset, key, &region);
        Ok(())
    }

    /// Adds `delta` to one field of an existing key.
    ///
    /// A key that does not resolve to an occupied slot is left untouched and
    /// the call still reports success; increments never allocate. When the
    /// updated vector no longer fits its slot, the value region is reset to
    /// all-zero bytes instead of failing the caller; every such discard is
    /// counted (see [`Self::overflow_discards`]) and logged, since the loss
    /// is otherwise invisible at the protocol level.
    pub fn increment(&self, key: &[u8], field_index: usize, delta: i32) -> Result<()> {
        let mut table = self.table.lock().unwrap();

        let offset = match locate(&table, key, Intent::Read) {
            Ok(offset) => offset,
            Err(Error::NotFound) => {
                debug!("increment for unresolvable key ignored");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if table.state_at(offset) != SlotState::Occupied {
            debug!("increment for absent key ignored");
            return Ok(());
        }

        let mut counters = decode_counters(table.value_at(offset), self.schema.len())?;
        counters.resize(self.schema.len(), 0);
        if field_index >= counters.len() {
            warn!(field_index, "increment for out-of-range field ignored");
            return Ok(());
        }
        counters[field_index] = counters[field_index].wrapping_add(delta);

        // Write back at the offset the lookup already resolved; no re-probe.
        match encode_counters(&counters, self.geometry.max_value_length) {
            Ok(region) => table.write_value(offset, &region),
            Err(Error::EncodingOverflow { encoded_len, capacity }) => {
                self.overflow_discards.fetch_add(1, Ordering::Relaxed);
                warn!(
                    encoded_len,
                    capacity, "counter vector no longer fits its slot; value reset"
                );
                table.clear_value(offset);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Returns every configured field's count for `key` plus a synthetic
    /// `"Total"` entry holding their sum.
    ///
    /// A key that does not resolve reads as the all-zero vector. With
    /// `reset_after_read` the resolved slot's value region is cleared to
    /// all-zero bytes under the same lock acquisition (the slot stays
    /// occupied; only its counters reset).
    pub fn snapshot(&self, key: &[u8], reset_after_read: bool) -> Result<BTreeMap<String, i64>> {
        let mut table = self.table.lock().unwrap();

        let resolved = match locate(&table, key, Intent::Read) {
            Ok(offset) => Some(offset),
            Err(Error::NotFound) => None,
            Err(e) => return Err(e),
        };

        let counters = match resolved {
            Some(offset) => decode_counters(table.value_at(offset), self.schema.len())?,
            None => vec![0; self.schema.len()],
        };

        if reset_after_read {
            if let Some(offset) = resolved {
                table.clear_value(offset);
            }
        }
        drop(table);

        Ok(self.totals_for(&counters))
    }

    /// The all-zero snapshot, as reported for keys that hold no data.
    pub fn empty_snapshot(&self) -> BTreeMap<String, i64> {
        self.totals_for(&[])
    }

    /// Tombstones the slot holding `key`.
    ///
    /// Only an exact occupied match is deleted; an empty landing or an
    /// exhausted probe walk both fail with [`Error::NotFound`]. The value
    /// region keeps its stale bytes; a tombstoned key region no longer
    /// matches any lookup, and the slot becomes reclaimable by later writes.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let mut table = self.table.lock().unwrap();
        let offset = locate(&table, key, Intent::Read)?;
        if table.state_at(offset) != SlotState::Occupied {
            return Err(Error::NotFound);
        }
        table.write_tombstone(offset);
        Ok(())
    }

    /// Number of occupied slots, scanned from the mapped table.
    pub fn count(&self) -> usize {
        let table = self.table.lock().unwrap();
        (0..self.geometry.item_max_count)
            .filter(|&index| table.state_at(table.slot_offset(index)) == SlotState::Occupied)
            .count()
    }

    /// How many increments were discarded because their re-encoded vector no
    /// longer fit the slot. Monotonic for the process lifetime.
    pub fn overflow_discards(&self) -> u64 {
        self.overflow_discards.load(Ordering::Relaxed)
    }

    /// Asks the OS to write dirty table pages back to the backing file.
    pub fn flush(&self) -> Result<()> {
        self.table.lock().unwrap().flush().map_err(Error::StorageInit)
    }

    fn totals_for(&self, counters: &[i32]) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        let mut total: i64 = 0;
        for (index, name) in self.schema.names().iter().enumerate() {
            let count = counters.get(index).copied().unwrap_or(0) as i64;
            totals.insert(name.clone(), count);
            total += count;
        }
        totals.insert(TOTAL_FIELD.to_string(), total);
        totals
    }
}
