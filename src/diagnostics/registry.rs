/*!
 * Compilation Registry
 * Process-wide aggregation of per-compilation memory summaries
 *
 * Every segment provider with region logging enabled appends one record at
 * teardown. Providers tear down on many worker threads at once, so the list
 * sits behind a mutex and sequence numbers come from a single atomic.
 */

use super::region_log::RegionLogChain;
use crate::core::limits::REGISTRY_INITIAL_CAPACITY;
use crate::core::types::{SequenceNumber, Size};
use crate::memory::{MemoryError, MemoryResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

static NEXT_SEQUENCE_NUMBER: AtomicU32 = AtomicU32::new(0);

static GLOBAL_REGISTRY: OnceLock<Arc<CompilationRegistry>> = OnceLock::new();

/// Draw a fresh compilation sequence number, unique across the process
pub fn next_sequence_number() -> SequenceNumber {
    NEXT_SEQUENCE_NUMBER.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
}

/// One finished compilation
#[derive(Debug, Clone, Serialize)]
pub struct CompilationRecord {
    pub sequence: SequenceNumber,
    pub bytes_allocated: Size,
    pub regions: RegionLogChain,
}

impl CompilationRecord {
    pub fn new(sequence: SequenceNumber, bytes_allocated: Size, regions: RegionLogChain) -> Self {
        Self {
            sequence,
            bytes_allocated,
            regions,
        }
    }

    pub fn summary(&self) -> CompilationSummary {
        CompilationSummary {
            sequence: self.sequence,
            bytes_allocated: self.bytes_allocated,
            region_count: self.regions.len(),
        }
    }

    /// Header line followed by every region log in the chain
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Compilation {}, Memory usage: {}",
            self.sequence, self.bytes_allocated
        )?;
        self.regions.write_to(out)
    }
}

/// Record without its region logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationSummary {
    pub sequence: SequenceNumber,
    pub bytes_allocated: Size,
    pub region_count: usize,
}

/// Mutex-guarded list of finished compilations
#[derive(Debug, Default)]
pub struct CompilationRegistry {
    records: Mutex<Vec<CompilationRecord>>,
}

impl CompilationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Process-wide registry, created on first use
    pub fn global() -> Arc<CompilationRegistry> {
        Arc::clone(
            GLOBAL_REGISTRY
                .get_or_init(|| Arc::new(CompilationRegistry::with_capacity(REGISTRY_INITIAL_CAPACITY))),
        )
    }

    /// Process-wide registry if anything has created it yet
    pub fn try_global() -> Option<&'static Arc<CompilationRegistry>> {
        GLOBAL_REGISTRY.get()
    }

    /// Append a record. Growth is fallible so a teardown-time append can
    /// report allocation failure instead of aborting.
    pub fn register(&self, record: CompilationRecord) -> MemoryResult<()> {
        let mut records = self.records.lock();
        records
            .try_reserve(1)
            .map_err(|e| MemoryError::RegistryAppend {
                sequence: record.sequence,
                reason: e.to_string(),
            })?;
        debug!(
            sequence = record.sequence,
            bytes_allocated = record.bytes_allocated,
            regions = record.regions.len(),
            "Compilation registered"
        );
        records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn summaries(&self) -> Vec<CompilationSummary> {
        self.records.lock().iter().map(|r| r.summary()).collect()
    }

    /// Copy of the record with the given sequence number
    pub fn find(&self, sequence: SequenceNumber) -> Option<CompilationRecord> {
        self.records
            .lock()
            .iter()
            .find(|r| r.sequence == sequence)
            .cloned()
    }

    /// Remove and return every record
    pub fn drain(&self) -> Vec<CompilationRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Plain-text report, one block per compilation
    pub fn write_report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let records = self.records.lock();
        for record in records.iter() {
            record.write_to(out)?;
        }
        Ok(())
    }

    /// JSON array of every record including its region logs
    pub fn write_json<W: Write>(&self, out: W) -> io::Result<()> {
        let records = self.records.lock();
        serde_json::to_writer_pretty(out, &*records)?;
        Ok(())
    }
}

/// Print every compilation recorded in the process-wide registry.
/// Does nothing if no compilation ever registered.
pub fn print_all_compilations<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    match CompilationRegistry::try_global() {
        Some(registry) => registry.write_report(out),
        None => Ok(()),
    }
}
