/*!
 * Provider Diagnostics
 * Region log chain, event timestamps, and registration at teardown
 */

use super::SegmentProvider;
use crate::core::types::{SequenceNumber, Timestamp};
use crate::diagnostics::{
    next_sequence_number, CompilationRecord, CompilationRegistry, RegionLog, RegionLogChain,
    RegionLogId,
};
use crate::memory::traits::BackingProvider;
use crate::memory::types::MemoryResult;
use log::{debug, info};

impl<B: BackingProvider> SegmentProvider<B> {
    /// Turn on region logging. There is no way to turn it off again.
    pub fn set_collect_region_log(&mut self) {
        if !self.collect_region_log {
            debug!("Provider {} now collects region logs", self.id.as_u64());
            self.collect_region_log = true;
        }
    }

    pub fn collect_regions(&self) -> bool {
        self.collect_region_log
    }

    /// Next provider-local timestamp, starting at 1
    pub fn record_event(&mut self) -> Timestamp {
        self.timestamp += 1;
        self.timestamp
    }

    pub fn append_region_log(&mut self, log: RegionLog) -> RegionLogId {
        self.region_logs.append(log)
    }

    pub fn region_log_mut(&mut self, id: RegionLogId) -> Option<&mut RegionLog> {
        self.region_logs.get_mut(id)
    }

    pub fn region_logs(&self) -> &RegionLogChain {
        &self.region_logs
    }

    /// Tear the provider down, registering its compilation summary first if
    /// region logging is on.
    ///
    /// Returns the sequence number the compilation was registered under.
    /// Every system segment goes back to the backing provider either way.
    pub fn finish(mut self) -> MemoryResult<Option<SequenceNumber>> {
        self.register_compilation()
    }

    /// Runs at most once, from `finish` or from `Drop`
    pub(super) fn register_compilation(&mut self) -> MemoryResult<Option<SequenceNumber>> {
        if self.registered || !self.collect_region_log {
            self.registered = true;
            return Ok(None);
        }
        self.registered = true;

        let registry = self
            .registry
            .clone()
            .unwrap_or_else(CompilationRegistry::global);
        let sequence = next_sequence_number();
        let bytes_allocated = self.bytes_allocated();
        let regions = std::mem::take(&mut self.region_logs);
        let region_count = regions.len();

        registry.register(CompilationRecord::new(sequence, bytes_allocated, regions))?;
        info!(
            "Compilation {} registered: {} bytes allocated, {} region logs",
            sequence, bytes_allocated, region_count
        );
        Ok(Some(sequence))
    }
}
