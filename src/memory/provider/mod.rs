/*!
 * Segment Provider
 *
 * Two-tier segment allocator serving as the root arena of one compilation.
 *
 * ## Allocation
 *
 * - **Rounding**: requests round up to a multiple of the default segment size
 * - **Free list**: released segments are reused best-fit by size
 * - **Bump allocation**: new segments are carved from the active system segment
 * - **Growth**: a full active segment is replaced by a fresh one from the
 *   backing provider; its tail is cut into default-size free segments
 * - **Dedicated segments**: requests larger than the system segment size
 *   bypass pooling and go back to the backing provider on release
 * - **Allocation limit**: checked before every backing allocation
 *
 * ## Threading
 *
 * A provider belongs to one compilation and is driven by one worker at a
 * time, so it takes `&mut self` and does no locking of its own. Only the
 * compilation registry it reports to at teardown is shared.
 */

mod accounting;
mod allocator;
mod config;
mod diagnostics;
mod free_list;
mod pool;

pub use config::SegmentProviderConfig;

use super::backing::HeapBackingProvider;
use super::traits::{BackingProvider, SegmentAllocator};
use super::types::{MemoryResult, ProviderId, Segment};
use crate::core::types::{Size, Timestamp};
use crate::diagnostics::{CompilationRegistry, RegionLog, RegionLogChain, RegionLogId};
use accounting::ByteCounters;
use free_list::FreeList;
use log::{debug, error, info};
use pool::SystemSegmentPool;
use std::fmt;
use std::sync::Arc;

/// Root segment allocator for one compilation
pub struct SegmentProvider<B: BackingProvider = HeapBackingProvider> {
    id: ProviderId,
    config: SegmentProviderConfig,
    backing: B,
    pool: SystemSegmentPool,
    free_list: FreeList,
    counters: ByteCounters,
    // Diagnostics
    collect_region_log: bool,
    timestamp: Timestamp,
    region_logs: RegionLogChain,
    registry: Option<Arc<CompilationRegistry>>,
    registered: bool,
}

impl SegmentProvider<HeapBackingProvider> {
    /// Provider backed by heap memory bounded only by the allocation limit
    pub fn with_heap(config: SegmentProviderConfig) -> MemoryResult<Self> {
        Self::new(config, HeapBackingProvider::new())
    }
}

impl<B: BackingProvider> SegmentProvider<B> {
    pub fn new(config: SegmentProviderConfig, backing: B) -> MemoryResult<Self> {
        config.validate()?;
        let id = ProviderId::next();
        info!(
            "Segment provider {} initialized: {} byte segments, {} byte system segments, {} byte limit",
            id.as_u64(),
            config.default_segment_size,
            config.system_segment_size,
            config.allocation_limit
        );
        Ok(Self {
            id,
            config,
            backing,
            pool: SystemSegmentPool::new(),
            free_list: FreeList::new(),
            counters: ByteCounters::default(),
            collect_region_log: false,
            timestamp: 0,
            region_logs: RegionLogChain::new(),
            registry: None,
            registered: false,
        })
    }

    /// Report to `registry` at teardown instead of the process-wide one
    pub fn with_registry(mut self, registry: Arc<CompilationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn config(&self) -> &SegmentProviderConfig {
        &self.config
    }

    pub fn default_segment_size(&self) -> Size {
        self.config.default_segment_size
    }

    pub fn system_segment_size(&self) -> Size {
        self.config.system_segment_size
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    fn release_all(&mut self) {
        self.free_list.clear();
        let segments = self.pool.drain();
        let count = segments.len();
        for segment in segments {
            self.backing.release_system_segment(segment);
        }
        if count > 0 {
            debug!(
                "Provider {} returned {} system segments ({} bytes) to backing provider",
                self.id.as_u64(),
                count,
                self.counters.system_bytes_allocated
            );
        }
        self.counters = ByteCounters::default();
    }
}

impl<B: BackingProvider> Drop for SegmentProvider<B> {
    fn drop(&mut self) {
        if let Err(e) = self.register_compilation() {
            error!(
                "Provider {} could not register its compilation: {}",
                self.id.as_u64(),
                e
            );
        }
        self.release_all();
    }
}

impl<B: BackingProvider> fmt::Debug for SegmentProvider<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SegmentProvider")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .field("collect_region_log", &self.collect_region_log)
            .field("region_logs", &self.region_logs.len())
            .finish()
    }
}

impl<B: BackingProvider> SegmentAllocator for SegmentProvider<B> {
    fn request(&mut self, size: Size) -> MemoryResult<Segment> {
        SegmentProvider::request(self, size)
    }

    fn release(&mut self, segment: Segment) -> MemoryResult<()> {
        SegmentProvider::release(self, segment)
    }

    fn default_segment_size(&self) -> Size {
        SegmentProvider::default_segment_size(self)
    }

    fn collect_regions(&self) -> bool {
        SegmentProvider::collect_regions(self)
    }

    fn record_event(&mut self) -> Timestamp {
        SegmentProvider::record_event(self)
    }

    fn append_region_log(&mut self, log: RegionLog) -> RegionLogId {
        SegmentProvider::append_region_log(self, log)
    }

    fn region_log_mut(&mut self, id: RegionLogId) -> Option<&mut RegionLog> {
        SegmentProvider::region_log_mut(self, id)
    }
}
