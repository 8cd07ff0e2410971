/*!
 * Byte Accounting
 * Counters behind allocation limits and diagnostics
 *
 * - system bytes: everything currently held from the backing provider
 *   (pooled system segments plus dedicated segments)
 * - large bytes: the dedicated-segment share of system bytes
 * - region bytes allocated: bytes carved out of system segments, plus
 *   dedicated segments
 * - region bytes in use: segment bytes currently held by clients
 * - region real bytes in use: unrounded request sizes currently held
 */

use super::SegmentProvider;
use crate::core::types::Size;
use crate::memory::traits::BackingProvider;
use crate::memory::types::ProviderStats;
use log::info;

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ByteCounters {
    pub system_bytes_allocated: Size,
    pub large_bytes_allocated: Size,
    pub region_bytes_allocated: Size,
    pub region_bytes_in_use: Size,
    pub region_real_bytes_in_use: Size,
}

impl ByteCounters {
    pub fn system_segment_acquired(&mut self, size: Size) {
        self.system_bytes_allocated += size;
    }

    pub fn carved(&mut self, size: Size) {
        self.region_bytes_allocated += size;
    }

    pub fn handed_out(&mut self, size: Size, requested: Size) {
        self.region_bytes_in_use += size;
        self.region_real_bytes_in_use += requested;
    }

    pub fn returned(&mut self, size: Size, requested: Size) {
        self.region_bytes_in_use = self.region_bytes_in_use.saturating_sub(size);
        self.region_real_bytes_in_use = self.region_real_bytes_in_use.saturating_sub(requested);
    }

    pub fn large_acquired(&mut self, size: Size, requested: Size) {
        self.system_bytes_allocated += size;
        self.large_bytes_allocated += size;
        self.region_bytes_allocated += size;
        self.handed_out(size, requested);
    }

    pub fn large_released(&mut self, size: Size, requested: Size) {
        self.system_bytes_allocated = self.system_bytes_allocated.saturating_sub(size);
        self.large_bytes_allocated = self.large_bytes_allocated.saturating_sub(size);
        self.region_bytes_allocated = self.region_bytes_allocated.saturating_sub(size);
        self.returned(size, requested);
    }
}

impl<B: BackingProvider> SegmentProvider<B> {
    /// Bytes currently held from the backing provider
    pub fn system_bytes_allocated(&self) -> Size {
        self.counters.system_bytes_allocated
    }

    /// Bytes held in dedicated (large) segments
    pub fn large_bytes_allocated(&self) -> Size {
        self.counters.large_bytes_allocated
    }

    pub fn region_bytes_allocated(&self) -> Size {
        self.counters.region_bytes_allocated
    }

    /// Total footprint checked against the allocation limit.
    ///
    /// Equals `system_segment_count() * system_segment_size() + large_bytes_allocated()`.
    pub fn bytes_allocated(&self) -> Size {
        self.counters.system_bytes_allocated
    }

    pub fn region_bytes_in_use(&self) -> Size {
        self.counters.region_bytes_in_use
    }

    pub fn region_real_bytes_in_use(&self) -> Size {
        self.counters.region_real_bytes_in_use
    }

    pub fn allocation_limit(&self) -> Size {
        self.config.allocation_limit
    }

    /// Applies to future growth only; nothing already allocated is released
    pub fn set_allocation_limit(&mut self, limit: Size) {
        info!(
            "Provider {} allocation limit changed from {} to {} bytes ({} bytes allocated)",
            self.id.as_u64(),
            self.config.allocation_limit,
            limit,
            self.bytes_allocated()
        );
        self.config.allocation_limit = limit;
    }

    pub fn is_large_segment(&self, size: Size) -> bool {
        size > self.config.system_segment_size
    }

    pub fn system_segment_count(&self) -> usize {
        self.pool.len()
    }

    pub fn large_segment_count(&self) -> usize {
        self.pool.dedicated_len()
    }

    pub fn free_segment_count(&self) -> usize {
        self.free_list.len()
    }

    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            system_bytes_allocated: self.counters.system_bytes_allocated,
            large_bytes_allocated: self.counters.large_bytes_allocated,
            region_bytes_allocated: self.counters.region_bytes_allocated,
            region_bytes_in_use: self.counters.region_bytes_in_use,
            region_real_bytes_in_use: self.counters.region_real_bytes_in_use,
            allocation_limit: self.config.allocation_limit,
            system_segments: self.pool.len(),
            large_segments: self.pool.dedicated_len(),
            free_segments: self.free_list.len(),
            free_bytes: self.free_list.bytes(),
        }
    }
}
