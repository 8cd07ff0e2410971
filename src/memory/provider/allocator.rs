/*!
 * Segment Allocation
 * Request and release paths of the segment provider
 */

use super::SegmentProvider;
use crate::core::types::Size;
use crate::memory::traits::BackingProvider;
use crate::memory::types::{MemoryError, MemoryResult, Segment};
use log::{debug, error, info, warn};

impl<B: BackingProvider> SegmentProvider<B> {
    /// Obtain a segment of at least `required_size` bytes.
    ///
    /// Small requests are served from the free list, then from the active
    /// system segment, then from a freshly fetched system segment. Requests
    /// that round up past the system segment size get a dedicated segment
    /// straight from the backing provider.
    pub fn request(&mut self, required_size: Size) -> MemoryResult<Segment> {
        if required_size == 0 {
            return Err(MemoryError::InvalidSize(0));
        }
        let rounded = self.round(required_size)?;

        if self.is_large_segment(rounded) {
            return self.request_large(rounded, required_size);
        }

        if let Some(mut segment) = self.free_list.find_best_fit(rounded) {
            segment.reset(required_size);
            self.counters.handed_out(segment.size(), required_size);
            debug!(
                "Recycled segment 0x{:x} ({} bytes) for request of {} bytes",
                segment.base(),
                segment.size(),
                required_size
            );
            return Ok(segment);
        }

        if let Some(segment) = self.carve_from_active(rounded, required_size) {
            return Ok(segment);
        }

        self.grow()?;
        self.carve_from_active(rounded, required_size)
            .ok_or(MemoryError::InvariantViolation(
                "fresh system segment cannot hold a small request",
            ))
    }

    /// Hand a segment back.
    ///
    /// Dedicated segments go straight back to the backing provider; everything
    /// else is kept on the free list until the provider is torn down.
    pub fn release(&mut self, segment: Segment) -> MemoryResult<()> {
        let size = segment.size();
        if segment.owner() != self.id {
            error!(
                "Provider {} asked to release segment 0x{:x} ({} bytes) issued by provider {}",
                self.id.as_u64(),
                segment.base(),
                size,
                segment.owner().as_u64()
            );
            return Err(MemoryError::InvalidRelease {
                address: segment.base(),
                size,
            });
        }

        if self.is_large_segment(size) {
            let Some(system) = self.pool.remove_dedicated(segment.base()) else {
                error!(
                    "Release of unknown dedicated segment 0x{:x} ({} bytes)",
                    segment.base(),
                    size
                );
                return Err(MemoryError::InvalidRelease {
                    address: segment.base(),
                    size,
                });
            };
            self.counters.large_released(size, segment.requested());
            self.backing.release_system_segment(system);
            info!(
                "Returned dedicated segment 0x{:x} ({} bytes) to backing provider ({} bytes still allocated)",
                segment.base(),
                size,
                self.bytes_allocated()
            );
            return Ok(());
        }

        debug_assert!(
            self.pool.owns(segment.base(), size),
            "segment 0x{:x} does not belong to any system segment",
            segment.base()
        );
        self.counters.returned(size, segment.requested());
        debug!(
            "Segment 0x{:x} ({} bytes) added to free list ({} free segments)",
            segment.base(),
            size,
            self.free_list.len() + 1
        );
        self.free_list.insert(segment);
        Ok(())
    }

    /// Round up to a multiple of the default segment size.
    ///
    /// A size that cannot be rounded without overflowing can never fit under
    /// the allocation limit, so it is reported as a limit failure.
    fn round(&self, size: Size) -> MemoryResult<Size> {
        let granularity = self.config.default_segment_size;
        size.checked_add(granularity - 1)
            .map(|padded| padded / granularity * granularity)
            .ok_or(MemoryError::AllocationLimitExceeded {
                requested: size,
                allocated: self.bytes_allocated(),
                limit: self.config.allocation_limit,
            })
    }

    fn check_limit(&self, size: Size) -> MemoryResult<()> {
        let allocated = self.bytes_allocated();
        let limit = self.config.allocation_limit;
        if allocated.saturating_add(size) > limit {
            warn!(
                "Provider {} allocation limit reached: {} bytes requested, {} / {} bytes allocated",
                self.id.as_u64(),
                size,
                allocated,
                limit
            );
            return Err(MemoryError::AllocationLimitExceeded {
                requested: size,
                allocated,
                limit,
            });
        }
        Ok(())
    }

    fn request_large(&mut self, rounded: Size, required_size: Size) -> MemoryResult<Segment> {
        self.check_limit(rounded)?;
        let system = self.backing.request_system_segment(rounded)?;
        let (base, size) = (system.base(), system.size());
        self.counters.large_acquired(size, required_size);
        self.pool.insert_dedicated(system);
        info!(
            "Allocated dedicated segment 0x{:x} ({} bytes) for request of {} bytes",
            base, size, required_size
        );
        Ok(Segment::new(base, size, required_size, self.id))
    }

    fn carve_from_active(&mut self, rounded: Size, required_size: Size) -> Option<Segment> {
        let active = self.pool.active()?;
        let base = self.pool.carve(active, rounded)?;
        self.counters.carved(rounded);
        self.counters.handed_out(rounded, required_size);
        Some(Segment::new(base, rounded, required_size, self.id))
    }

    /// Fetch a new system segment and make it the active bump source
    fn grow(&mut self) -> MemoryResult<()> {
        let size = self.config.system_segment_size;
        self.check_limit(size)?;
        let system = self.backing.request_system_segment(size)?;

        self.retire_active();

        let base = system.base();
        self.counters.system_segment_acquired(system.size());
        let id = self.pool.push(system);
        self.pool.set_active(id);
        info!(
            "Provider {} fetched system segment #{} at 0x{:x} ({} bytes, {} bytes allocated)",
            self.id.as_u64(),
            self.pool.len(),
            base,
            size,
            self.bytes_allocated()
        );
        Ok(())
    }

    /// Cut the tail of the active system segment into default-size free
    /// segments so it is not stranded once a new segment takes over
    fn retire_active(&mut self) {
        let Some(active) = self.pool.active() else {
            return;
        };
        let granularity = self.config.default_segment_size;
        let mut retired = 0;
        while let Some(base) = self.pool.carve(active, granularity) {
            self.counters.carved(granularity);
            self.free_list.insert(Segment::new(base, granularity, 0, self.id));
            retired += 1;
        }
        if retired > 0 {
            debug!(
                "Moved {} tail segments of {} bytes to the free list ({} bytes left unused)",
                retired,
                granularity,
                self.pool.remaining(active)
            );
        }
    }
}
