/*!
 * Memory Traits
 * Backing provider and client scope abstractions
 */

use super::types::*;
use crate::core::types::{Size, Timestamp};
use crate::diagnostics::{RegionLog, RegionLogId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of raw system segments.
///
/// Implementations hand out blocks of exactly the requested size and take
/// them back whole. The segment provider never synchronizes calls into its
/// backing provider; share one across threads through `Arc<Mutex<_>>`.
#[cfg_attr(test, mockall::automock)]
pub trait BackingProvider: Send {
    /// Obtain a system segment of `size` bytes
    fn request_system_segment(&mut self, size: Size) -> MemoryResult<SystemSegment>;

    /// Return a system segment previously obtained from this provider
    fn release_system_segment(&mut self, segment: SystemSegment);
}

impl<B: BackingProvider + ?Sized> BackingProvider for &mut B {
    fn request_system_segment(&mut self, size: Size) -> MemoryResult<SystemSegment> {
        (**self).request_system_segment(size)
    }

    fn release_system_segment(&mut self, segment: SystemSegment) {
        (**self).release_system_segment(segment)
    }
}

impl<B: BackingProvider + ?Sized> BackingProvider for Box<B> {
    fn request_system_segment(&mut self, size: Size) -> MemoryResult<SystemSegment> {
        (**self).request_system_segment(size)
    }

    fn release_system_segment(&mut self, segment: SystemSegment) {
        (**self).release_system_segment(segment)
    }
}

impl<B: BackingProvider> BackingProvider for Arc<Mutex<B>> {
    fn request_system_segment(&mut self, size: Size) -> MemoryResult<SystemSegment> {
        self.lock().request_system_segment(size)
    }

    fn release_system_segment(&mut self, segment: SystemSegment) {
        self.lock().release_system_segment(segment)
    }
}

/// Interface exposed to allocation scopes
pub trait SegmentAllocator {
    /// Obtain a segment of at least `size` bytes
    fn request(&mut self, size: Size) -> MemoryResult<Segment>;

    /// Hand a segment back to the allocator that issued it
    fn release(&mut self, segment: Segment) -> MemoryResult<()>;

    /// Granularity every request is rounded to
    fn default_segment_size(&self) -> Size;

    /// Whether scopes should record region logs
    fn collect_regions(&self) -> bool;

    /// Next event timestamp
    fn record_event(&mut self) -> Timestamp;

    /// Link a region log at the tail of this allocator's chain
    fn append_region_log(&mut self, log: RegionLog) -> RegionLogId;

    /// Mutable access to a previously appended region log
    fn region_log_mut(&mut self, id: RegionLogId) -> Option<&mut RegionLog>;
}
