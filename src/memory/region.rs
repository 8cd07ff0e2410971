/*!
 * Region
 * Scoped bump allocator built on a segment allocator
 */

use super::traits::SegmentAllocator;
use super::types::{MemoryError, MemoryResult, Segment};
use crate::core::types::{Address, Size};
use crate::diagnostics::{RegionKind, RegionLog, RegionLogId};
use log::error;

/// Allocation scope that hands out bytes from segments it requests and
/// releases every one of them when dropped.
///
/// When the allocator collects region logs, the region appends a log at
/// creation, keeps its counters current, and stamps the destruction time.
pub struct Region<'a, A: SegmentAllocator> {
    allocator: &'a mut A,
    segments: Vec<Segment>,
    log: Option<RegionLogId>,
    bytes_allocated: Size,
}

impl<'a, A: SegmentAllocator> Region<'a, A> {
    pub fn new(allocator: &'a mut A, name: impl Into<String>) -> Self {
        Self::with_kind(allocator, name, RegionKind::Heap)
    }

    pub fn with_kind(allocator: &'a mut A, name: impl Into<String>, kind: RegionKind) -> Self {
        let log = if allocator.collect_regions() {
            let created = allocator.record_event();
            Some(allocator.append_region_log(RegionLog::new(name, kind, created)))
        } else {
            None
        };
        Self {
            allocator,
            segments: Vec::new(),
            log,
            bytes_allocated: 0,
        }
    }

    /// Carve `bytes` from the current segment, requesting a new one when it
    /// is full
    pub fn allocate(&mut self, bytes: Size) -> MemoryResult<Address> {
        if bytes == 0 {
            return Err(MemoryError::InvalidSize(0));
        }

        if let Some(address) = self.segments.last_mut().and_then(|s| s.bump(bytes)) {
            self.bytes_allocated += bytes;
            if let Some(log) = self.log_mut() {
                log.bytes_allocated += bytes;
            }
            return Ok(address);
        }

        let request = bytes.max(self.allocator.default_segment_size());
        let mut segment = self.allocator.request(request)?;
        let address = segment
            .bump(bytes)
            .ok_or(MemoryError::InvariantViolation(
                "allocator returned a segment smaller than requested",
            ))?;
        let segment_size = segment.size();
        self.segments.push(segment);
        self.bytes_allocated += bytes;
        if let Some(log) = self.log_mut() {
            log.bytes_allocated += bytes;
            log.segments_requested += 1;
            log.segment_bytes += segment_size;
        }
        Ok(address)
    }

    pub fn bytes_allocated(&self) -> Size {
        self.bytes_allocated
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn log_id(&self) -> Option<RegionLogId> {
        self.log
    }

    fn log_mut(&mut self) -> Option<&mut RegionLog> {
        let id = self.log?;
        self.allocator.region_log_mut(id)
    }
}

impl<'a, A: SegmentAllocator> Drop for Region<'a, A> {
    fn drop(&mut self) {
        for segment in std::mem::take(&mut self.segments) {
            if let Err(e) = self.allocator.release(segment) {
                error!("Region failed to release segment: {}", e);
            }
        }
        if let Some(id) = self.log {
            let destroyed = self.allocator.record_event();
            if let Some(log) = self.allocator.region_log_mut(id) {
                log.destroyed = Some(destroyed);
            }
        }
    }
}
