/*!
 * System Segment Pool
 * Backing blocks owned by a provider and the active bump source
 */

use crate::core::types::{Address, Size};
use crate::memory::types::SystemSegment;
use std::collections::BTreeMap;

/// Index of a pooled system segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SystemSegmentId(usize);

#[derive(Debug)]
struct PooledSystemSegment {
    segment: SystemSegment,
    used: Size,
}

impl PooledSystemSegment {
    fn remaining(&self) -> Size {
        self.segment.size() - self.used
    }
}

/// Pooled system segments plus dedicated (large) segments.
///
/// Pooled segments stay until the provider is torn down because the
/// sub-segments carved from them do not track their parent. Dedicated
/// segments are keyed by base address and leave as soon as they are released.
#[derive(Debug, Default)]
pub(super) struct SystemSegmentPool {
    segments: Vec<PooledSystemSegment>,
    active: Option<SystemSegmentId>,
    dedicated: BTreeMap<Address, SystemSegment>,
}

impl SystemSegmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: SystemSegment) -> SystemSegmentId {
        let id = SystemSegmentId(self.segments.len());
        self.segments.push(PooledSystemSegment { segment, used: 0 });
        id
    }

    pub fn active(&self) -> Option<SystemSegmentId> {
        self.active
    }

    pub fn set_active(&mut self, id: SystemSegmentId) {
        self.active = Some(id);
    }

    pub fn remaining(&self, id: SystemSegmentId) -> Size {
        self.segments.get(id.0).map_or(0, |s| s.remaining())
    }

    /// Advance the high-water mark of segment `id` by `size`
    pub fn carve(&mut self, id: SystemSegmentId, size: Size) -> Option<Address> {
        let pooled = self.segments.get_mut(id.0)?;
        if pooled.remaining() < size {
            return None;
        }
        let address = pooled.segment.base() + pooled.used;
        pooled.used += size;
        Some(address)
    }

    /// Whether `[base, base + size)` lies inside a pooled system segment
    pub fn owns(&self, base: Address, size: Size) -> bool {
        self.segments.iter().any(|pooled| {
            base >= pooled.segment.base() && base + size <= pooled.segment.base() + pooled.used
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn insert_dedicated(&mut self, segment: SystemSegment) {
        self.dedicated.insert(segment.base(), segment);
    }

    pub fn remove_dedicated(&mut self, base: Address) -> Option<SystemSegment> {
        self.dedicated.remove(&base)
    }

    pub fn dedicated_len(&self) -> usize {
        self.dedicated.len()
    }

    /// Take every system segment out of the pool, dedicated ones included
    pub fn drain(&mut self) -> Vec<SystemSegment> {
        self.active = None;
        let mut all: Vec<SystemSegment> = self.segments.drain(..).map(|p| p.segment).collect();
        all.extend(std::mem::take(&mut self.dedicated).into_values());
        all
    }
}
