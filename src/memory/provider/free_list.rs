/*!
 * Segment Free List
 * Released small segments kept for reuse
 */

use crate::core::types::Size;
use crate::memory::types::Segment;
use std::collections::BTreeMap;

/// Released segments bucketed by exact size.
///
/// Lookup is best-fit by size class (the smallest bucket that can hold the
/// request) and LIFO within a bucket.
#[derive(Debug, Default)]
pub(super) struct FreeList {
    buckets: BTreeMap<Size, Vec<Segment>>,
    len: usize,
    bytes: Size,
}

impl FreeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment: Segment) {
        self.len += 1;
        self.bytes += segment.size();
        self.buckets.entry(segment.size()).or_default().push(segment);
    }

    pub fn find_best_fit(&mut self, size: Size) -> Option<Segment> {
        let (&bucket_size, bucket) = self.buckets.range_mut(size..).next()?;
        let segment = bucket.pop()?;
        if bucket.is_empty() {
            self.buckets.remove(&bucket_size);
        }
        self.len -= 1;
        self.bytes -= segment.size();
        Some(segment)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn bytes(&self) -> Size {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
        self.bytes = 0;
    }
}
