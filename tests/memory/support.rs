/*!
 * Shared test helpers
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use segment_provider::{
    BackingProvider, HeapBackingProvider, MemoryResult, SegmentProvider, SegmentProviderConfig,
    SystemSegment,
};
use std::sync::Arc;

pub const SYSTEM_SEGMENT: usize = 4096;
pub const GRANULE: usize = 64;
pub const LIMIT: usize = 1_000_000;

/// Backing call observed by [`RecordingBacking`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingEvent {
    Requested(usize),
    Released { base: usize, size: usize },
}

/// Heap backing provider that keeps a log of every call
#[derive(Debug, Default)]
pub struct RecordingBacking {
    inner: HeapBackingProvider,
    pub events: Vec<BackingEvent>,
}

impl RecordingBacking {
    pub fn shared() -> Arc<Mutex<RecordingBacking>> {
        Arc::new(Mutex::new(RecordingBacking::default()))
    }

    pub fn requests(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BackingEvent::Requested(size) => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn releases(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BackingEvent::Released { base, size } => Some((*base, *size)),
                _ => None,
            })
            .collect()
    }

    pub fn outstanding(&self) -> usize {
        self.inner.outstanding()
    }
}

impl BackingProvider for RecordingBacking {
    fn request_system_segment(&mut self, size: usize) -> MemoryResult<SystemSegment> {
        self.events.push(BackingEvent::Requested(size));
        self.inner.request_system_segment(size)
    }

    fn release_system_segment(&mut self, segment: SystemSegment) {
        self.events.push(BackingEvent::Released {
            base: segment.base(),
            size: segment.size(),
        });
        self.inner.release_system_segment(segment)
    }
}

pub fn config() -> SegmentProviderConfig {
    SegmentProviderConfig::new(GRANULE, SYSTEM_SEGMENT, LIMIT)
}

pub fn recording_provider() -> (
    SegmentProvider<Arc<Mutex<RecordingBacking>>>,
    Arc<Mutex<RecordingBacking>>,
) {
    let backing = RecordingBacking::shared();
    let provider = SegmentProvider::new(config(), Arc::clone(&backing)).expect("valid config");
    (provider, backing)
}
