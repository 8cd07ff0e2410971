/*!
 * Heap Backing Provider
 * System segments reserved from the process heap
 */

use super::traits::BackingProvider;
use super::types::{MemoryError, MemoryResult, SystemSegment};
use crate::core::limits::DEFAULT_BACKING_CAPACITY;
use crate::core::types::{Address, Size};
use ahash::AHashMap;
use log::{info, warn};

/// Backing provider that reserves zeroed heap blocks.
///
/// Each system segment owns a boxed byte slice keyed by its base address,
/// so releasing a segment drops exactly the block that was handed out.
/// Reservation is fallible: a failed reservation surfaces as
/// [`MemoryError::BackingExhausted`] instead of aborting the process.
#[derive(Debug)]
pub struct HeapBackingProvider {
    blocks: AHashMap<Address, Box<[u8]>>,
    capacity: Size,
    reserved: Size,
    requests: usize,
    releases: usize,
}

impl HeapBackingProvider {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BACKING_CAPACITY)
    }

    /// Provider that refuses to hold more than `capacity` bytes at once
    pub fn with_capacity(capacity: Size) -> Self {
        Self {
            blocks: AHashMap::new(),
            capacity,
            reserved: 0,
            requests: 0,
            releases: 0,
        }
    }

    /// Bytes currently handed out
    pub fn reserved(&self) -> Size {
        self.reserved
    }

    pub fn outstanding(&self) -> usize {
        self.blocks.len()
    }

    pub fn request_count(&self) -> usize {
        self.requests
    }

    pub fn release_count(&self) -> usize {
        self.releases
    }

    /// Memory behind a segment this provider handed out
    pub fn bytes(&self, base: Address) -> Option<&[u8]> {
        self.blocks.get(&base).map(|block| &block[..])
    }

    pub fn bytes_mut(&mut self, base: Address) -> Option<&mut [u8]> {
        self.blocks.get_mut(&base).map(|block| &mut block[..])
    }
}

impl Default for HeapBackingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingProvider for HeapBackingProvider {
    fn request_system_segment(&mut self, size: Size) -> MemoryResult<SystemSegment> {
        if size == 0 {
            return Err(MemoryError::InvalidSize(0));
        }
        let available = self.capacity - self.reserved;
        if size > available {
            warn!(
                "Heap backing provider exhausted: {} bytes requested, {} bytes available",
                size, available
            );
            return Err(MemoryError::BackingExhausted {
                requested: size,
                available,
            });
        }

        let mut buffer: Vec<u8> = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| MemoryError::BackingExhausted {
                requested: size,
                available,
            })?;
        buffer.resize(size, 0);
        let block = buffer.into_boxed_slice();
        let base = block.as_ptr() as Address;

        self.blocks.insert(base, block);
        self.reserved += size;
        self.requests += 1;
        info!(
            "Reserved {} byte system segment at 0x{:x} ({} bytes reserved)",
            size, base, self.reserved
        );
        Ok(SystemSegment::new(base, size))
    }

    fn release_system_segment(&mut self, segment: SystemSegment) {
        match self.blocks.remove(&segment.base()) {
            Some(block) => {
                self.reserved -= block.len();
                self.releases += 1;
            }
            None => warn!(
                "Ignoring release of unknown system segment 0x{:x} ({} bytes)",
                segment.base(),
                segment.size()
            ),
        }
    }
}
