/*!
 * Memory Types
 * Segments, errors, and statistics shared by the segment provider
 */

use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Allocation limit exceeded: requested {requested} bytes with {allocated} bytes already allocated (limit {limit} bytes)")]
    #[diagnostic(
        code(memory::allocation_limit_exceeded),
        help("The compilation needs more memory than its allocation limit permits. Raise the limit or reduce the working set.")
    )]
    AllocationLimitExceeded {
        requested: usize,
        allocated: usize,
        limit: usize,
    },

    #[error("Backing provider exhausted: requested {requested} bytes, available {available} bytes")]
    #[diagnostic(
        code(memory::backing_exhausted),
        help("The backing provider could not supply a system segment.")
    )]
    BackingExhausted { requested: usize, available: usize },

    #[error("Invalid segment size: {0} bytes")]
    #[diagnostic(code(memory::invalid_size))]
    InvalidSize(usize),

    #[error("Invalid release of segment at 0x{address:x} ({size} bytes)")]
    #[diagnostic(
        code(memory::invalid_release),
        help("Segments must be released exactly once, to the provider that issued them.")
    )]
    InvalidRelease { address: usize, size: usize },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(memory::invalid_config))]
    InvalidConfig(String),

    #[error("Failed to append compilation {sequence} to the registry: {reason}")]
    #[diagnostic(code(memory::registry_append))]
    RegistryAppend { sequence: u32, reason: String },

    #[error("Internal invariant violated: {0}")]
    #[diagnostic(code(memory::invariant_violation))]
    InvariantViolation(&'static str),
}

impl MemoryError {
    /// True for failures caused by running out of memory or budget
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            MemoryError::AllocationLimitExceeded { .. } | MemoryError::BackingExhausted { .. }
        )
    }
}

/// Identity of the provider that issued a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProviderId(u64);

impl ProviderId {
    pub(crate) fn next() -> Self {
        static NEXT_PROVIDER_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_PROVIDER_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Contiguous memory range handed to a client scope.
///
/// A segment is a move-only view: it cannot be cloned, and handing it back
/// to [`release`](crate::memory::SegmentProvider::release) consumes it.
/// `used` is the client's bump mark inside the range.
#[derive(Debug)]
pub struct Segment {
    base: Address,
    size: Size,
    used: Size,
    requested: Size,
    owner: ProviderId,
}

impl Segment {
    pub(crate) fn new(base: Address, size: Size, requested: Size, owner: ProviderId) -> Self {
        Self {
            base,
            size,
            used: 0,
            requested,
            owner,
        }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// One past the last byte of the segment
    pub fn end(&self) -> Address {
        self.base + self.size
    }

    /// High-water mark
    pub fn used(&self) -> Size {
        self.used
    }

    pub fn remaining(&self) -> Size {
        self.size - self.used
    }

    /// Size the client asked for before rounding
    pub fn requested(&self) -> Size {
        self.requested
    }

    pub fn owner(&self) -> ProviderId {
        self.owner
    }

    /// Advance the high-water mark by `bytes`, returning the start of the
    /// carved range, or `None` if the segment cannot hold it
    pub fn bump(&mut self, bytes: Size) -> Option<Address> {
        if bytes > self.remaining() {
            return None;
        }
        let address = self.base + self.used;
        self.used += bytes;
        Some(address)
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.base && address < self.end()
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        self.base < other.end() && other.base < self.end()
    }

    pub(crate) fn reset(&mut self, requested: Size) {
        self.used = 0;
        self.requested = requested;
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.size == other.size
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| self.size.cmp(&other.size))
    }
}

/// Raw block obtained from a backing provider
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SystemSegment {
    base: Address,
    size: Size,
}

impl SystemSegment {
    pub fn new(base: Address, size: Size) -> Self {
        Self { base, size }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Snapshot of a provider's byte accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub system_bytes_allocated: usize,
    pub large_bytes_allocated: usize,
    pub region_bytes_allocated: usize,
    pub region_bytes_in_use: usize,
    pub region_real_bytes_in_use: usize,
    pub allocation_limit: usize,
    pub system_segments: usize,
    pub large_segments: usize,
    pub free_segments: usize,
    pub free_bytes: usize,
}

impl ProviderStats {
    /// Fraction of the allocation limit already obtained from the backing provider
    pub fn limit_usage(&self) -> f64 {
        if self.allocation_limit == 0 {
            return 1.0;
        }
        self.system_bytes_allocated as f64 / self.allocation_limit as f64
    }
}
