/*!
 * Segment Provider Library
 *
 * Root arena allocator for per-compilation memory:
 * - Segment provider with free-list reuse, dedicated large segments,
 *   and allocation limits
 * - Region logs recording the life of each allocation scope
 * - Process-wide compilation registry for end-of-run memory reports
 */

pub mod core;
pub mod diagnostics;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use diagnostics::{
    print_all_compilations, CompilationRecord, CompilationRegistry, CompilationSummary, RegionKind,
    RegionLog, RegionLogChain, RegionLogId,
};
pub use memory::{
    BackingProvider, HeapBackingProvider, MemoryError, MemoryResult, ProviderStats, Region,
    Segment, SegmentAllocator, SegmentProvider, SegmentProviderConfig, SystemSegment,
};
pub use monitoring::init_tracing;
