/*!
 * Diagnostics
 * Region logs and the process-wide compilation registry
 */

mod region_log;
mod registry;

pub use region_log::{RegionKind, RegionLog, RegionLogChain, RegionLogId, RegionLogIter};
pub use registry::{
    next_sequence_number, print_all_compilations, CompilationRecord, CompilationRegistry,
    CompilationSummary,
};
