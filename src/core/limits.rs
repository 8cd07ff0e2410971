/*!
 * System Limits and Constants
 *
 * Centralized location for segment provider defaults and thresholds.
 * Organized by domain for maintainability and discoverability.
 *
 * ## Conventions
 * - Performance-critical constants are marked with [PERF]
 * - Values that bound resource usage are marked with [LIMIT]
 */

// =============================================================================
// SEGMENT SIZES
// =============================================================================

/// Default segment size (64KB)
/// Allocation granularity: every request is rounded up to a multiple of this
/// [PERF] Equal-sized rounding makes released segments easy to recycle
pub const DEFAULT_SEGMENT_SIZE: usize = 64 * 1024;

/// Default system segment size (16MB)
/// Size of each backing block requested from the backing provider.
/// Requests larger than this get a dedicated segment.
pub const DEFAULT_SYSTEM_SEGMENT_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// ALLOCATION LIMITS
// =============================================================================

/// Default per-compilation allocation limit (1GB)
/// [LIMIT] Bytes obtained from the backing provider may not exceed this
pub const DEFAULT_ALLOCATION_LIMIT: usize = 1024 * 1024 * 1024;

/// Default heap backing provider capacity (unbounded)
/// [LIMIT] The allocation limit is normally the binding constraint
pub const DEFAULT_BACKING_CAPACITY: usize = usize::MAX;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Initial registry capacity, reserved on first use so teardown-time appends
/// rarely need to grow the list
pub const REGISTRY_INITIAL_CAPACITY: usize = 64;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Environment override for the default segment size
pub const ENV_DEFAULT_SEGMENT_SIZE: &str = "SEGMENT_PROVIDER_DEFAULT_SEGMENT_SIZE";

/// Environment override for the system segment size
pub const ENV_SYSTEM_SEGMENT_SIZE: &str = "SEGMENT_PROVIDER_SYSTEM_SEGMENT_SIZE";

/// Environment override for the allocation limit
pub const ENV_ALLOCATION_LIMIT: &str = "SEGMENT_PROVIDER_ALLOCATION_LIMIT";

/// Enables JSON tracing output when set to "1" or "true"
pub const ENV_TRACE_JSON: &str = "SEGMENT_TRACE_JSON";
