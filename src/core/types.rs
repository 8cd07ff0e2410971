/*!
 * Core Types
 * Common types used across the segment provider
 */

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Provider-local event counter value (monotonic, starts at 1)
pub type Timestamp = u64;

/// Process-wide compilation sequence number
pub type SequenceNumber = u32;
