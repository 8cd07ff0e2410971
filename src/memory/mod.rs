/*!
 * Memory Module
 * Segment provider, backing providers, and allocation scopes
 */

pub mod backing;
pub mod provider;
pub mod region;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use backing::HeapBackingProvider;
pub use provider::{SegmentProvider, SegmentProviderConfig};
pub use region::Region;
pub use traits::*;
pub use types::*;
