/*!
 * Segment Provider Configuration
 * Sizes and limits fixed at construction, with environment overrides
 */

use crate::core::limits::{
    DEFAULT_ALLOCATION_LIMIT, DEFAULT_SEGMENT_SIZE, DEFAULT_SYSTEM_SEGMENT_SIZE,
    ENV_ALLOCATION_LIMIT, ENV_DEFAULT_SEGMENT_SIZE, ENV_SYSTEM_SEGMENT_SIZE,
};
use crate::core::types::Size;
use crate::memory::types::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};

/// Segment provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentProviderConfig {
    /// Allocation granularity; requests round up to a multiple of this
    pub default_segment_size: Size,
    /// Size of each pooled backing block; larger requests get dedicated segments
    pub system_segment_size: Size,
    /// Ceiling on bytes obtained from the backing provider
    pub allocation_limit: Size,
}

impl Default for SegmentProviderConfig {
    fn default() -> Self {
        Self {
            default_segment_size: DEFAULT_SEGMENT_SIZE,
            system_segment_size: DEFAULT_SYSTEM_SEGMENT_SIZE,
            allocation_limit: DEFAULT_ALLOCATION_LIMIT,
        }
    }
}

impl SegmentProviderConfig {
    pub fn new(default_segment_size: Size, system_segment_size: Size, allocation_limit: Size) -> Self {
        Self {
            default_segment_size,
            system_segment_size,
            allocation_limit,
        }
    }

    /// Defaults overridden by `SEGMENT_PROVIDER_*` environment variables
    pub fn from_env() -> MemoryResult<Self> {
        let mut config = Self::default();
        if let Some(size) = read_env(ENV_DEFAULT_SEGMENT_SIZE)? {
            config.default_segment_size = size;
        }
        if let Some(size) = read_env(ENV_SYSTEM_SEGMENT_SIZE)? {
            config.system_segment_size = size;
        }
        if let Some(limit) = read_env(ENV_ALLOCATION_LIMIT)? {
            config.allocation_limit = limit;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_allocation_limit(mut self, limit: Size) -> Self {
        self.allocation_limit = limit;
        self
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.default_segment_size == 0 {
            return Err(MemoryError::InvalidConfig(
                "default segment size must be non-zero".into(),
            ));
        }
        if self.default_segment_size > self.system_segment_size {
            return Err(MemoryError::InvalidConfig(format!(
                "default segment size {} exceeds system segment size {}",
                self.default_segment_size, self.system_segment_size
            )));
        }
        Ok(())
    }
}

fn read_env(name: &str) -> MemoryResult<Option<Size>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<Size>()
            .map(Some)
            .map_err(|e| MemoryError::InvalidConfig(format!("{}={:?}: {}", name, value, e))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(MemoryError::InvalidConfig(format!("{}: {}", name, e))),
    }
}
