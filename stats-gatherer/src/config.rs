//! # Collection Configuration
//!
//! Switches for the optional, higher-cardinality sections of a statistics
//! document. Supplied once per collection and never changed during it.

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Emit one gauge per allocator context.
    #[serde(default)]
    pub gather_memory_contexts: bool,
    /// Emit the per-view query type and resolver counters.
    #[serde(default)]
    pub gather_views: bool,
}

impl CollectionConfig {
    pub fn new(gather_memory_contexts: bool, gather_views: bool) -> Self {
        Self {
            gather_memory_contexts,
            gather_views,
        }
    }

    /// Every optional section enabled.
    pub fn all() -> Self {
        Self::new(true, true)
    }
}
