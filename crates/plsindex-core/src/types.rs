//! Shared types for the ingestion seam.

use serde::{Deserialize, Serialize};

/// A minimal summary of the block an event was emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block number.
    pub number: u64,
    /// Block hash (`0x…`).
    pub hash: String,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: u64,
}

/// Context passed to event handlers.
#[derive(Debug, Clone)]
pub struct IndexContext {
    /// The block being processed.
    pub block: BlockSummary,
}

impl IndexContext {
    pub fn new(block: BlockSummary) -> Self {
        Self { block }
    }
}
