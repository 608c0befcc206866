//! Label gate and reverse name lookup.
//!
//! A human-readable name is only ever attached to stored state after passing
//! [`is_valid_label`]. Resolution services use an embedded null byte as the
//! "unknown" sentinel.

use std::collections::HashMap;

use alloy_primitives::B256;

use crate::identity::label_hash;

/// Returns `true` if `name` may be attached to a domain or registration.
pub fn is_valid_label(name: Option<&str>) -> bool {
    match name {
        None => false,
        Some(name) if name.contains('\0') => {
            tracing::warn!(label = %name.escape_debug(), "label contains null byte, skipping");
            false
        }
        Some(_) => true,
    }
}

/// Reverse lookup from a label hash to its plaintext label.
pub trait NameLookup: Send + Sync {
    /// Return the plaintext label whose keccak256 is `label`, if known.
    fn name_by_hash(&self, label: &B256) -> Option<String>;
}

/// A lookup that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNameLookup;

impl NameLookup for NoNameLookup {
    fn name_by_hash(&self, _label: &B256) -> Option<String> {
        None
    }
}

/// In-memory preimage table built from known plaintext labels.
#[derive(Debug, Clone, Default)]
pub struct RainbowTable {
    names: HashMap<B256, String>,
}

impl RainbowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an iterator of plaintext labels.
    pub fn from_names<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut table = Self::new();
        for name in names {
            table.insert(name);
        }
        table
    }

    /// Add a plaintext label; returns its hash.
    pub fn insert(&mut self, name: impl Into<String>) -> B256 {
        let name = name.into();
        let hash = label_hash(&name);
        self.names.insert(hash, name);
        hash
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameLookup for RainbowTable {
    fn name_by_hash(&self, label: &B256) -> Option<String> {
        self.names.get(label).cloned()
    }
}
