//! Fixed registrar configuration.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::identity::namehash_tld;

/// Window after contractual expiry during which a name is still held (30 days).
pub const GRACE_PERIOD_SECONDS: u64 = 2_592_000;

/// Top-level suffix all registrar names live under.
pub const DEFAULT_TLD: &str = "pls";

/// Constants shared by every projector, computed once and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Top-level suffix (e.g. `"pls"`).
    pub tld: String,
    /// Namehash of `tld`; parent node of every registrar domain.
    pub root_node: B256,
    /// Grace period added to the Domain's expiry, in seconds.
    pub grace_period: u64,
}

impl RegistrarConfig {
    /// Build the config for a top-level suffix, deriving its root node.
    pub fn for_tld(tld: impl Into<String>) -> Self {
        let tld = tld.into();
        Self {
            root_node: namehash_tld(&tld),
            tld,
            grace_period: GRACE_PERIOD_SECONDS,
        }
    }

    /// Fully-qualified name of a label, e.g. `"alice"` → `"alice.pls"`.
    pub fn full_name(&self, label: &str) -> String {
        format!("{label}.{}", self.tld)
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self::for_tld(DEFAULT_TLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::hex_id;

    #[test]
    fn default_is_pls() {
        let cfg = RegistrarConfig::default();
        assert_eq!(cfg.tld, "pls");
        assert_eq!(cfg.grace_period, 2_592_000);
        assert_eq!(
            hex_id(cfg.root_node),
            "0x55fb31aa6f23709345f51ac8d7e4ed79336defe55be2733bc226ed0f1f62f3c8"
        );
    }

    #[test]
    fn full_name_appends_suffix() {
        assert_eq!(RegistrarConfig::default().full_name("alice"), "alice.pls");
        assert_eq!(RegistrarConfig::for_tld("eth").full_name("bob"), "bob.eth");
    }
}
