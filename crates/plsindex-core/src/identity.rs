//! Identity codec — token ids, label hashes and domain keys.
//!
//! The base registrar identifies a name by `uint256(keccak256(label))`. The
//! domain key is the ENS-style node of that label under the root namespace:
//!   keccak256(root_node ‖ label)

use alloy_primitives::{B256, U256};
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Big-endian 32-byte encoding of a registrar token id (the on-chain label hash).
pub fn label_from_id(token_id: U256) -> B256 {
    B256::from(token_id.to_be_bytes::<32>())
}

/// Inverse of [`label_from_id`].
pub fn id_from_label(label: &B256) -> U256 {
    U256::from_be_bytes(label.0)
}

/// Content-addressed key of the domain for `label` under `root_node`.
pub fn domain_key(root_node: &B256, label: &B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(root_node.as_slice());
    buf[32..].copy_from_slice(label.as_slice());
    keccak256(&buf)
}

/// Hash of a single plaintext label segment.
pub fn label_hash(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Namehash of a top-level name: keccak256(0x00…00 ‖ keccak256(tld)).
pub fn namehash_tld(tld: &str) -> B256 {
    domain_key(&B256::ZERO, &label_hash(tld))
}

/// Lower-case `0x`-prefixed hex, the canonical form of every entity id.
pub fn hex_id(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
