//! The projector — turns registrar events into entity mutations.
//!
//! Each operation checks its preconditions before the first write, so an
//! event that fails with [`IndexerError::MissingEntity`] leaves the store as
//! it found it. Handlers are split by concern:
//!
//! - [`lifecycle`] — base-registrar register / renew / transfer, and domain
//!   provisioning from the registry
//! - [`preimage`] — controller-observed plaintext names
//! - [`referral`] — referrer counters and commission
//! - [`compliance`] — blacklist flags

mod compliance;
mod lifecycle;
mod preimage;
mod referral;

use alloy_primitives::B256;

use crate::config::RegistrarConfig;
use crate::error::IndexerError;
use crate::events::RegistrarEvent;
use crate::identity::{domain_key, hex_id};
use crate::label::NameLookup;
use crate::store::EntityStore;

/// Projects registrar events into an [`EntityStore`].
pub struct Projector<S, L> {
    config: RegistrarConfig,
    store: S,
    names: L,
}

impl<S, L> Projector<S, L> {
    pub fn new(config: RegistrarConfig, store: S, names: L) -> Self {
        Self {
            config,
            store,
            names,
        }
    }

    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// `(registration id, domain id)` for a label hash.
    pub fn entity_ids(&self, label: &B256) -> (String, String) {
        (
            hex_id(label),
            hex_id(domain_key(&self.config.root_node, label)),
        )
    }
}

impl<S: EntityStore, L: NameLookup> Projector<S, L> {
    /// Apply one event.
    pub fn apply(&self, event: &RegistrarEvent) -> Result<(), IndexerError> {
        let meta = event.meta();
        tracing::debug!(
            schema = event.schema(),
            block = meta.block_number,
            tx = %meta.tx_hash,
            log_index = meta.log_index,
            "projecting event"
        );
        match event {
            RegistrarEvent::NameRegistered(e) => self.name_registered(e),
            RegistrarEvent::NameRenewed(e) => self.name_renewed(e),
            RegistrarEvent::Transfer(e) => self.name_transferred(e),
            RegistrarEvent::ControllerNameRegistered(e) => self.controller_name_registered(e),
            RegistrarEvent::ControllerNameRenewed(e) => self.controller_name_renewed(e),
            RegistrarEvent::BlacklistChanged(e) => self.blacklist_changed(e),
            RegistrarEvent::ReferralFeeReceived(e) => self.referral_fee_received(e),
            RegistrarEvent::NewOwner(e) => self.new_owner(e),
        }
    }
}
