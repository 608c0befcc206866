//! Registration lifecycle: register, renew, transfer, and domain provisioning.
//!
//! The Domain's expiry always includes the grace period; the Registration's
//! expiry is the raw contract value.

use alloy_primitives::U256;

use super::Projector;
use crate::entity::{Account, Domain, NameRegistered, NameRenewed, NameTransferred, Registration};
use crate::error::IndexerError;
use crate::eventlog::{self, event_id};
use crate::events::{NameRegisteredEvent, NameRenewedEvent, NewOwnerEvent, TransferEvent};
use crate::identity::{hex_id, label_from_id};
use crate::label::{is_valid_label, NameLookup};
use crate::store::{EntityStore, EntityStoreExt};

impl<S: EntityStore, L: NameLookup> Projector<S, L> {
    fn domain_expiry(&self, expires: U256) -> U256 {
        expires.saturating_add(U256::from(self.config.grace_period))
    }

    /// BaseRegistrar `NameRegistered(id, owner, expires)`.
    pub fn name_registered(&self, event: &NameRegisteredEvent) -> Result<(), IndexerError> {
        let label = label_from_id(event.id);
        let (label_id, domain_id) = self.entity_ids(&label);
        let mut domain: Domain = self.store.require(&domain_id)?;

        let account = Account::new(hex_id(event.owner.as_slice()));
        let mut registration = Registration {
            id: label_id.clone(),
            domain: domain_id,
            registration_date: event.meta.block_timestamp,
            expiry_date: event.expires,
            registrant: account.id.clone(),
            label_name: None,
            cost: None,
        };

        domain.registrant = Some(account.id.clone());
        domain.expiry_date = Some(self.domain_expiry(event.expires));

        let resolved = self.names.name_by_hash(&label);
        if let Some(name) = resolved.filter(|n| is_valid_label(Some(n.as_str()))) {
            domain.name = Some(self.config.full_name(&name));
            domain.label_name = Some(name.clone());
            registration.label_name = Some(name);
        }

        self.store.save(&account)?;
        self.store.save(&domain)?;
        self.store.save(&registration)?;
        eventlog::append(
            &self.store,
            &NameRegistered {
                id: event_id(&event.meta),
                registration: label_id,
                block_number: event.meta.block_number,
                transaction_id: event.meta.tx_hash.clone(),
                registrant: account.id,
                expiry_date: event.expires,
            },
        )?;

        tracing::debug!(
            registration = %registration.id,
            registrant = %registration.registrant,
            expires = %event.expires,
            "name registered"
        );
        Ok(())
    }

    /// BaseRegistrar `NameRenewed(id, expires)`.
    pub fn name_renewed(&self, event: &NameRenewedEvent) -> Result<(), IndexerError> {
        let label = label_from_id(event.id);
        let (label_id, domain_id) = self.entity_ids(&label);
        let mut registration: Registration = self.store.require(&label_id)?;
        let mut domain: Domain = self.store.require(&domain_id)?;

        registration.expiry_date = event.expires;
        domain.expiry_date = Some(self.domain_expiry(event.expires));

        self.store.save(&registration)?;
        self.store.save(&domain)?;
        eventlog::append(
            &self.store,
            &NameRenewed {
                id: event_id(&event.meta),
                registration: label_id,
                block_number: event.meta.block_number,
                transaction_id: event.meta.tx_hash.clone(),
                expiry_date: event.expires,
            },
        )?;

        tracing::debug!(registration = %registration.id, expires = %event.expires, "name renewed");
        Ok(())
    }

    /// BaseRegistrar `Transfer(from, to, tokenId)`.
    ///
    /// A token whose registration was never indexed (mints observed before
    /// `NameRegistered`, or tokens from outside the indexed range) is skipped.
    pub fn name_transferred(&self, event: &TransferEvent) -> Result<(), IndexerError> {
        let account = Account::new(hex_id(event.to.as_slice()));
        let label = label_from_id(event.token_id);
        let (label_id, domain_id) = self.entity_ids(&label);

        let Some(mut registration) = self.store.load::<Registration>(&label_id)? else {
            self.store.save(&account)?;
            tracing::debug!(registration = %label_id, "transfer of unindexed token, skipping");
            return Ok(());
        };
        let mut domain: Domain = self.store.require(&domain_id)?;

        registration.registrant = account.id.clone();
        domain.registrant = Some(account.id.clone());

        self.store.save(&account)?;
        self.store.save(&domain)?;
        self.store.save(&registration)?;
        eventlog::append(
            &self.store,
            &NameTransferred {
                id: event_id(&event.meta),
                registration: label_id,
                block_number: event.meta.block_number,
                transaction_id: event.meta.tx_hash.clone(),
                new_owner: account.id,
            },
        )?;

        tracing::debug!(registration = %registration.id, to = %registration.registrant, "name transferred");
        Ok(())
    }

    /// Registry `NewOwner(node, label, owner)`.
    ///
    /// Creates the Domain that registrar events expect to find. Subnodes of
    /// anything other than the root node are ignored.
    pub fn new_owner(&self, event: &NewOwnerEvent) -> Result<(), IndexerError> {
        if event.node != self.config.root_node {
            return Ok(());
        }
        let account = Account::new(hex_id(event.owner.as_slice()));
        let (label_id, domain_id) = self.entity_ids(&event.label);

        let mut domain = self
            .store
            .load::<Domain>(&domain_id)?
            .unwrap_or_else(|| Domain::new(domain_id));
        domain.label_hash = Some(label_id);
        domain.owner = Some(account.id.clone());

        self.store.save(&account)?;
        self.store.save(&domain)?;
        tracing::debug!(domain = %domain.id, owner = %account.id, "domain provisioned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::super::testing::*;
    use crate::entity::{Account, Domain, Registration};
    use crate::error::IndexerError;
    use crate::events::{NameRenewedEvent, NewOwnerEvent, TransferEvent};
    use crate::identity::{hex_id, label_hash};
    use crate::store::{EntityStore, EntityStoreExt};

    #[test]
    fn renew_without_registration_is_fatal_and_writes_nothing() {
        let p = projector(&[]);
        let id = U256::from(7u64);
        provision(&p, id);
        let err = p
            .name_renewed(&NameRenewedEvent {
                meta: meta(10, 0),
                id,
                expires: U256::from(2_000_000_000u64),
            })
            .unwrap_err();
        assert!(matches!(err, IndexerError::MissingEntity { kind: "Registration", .. }));
        assert_eq!(p.store().ids("NameRenewed").unwrap().len(), 0);
    }

    #[test]
    fn transfer_of_unknown_token_only_records_account() {
        let p = projector(&[]);
        p.name_transferred(&TransferEvent {
            meta: meta(10, 0),
            from: addr(0x01),
            to: addr(0x02),
            token_id: U256::from(99u64),
        })
        .unwrap();
        assert!(p.store().load::<Account>(&hex_id(addr(0x02).as_slice())).unwrap().is_some());
        assert!(p.store().load::<Registration>(&label_id(U256::from(99u64))).unwrap().is_none());
        assert_eq!(p.store().ids("NameTransferred").unwrap().len(), 0);
    }

    #[test]
    fn new_owner_under_root_provisions_domain() {
        let p = projector(&[]);
        let label = label_hash("alice");
        p.new_owner(&NewOwnerEvent {
            meta: meta(5, 0),
            node: p.config().root_node,
            label,
            owner: addr(0xaa),
        })
        .unwrap();

        let (_, domain_id) = p.entity_ids(&label);
        let domain: Domain = p.store().require(&domain_id).unwrap();
        assert_eq!(domain.label_hash, Some(hex_id(label)));
        assert_eq!(domain.owner, Some(hex_id(addr(0xaa).as_slice())));
        assert!(domain.registrant.is_none());
    }

    #[test]
    fn new_owner_under_other_node_is_ignored() {
        let p = projector(&[]);
        p.new_owner(&NewOwnerEvent {
            meta: meta(5, 0),
            node: label_hash("not-a-root"),
            label: label_hash("alice"),
            owner: addr(0xaa),
        })
        .unwrap();
        assert_eq!(p.store().ids("Domain").unwrap().len(), 0);
        assert_eq!(p.store().ids("Account").unwrap().len(), 0);
    }
}
