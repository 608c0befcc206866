//! Controller-observed plaintext names.
//!
//! The controller emits the plaintext label alongside its hash, which fills in
//! names the reverse lookup could not resolve at registration time.

use alloy_primitives::{B256, U256};

use super::Projector;
use crate::entity::{Domain, Registration};
use crate::error::IndexerError;
use crate::events::{ControllerNameRegisteredEvent, ControllerNameRenewedEvent};
use crate::label::{is_valid_label, NameLookup};
use crate::store::{EntityStore, EntityStoreExt};

impl<S: EntityStore, L: NameLookup> Projector<S, L> {
    /// Controller `NameRegistered(name, label, owner, baseCost, premium, expires)`.
    pub fn controller_name_registered(
        &self,
        event: &ControllerNameRegisteredEvent,
    ) -> Result<(), IndexerError> {
        let cost = event.base_cost.checked_add(event.premium).ok_or_else(|| {
            IndexerError::Overflow(format!(
                "registration cost of '{}' exceeds uint256",
                event.name.escape_debug()
            ))
        })?;
        self.set_name_preimage(&event.name, &event.label, cost)
    }

    /// Controller `NameRenewed(name, label, cost, expires)`.
    pub fn controller_name_renewed(
        &self,
        event: &ControllerNameRenewedEvent,
    ) -> Result<(), IndexerError> {
        self.set_name_preimage(&event.name, &event.label, event.cost)
    }

    /// Attach a plaintext name to the Domain and, if indexed, the Registration.
    ///
    /// Names that fail the label gate are ignored. A missing Registration is
    /// tolerated: controller and registrar logs are not ordered relative to
    /// each other.
    pub fn set_name_preimage(&self, name: &str, label: &B256, cost: U256) -> Result<(), IndexerError> {
        if !is_valid_label(Some(name)) {
            return Ok(());
        }
        let (label_id, domain_id) = self.entity_ids(label);
        let mut domain: Domain = self.store.require(&domain_id)?;
        let registration = self.store.load::<Registration>(&label_id)?;

        if domain.label_name.as_deref() != Some(name) {
            domain.label_name = Some(name.to_string());
            domain.name = Some(self.config.full_name(name));
            self.store.save(&domain)?;
        }

        match registration {
            Some(mut registration) => {
                registration.label_name = Some(name.to_string());
                registration.cost = Some(cost);
                self.store.save(&registration)?;
            }
            None => {
                tracing::debug!(registration = %label_id, "preimage for unindexed registration");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::super::testing::*;
    use super::super::Projector;
    use crate::config::RegistrarConfig;
    use crate::entity::{Domain, Registration};
    use crate::error::IndexerError;
    use crate::events::{ControllerNameRegisteredEvent, ControllerNameRenewedEvent};
    use crate::identity::{hex_id, id_from_label, label_hash};
    use crate::label::NoNameLookup;
    use crate::store::{EntityStore, EntityStoreExt, MemoryEntityStore};

    /// Counts `put` calls per kind on top of an in-memory store.
    #[derive(Default)]
    struct WriteCounter {
        inner: MemoryEntityStore,
        writes: Mutex<HashMap<String, usize>>,
    }

    impl WriteCounter {
        fn writes(&self, kind: &str) -> usize {
            self.writes.lock().unwrap().get(kind).copied().unwrap_or(0)
        }
    }

    impl EntityStore for WriteCounter {
        fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, IndexerError> {
            self.inner.get(kind, id)
        }

        fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), IndexerError> {
            *self.writes.lock().unwrap().entry(kind.to_string()).or_default() += 1;
            self.inner.put(kind, id, value)
        }

        fn ids(&self, kind: &str) -> Result<Vec<String>, IndexerError> {
            self.inner.ids(kind)
        }
    }

    #[test]
    fn preimage_without_registration_names_domain_only() {
        let p = projector(&[]);
        let label = label_hash("alice");
        let domain_id = provision(&p, id_from_label(&label));

        p.controller_name_renewed(&ControllerNameRenewedEvent {
            meta: meta(1, 0),
            name: "alice".into(),
            label,
            cost: U256::from(5u64),
        })
        .unwrap();

        let domain: Domain = p.store().require(&domain_id).unwrap();
        assert_eq!(domain.label_name.as_deref(), Some("alice"));
        assert_eq!(domain.name.as_deref(), Some("alice.pls"));
        assert!(p
            .store()
            .load::<Registration>(&label_id(id_from_label(&label)))
            .unwrap()
            .is_none());
    }

    #[test]
    fn invalid_name_is_ignored_even_without_domain() {
        let p = projector(&[]);
        p.controller_name_renewed(&ControllerNameRenewedEvent {
            meta: meta(1, 0),
            name: "bad\0name".into(),
            label: label_hash("bad\0name"),
            cost: U256::from(5u64),
        })
        .unwrap();
    }

    #[test]
    fn valid_name_without_domain_is_fatal() {
        let p = projector(&[]);
        let err = p
            .controller_name_renewed(&ControllerNameRenewedEvent {
                meta: meta(1, 0),
                name: "ghost".into(),
                label: label_hash("ghost"),
                cost: U256::from(5u64),
            })
            .unwrap_err();
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn cost_overflow_is_reported() {
        let p = projector(&[]);
        let err = p
            .controller_name_registered(&ControllerNameRegisteredEvent {
                meta: meta(1, 0),
                name: "alice".into(),
                label: label_hash("alice"),
                base_cost: U256::MAX,
                premium: U256::from(1u64),
            })
            .unwrap_err();
        assert!(matches!(err, IndexerError::Overflow(_)));
    }

    #[test]
    fn repeated_preimage_rewrites_registration_not_domain() {
        let p = Projector::new(RegistrarConfig::default(), WriteCounter::default(), NoNameLookup);
        let label = label_hash("alice");
        let (label_id, domain_id) = p.entity_ids(&label);
        p.store().save(&Domain::new(domain_id.clone())).unwrap();
        p.store()
            .save(&Registration {
                id: label_id.clone(),
                domain: domain_id.clone(),
                registration_date: 1_690_000_000,
                expiry_date: U256::from(1_700_000_000u64),
                registrant: hex_id(addr(0x11).as_slice()),
                label_name: None,
                cost: None,
            })
            .unwrap();

        for cost in [5u64, 9] {
            p.controller_name_renewed(&ControllerNameRenewedEvent {
                meta: meta(1, 0),
                name: "alice".into(),
                label,
                cost: U256::from(cost),
            })
            .unwrap();
        }

        // one provisioning write plus the first naming
        assert_eq!(p.store().writes("Domain"), 2);
        assert_eq!(p.store().writes("Registration"), 3);
        let registration: Registration = p.store().require(&label_id).unwrap();
        assert_eq!(registration.cost, Some(U256::from(9u64)));
    }
}
