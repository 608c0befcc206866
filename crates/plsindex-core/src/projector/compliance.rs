//! Blacklist flags. Mutable state keeps only the latest flag; the history
//! lives in the `BlacklistChanged` audit records.

use super::Projector;
use crate::entity::{Blacklist, BlacklistChanged};
use crate::error::IndexerError;
use crate::eventlog::{self, event_id};
use crate::events::BlacklistChangedEvent;
use crate::identity::hex_id;
use crate::label::NameLookup;
use crate::store::{EntityStore, EntityStoreExt};

impl<S: EntityStore, L: NameLookup> Projector<S, L> {
    /// Controller `BlacklistChanged(account, banned)`.
    pub fn blacklist_changed(&self, event: &BlacklistChangedEvent) -> Result<(), IndexerError> {
        let account = hex_id(event.account.as_slice());
        let mut flag: Blacklist = self.store.load_or_default(&account)?;
        flag.banned = event.banned;

        self.store.save(&flag)?;
        eventlog::append(
            &self.store,
            &BlacklistChanged {
                id: event_id(&event.meta),
                account,
                banned: event.banned,
                block_number: event.meta.block_number,
                transaction_id: event.meta.tx_hash.clone(),
            },
        )?;

        tracing::debug!(account = %flag.id, banned = flag.banned, "blacklist changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::entity::{Blacklist, BlacklistChanged};
    use crate::eventlog::event_id;
    use crate::events::BlacklistChangedEvent;
    use crate::identity::hex_id;
    use crate::store::EntityStoreExt;

    #[test]
    fn records_flag_and_audit_entry() {
        let p = projector(&[]);
        let event = BlacklistChangedEvent {
            meta: meta(42, 2),
            account: addr(0xbb),
            banned: true,
        };
        p.blacklist_changed(&event).unwrap();

        let account = hex_id(addr(0xbb).as_slice());
        let flag: Blacklist = p.store().require(&account).unwrap();
        assert!(flag.banned);

        let record: BlacklistChanged = p.store().require(&event_id(&event.meta)).unwrap();
        assert_eq!(record.account, account);
        assert!(record.banned);
        assert_eq!(record.block_number, 42);
        assert_eq!(record.transaction_id, event.meta.tx_hash);
    }
}
