//! Referral accounting.

use super::Projector;
use crate::entity::{ReferralFeeReceived, Referrer};
use crate::error::IndexerError;
use crate::eventlog::{self, event_id};
use crate::events::ReferralFeeReceivedEvent;
use crate::identity::hex_id;
use crate::label::NameLookup;
use crate::store::{EntityStore, EntityStoreExt};

impl<S: EntityStore, L: NameLookup> Projector<S, L> {
    /// Controller `ReferralFeeReceived(referrer, amount)`.
    ///
    /// Every event counts as one referral; only non-zero fees touch the
    /// commission.
    pub fn referral_fee_received(&self, event: &ReferralFeeReceivedEvent) -> Result<(), IndexerError> {
        let referrer_id = hex_id(event.referrer.as_slice());
        let mut referrer: Referrer = self.store.load_or_default(&referrer_id)?;

        referrer.count += 1;
        if !event.amount.is_zero() {
            referrer.commission = referrer
                .commission
                .checked_add(event.amount)
                .ok_or_else(|| IndexerError::Overflow(format!("commission of {referrer_id}")))?;
        }

        self.store.save(&referrer)?;
        eventlog::append(
            &self.store,
            &ReferralFeeReceived {
                id: event_id(&event.meta),
                referrer: referrer_id,
                amount: event.amount,
            },
        )?;

        tracing::debug!(
            referrer = %referrer.id,
            count = referrer.count,
            commission = %referrer.commission,
            "referral fee received"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::super::testing::*;
    use crate::entity::Referrer;
    use crate::events::ReferralFeeReceivedEvent;
    use crate::identity::hex_id;
    use crate::store::{EntityStore, EntityStoreExt};

    #[test]
    fn first_referral_creates_referrer() {
        let p = projector(&[]);
        p.referral_fee_received(&ReferralFeeReceivedEvent {
            meta: meta(1, 0),
            referrer: addr(0x0f),
            amount: U256::from(250u64),
        })
        .unwrap();

        let r: Referrer = p.store().require(&hex_id(addr(0x0f).as_slice())).unwrap();
        assert_eq!(r.count, 1);
        assert_eq!(r.commission, U256::from(250u64));
        assert_eq!(p.store().ids("ReferralFeeReceived").unwrap().len(), 1);
    }

    #[test]
    fn commission_overflow_leaves_referrer_untouched() {
        let p = projector(&[]);
        let id = hex_id(addr(0x0f).as_slice());
        p.store()
            .save(&Referrer {
                id: id.clone(),
                count: 3,
                commission: U256::MAX,
            })
            .unwrap();

        assert!(p
            .referral_fee_received(&ReferralFeeReceivedEvent {
                meta: meta(1, 0),
                referrer: addr(0x0f),
                amount: U256::from(1u64),
            })
            .is_err());
        let r: Referrer = p.store().require(&id).unwrap();
        assert_eq!(r.count, 3);
    }
}
