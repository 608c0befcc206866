//! Typed registrar events and decoding from the generic decoded-log form.
//!
//! The ingestion side hands over ABI-decoded logs as a JSON field map keyed by
//! the Solidity parameter names. Integers may arrive as JSON numbers or as
//! decimal / `0x` strings.

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IndexerError;
use crate::handler::DecodedEvent;
use crate::types::IndexContext;

/// Schema names the projector subscribes to.
pub mod schema {
    // BaseRegistrar
    pub const NAME_REGISTERED: &str = "NameRegistered";
    pub const NAME_RENEWED: &str = "NameRenewed";
    pub const TRANSFER: &str = "Transfer";
    // RegistrarController
    pub const CONTROLLER_NAME_REGISTERED: &str = "ControllerNameRegistered";
    pub const CONTROLLER_NAME_RENEWED: &str = "ControllerNameRenewed";
    pub const BLACKLIST_CHANGED: &str = "BlacklistChanged";
    pub const REFERRAL_FEE_RECEIVED: &str = "ReferralFeeReceived";
    // Registry
    pub const NEW_OWNER: &str = "NewOwner";

    pub const ALL: [&str; 8] = [
        NAME_REGISTERED,
        NAME_RENEWED,
        TRANSFER,
        CONTROLLER_NAME_REGISTERED,
        CONTROLLER_NAME_RENEWED,
        BLACKLIST_CHANGED,
        REFERRAL_FEE_RECEIVED,
        NEW_OWNER,
    ];
}

/// Where an event was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub block_number: u64,
    pub block_timestamp: u64,
    /// Transaction hash, lower-case `0x…`.
    pub tx_hash: String,
    pub log_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRegisteredEvent {
    pub meta: EventMeta,
    pub id: U256,
    pub owner: Address,
    pub expires: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRenewedEvent {
    pub meta: EventMeta,
    pub id: U256,
    pub expires: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub meta: EventMeta,
    pub from: Address,
    pub to: Address,
    pub token_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerNameRegisteredEvent {
    pub meta: EventMeta,
    pub name: String,
    pub label: B256,
    pub base_cost: U256,
    pub premium: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerNameRenewedEvent {
    pub meta: EventMeta,
    pub name: String,
    pub label: B256,
    pub cost: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistChangedEvent {
    pub meta: EventMeta,
    pub account: Address,
    pub banned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralFeeReceivedEvent {
    pub meta: EventMeta,
    pub referrer: Address,
    pub amount: U256,
}

/// Registry `NewOwner(node, label, owner)` — provisions a subdomain of `node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwnerEvent {
    pub meta: EventMeta,
    pub node: B256,
    pub label: B256,
    pub owner: Address,
}

/// Any event the projector handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarEvent {
    NameRegistered(NameRegisteredEvent),
    NameRenewed(NameRenewedEvent),
    Transfer(TransferEvent),
    ControllerNameRegistered(ControllerNameRegisteredEvent),
    ControllerNameRenewed(ControllerNameRenewedEvent),
    BlacklistChanged(BlacklistChangedEvent),
    ReferralFeeReceived(ReferralFeeReceivedEvent),
    NewOwner(NewOwnerEvent),
}

impl RegistrarEvent {
    /// Decode a generic decoded log into a typed event.
    pub fn decode(event: &DecodedEvent, ctx: &IndexContext) -> Result<Self, IndexerError> {
        let meta = EventMeta {
            block_number: event.block_number,
            block_timestamp: ctx.block.timestamp,
            tx_hash: event.tx_hash.to_ascii_lowercase(),
            log_index: event.log_index,
        };
        let f = Fields {
            schema: &event.schema,
            values: &event.fields_json,
        };

        let decoded = match event.schema.as_str() {
            schema::NAME_REGISTERED => Self::NameRegistered(NameRegisteredEvent {
                id: f.uint("id")?,
                owner: f.address("owner")?,
                expires: f.uint("expires")?,
                meta,
            }),
            schema::NAME_RENEWED => Self::NameRenewed(NameRenewedEvent {
                id: f.uint("id")?,
                expires: f.uint("expires")?,
                meta,
            }),
            schema::TRANSFER => Self::Transfer(TransferEvent {
                from: f.address("from")?,
                to: f.address("to")?,
                token_id: f.uint("tokenId")?,
                meta,
            }),
            schema::CONTROLLER_NAME_REGISTERED => {
                Self::ControllerNameRegistered(ControllerNameRegisteredEvent {
                    name: f.string("name")?,
                    label: f.bytes32("label")?,
                    base_cost: f.uint("baseCost")?,
                    premium: f.uint("premium")?,
                    meta,
                })
            }
            schema::CONTROLLER_NAME_RENEWED => {
                Self::ControllerNameRenewed(ControllerNameRenewedEvent {
                    name: f.string("name")?,
                    label: f.bytes32("label")?,
                    cost: f.uint("cost")?,
                    meta,
                })
            }
            schema::BLACKLIST_CHANGED => Self::BlacklistChanged(BlacklistChangedEvent {
                account: f.address("account")?,
                banned: f.boolean("banned")?,
                meta,
            }),
            schema::REFERRAL_FEE_RECEIVED => Self::ReferralFeeReceived(ReferralFeeReceivedEvent {
                referrer: f.address("referrer")?,
                amount: f.uint("amount")?,
                meta,
            }),
            schema::NEW_OWNER => Self::NewOwner(NewOwnerEvent {
                node: f.bytes32("node")?,
                label: f.bytes32("label")?,
                owner: f.address("owner")?,
                meta,
            }),
            other => return Err(IndexerError::decode(other, "unknown schema")),
        };
        Ok(decoded)
    }

    /// Schema name of this event.
    pub fn schema(&self) -> &'static str {
        match self {
            Self::NameRegistered(_) => schema::NAME_REGISTERED,
            Self::NameRenewed(_) => schema::NAME_RENEWED,
            Self::Transfer(_) => schema::TRANSFER,
            Self::ControllerNameRegistered(_) => schema::CONTROLLER_NAME_REGISTERED,
            Self::ControllerNameRenewed(_) => schema::CONTROLLER_NAME_RENEWED,
            Self::BlacklistChanged(_) => schema::BLACKLIST_CHANGED,
            Self::ReferralFeeReceived(_) => schema::REFERRAL_FEE_RECEIVED,
            Self::NewOwner(_) => schema::NEW_OWNER,
        }
    }

    pub fn meta(&self) -> &EventMeta {
        match self {
            Self::NameRegistered(e) => &e.meta,
            Self::NameRenewed(e) => &e.meta,
            Self::Transfer(e) => &e.meta,
            Self::ControllerNameRegistered(e) => &e.meta,
            Self::ControllerNameRenewed(e) => &e.meta,
            Self::BlacklistChanged(e) => &e.meta,
            Self::ReferralFeeReceived(e) => &e.meta,
            Self::NewOwner(e) => &e.meta,
        }
    }
}

// ─── Field access ─────────────────────────────────────────────────────────────

struct Fields<'a> {
    schema: &'a str,
    values: &'a Value,
}

impl<'a> Fields<'a> {
    fn get(&self, name: &str) -> Result<&'a Value, IndexerError> {
        self.values
            .get(name)
            .ok_or_else(|| IndexerError::decode(self.schema, format!("missing field '{name}'")))
    }

    fn invalid(&self, name: &str, detail: impl std::fmt::Display) -> IndexerError {
        IndexerError::decode(self.schema, format!("invalid field '{name}': {detail}"))
    }

    fn text(&self, name: &str) -> Result<&'a str, IndexerError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.invalid(name, "expected a string"))
    }

    fn string(&self, name: &str) -> Result<String, IndexerError> {
        self.text(name).map(str::to_string)
    }

    fn uint(&self, name: &str) -> Result<U256, IndexerError> {
        match self.get(name)? {
            Value::Number(n) => n
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| self.invalid(name, "expected an unsigned integer")),
            Value::String(s) => U256::from_str(s).map_err(|e| self.invalid(name, e)),
            _ => Err(self.invalid(name, "expected an integer")),
        }
    }

    fn address(&self, name: &str) -> Result<Address, IndexerError> {
        Address::from_str(self.text(name)?).map_err(|e| self.invalid(name, e))
    }

    fn bytes32(&self, name: &str) -> Result<B256, IndexerError> {
        B256::from_str(self.text(name)?).map_err(|e| self.invalid(name, e))
    }

    fn boolean(&self, name: &str) -> Result<bool, IndexerError> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.invalid(name, "expected a boolean"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockSummary;
    use serde_json::json;

    fn ctx() -> IndexContext {
        IndexContext::new(BlockSummary {
            number: 100,
            hash: "0xb100".into(),
            timestamp: 1_690_000_000,
        })
    }

    fn decoded(schema: &str, fields: Value) -> DecodedEvent {
        DecodedEvent {
            schema: schema.into(),
            address: "0x0".into(),
            tx_hash: "0xABCDEF".into(),
            block_number: 100,
            log_index: 3,
            fields_json: fields,
        }
    }

    #[test]
    fn decodes_name_registered() {
        let ev = decoded(
            schema::NAME_REGISTERED,
            json!({
                "id": "12345",
                "owner": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "expires": 1_700_000_000u64,
            }),
        );
        let RegistrarEvent::NameRegistered(e) = RegistrarEvent::decode(&ev, &ctx()).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.id, U256::from(12345u64));
        assert_eq!(e.expires, U256::from(1_700_000_000u64));
        assert_eq!(e.meta.block_timestamp, 1_690_000_000);
        assert_eq!(e.meta.tx_hash, "0xabcdef");
        assert_eq!(e.meta.log_index, 3);
    }

    #[test]
    fn decodes_hex_integers_and_labels() {
        let label = format!("0x{}", "11".repeat(32));
        let ev = decoded(
            schema::CONTROLLER_NAME_RENEWED,
            json!({ "name": "alice", "label": label, "cost": "0x0de0b6b3a7640000" }),
        );
        let decoded = RegistrarEvent::decode(&ev, &ctx()).unwrap();
        assert_eq!(decoded.schema(), schema::CONTROLLER_NAME_RENEWED);
        let RegistrarEvent::ControllerNameRenewed(e) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(e.cost, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(e.label, B256::repeat_byte(0x11));
    }

    #[test]
    fn missing_field_is_decode_error() {
        let ev = decoded(schema::BLACKLIST_CHANGED, json!({ "banned": true }));
        let err = RegistrarEvent::decode(&ev, &ctx()).unwrap_err();
        assert!(err.to_string().contains("missing field 'account'"));
    }

    #[test]
    fn wrong_type_is_decode_error() {
        let ev = decoded(
            schema::BLACKLIST_CHANGED,
            json!({ "account": "0x1111111111111111111111111111111111111111", "banned": "yes" }),
        );
        assert!(matches!(
            RegistrarEvent::decode(&ev, &ctx()),
            Err(IndexerError::Decode { .. })
        ));
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let ev = decoded("Approval", json!({}));
        assert!(RegistrarEvent::decode(&ev, &ctx()).is_err());
    }
}
