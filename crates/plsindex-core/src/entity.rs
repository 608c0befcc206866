//! Entity model — the mutable graph plus the immutable audit records.
//!
//! Every entity is keyed by a lower-case hex string (address, label or domain
//! key) or, for audit records, by the event id from [`crate::eventlog`].

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A storable entity.
pub trait Entity: Serialize + DeserializeOwned {
    /// Entity kind, used as the store's namespace.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// An entity created lazily with default attributes on first observation.
pub trait LazyEntity: Entity {
    fn with_default(id: &str) -> Self;
}

fn to_datetime(ts: U256) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(u64::try_from(ts).ok()?).ok()?;
    DateTime::from_timestamp(secs, 0)
}

// ─── Mutable entities ─────────────────────────────────────────────────────────

/// An owner address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Entity for Account {
    const KIND: &'static str = "Account";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A name under the root namespace, keyed by `keccak256(root_node ‖ label)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    /// Label hash this domain was provisioned for, when known.
    pub label_hash: Option<String>,
    pub label_name: Option<String>,
    /// Fully-qualified name, e.g. `alice.pls`.
    pub name: Option<String>,
    /// Registry-level owner, set by the provisioning flow.
    pub owner: Option<String>,
    /// Registrar-level owner (Account id).
    pub registrant: Option<String>,
    /// Contract expiry plus the grace period.
    pub expiry_date: Option<U256>,
}

impl Domain {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label_hash: None,
            label_name: None,
            name: None,
            owner: None,
            registrant: None,
            expiry_date: None,
        }
    }

    /// End of the grace period as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.and_then(to_datetime)
    }

    /// Returns `true` if the name is still held at `now`, grace period included.
    pub fn is_held_at(&self, now: DateTime<Utc>) -> bool {
        match (self.expiry_date, u64::try_from(now.timestamp())) {
            (Some(expiry), Ok(now)) => U256::from(now) < expiry,
            (Some(_), Err(_)) => true,
            (None, _) => false,
        }
    }
}

impl Entity for Domain {
    const KIND: &'static str = "Domain";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A base-registrar registration, keyed by the label hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    /// Domain id.
    pub domain: String,
    /// Block timestamp of the most recent `NameRegistered`.
    pub registration_date: u64,
    /// Contract-reported expiry, without grace period.
    pub expiry_date: U256,
    /// Account id.
    pub registrant: String,
    pub label_name: Option<String>,
    pub cost: Option<U256>,
}

impl Registration {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.expiry_date)
    }
}

impl Entity for Registration {
    const KIND: &'static str = "Registration";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Referral accounting per referrer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub id: String,
    pub count: u64,
    pub commission: U256,
}

impl Entity for Referrer {
    const KIND: &'static str = "Referrer";
    fn id(&self) -> &str {
        &self.id
    }
}

impl LazyEntity for Referrer {
    fn with_default(id: &str) -> Self {
        Self {
            id: id.to_string(),
            count: 0,
            commission: U256::ZERO,
        }
    }
}

/// Current banned flag of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    pub id: String,
    pub banned: bool,
}

impl Entity for Blacklist {
    const KIND: &'static str = "Blacklist";
    fn id(&self) -> &str {
        &self.id
    }
}

impl LazyEntity for Blacklist {
    fn with_default(id: &str) -> Self {
        Self {
            id: id.to_string(),
            banned: false,
        }
    }
}

// ─── Immutable audit records ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRegistered {
    pub id: String,
    pub registration: String,
    pub block_number: u64,
    pub transaction_id: String,
    pub registrant: String,
    pub expiry_date: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRenewed {
    pub id: String,
    pub registration: String,
    pub block_number: u64,
    pub transaction_id: String,
    pub expiry_date: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTransferred {
    pub id: String,
    pub registration: String,
    pub block_number: u64,
    pub transaction_id: String,
    pub new_owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistChanged {
    pub id: String,
    pub account: String,
    pub banned: bool,
    pub block_number: u64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralFeeReceived {
    pub id: String,
    pub referrer: String,
    pub amount: U256,
}

macro_rules! audit_record {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: &'static str = stringify!($ty);
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

audit_record!(
    NameRegistered,
    NameRenewed,
    NameTransferred,
    BlacklistChanged,
    ReferralFeeReceived,
);

/// Every entity kind, in display order.
pub const ALL_KINDS: [&str; 10] = [
    Account::KIND,
    Domain::KIND,
    Registration::KIND,
    Referrer::KIND,
    Blacklist::KIND,
    NameRegistered::KIND,
    NameRenewed::KIND,
    NameTransferred::KIND,
    BlacklistChanged::KIND,
    ReferralFeeReceived::KIND,
];
