//! `plsindex replay` — project a JSON-lines event dump.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use plsindex_core::entity::{Domain, ALL_KINDS};
use plsindex_core::{
    register_projector, BlockSummary, DecodedEvent, EntityStore, EntityStoreExt, HandlerRegistry,
    IndexContext, Projector, RainbowTable, RegistrarConfig,
};
use plsindex_storage::{MemoryEntityStore, SqliteEntityStore};

/// One line of an event dump.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    schema: String,
    #[serde(default)]
    address: String,
    tx_hash: String,
    block_number: u64,
    #[serde(default)]
    block_hash: String,
    block_timestamp: u64,
    log_index: u32,
    fields: serde_json::Value,
}

impl ReplayRecord {
    fn into_parts(self) -> (DecodedEvent, IndexContext) {
        let ctx = IndexContext::new(BlockSummary {
            number: self.block_number,
            hash: self.block_hash,
            timestamp: self.block_timestamp,
        });
        let event = DecodedEvent {
            schema: self.schema,
            address: self.address,
            tx_hash: self.tx_hash,
            block_number: self.block_number,
            log_index: self.log_index,
            fields_json: self.fields,
        };
        (event, ctx)
    }
}

/// Summary of a finished replay.
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub applied: usize,
    pub skipped: usize,
}

pub async fn run(events: &Path, names: Option<&Path>, db: Option<&Path>, json: bool) -> Result<()> {
    let names = match names {
        Some(path) => load_names(path)?,
        None => RainbowTable::new(),
    };
    tracing::info!(labels = names.len(), "name table loaded");

    let store: Arc<dyn EntityStore> = match db {
        Some(path) => Arc::new(
            SqliteEntityStore::open(path)
                .with_context(|| format!("opening database {}", path.display()))?,
        ),
        None => Arc::new(MemoryEntityStore::new()),
    };

    let dump = std::fs::read_to_string(events)
        .with_context(|| format!("reading {}", events.display()))?;
    let stats = replay(&dump, store.clone(), names).await?;
    tracing::info!(applied = stats.applied, skipped = stats.skipped, "replay complete");

    print_summary(store.as_ref(), json)
}

fn load_names(path: &Path) -> Result<RainbowTable> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(RainbowTable::from_names(
        text.lines().map(str::trim).filter(|l| !l.is_empty()),
    ))
}

/// Dispatch every line of `dump`, in order, through the projection handlers.
pub async fn replay(
    dump: &str,
    store: Arc<dyn EntityStore>,
    names: RainbowTable,
) -> Result<ReplayStats> {
    let projector = Arc::new(Projector::new(RegistrarConfig::default(), store, names));
    let mut registry = HandlerRegistry::new();
    register_projector(&mut registry, projector);

    let mut stats = ReplayStats::default();
    for (idx, line) in dump.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord = serde_json::from_str(line)
            .with_context(|| format!("line {line_no}: malformed event record"))?;
        if !registry.handles(&record.schema) {
            tracing::warn!(line = line_no, schema = %record.schema, "no handler, skipping");
            stats.skipped += 1;
            continue;
        }
        let (event, ctx) = record.into_parts();
        registry
            .dispatch_event(&event, &ctx)
            .await
            .with_context(|| {
                format!(
                    "line {line_no}: {} at block {} ({}-{})",
                    event.schema, event.block_number, event.tx_hash, event.log_index
                )
            })?;
        stats.applied += 1;
    }
    Ok(stats)
}

fn print_summary(store: &dyn EntityStore, json: bool) -> Result<()> {
    let domains: Vec<Domain> = store.load_all()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
        return Ok(());
    }

    println!("Entities:");
    for kind in ALL_KINDS {
        println!("  {kind:<20} {}", store.count(kind)?);
    }

    let now = Utc::now();
    println!("\nDomains:");
    for domain in domains.iter().filter(|d| d.registrant.is_some()) {
        let expiry = domain
            .expires_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:<32} {:<44} {} {}",
            domain.name.as_deref().unwrap_or(&domain.id),
            domain.registrant.as_deref().unwrap_or("-"),
            expiry,
            if domain.is_held_at(now) { "held" } else { "expired" },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use plsindex_core::entity::{Referrer, Registration};
    use plsindex_core::identity::{hex_id, label_hash};

    const ROOT: &str = "0x55fb31aa6f23709345f51ac8d7e4ed79336defe55be2733bc226ed0f1f62f3c8";
    const OWNER: &str = "0x1111111111111111111111111111111111111111";

    fn line(schema: &str, block: u64, log_index: u32, fields: serde_json::Value) -> String {
        serde_json::json!({
            "schema": schema,
            "tx_hash": format!("0x{block:064x}"),
            "block_number": block,
            "block_timestamp": 1_690_000_000u64 + block,
            "log_index": log_index,
            "fields": fields,
        })
        .to_string()
    }

    fn dump() -> String {
        let label = hex_id(label_hash("alice"));
        let token_id = U256::from_be_bytes(label_hash("alice").0).to_string();
        [
            line("NewOwner", 1, 0, serde_json::json!({ "node": ROOT, "label": label, "owner": OWNER })),
            line(
                "NameRegistered",
                2,
                0,
                serde_json::json!({ "id": token_id, "owner": OWNER, "expires": 1_700_000_000u64 }),
            ),
            String::new(),
            line("Approval", 2, 1, serde_json::json!({})),
            line(
                "ReferralFeeReceived",
                2,
                2,
                serde_json::json!({ "referrer": OWNER, "amount": "0x64" }),
            ),
        ]
        .join("\n")
    }

    #[tokio::test]
    async fn replays_dump_into_store() {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryEntityStore::new());
        let stats = replay(&dump(), store.clone(), RainbowTable::from_names(["alice"]))
            .await
            .unwrap();
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.skipped, 1);

        let registration: Registration = store.require(&hex_id(label_hash("alice"))).unwrap();
        assert_eq!(registration.label_name.as_deref(), Some("alice"));
        let domains: Vec<Domain> = store.load_all().unwrap();
        assert_eq!(domains[0].name.as_deref(), Some("alice.pls"));
        let referrer: Referrer = store.require(OWNER).unwrap();
        assert_eq!(referrer.commission, U256::from(100u64));
    }

    #[tokio::test]
    async fn fatal_event_reports_line() {
        // NameRegistered without the provisioning NewOwner line
        let dump = dump().lines().skip(1).collect::<Vec<_>>().join("\n");
        let store: Arc<dyn EntityStore> = Arc::new(MemoryEntityStore::new());
        let err = replay(&dump, store, RainbowTable::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("line 1: NameRegistered"));
    }
}
