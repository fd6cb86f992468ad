#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use entity_audit::config::AuditConfig;
use entity_audit::domain::catalog::{EntityMapping, InheritanceType, StaticCatalog};
use entity_audit::domain::entry::{AuditEntry, Blame, OperationType};
use entity_audit::domain::error::AuditError;
use entity_audit::domain::naming::{TableName, TableNamer};
use entity_audit::domain::policy::{EntityOptions, Identity, UserProvider};
use entity_audit::domain::query::{AuditQuery, Predicate, Projection};
use entity_audit::domain::schema::Schema;
use entity_audit::domain::store::{AuditStore, SchemaStore, StoreFuture};
use entity_audit::infra::postgres::platform::PostgresPlatform;
use entity_audit::services::access::AccessGate;
use entity_audit::services::reader::Reader;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ── In-memory audit store ──────────────────────────────────────────────────

/// Evaluates `AuditQuery` predicates over rows held in memory and records
/// every query it receives.
#[derive(Default)]
pub struct MemoryAuditStore {
    tables: Mutex<BTreeMap<TableName, Vec<AuditEntry>>>,
    queries: Mutex<Vec<AuditQuery>>,
    indeterminate_count: bool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose count queries come back without a value.
    pub fn with_indeterminate_count() -> Self {
        Self {
            indeterminate_count: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, table: &str, entry: AuditEntry) {
        self.tables
            .lock()
            .entry(TableName::new(table))
            .or_default()
            .push(entry);
    }

    pub fn queries(&self) -> Vec<AuditQuery> {
        self.queries.lock().clone()
    }

    fn matching(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        self.queries.lock().push(query.clone());
        let tables = self.tables.lock();
        let mut rows: Vec<AuditEntry> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|e| query.predicates.iter().all(|p| matches(p, e)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        rows.into_iter().skip(offset).take(limit).collect()
    }
}

fn matches(predicate: &Predicate, entry: &AuditEntry) -> bool {
    match predicate {
        Predicate::Discriminator(d) => entry.discriminator.as_deref() == Some(d.as_str()),
        Predicate::ObjectId(id) => entry.object_id.as_deref() == Some(id.as_str()),
        Predicate::TransactionHash(h) => entry.transaction_hash.as_deref() == Some(h.as_str()),
        Predicate::TypeIn(types) => types.contains(&entry.operation),
        Predicate::CreatedFrom(at) => entry.created_at >= *at,
        Predicate::CreatedUntil(at) => entry.created_at <= *at,
    }
}

impl AuditStore for MemoryAuditStore {
    fn fetch_entries<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Vec<AuditEntry>> {
        Box::pin(async move {
            assert_eq!(query.projection, Projection::Entries);
            Ok(self.matching(query))
        })
    }

    fn fetch_count<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Option<i64>> {
        Box::pin(async move {
            assert_eq!(query.projection, Projection::Count);
            let rows = self.matching(query);
            if self.indeterminate_count {
                Ok(None)
            } else {
                Ok(Some(rows.len() as i64))
            }
        })
    }
}

// ── In-memory schema store ─────────────────────────────────────────────────

/// Holds a schema graph, renders DDL through the Postgres platform and
/// records executed statements. Statements containing a marker registered
/// with `fail_on` return an error.
#[derive(Default)]
pub struct MemorySchemaStore {
    schema: Mutex<Schema>,
    executed: Mutex<Vec<String>>,
    fail_markers: Mutex<Vec<String>>,
}

impl MemorySchemaStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Mutex::new(schema),
            ..Self::default()
        }
    }

    pub fn replace(&self, schema: Schema) {
        *self.schema.lock() = schema;
    }

    pub fn snapshot(&self) -> Schema {
        self.schema.lock().clone()
    }

    pub fn fail_on(&self, marker: &str) {
        self.fail_markers.lock().push(marker.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

impl SchemaStore for MemorySchemaStore {
    fn current_schema(&self) -> StoreFuture<'_, Schema> {
        Box::pin(async move { Ok(self.snapshot()) })
    }

    fn migrate_sql(&self, from: &Schema, to: &Schema) -> Vec<String> {
        PostgresPlatform.migrate_sql(from, to)
    }

    fn execute<'a>(&'a self, statement: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.executed.lock().push(statement.to_string());
            if self
                .fail_markers
                .lock()
                .iter()
                .any(|m| statement.contains(m.as_str()))
            {
                return Err(AuditError::Store(format!("rejected: {statement}")));
            }
            Ok(())
        })
    }
}

// ── Policies ───────────────────────────────────────────────────────────────

pub struct FixedUser(pub Option<Identity>);

impl UserProvider for FixedUser {
    fn current_user(&self) -> Option<Identity> {
        self.0.clone()
    }
}

pub fn user_with_roles(roles: &[&str]) -> Identity {
    Identity {
        id: "42".to_string(),
        username: "dana".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Entities known to the persistence layer:
/// - `Invoice` → `invoice`, audited, unrestricted
/// - `Car` → `vehicle` (single-table inheritance), audited
/// - `Secret` → `secret`, audited, viewing needs `ROLE_ADMIN`
/// - `Tag` → `tag`, not audited
pub fn mappings() -> Vec<EntityMapping> {
    vec![
        EntityMapping::new("Tag", "tag"),
        EntityMapping::new("Invoice", "invoice"),
        EntityMapping::new("Car", "vehicle").with_inheritance(InheritanceType::SingleTable),
        EntityMapping::new("Secret", "secret"),
    ]
}

pub fn config() -> AuditConfig {
    let mut entities = BTreeMap::new();
    entities.insert("Invoice".to_string(), EntityOptions::default());
    entities.insert("Car".to_string(), EntityOptions::default());
    entities.insert(
        "Secret".to_string(),
        EntityOptions {
            roles: Some(BTreeMap::from([(
                "view".to_string(),
                vec!["ROLE_ADMIN".to_string()],
            )])),
            ..EntityOptions::default()
        },
    );

    AuditConfig {
        table_prefix: "audit_".to_string(),
        table_suffix: String::new(),
        entities,
        mappings: mappings(),
        ..AuditConfig::default()
    }
}

pub fn make_reader(store: Arc<MemoryAuditStore>, user: Option<Identity>) -> Reader {
    let config = Arc::new(config());
    let gate = AccessGate::new(
        config.clone(),
        Some(config.clone()),
        Some(Arc::new(FixedUser(user))),
    );
    reader_with_gate(store, gate)
}

pub fn reader_with_gate(store: Arc<MemoryAuditStore>, gate: AccessGate) -> Reader {
    Reader::new(
        store,
        Arc::new(StaticCatalog::new(mappings())),
        gate,
        TableNamer::new("audit_", ""),
    )
}

// ── Entry fixtures ─────────────────────────────────────────────────────────

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Entry created `minutes` after `base_time()`.
pub fn entry(id: i64, operation: OperationType, object_id: &str, minutes: i64) -> AuditEntry {
    AuditEntry {
        id,
        operation,
        object_id: Some(object_id.to_string()),
        discriminator: None,
        transaction_hash: None,
        diffs: Some(serde_json::json!({"total": {"old": 10, "new": 12}})),
        blame: Blame {
            id: Some("42".to_string()),
            user: Some("dana".to_string()),
            user_fqdn: None,
            user_firewall: Some("main".to_string()),
        },
        ip: Some("10.0.0.1".to_string()),
        created_at: base_time() + Duration::minutes(minutes),
    }
}

pub fn in_transaction(mut entry: AuditEntry, hash: &str) -> AuditEntry {
    entry.transaction_hash = Some(hash.to_string());
    entry
}

pub fn with_discriminator(mut entry: AuditEntry, discriminator: &str) -> AuditEntry {
    entry.discriminator = Some(discriminator.to_string());
    entry
}

pub fn ids(entries: &[AuditEntry]) -> Vec<i64> {
    entries.iter().map(|e| e.id).collect()
}

pub fn types(names: &[&str]) -> BTreeSet<OperationType> {
    names
        .iter()
        .map(|n| OperationType::try_from(*n).unwrap())
        .collect()
}
