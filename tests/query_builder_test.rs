mod common;

use chrono::Duration;
use common::*;
use entity_audit::domain::catalog::{EntityMapping, InheritanceType};
use entity_audit::domain::error::AuditError;
use entity_audit::domain::filter::QueryFilter;
use entity_audit::domain::naming::TableName;
use entity_audit::domain::query::{Predicate, Projection, SqlParam};
use entity_audit::services::query_builder::{FilterBuilder, build_query};
use std::collections::BTreeSet;

fn invoice() -> EntityMapping {
    EntityMapping::new("Invoice", "invoice")
}

// ── 1. base_query_orders_newest_first ──────────────────────────────────────

#[test]
fn base_query_orders_newest_first() {
    let query = FilterBuilder::new(TableName::new("audit_invoice")).build();
    let (sql, params) = query.to_sql();

    assert_eq!(
        sql,
        "SELECT \"id\", \"type\", \"object_id\", \"discriminator\", \"transaction_hash\", \
         \"diffs\", \"blame_id\", \"blame_user\", \"blame_user_fqdn\", \"blame_user_firewall\", \
         \"ip\", \"created_at\" FROM \"audit_invoice\" ORDER BY created_at DESC, id DESC"
    );
    assert!(params.is_empty());
}

// ── 2. predicates_are_numbered_in_order ────────────────────────────────────

#[test]
fn predicates_are_numbered_in_order() {
    let filter = QueryFilter::new()
        .object_id(42)
        .transaction_hash("abc")
        .between(Some(base_time()), None)
        .page(3, 20);
    let query = build_query(
        TableName::new("audit_invoice"),
        &invoice(),
        &filter,
        &types(&["update", "insert"]),
    )
    .unwrap();

    let (sql, params) = query.to_sql();
    assert!(sql.ends_with(
        "WHERE object_id = $1 AND transaction_hash = $2 AND \"type\" = ANY($3) \
         AND created_at >= $4 ORDER BY created_at DESC, id DESC LIMIT 20 OFFSET 40"
    ));
    assert_eq!(
        params,
        vec![
            SqlParam::Text("42".into()),
            SqlParam::Text("abc".into()),
            SqlParam::TextList(vec!["insert".into(), "update".into()]),
            SqlParam::Timestamp(base_time()),
        ]
    );
}

// ── 3. discriminator_only_for_single_table_when_strict ─────────────────────

#[test]
fn discriminator_only_for_single_table_when_strict() {
    let car = EntityMapping::new("Car", "vehicle").with_inheritance(InheritanceType::SingleTable);
    let joined = EntityMapping::new("Bus", "vehicle").with_inheritance(InheritanceType::Joined);
    let table = TableName::new("audit_vehicle");

    let strict = FilterBuilder::new(table.clone()).discriminator(&car, true).build();
    assert_eq!(
        strict.predicates,
        vec![Predicate::Discriminator("Car".into())]
    );

    let loose = FilterBuilder::new(table.clone()).discriminator(&car, false).build();
    assert!(loose.predicates.is_empty());

    let other = FilterBuilder::new(table).discriminator(&joined, true).build();
    assert!(other.predicates.is_empty());
}

// ── 4. empty_type_set_adds_no_predicate ────────────────────────────────────

#[test]
fn empty_type_set_adds_no_predicate() {
    let query = FilterBuilder::new(TableName::new("audit_invoice"))
        .types(&BTreeSet::new())
        .build();
    assert!(query.predicates.is_empty());
}

// ── 5. reversed_dates_are_rejected ─────────────────────────────────────────

#[test]
fn reversed_dates_are_rejected() {
    let start = base_time();
    let end = start - Duration::seconds(1);

    let built = FilterBuilder::new(TableName::new("audit_invoice"))
        .created_between(Some(start), Some(end));
    assert!(matches!(built, Err(AuditError::InvalidArgument(_))));

    let same = FilterBuilder::new(TableName::new("audit_invoice"))
        .created_between(Some(start), Some(start))
        .unwrap()
        .build();
    assert_eq!(
        same.predicates,
        vec![Predicate::CreatedFrom(start), Predicate::CreatedUntil(start)]
    );
}

// ── 6. count_projection_drops_order_and_window ─────────────────────────────

#[test]
fn count_projection_drops_order_and_window() {
    let query = build_query(
        TableName::new("sales.audit_invoice"),
        &invoice(),
        &QueryFilter::new().object_id("9").page(2, 10),
        &BTreeSet::new(),
    )
    .unwrap()
    .to_count();

    assert_eq!(query.projection, Projection::Count);
    let (sql, params) = query.to_sql();
    assert_eq!(
        sql,
        "SELECT COUNT(id) FROM \"sales\".\"audit_invoice\" WHERE object_id = $1"
    );
    assert_eq!(params, vec![SqlParam::Text("9".into())]);
}

// ── 7. first_page_has_no_offset ────────────────────────────────────────────

#[test]
fn first_page_has_no_offset() {
    let query = build_query(
        TableName::new("audit_invoice"),
        &invoice(),
        &QueryFilter::new().page_size(5),
        &BTreeSet::new(),
    )
    .unwrap();

    assert_eq!(query.offset, Some(0));
    assert_eq!(query.limit, Some(5));
    assert!(query.to_sql().0.ends_with("LIMIT 5"));
}
