mod common;

use common::*;
use entity_audit::domain::entry::OperationType;
use entity_audit::domain::filter::QueryFilter;
use entity_audit::domain::page::PageResult;
use proptest::prelude::*;
use std::sync::Arc;

fn arb_operation() -> impl Strategy<Value = OperationType> {
    prop::sample::select(OperationType::ALL.to_vec())
}

fn arb_type_name() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_operation().prop_map(|op| op.as_str().to_string()),
        "[a-z]{1,8}",
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    /// Neighbour flags and page count follow from total, page and size alone.
    #[test]
    fn page_math_is_consistent(total in 0u64..10_000, page in 1u32..200, size in 1u32..100) {
        let result = PageResult::new(Vec::new(), total, page, size);

        prop_assert_eq!(result.has_next_page, u64::from(page) * u64::from(size) < total);
        prop_assert_eq!(result.has_previous_page, page > 1);
        prop_assert_eq!(result.num_pages, total.div_ceil(u64::from(size)));
        prop_assert_eq!(result.needs_pagination, result.num_pages > 1);
        prop_assert_eq!(result.next_page.is_some(), result.has_next_page);
        prop_assert_eq!(result.previous_page, (page > 1).then(|| page - 1));
    }

    /// The window of page p covers exactly the rows after (p - 1) full pages.
    #[test]
    fn window_offsets_by_whole_pages(page in 1u32..10_000, size in 1u32..500) {
        let window = QueryFilter::new().page(page, size).window().unwrap();
        prop_assert_eq!(
            window,
            Some((u64::from(page - 1) * u64::from(size), u64::from(size)))
        );
    }

    /// Only recognised operation names survive, whatever else is passed in.
    #[test]
    fn type_filter_keeps_known_operations(names in prop::collection::vec(arb_type_name(), 0..12)) {
        let mut reader = make_reader(Arc::new(MemoryAuditStore::new()), None);
        reader.set_type_filter(&names);

        for op in reader.type_filter() {
            prop_assert!(names.iter().any(|n| n == op.as_str()));
        }
        for name in &names {
            if let Ok(op) = OperationType::try_from(name.as_str()) {
                prop_assert!(reader.type_filter().contains(&op));
            }
        }
    }

    /// A non-empty type filter never lets other operations through, and
    /// listings are newest first.
    #[test]
    fn list_respects_type_filter(
        ops in prop::collection::vec(arb_operation(), 1..30),
        allowed in prop::collection::btree_set(arb_operation(), 1..4),
    ) {
        let store = Arc::new(MemoryAuditStore::new());
        for (i, op) in ops.iter().enumerate() {
            store.insert("audit_invoice", entry(i as i64 + 1, *op, "1", (i % 7) as i64));
        }
        let mut reader = make_reader(store, None);
        reader.set_type_filter(allowed.iter().map(|op| op.as_str()));

        let listed = block_on(reader.list("Invoice", &QueryFilter::new())).unwrap();

        let expected = ops.iter().filter(|op| allowed.contains(op)).count();
        prop_assert_eq!(listed.len(), expected);
        prop_assert!(listed.iter().all(|e| allowed.contains(&e.operation)));
        let newest_first = listed
            .windows(2)
            .all(|w| (w[0].created_at, w[0].id) >= (w[1].created_at, w[1].id));
        prop_assert!(newest_first);
    }
}
