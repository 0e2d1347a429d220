use gridboard::domain::rows::{
    field, filter_rows, paginate, process, sort_rows, total_pages, Row, SortDirection,
};
use proptest::prelude::*;
use serde_json::Value;

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z ]{0,6}".prop_map(Value::from),
        "-?[0-9][0-9a-z]{0,3}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

fn rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((cell(), cell()), 0..40).prop_map(|cells| {
        cells
            .into_iter()
            .map(|(a, b)| Row::from([("a".to_string(), a), ("b".to_string(), b)]))
            .collect()
    })
}

/// Numbers and digit-led text in the same column.
fn mixed_rows() -> impl Strategy<Value = Vec<Row>> {
    let value = prop_oneof![
        (-50i64..50).prop_map(Value::from),
        "[0-9][0-9a-z]{0,3}".prop_map(Value::from),
    ];
    prop::collection::vec(value, 0..300).prop_map(|values| {
        values
            .into_iter()
            .map(|v| Row::from([("k".to_string(), v)]))
            .collect()
    })
}

fn direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

proptest! {
    #[test]
    fn filtering_is_idempotent(rows in rows(), query in "[a-z ]{0,3}") {
        let once: Vec<Row> = filter_rows(&rows, &query)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect();
        let twice = filter_rows(&once, &query);
        prop_assert_eq!(twice, (0..once.len()).collect::<Vec<_>>());
    }

    #[test]
    fn sorting_is_idempotent(rows in rows(), dir in direction()) {
        let mut once: Vec<usize> = (0..rows.len()).collect();
        sort_rows(&rows, &mut once, "a", dir);
        let mut twice = once.clone();
        sort_rows(&rows, &mut twice, "a", dir);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sorting_is_stable(rows in rows(), dir in direction()) {
        let mut sorted: Vec<usize> = (0..rows.len()).collect();
        sort_rows(&rows, &mut sorted, "a", dir);
        for pair in sorted.windows(2) {
            let (x, y) = (pair[0], pair[1]);
            if field(&rows[x], "a") == field(&rows[y], "a") {
                prop_assert!(x < y, "equal keys kept input order");
            }
        }
    }

    #[test]
    fn pages_partition_rows(total in 0usize..200, page_size in 1usize..30) {
        let pages = total_pages(total, page_size);
        prop_assert_eq!(pages, total.div_ceil(page_size).max(1));

        let mut covered = 0;
        for page in 1..=pages {
            let window = paginate(total, page, page_size);
            prop_assert_eq!(window.start, covered);
            prop_assert!(window.len() <= page_size);
            covered = window.end;
        }
        prop_assert_eq!(covered, total);
    }

    #[test]
    fn out_of_range_pages_clamp(total in 0usize..200, page_size in 1usize..30, beyond in 1usize..50) {
        let pages = total_pages(total, page_size);
        prop_assert_eq!(paginate(total, 0, page_size).page, 1);
        prop_assert_eq!(paginate(total, pages + beyond, page_size).page, pages);
    }

    #[test]
    fn processed_page_stays_in_bounds(rows in rows(), page in 0usize..10, page_size in 1usize..8) {
        let processed = process(&rows, "", Some(("b", SortDirection::Desc)), page, page_size);
        prop_assert_eq!(processed.filtered_count(), rows.len());
        prop_assert!(processed.visible().len() <= page_size);
        prop_assert!(processed.window.page >= 1);
        prop_assert!(processed.window.page <= processed.window.total_pages);
    }

    #[test]
    fn mixed_columns_sort_consistently(rows in mixed_rows(), dir in direction()) {
        let first = process(&rows, "", Some(("k", dir)), 1, 10);
        let reordered: Vec<Row> = first.ordered.iter().map(|&i| rows[i].clone()).collect();
        let second = process(&reordered, "", Some(("k", dir)), 1, 10);
        prop_assert_eq!(second.ordered, (0..reordered.len()).collect::<Vec<_>>());
    }
}
