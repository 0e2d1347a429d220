//! Row processing pipeline: filter -> sort -> paginate.
//!
//! Everything here is pure and infallible. Rows are loose JSON objects, so a
//! missing field is read as `null` rather than treated as an error.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record of tabular data.
pub type Row = BTreeMap<String, Value>;

/// Field used for stable rendering keys when present.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    }
}

/// Stable identity of a row within one render pass
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(String),
    Index(usize),
}

pub fn row_key(row: &Row, index: usize) -> RowKey {
    match row.get(ID_FIELD) {
        None | Some(Value::Null) => RowKey::Index(index),
        Some(value) => RowKey::Id(stringify(value)),
    }
}

/// Read a field, treating absent keys as `null`.
pub fn field<'a>(row: &'a Row, key: &str) -> &'a Value {
    row.get(key).unwrap_or(&Value::Null)
}

/// String form used for both searching and non-numeric sorting.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Normalize a free-text query into the needle used by [`filter_rows`].
/// Returns `None` when the query is blank and every row should pass.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn row_matches(row: &Row, needle: &str) -> bool {
    row.values()
        .any(|value| stringify(value).to_lowercase().contains(needle))
}

/// Indices of the rows matching `query`, in input order.
pub fn filter_rows(rows: &[Row], query: &str) -> Vec<usize> {
    match normalize_query(query) {
        None => (0..rows.len()).collect(),
        Some(needle) => rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &needle))
            .map(|(idx, _)| idx)
            .collect(),
    }
}

/// Case-insensitive primary ordering with lowercase sorting before
/// uppercase when two strings differ only by case.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    primary.then_with(|| b.cmp(a))
}

/// Sort key of one cell for a single sort pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Null,
    Number(f64),
    Text(String),
}

impl SortKey {
    /// `numeric` is decided once per column, so a pass never compares a
    /// number against text.
    pub fn of(value: &Value, numeric: bool) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Number(n) if numeric => SortKey::Number(n.as_f64().unwrap_or_default()),
            other => SortKey::Text(stringify(other)),
        }
    }

    /// Ascending order. Nulls sort first.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Null, _) => Ordering::Less,
            (_, SortKey::Null) => Ordering::Greater,
            (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
            (SortKey::Text(x), SortKey::Text(y)) => locale_compare(x, y),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// A column sorts numerically only when every non-null value in it is a
/// number. Any text, bool or nested value turns the whole column to text.
pub fn is_numeric_column(rows: &[Row], indices: &[usize], key: &str) -> bool {
    indices.iter().all(|&idx| {
        let value = field(&rows[idx], key);
        value.is_null() || value.is_number()
    })
}

/// Stable sort of `indices` by the value under `key`. Descending order is
/// the ascending comparator reversed, so nulls end up last.
pub fn sort_rows(rows: &[Row], indices: &mut [usize], key: &str, direction: SortDirection) {
    let numeric = is_numeric_column(rows, indices, key);
    let mut keyed: Vec<(SortKey, usize)> = indices
        .iter()
        .map(|&idx| (SortKey::of(field(&rows[idx], key), numeric), idx))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    for (slot, (_, idx)) in indices.iter_mut().zip(keyed) {
        *slot = idx;
    }
}

/// Slice bounds of one page over `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page after clamping
    pub page: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn is_last(&self) -> bool {
        self.page == self.total_pages
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

pub fn paginate(total: usize, page: usize, page_size: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(total, page_size);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(total);
    let end = (start + page_size).min(total);
    PageWindow {
        page,
        total_pages,
        start,
        end,
    }
}

/// Output of one pass of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPage {
    /// Every matching row index, in display order
    pub ordered: Vec<usize>,
    pub window: PageWindow,
}

impl ProcessedPage {
    pub fn filtered_count(&self) -> usize {
        self.ordered.len()
    }

    /// Row indices on the visible page.
    pub fn visible(&self) -> &[usize] {
        &self.ordered[self.window.start..self.window.end]
    }
}

pub fn process(
    rows: &[Row],
    query: &str,
    sort: Option<(&str, SortDirection)>,
    page: usize,
    page_size: usize,
) -> ProcessedPage {
    let mut ordered = filter_rows(rows, query);
    if let Some((key, direction)) = sort {
        sort_rows(rows, &mut ordered, key, direction);
    }
    let window = paginate(ordered.len(), page, page_size);
    ProcessedPage { ordered, window }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap())
            .collect()
    }

    fn people() -> Vec<Row> {
        rows(vec![
            json!({"id": 1, "name": "Ava", "email": "ava@example.com", "age": 29}),
            json!({"id": 2, "name": "Ben", "email": "ben@example.io", "age": 34}),
        ])
    }

    #[test]
    fn test_query_matches_case_insensitively() {
        assert_eq!(filter_rows(&people(), "ava"), vec![0]);
        assert_eq!(filter_rows(&people(), "  EXAMPLE.IO "), vec![1]);
    }

    #[test]
    fn test_blank_query_passes_everything() {
        assert_eq!(filter_rows(&people(), ""), vec![0, 1]);
        assert_eq!(filter_rows(&people(), "   "), vec![0, 1]);
    }

    #[test]
    fn test_numbers_are_searchable() {
        assert_eq!(filter_rows(&people(), "34"), vec![1]);
    }

    #[test]
    fn test_null_never_matches() {
        let data = rows(vec![json!({"name": null}), json!({"name": "null"})]);
        assert_eq!(filter_rows(&data, "null"), vec![1]);
    }

    #[test]
    fn test_sort_numeric_both_directions() {
        let data = people();
        let mut idx = vec![0, 1];
        sort_rows(&data, &mut idx, "age", SortDirection::Asc);
        assert_eq!(idx, vec![0, 1]);
        sort_rows(&data, &mut idx, "age", SortDirection::Desc);
        assert_eq!(idx, vec![1, 0]);
    }

    #[test]
    fn test_nulls_first_ascending_last_descending() {
        let data = rows(vec![
            json!({"age": 5}),
            json!({"name": "missing age"}),
            json!({"age": 1}),
        ]);
        let mut idx = vec![0, 1, 2];
        sort_rows(&data, &mut idx, "age", SortDirection::Asc);
        assert_eq!(idx, vec![1, 2, 0]);
        sort_rows(&data, &mut idx, "age", SortDirection::Desc);
        assert_eq!(idx, vec![0, 2, 1]);
    }

    #[test]
    fn test_two_nulls_keep_input_order() {
        let data = rows(vec![json!({"k": null, "n": 1}), json!({"n": 2})]);
        let mut idx = vec![0, 1];
        sort_rows(&data, &mut idx, "k", SortDirection::Desc);
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn test_locale_compare_ignores_case_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_mixed_column_sorts_as_text() {
        let data = rows(vec![
            json!({"k": 10}),
            json!({"k": "9"}),
            json!({"k": 2}),
            json!({"k": "1a"}),
        ]);
        let mut idx = vec![0, 1, 2, 3];
        sort_rows(&data, &mut idx, "k", SortDirection::Asc);
        // "10" < "1a" < "2" < "9"
        assert_eq!(idx, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_mixed_column_sort_does_not_panic() {
        // Digit-led text next to numbers must not form comparison cycles.
        let data: Vec<Row> = (0..400)
            .map(|n| {
                let value = if n % 3 == 0 {
                    json!(format!("{}a", n % 17))
                } else {
                    json!((n * 7919) % 23)
                };
                Row::from([("k".to_string(), value)])
            })
            .collect();
        let mut idx: Vec<usize> = (0..data.len()).collect();
        sort_rows(&data, &mut idx, "k", SortDirection::Asc);
        let texts: Vec<String> = idx.iter().map(|&i| stringify(field(&data[i], "k"))).collect();
        assert!(texts
            .windows(2)
            .all(|pair| locale_compare(&pair[0], &pair[1]) != Ordering::Greater));
    }

    #[test]
    fn test_numeric_column_ignores_nulls() {
        assert!(is_numeric_column(&people(), &[0, 1], "age"));
        let data = rows(vec![json!({"k": 3}), json!({"k": null}), json!({"k": "x"})]);
        assert!(is_numeric_column(&data, &[0, 1], "k"));
        assert!(!is_numeric_column(&data, &[0, 1, 2], "k"));
    }

    #[test]
    fn test_paginate_clamps_and_slices() {
        let window = paginate(23, 3, 10);
        assert_eq!((window.page, window.total_pages), (3, 3));
        assert_eq!((window.start, window.end), (20, 23));

        assert_eq!(paginate(23, 0, 10).page, 1);
        assert_eq!(paginate(23, 99, 10).page, 3);
    }

    #[test]
    fn test_empty_set_has_one_page() {
        let window = paginate(0, 5, 10);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.page, 1);
        assert!(window.is_empty());
    }

    #[test]
    fn test_row_key_falls_back_to_index() {
        let data = rows(vec![json!({"id": "a-1"}), json!({"name": "x"})]);
        assert_eq!(row_key(&data[0], 0), RowKey::Id("a-1".into()));
        assert_eq!(row_key(&data[1], 1), RowKey::Index(1));
    }

    #[test]
    fn test_process_runs_all_stages() {
        let data = people();
        let page = process(&data, "", Some(("age", SortDirection::Desc)), 1, 1);
        assert_eq!(page.filtered_count(), 2);
        assert_eq!(page.visible(), &[1]);
        assert_eq!(page.window.total_pages, 2);
    }
}
