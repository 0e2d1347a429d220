//! Table view state: column metadata, UI state, and the cached page.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::rows::{self, ProcessedPage, Row, SortDirection};

pub type Accessor = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("page size {size} is not one of {options:?}")]
    InvalidPageSize { size: usize, options: Vec<usize> },

    #[error("no page size options configured")]
    NoPageSizeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-header or per-cell styling hint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StyleHint {
    #[serde(default)]
    pub fg: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub dim: bool,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub align: Align,
    #[serde(skip)]
    pub accessor: Option<Accessor>,
    #[serde(default)]
    pub header_style: Option<StyleHint>,
    #[serde(default)]
    pub cell_style: Option<StyleHint>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("align", &self.align)
            .field("accessor", &self.accessor.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            align: Align::Left,
            accessor: None,
            header_style: None,
            cell_style: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn accessor(mut self, f: impl Fn(&Row) -> Value + Send + Sync + 'static) -> Self {
        self.accessor = Some(Arc::new(f));
        self
    }

    /// Display value of this column for `row`.
    pub fn value(&self, row: &Row) -> Value {
        match &self.accessor {
            Some(accessor) => accessor(row),
            None => rows::field(row, &self.key).clone(),
        }
    }
}

/// Wire shape accepted by the table: `{ columns, rows }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableData {
    /// Fill in columns from the first row when the payload carries none.
    pub fn with_derived_columns(mut self) -> Self {
        if !self.columns.is_empty() {
            return self;
        }
        if let Some(first) = self.rows.first() {
            self.columns = first
                .keys()
                .filter(|key| key.as_str() != rows::ID_FIELD)
                .map(|key| Column::new(key.clone(), capitalize(key)).sortable())
                .collect();
        }
        self
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.key == key)
    }
}

pub fn sample_users() -> TableData {
    let rows = [
        (1, "Ava", "ava@example.com", 29),
        (2, "Ben", "ben@example.io", 34),
    ]
    .into_iter()
    .map(|(id, name, email, age)| {
        Row::from([
            ("id".to_string(), Value::from(id)),
            ("name".to_string(), Value::from(name)),
            ("email".to_string(), Value::from(email)),
            ("age".to_string(), Value::from(age)),
        ])
    })
    .collect();

    TableData {
        columns: vec![
            Column::new("name", "Name").sortable(),
            Column::new("email", "Email"),
            Column::new("age", "Age").sortable().align(Align::Right),
        ],
        rows,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub page_size_options: Vec<usize>,
    pub initial_page_size: usize,
    pub striped: bool,
    pub dense: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            initial_page_size: DEFAULT_PAGE_SIZE,
            striped: true,
            dense: false,
        }
    }
}

impl TableOptions {
    /// Sanitize options: drop zero sizes, require at least one option, and
    /// fall back to the first option when the initial size is not offered.
    pub fn validated(mut self) -> Result<Self, TableError> {
        let mut seen = BTreeSet::new();
        self.page_size_options
            .retain(|size| *size > 0 && seen.insert(*size));
        let Some(&first) = self.page_size_options.first() else {
            return Err(TableError::NoPageSizeOptions);
        };
        if !self.page_size_options.contains(&self.initial_page_size) {
            tracing::warn!(
                initial = self.initial_page_size,
                fallback = first,
                "initial page size is not an option"
            );
            self.initial_page_size = first;
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub query: String,
    pub page: usize,
    pub page_size: usize,
    pub sort_key: Option<String>,
    pub direction: SortDirection,
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            page: 1,
            page_size,
            sort_key: None,
            direction: SortDirection::Asc,
        }
    }
}

/// Self-contained table component state. Every mutation re-runs the row
/// pipeline and clamps the page.
#[derive(Debug, Clone)]
pub struct TableView {
    data: TableData,
    options: TableOptions,
    state: TableState,
    view: ProcessedPage,
    selected: usize,
}

impl TableView {
    pub fn new(data: TableData, options: TableOptions) -> Result<Self, TableError> {
        let options = options.validated()?;
        let state = TableState::new(options.initial_page_size);
        let view = rows::process(&data.rows, "", None, 1, state.page_size);
        Ok(Self {
            data,
            options,
            state,
            view,
            selected: 0,
        })
    }

    pub fn refresh(&mut self) {
        let sort = self.effective_sort();
        self.view = rows::process(
            &self.data.rows,
            &self.state.query,
            sort,
            self.state.page,
            self.state.page_size,
        );
        self.state.page = self.view.window.page;
        self.selected = self.selected.min(self.view.window.len().saturating_sub(1));
    }

    /// Sort in effect: the key must name a known sortable column.
    pub fn effective_sort(&self) -> Option<(&str, SortDirection)> {
        let key = self.state.sort_key.as_deref()?;
        self.data
            .column(key)
            .filter(|col| col.sortable)
            .map(|col| (col.key.as_str(), self.state.direction))
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
        self.state.page = 1;
        self.refresh();
    }

    pub fn push_query_char(&mut self, ch: char) {
        let mut query = self.state.query.clone();
        query.push(ch);
        self.set_query(query);
    }

    pub fn pop_query_char(&mut self) {
        let mut query = self.state.query.clone();
        if query.pop().is_some() {
            self.set_query(query);
        }
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), TableError> {
        if !self.options.page_size_options.contains(&size) {
            return Err(TableError::InvalidPageSize {
                size,
                options: self.options.page_size_options.clone(),
            });
        }
        self.state.page_size = size;
        self.state.page = 1;
        self.refresh();
        Ok(())
    }

    pub fn cycle_page_size(&mut self, forward: bool) {
        let options = &self.options.page_size_options;
        let pos = options
            .iter()
            .position(|size| *size == self.state.page_size)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % options.len()
        } else {
            (pos + options.len() - 1) % options.len()
        };
        let size = options[next];
        self.state.page_size = size;
        self.state.page = 1;
        self.refresh();
    }

    /// Header click semantics: a new sortable column sorts ascending, the
    /// active column flips, anything else is ignored. Returns whether the
    /// sort changed.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let Some(column) = self.data.column(key).filter(|col| col.sortable) else {
            return false;
        };
        if self.state.sort_key.as_deref() == Some(column.key.as_str()) {
            self.state.direction = self.state.direction.flipped();
        } else {
            self.state.sort_key = Some(column.key.clone());
            self.state.direction = SortDirection::Asc;
        }
        self.state.page = 1;
        self.refresh();
        true
    }

    /// Toggle the sort on the `n`th column (0-based).
    pub fn toggle_sort_at(&mut self, n: usize) -> bool {
        match self.data.columns.get(n).map(|col| col.key.clone()) {
            Some(key) => self.toggle_sort(&key),
            None => false,
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page;
        self.refresh();
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.state.page.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.page + 1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.view.window.total_pages);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.view.window.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.view.window.len().saturating_sub(1));
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.view
            .visible()
            .get(self.selected)
            .map(|&idx| &self.data.rows[idx])
    }

    /// Rows on the current page together with their source index.
    pub fn page_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.view
            .visible()
            .iter()
            .map(move |&idx| (idx, &self.data.rows[idx]))
    }

    /// Every filtered row in display order, across all pages.
    pub fn ordered_rows(&self) -> impl Iterator<Item = &Row> {
        self.view.ordered.iter().map(move |&idx| &self.data.rows[idx])
    }

    pub fn columns(&self) -> &[Column] {
        &self.data.columns
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn processed(&self) -> &ProcessedPage {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> TableData {
        serde_json::from_value(json!({
            "columns": [
                { "key": "name", "label": "Name", "sortable": true },
                { "key": "email", "label": "Email" },
                { "key": "age", "label": "Age", "sortable": true, "align": "right" }
            ],
            "rows": [
                { "id": 1, "name": "Ava", "email": "ava@example.com", "age": 29 },
                { "id": 2, "name": "Ben", "email": "ben@example.io", "age": 34 }
            ]
        }))
        .unwrap()
    }

    fn ages(view: &TableView) -> Vec<i64> {
        view.page_rows()
            .map(|(_, row)| row["age"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_wire_format_defaults() {
        let data = users();
        assert_eq!(data.columns[2].align, Align::Right);
        assert!(!data.columns[1].sortable);
        assert_eq!(data.columns[1].align, Align::Left);
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let mut view = TableView::new(users(), TableOptions::default()).unwrap();
        assert!(view.toggle_sort("age"));
        assert_eq!(ages(&view), vec![29, 34]);
        assert!(view.toggle_sort("age"));
        assert_eq!(view.state().direction, SortDirection::Desc);
        assert_eq!(ages(&view), vec![34, 29]);
    }

    #[test]
    fn test_switching_column_resets_direction() {
        let mut view = TableView::new(users(), TableOptions::default()).unwrap();
        view.toggle_sort("age");
        view.toggle_sort("age");
        view.toggle_sort("name");
        assert_eq!(view.state().sort_key.as_deref(), Some("name"));
        assert_eq!(view.state().direction, SortDirection::Asc);
    }

    #[test]
    fn test_non_sortable_column_is_noop() {
        let mut view = TableView::new(users(), TableOptions::default()).unwrap();
        assert!(!view.toggle_sort("email"));
        assert!(!view.toggle_sort("unknown"));
        assert_eq!(view.state().sort_key, None);
    }

    #[test]
    fn test_query_resets_and_clamps_page() {
        let mut view = TableView::new(users(), TableOptions::default()).unwrap();
        view.set_page_size(5).unwrap();
        view.set_page(4);
        assert_eq!(view.state().page, 1);
        view.set_query("ben");
        assert_eq!(view.processed().filtered_count(), 1);
        assert_eq!(view.selected_row().unwrap()["name"], json!("Ben"));
    }

    #[test]
    fn test_page_size_must_be_an_option() {
        let mut view = TableView::new(users(), TableOptions::default()).unwrap();
        assert_eq!(
            view.set_page_size(7),
            Err(TableError::InvalidPageSize {
                size: 7,
                options: vec![5, 10, 20, 50]
            })
        );
        assert_eq!(view.state().page_size, 10);
    }

    #[test]
    fn test_initial_page_size_falls_back_to_first_option() {
        let options = TableOptions {
            page_size_options: vec![25, 100],
            initial_page_size: 10,
            ..TableOptions::default()
        };
        let view = TableView::new(users(), options).unwrap();
        assert_eq!(view.state().page_size, 25);
    }

    #[test]
    fn test_repeated_page_sizes_collapse() {
        let options = TableOptions {
            page_size_options: vec![5, 10, 5, 0, 10],
            initial_page_size: 5,
            ..TableOptions::default()
        };
        let view = TableView::new(users(), options).unwrap();
        assert_eq!(view.options().page_size_options, vec![5, 10]);
    }

    #[test]
    fn test_empty_options_rejected() {
        let options = TableOptions {
            page_size_options: vec![0],
            ..TableOptions::default()
        };
        assert!(matches!(
            TableView::new(users(), options),
            Err(TableError::NoPageSizeOptions)
        ));
    }

    #[test]
    fn test_derived_columns_skip_id() {
        let data: TableData = serde_json::from_value(json!({
            "rows": [{ "id": 1, "city": "Oslo", "zip": "0150" }]
        }))
        .unwrap();
        let data = data.with_derived_columns();
        let labels: Vec<_> = data.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["City", "Zip"]);
        assert!(data.columns.iter().all(|c| c.sortable));
    }

    #[test]
    fn test_accessor_overrides_field() {
        let col = Column::new("name", "Name").accessor(|row| {
            json!(rows::stringify(rows::field(row, "name")).to_uppercase())
        });
        let data = users();
        assert_eq!(col.value(&data.rows[0]), json!("AVA"));
    }

    #[test]
    fn test_paging_moves_and_stops_at_bounds() {
        let rows: Vec<Row> = (0..12)
            .map(|n| serde_json::from_value(json!({ "id": n })).unwrap())
            .collect();
        let data = TableData {
            columns: vec![Column::new("id", "Id")],
            rows,
        };
        let mut view = TableView::new(data, TableOptions::default()).unwrap();
        view.set_page_size(5).unwrap();
        view.last_page();
        assert_eq!(view.state().page, 3);
        view.next_page();
        assert_eq!(view.state().page, 3);
        assert_eq!(view.page_rows().count(), 2);
        view.first_page();
        view.prev_page();
        assert_eq!(view.state().page, 1);
    }
}
