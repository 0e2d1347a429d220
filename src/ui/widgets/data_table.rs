//! Table renderer: toolbar, sortable header, striped body and pager.
//!
//! Rendering returns the screen regions of every interactive control so the
//! hosting module can hit-test mouse clicks against the last frame.

use std::str::FromStr;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, HighlightSpacing, Paragraph, Row as TableRow, Table, TableState,
};
use ratatui::Frame;
use serde_json::Value;

use crate::domain::rows::{stringify, SortDirection};
use crate::domain::table::{Align, Column, StyleHint, TableView};
use crate::ui::layout::hit;

const HIGHLIGHT_SYMBOL: &str = "› ";
const NULL_PLACEHOLDER: &str = "—";
const MAX_COLUMN_WIDTH: usize = 40;
const STRIPE_BG: Color = Color::Rgb(30, 32, 40);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerControl {
    First,
    Prev,
    Next,
    Last,
}

impl PagerControl {
    fn label(&self) -> &'static str {
        match self {
            PagerControl::First => "« First",
            PagerControl::Prev => "‹ Prev",
            PagerControl::Next => "Next ›",
            PagerControl::Last => "Last »",
        }
    }
}

/// Interactive regions from the last render.
#[derive(Debug, Clone, Default)]
pub struct TableHits {
    pub search: Rect,
    pub page_size: Rect,
    pub headers: Vec<(Rect, String)>,
    /// Data rows, excluding the header line
    pub body: Rect,
    pub row_offset: usize,
    pub controls: Vec<(Rect, PagerControl)>,
}

impl TableHits {
    pub fn in_search(&self, column: u16, row: u16) -> bool {
        hit(self.search, column, row)
    }

    pub fn in_page_size(&self, column: u16, row: u16) -> bool {
        hit(self.page_size, column, row)
    }

    pub fn header_at(&self, column: u16, row: u16) -> Option<&str> {
        self.headers
            .iter()
            .find(|(rect, _)| hit(*rect, column, row))
            .map(|(_, key)| key.as_str())
    }

    pub fn control_at(&self, column: u16, row: u16) -> Option<PagerControl> {
        self.controls
            .iter()
            .find(|(rect, _)| hit(*rect, column, row))
            .map(|(_, control)| *control)
    }

    /// Page-relative index of the clicked data row.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        hit(self.body, column, row).then(|| self.row_offset + (row - self.body.y) as usize)
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

fn fit(text: &str, width: usize, align: Align) -> String {
    let len = width_of(text);
    if len > width {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        return format!("{kept}…");
    }
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
        Align::Center => format!("{text:^width$}"),
    }
}

fn hint_style(base: Style, hint: Option<&StyleHint>) -> Style {
    let Some(hint) = hint else {
        return base;
    };
    let mut style = base;
    if let Some(color) = hint.fg.as_deref().and_then(|c| Color::from_str(c).ok()) {
        style = style.fg(color);
    }
    if hint.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if hint.dim {
        style = style.add_modifier(Modifier::DIM);
    }
    style
}

fn sort_indicator(view: &TableView, column: &Column) -> &'static str {
    match view.effective_sort() {
        Some((key, SortDirection::Asc)) if key == column.key => "▲",
        Some((key, SortDirection::Desc)) if key == column.key => "▼",
        _ if column.sortable => "↕",
        _ => "",
    }
}

fn header_text(view: &TableView, column: &Column) -> String {
    match sort_indicator(view, column) {
        "" => column.label.clone(),
        indicator => format!("{} {}", column.label, indicator),
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(stringify(other)),
    }
}

fn column_widths(view: &TableView) -> Vec<usize> {
    view.columns()
        .iter()
        .map(|column| {
            let header = width_of(&header_text(view, column)).max(width_of(&column.label) + 2);
            let widest = view
                .page_rows()
                .map(|(_, row)| {
                    cell_text(&column.value(row))
                        .map(|text| width_of(&text))
                        .unwrap_or(1)
                })
                .max()
                .unwrap_or(0);
            header.max(widest).clamp(3, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Narrow the widest columns until every column plus spacing fits in
/// `available`, so the table and its header hit areas share one layout.
fn shrink_to_fit(mut widths: Vec<usize>, available: usize, spacing: usize) -> Vec<usize> {
    let gaps = spacing * widths.len().saturating_sub(1);
    let mut total: usize = widths.iter().sum::<usize>() + gaps;
    while total > available {
        let Some(widest) = widths.iter_mut().filter(|w| **w > 1).max_by_key(|w| **w) else {
            break;
        };
        *widest -= 1;
        total -= 1;
    }
    widths
}

/// Draw the table and return its interactive regions.
pub fn render_table(
    f: &mut Frame,
    area: Rect,
    view: &TableView,
    state: &mut TableState,
    title: &str,
    focused: bool,
    searching: bool,
) -> TableHits {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut hits = TableHits::default();
    if inner.height < 4 || inner.width < 10 {
        return hits;
    }

    let dense = view.options().dense;
    let gap = if dense { 0 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(gap),
            Constraint::Min(2),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_toolbar(f, chunks[0], view, searching, &mut hits);
    draw_body(f, chunks[2], view, state, focused, &mut hits);
    draw_footer(f, chunks[3], view, &mut hits);
    hits
}

fn draw_toolbar(f: &mut Frame, area: Rect, view: &TableView, searching: bool, hits: &mut TableHits) {
    let query = &view.state().query;
    let mut spans = vec![Span::styled("⌕ ", Style::default().fg(Color::DarkGray))];
    if query.is_empty() && !searching {
        spans.push(Span::styled("Search…", Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::raw(query.clone()));
    }
    if searching {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }

    let size_label = format!("Rows per page  {} ▾", view.state().page_size);
    let size_width = (width_of(&size_label) as u16).min(area.width);
    let search_width = area.width.saturating_sub(size_width + 2).min(40);

    hits.search = Rect::new(area.x, area.y, search_width, 1);
    hits.page_size = Rect::new(area.x + area.width - size_width, area.y, size_width, 1);

    let search_style = if searching {
        Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    f.render_widget(Paragraph::new(Line::from(spans)).style(search_style), hits.search);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Rows per page  ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{} ▾", view.state().page_size)),
        ])),
        hits.page_size,
    );
}

fn draw_body(
    f: &mut Frame,
    area: Rect,
    view: &TableView,
    state: &mut TableState,
    focused: bool,
    hits: &mut TableHits,
) {
    let dense = view.options().dense;
    let spacing: u16 = if dense { 1 } else { 2 };
    let gutter = width_of(HIGHLIGHT_SYMBOL);
    let widths = shrink_to_fit(
        column_widths(view),
        (area.width as usize).saturating_sub(gutter),
        spacing as usize,
    );

    let header_cells = view.columns().iter().zip(&widths).map(|(column, width)| {
        let base = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD);
        Cell::from(fit(&header_text(view, column), *width, column.align))
            .style(hint_style(base, column.header_style.as_ref()))
    });
    let header = TableRow::new(header_cells).style(Style::default().bg(Color::Rgb(24, 26, 32)));

    let striped = view.options().striped;
    let rows: Vec<TableRow> = view
        .page_rows()
        .enumerate()
        .map(|(i, (_, row))| {
            let cells = view.columns().iter().zip(&widths).map(|(column, width)| {
                match cell_text(&column.value(row)) {
                    Some(text) => Cell::from(fit(&text, *width, column.align))
                        .style(hint_style(Style::default(), column.cell_style.as_ref())),
                    None => Cell::from(fit(NULL_PLACEHOLDER, *width, column.align))
                        .style(Style::default().fg(Color::DarkGray)),
                }
            });
            let style = if striped && i % 2 == 1 {
                Style::default().bg(STRIPE_BG)
            } else {
                Style::default()
            };
            TableRow::new(cells).style(style)
        })
        .collect();

    let constraints: Vec<Constraint> = widths.iter().map(|w| Constraint::Length(*w as u16)).collect();
    let highlight = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let table = Table::new(rows, constraints)
        .header(header)
        .column_spacing(spacing)
        .highlight_style(highlight)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always);

    let empty = view.processed().window.is_empty();
    state.select((!empty).then_some(view.selected()));
    f.render_stateful_widget(table, area, state);

    // Header cells start after the highlight gutter.
    let mut x = area.x + gutter as u16;
    let right = area.x + area.width;
    for (column, width) in view.columns().iter().zip(&widths) {
        if x >= right {
            break;
        }
        let w = (*width as u16).min(right - x);
        if column.sortable {
            hits.headers.push((Rect::new(x, area.y, w, 1), column.key.clone()));
        }
        x = x.saturating_add(w + spacing);
    }

    let body = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
    if empty {
        f.render_widget(
            Paragraph::new("No results")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(ratatui::layout::Alignment::Center),
            Rect::new(body.x, body.y, body.width, body.height.min(1)),
        );
        hits.body = Rect::default();
    } else {
        let visible = (view.processed().window.len() - state.offset().min(view.processed().window.len())) as u16;
        hits.body = Rect::new(body.x, body.y, body.width, body.height.min(visible));
        hits.row_offset = state.offset();
    }
}

fn draw_footer(f: &mut Frame, area: Rect, view: &TableView, hits: &mut TableHits) {
    let window = view.processed().window;
    let total = view.processed().filtered_count();
    let first = if total == 0 { 0 } else { window.start + 1 };
    let summary = Line::from(vec![
        Span::styled("Showing ", Style::default().fg(Color::DarkGray)),
        Span::raw(first.to_string()),
        Span::styled("–", Style::default().fg(Color::DarkGray)),
        Span::raw(window.end.to_string()),
        Span::styled(" of ", Style::default().fg(Color::DarkGray)),
        Span::raw(total.to_string()),
    ]);
    f.render_widget(Paragraph::new(summary), area);

    let page_label = format!("Page {} / {}", window.page, window.total_pages);
    let items = [
        (Some(PagerControl::First), PagerControl::First.label().to_string(), window.is_first()),
        (Some(PagerControl::Prev), PagerControl::Prev.label().to_string(), window.is_first()),
        (None, page_label, false),
        (Some(PagerControl::Next), PagerControl::Next.label().to_string(), window.is_last()),
        (Some(PagerControl::Last), PagerControl::Last.label().to_string(), window.is_last()),
    ];
    let pager_width: u16 = items
        .iter()
        .map(|(_, label, _)| width_of(label) as u16 + 2)
        .sum();
    if pager_width > area.width {
        return;
    }

    let mut x = area.x + area.width - pager_width;
    for (control, label, disabled) in items {
        let w = width_of(&label) as u16;
        let style = match (control, disabled) {
            (None, _) => Style::default().fg(Color::Gray),
            (Some(_), true) => Style::default().fg(Color::DarkGray),
            (Some(_), false) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        };
        let rect = Rect::new(x + 1, area.y, w, 1);
        f.render_widget(Paragraph::new(Span::styled(label, style)), rect);
        if let (Some(control), false) = (control, disabled) {
            hits.controls.push((rect, control));
        }
        x += w + 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{sample_users, TableData, TableOptions};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(view: &TableView) -> (String, TableHits) {
        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        let mut state = TableState::default();
        let mut hits = TableHits::default();
        terminal
            .draw(|f| {
                hits = render_table(f, f.size(), view, &mut state, "Users", true, false);
            })
            .unwrap();
        (screen(&terminal), hits)
    }

    #[test]
    fn test_fit_aligns_and_truncates() {
        assert_eq!(fit("29", 4, Align::Right), "  29");
        assert_eq!(fit("ab", 4, Align::Center), " ab ");
        assert_eq!(fit("abcdef", 4, Align::Left), "abc…");
    }

    #[test]
    fn test_renders_rows_and_pager() {
        let view = TableView::new(sample_users(), TableOptions::default()).unwrap();
        let (text, hits) = draw(&view);
        assert!(text.contains("Ava"));
        assert!(text.contains("ben@example.io"));
        assert!(text.contains("Name ↕"));
        assert!(text.contains("Showing 1–2 of 2"));
        assert!(text.contains("Page 1 / 1"));
        // A single page leaves every pager control disabled.
        assert!(hits.controls.is_empty());
        let keys: Vec<_> = hits.headers.iter().map(|(_, key)| key.as_str()).collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn test_empty_result_shows_placeholder() {
        let mut view = TableView::new(sample_users(), TableOptions::default()).unwrap();
        view.set_query("zzz");
        let (text, hits) = draw(&view);
        assert!(text.contains("No results"));
        assert!(text.contains("Showing 0–0 of 0"));
        assert_eq!(hits.row_at(5, 5), None);
    }

    #[test]
    fn test_sort_indicator_follows_state() {
        let mut view = TableView::new(sample_users(), TableOptions::default()).unwrap();
        view.toggle_sort("age");
        view.toggle_sort("age");
        let (text, hits) = draw(&view);
        assert!(text.contains("Age ▼"));
        let (rect, _) = hits.headers.iter().find(|(_, key)| key == "age").unwrap();
        assert_eq!(hits.header_at(rect.x, rect.y), Some("age"));
    }

    #[test]
    fn test_shrink_to_fit_narrows_widest_first() {
        assert_eq!(shrink_to_fit(vec![10, 4, 6], 30, 2), vec![10, 4, 6]);
        assert_eq!(shrink_to_fit(vec![10, 4, 6], 20, 2), vec![6, 4, 6]);
        assert_eq!(shrink_to_fit(vec![3, 3], 2, 1), vec![1, 1]);
    }

    #[test]
    fn test_header_hits_line_up_when_columns_overflow() {
        let long = "x".repeat(30);
        let data: TableData = serde_json::from_value(serde_json::json!({
            "columns": [
                { "key": "alpha", "label": "Alpha", "sortable": true },
                { "key": "beta", "label": "Beta", "sortable": true },
                { "key": "gamma", "label": "Gamma", "sortable": true }
            ],
            "rows": [{ "alpha": long, "beta": long, "gamma": long }]
        }))
        .unwrap();
        let view = TableView::new(data, TableOptions::default()).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut state = TableState::default();
        let mut hits = TableHits::default();
        terminal
            .draw(|f| {
                hits = render_table(f, f.size(), &view, &mut state, "Wide", true, false);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(hits.headers.len(), 3);
        for (rect, key) in &hits.headers {
            let shown: String = (rect.x..rect.x + 4)
                .map(|x| buffer.get(x, rect.y).symbol().to_string())
                .collect();
            let label = &view.data().column(key).unwrap().label;
            assert_eq!(shown, label[..4], "header {key} at x={}", rect.x);
        }
    }
}
