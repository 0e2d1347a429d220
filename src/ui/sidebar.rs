//! Navigation tree renderer.
//!
//! Collapsed, the sidebar shows one glyph per top-level item. Expanded, it
//! shows labels, the open submenu and an arrow on external links. The
//! regions drawn are recorded on the app for mouse hit-testing.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus, SidebarHits};
use crate::domain::menu::{NavRow, NavRowKind, DOT_GLYPH};

const COLLAPSE_GLYPH: &str = "«";
const EXPAND_GLYPH: &str = "»";
const EXTERNAL_GLYPH: &str = "↗";

fn row_line(row: &NavRow, collapsed: bool, width: usize) -> Line<'static> {
    let glyph = row.icon.map(|icon| icon.glyph()).unwrap_or(DOT_GLYPH);
    if collapsed {
        return Line::from(format!(" {glyph}"));
    }

    let mut spans = Vec::new();
    if row.is_child() {
        spans.push(Span::raw("    "));
    } else {
        spans.push(Span::raw(format!(" {glyph} ")));
    }
    spans.push(Span::raw(row.label.clone()));

    let suffix = match &row.kind {
        NavRowKind::Group { open: true, .. } => Some("▾"),
        NavRowKind::Group { .. } => Some("▸"),
        NavRowKind::Link { external: true, .. } => Some(EXTERNAL_GLYPH),
        NavRowKind::Link { .. } => None,
    };
    if let Some(suffix) = suffix {
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let gap = width.saturating_sub(used + 1).max(1);
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn row_style(row: &NavRow, selected: bool, focused: bool) -> Style {
    let mut style = if row.is_active() {
        Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD)
    } else if row.is_child() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::White)
    };
    if selected && focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.focus == Focus::Sidebar;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut hits = SidebarHits {
        area,
        ..SidebarHits::default()
    };
    if inner.height == 0 || inner.width == 0 {
        app.sidebar_hits = hits;
        return;
    }

    let collapsed = app.sidebar_collapsed;
    let toggle = if collapsed {
        format!(" {EXPAND_GLYPH}")
    } else {
        format!(" {COLLAPSE_GLYPH} Menu")
    };
    let toggle_area = Rect::new(inner.x, inner.y, inner.width, 1);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            toggle,
            Style::default().fg(Color::DarkGray),
        ))),
        toggle_area,
    );
    hits.toggle = toggle_area;

    let rows = app.nav_rows();
    let top = inner.y + 1;
    let visible = inner.height.saturating_sub(1) as usize;
    for (index, row) in rows.iter().enumerate().take(visible) {
        let line_area = Rect::new(inner.x, top + index as u16, inner.width, 1);
        let line = row_line(row, collapsed, inner.width as usize);
        let style = row_style(row, index == app.nav_selected, focused);
        f.render_widget(Paragraph::new(line).style(style), line_area);
        hits.rows.push((line_area, index));
    }

    app.sidebar_hits = hits;
}
