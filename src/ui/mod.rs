use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod header;
pub mod layout;
pub mod sidebar;
pub mod widgets;

use crate::app::{App, Focus, InputMode, PageSlot, StatusLevel};

pub const LOADING_TEXT: &str = "Loading…";

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size(), app.sidebar_collapsed);

    header::draw_header(f, areas.header, app);
    sidebar::draw_sidebar(f, areas.sidebar, app);
    draw_content(f, areas.content, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
}

/// Only the content region reflects page state; header and sidebar stay
/// interactive while a page loads or fails.
fn draw_content(f: &mut Frame, area: Rect, app: &mut App) {
    app.content_area = area;
    let ctx = app.ctx.clone();
    let title = app.router.current_page().title();
    match app.current_slot_mut() {
        Some(PageSlot::Ready(module)) => module.render(f, area, &ctx),
        Some(PageSlot::Failed { error, .. }) => {
            let error = error.clone();
            draw_error_panel(f, area, title, &error);
        }
        Some(PageSlot::Loading { .. }) | None => draw_loading(f, area),
    }
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return;
    }
    let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
    let paragraph = Paragraph::new(Span::styled(
        LOADING_TEXT,
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(paragraph, middle);
}

fn draw_error_panel(f: &mut Frame, area: Rect, title: &str, error: &str) {
    let lines = vec![
        Line::from(Span::styled(
            format!("{title} could not be loaded"),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "press r to retry",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error ")
                .border_style(Style::default().fg(Color::LightRed)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let page_state = match app.current_slot() {
        Some(PageSlot::Ready(_)) => "ready",
        Some(PageSlot::Failed { .. }) => "failed",
        Some(PageSlot::Loading { .. }) | None => "loading",
    };
    let sidebar = if app.sidebar_collapsed {
        "collapsed"
    } else {
        "expanded"
    };
    let spans = vec![
        Span::styled("Route ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.router.location())),
        Span::styled("Page ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            "{} ({})  ",
            app.router.current_page().title(),
            page_state
        )),
        Span::styled("Focus ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.focus_label())),
        Span::styled("Sidebar ", Style::default().fg(Color::DarkGray)),
        Span::raw(sidebar),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("go", "Go to a path, e.g. go /reports/dailyoutput"),
        ("back", "Previous location"),
        ("sidebar", "Collapse / expand the sidebar"),
        ("menu", "Open or close a submenu by id"),
        ("search", "Filter table rows"),
        ("sort", "Sort by column key (again to flip)"),
        ("pagesize", "Rows per page"),
        ("page", "first | prev | next | last | <n>"),
        ("export", "Write filtered rows to CSV"),
        ("reload", "Reload the current page"),
        ("help", "Show key bindings"),
        ("quit", "Exit"),
    ];

    let word = input.split_whitespace().next().unwrap_or("");
    if let Some((_, desc)) = commands.iter().find(|(cmd, _)| *cmd == word) {
        return Some(*desc);
    }
    for (cmd, desc) in commands {
        if cmd.starts_with(word) {
            return Some(desc);
        }
    }
    None
}

fn action_hints(app: &App) -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));

    let mut spans = Vec::new();
    match app.focus {
        Focus::Sidebar => {
            spans.extend([key("j/k"), text(" move  "), key("Enter"), text(" open  ")]);
            spans.extend([key("h"), text(" close  ")]);
        }
        Focus::Content => {
            if let Some(PageSlot::Ready(module)) = app.current_slot() {
                let hints = module.hints();
                if !hints.is_empty() {
                    spans.push(text(hints));
                    spans.push(Span::raw("  "));
                }
            }
        }
    }
    spans.extend([
        key("Tab"),
        text(" focus  "),
        key("["),
        text(" sidebar  "),
        key(":"),
        text(" command  "),
        key("?"),
        text(" help  "),
        key("q"),
        text(" quit"),
    ]);
    Line::from(spans)
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("go | back | search | sort | page | export | reload");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = layout::centered_rect(70, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Shell"),
        Line::from("  Tab        Switch focus sidebar / content"),
        Line::from("  [          Collapse / expand sidebar"),
        Line::from("  Backspace  Back"),
        Line::from("  r          Reload page / retry after an error"),
        Line::from("  :          Command line"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from("  Mouse      Click rows, headers, pager; scroll"),
        Line::from(""),
        Line::from("Sidebar"),
        Line::from("  j / k      Move"),
        Line::from("  Enter / l  Open link or toggle submenu"),
        Line::from("  h          Close submenu"),
        Line::from(""),
        Line::from("Table"),
        Line::from("  /          Search (Enter / Esc to finish)"),
        Line::from("  j / k      Select row"),
        Line::from("  h / l      Previous / next page"),
        Line::from("  g / G      First / last page"),
        Line::from("  1-9        Sort by column"),
        Line::from("  + / -      Rows per page"),
        Line::from("  y          Copy row as JSON"),
        Line::from("  e          Export CSV"),
        Line::from(""),
        Line::from("Chart"),
        Line::from("  z          Toggle y axis from zero"),
        Line::from("  L          Toggle legend"),
        Line::from(""),
        Line::from(format!("Location: {}", app.router.location())),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}
