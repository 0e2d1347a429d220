use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const COLLAPSED_SIDEBAR_WIDTH: u16 = 6;
pub const MIN_SIDEBAR_WIDTH: u16 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Rect,
    /// Content region after the padding
    pub content: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

pub fn sidebar_width(total: u16, collapsed: bool) -> u16 {
    let width = if collapsed {
        COLLAPSED_SIDEBAR_WIDTH
    } else {
        (total / 6).max(MIN_SIDEBAR_WIDTH)
    };
    width.min(total)
}

/// The collapsed sidebar leaves more room, so the content gets less padding.
pub fn content_padding(collapsed: bool) -> u16 {
    if collapsed {
        1
    } else {
        2
    }
}

fn pad(rect: Rect, horizontal: u16) -> Rect {
    let horizontal = horizontal.min(rect.width / 2);
    Rect {
        x: rect.x + horizontal,
        y: rect.y,
        width: rect.width - horizontal * 2,
        height: rect.height,
    }
}

pub fn areas(size: Rect, sidebar_collapsed: bool) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(sidebar_width(size.width, sidebar_collapsed)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        sidebar: main_chunks[0],
        content: pad(main_chunks[1], content_padding(sidebar_collapsed)),
        status_line: vertical[2],
        command_line: vertical[3],
    }
}

/// Inclusive-exclusive hit test on terminal cells.
pub fn hit(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
