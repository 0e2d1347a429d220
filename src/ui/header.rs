use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

/// Below this width the greeting is dropped and the brand takes the row.
pub const GREETING_MIN_WIDTH: u16 = 60;

const BRAND_BADGE: &str = "◆";
const AVATAR: &str = "◉";

pub fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let brand = Line::from(vec![
        Span::styled(
            format!("{BRAND_BADGE} "),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            app.header.app_name.clone(),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.header.tagline.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    if area.width < GREETING_MIN_WIDTH {
        f.render_widget(Paragraph::new(brand), inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner);

    let name = app.header.user_name.as_deref().unwrap_or("there");
    let greeting = Line::from(vec![
        Span::styled("Hello, ", Style::default().fg(Color::DarkGray)),
        Span::raw(name.to_string()),
        Span::raw(" "),
        Span::styled(AVATAR, Style::default().fg(Color::LightMagenta)),
    ]);

    f.render_widget(Paragraph::new(brand), chunks[0]);
    f.render_widget(
        Paragraph::new(greeting).alignment(Alignment::Right),
        chunks[1],
    );
}
