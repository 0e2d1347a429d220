//! Dashboard module - welcome text, summary cards and report links

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::core::{Action, Command, Context, Module};
use crate::domain::chart::{resolve_series, ChartData, Rgba};
use crate::domain::table::TableData;
use crate::router::PageId;
use crate::ui::layout::hit;
use crate::ui::widgets::MiniSparkline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardPanel {
    Summary,
    Reports,
}

/// Summary of one chart series for its card.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCard {
    pub label: String,
    pub values: Vec<f64>,
    pub latest: Option<f64>,
    pub color: Rgba,
}

/// A card or link that leads to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    page: PageId,
    label: &'static str,
    blurb: &'static str,
}

const LINKS: [Link; 2] = [
    Link {
        page: PageId::DailyOutput,
        label: "Daily Output",
        blurb: "Searchable, sortable table",
    },
    Link {
        page: PageId::Accumulated,
        label: "Accumulated",
        blurb: "Line chart with gradient fill",
    },
];

pub struct Dashboard {
    active_panel: DashboardPanel,
    row_count: usize,
    column_count: usize,
    series: Vec<SeriesCard>,
    selected_link: usize,
    /// Clickable regions from the last frame
    targets: Vec<(Rect, PageId)>,
}

impl Dashboard {
    pub fn new(table: &TableData, chart: &ChartData) -> Self {
        let series = resolve_series(chart)
            .into_iter()
            .map(|s| SeriesCard {
                latest: s.values.last().copied(),
                label: s.label,
                values: s.values,
                color: s.color,
            })
            .collect();
        Self {
            active_panel: DashboardPanel::Reports,
            row_count: table.rows.len(),
            column_count: table.columns.len(),
            series,
            selected_link: 0,
            targets: Vec::new(),
        }
    }

    pub fn next_panel(&mut self) {
        self.active_panel = match self.active_panel {
            DashboardPanel::Summary => DashboardPanel::Reports,
            DashboardPanel::Reports => DashboardPanel::Summary,
        };
    }

    pub fn series(&self) -> &[SeriesCard] {
        &self.series
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    fn open_selected(&self) -> Action {
        match self.active_panel {
            DashboardPanel::Reports => Action::Navigate(LINKS[self.selected_link].page.path().to_string()),
            DashboardPanel::Summary => Action::None,
        }
    }
}

impl Module for Dashboard {
    fn id(&self) -> PageId {
        PageId::Dashboard
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Char('n') => {
                self.next_panel();
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected_link = (self.selected_link + 1).min(LINKS.len() - 1);
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_link = self.selected_link.saturating_sub(1);
                Action::None
            }
            KeyCode::Enter => self.open_selected(),
            _ => Action::None,
        }
    }

    fn handle_command(&mut self, cmd: &Command, _ctx: &mut Context) -> Action {
        super::table_command_unavailable(cmd)
    }

    fn handle_click(&mut self, column: u16, row: u16, _ctx: &mut Context) -> Action {
        self.targets
            .iter()
            .find(|(rect, _)| hit(*rect, column, row))
            .map(|(_, page)| Action::Navigate(page.path().to_string()))
            .unwrap_or(Action::None)
    }

    fn hints(&self) -> &'static str {
        "n panel  j/k link  Enter open"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Min(0),
            ])
            .split(area);

        self.targets.clear();
        self.render_welcome(frame, chunks[0]);
        self.render_summary(frame, chunks[1], ctx.focused);
        self.render_reports(frame, chunks[2], ctx.focused);
    }
}

fn border(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{v:.2}"),
        None => "--".to_string(),
    }
}

impl Dashboard {
    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Welcome",
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Pick a report from the sidebar or below. Press ? for key bindings.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::BOTTOM).border_style(border(false)))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_summary(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let active = focused && self.active_panel == DashboardPanel::Summary;
        let cards = 1 + self.series.len();
        let constraints: Vec<Constraint> = (0..cards)
            .map(|_| Constraint::Ratio(1, cards as u32))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let table_card = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                self.row_count.to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} columns", self.column_count),
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Rows ")
                .border_style(border(active)),
        );
        frame.render_widget(table_card, chunks[0]);
        self.targets.push((chunks[0], PageId::DailyOutput));

        for (card, chunk) in self.series.iter().zip(chunks.iter().skip(1)) {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", card.label))
                .border_style(border(active));
            let inner = block.inner(*chunk);
            frame.render_widget(block, *chunk);
            if inner.height == 0 {
                continue;
            }
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format_value(card.latest),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Rect::new(inner.x, inner.y, inner.width, 1),
            );
            if inner.height > 1 {
                let color = Color::Rgb(card.color.r, card.color.g, card.color.b);
                frame.render_widget(
                    MiniSparkline::new(&card.values).style(Style::default().fg(color)),
                    Rect::new(inner.x, inner.y + 1, inner.width, 1),
                );
            }
            self.targets.push((*chunk, PageId::Accumulated));
        }
    }

    fn render_reports(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let active = focused && self.active_panel == DashboardPanel::Reports;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Reports ")
            .border_style(border(active));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        for (i, link) in LINKS.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.bottom() {
                break;
            }
            let selected = i == self.selected_link;
            let marker = if selected && active { "› " } else { "  " };
            let label_style = if selected && active {
                Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let line = Line::from(vec![
                Span::raw(marker),
                Span::styled(link.label, label_style),
                Span::styled(
                    format!("  {}  {}", link.page.path(), link.blurb),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            let rect = Rect::new(inner.x, y, inner.width, 1);
            frame.render_widget(Paragraph::new(line), rect);
            self.targets.push((rect, link.page));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::sample_chart;
    use crate::domain::table::sample_users;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cards_summarize_payloads() {
        let dashboard = Dashboard::new(&sample_users(), &sample_chart());
        assert_eq!(dashboard.row_count(), 2);
        let labels: Vec<&str> = dashboard.series().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Sales", "Costs"]);
        assert_eq!(dashboard.series()[0].latest, Some(260.0));
    }

    #[test]
    fn test_enter_opens_selected_report() {
        let mut dashboard = Dashboard::new(&sample_users(), &sample_chart());
        let mut ctx = Context::default();
        dashboard.handle_key(key(KeyCode::Char('j')), &mut ctx);
        assert_eq!(
            dashboard.handle_key(key(KeyCode::Enter), &mut ctx),
            Action::Navigate("/reports/accumulated".to_string())
        );
    }

    #[test]
    fn test_clicking_rows_card_opens_table() {
        let mut dashboard = Dashboard::new(&sample_users(), &sample_chart());
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let ctx = Context::default();
        terminal
            .draw(|f| dashboard.render(f, f.size(), &ctx))
            .unwrap();
        let mut ctx = Context::default();
        // First card sits under the welcome block.
        assert_eq!(
            dashboard.handle_click(2, 6, &mut ctx),
            Action::Navigate("/reports/dailyoutput".to_string())
        );
    }

    #[test]
    fn test_table_commands_are_rejected() {
        let mut dashboard = Dashboard::new(&sample_users(), &sample_chart());
        let mut ctx = Context::default();
        assert!(matches!(
            dashboard.handle_command(&Command::Export, &mut ctx),
            Action::Notify(_, crate::core::NotifyLevel::Warn)
        ));
    }
}
