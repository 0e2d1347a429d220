//! Accumulated page: the line chart.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::core::{Action, Command, Context, Module};
use crate::domain::chart::{resolve_series, ChartData, ChartOptions, ResolvedSeries};
use crate::router::PageId;
use crate::ui::widgets::{render_line_chart, ChartGeometry};

pub struct Accumulated {
    data: ChartData,
    series: Vec<ResolvedSeries>,
    options: ChartOptions,
    /// Layout of the last frame; `None` until the chart has had room to draw
    geometry: Option<ChartGeometry>,
}

impl Accumulated {
    pub fn new(data: ChartData) -> Self {
        let series = resolve_series(&data);
        Self {
            data,
            series,
            options: ChartOptions::default(),
            geometry: None,
        }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn geometry(&self) -> Option<&ChartGeometry> {
        self.geometry.as_ref()
    }
}

impl Module for Accumulated {
    fn id(&self) -> PageId {
        PageId::Accumulated
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Char('z') => {
                self.options.begin_at_zero = !self.options.begin_at_zero;
                if self.options.begin_at_zero {
                    Action::info("Y axis starts at zero")
                } else {
                    Action::info("Y axis fits the data")
                }
            }
            KeyCode::Char('L') => {
                self.options.show_legend = !self.options.show_legend;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_command(&mut self, cmd: &Command, _ctx: &mut Context) -> Action {
        super::table_command_unavailable(cmd)
    }

    fn hints(&self) -> &'static str {
        "z zero axis  L legend"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &Context) {
        self.geometry = render_line_chart(
            frame,
            area,
            &self.data,
            &self.series,
            &self.options,
            ctx.focused,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::sample_chart;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_geometry_known_after_first_frame() {
        let mut page = Accumulated::new(sample_chart());
        assert!(page.geometry().is_none());

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let ctx = Context::default();
        terminal.draw(|f| page.render(f, f.size(), &ctx)).unwrap();
        assert!(page.geometry().is_some());
    }

    #[test]
    fn test_zero_axis_toggle_changes_bounds() {
        let mut page = Accumulated::new(sample_chart());
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let ctx = Context::default();
        terminal.draw(|f| page.render(f, f.size(), &ctx)).unwrap();
        let from_zero = page.geometry().unwrap().y_bounds;
        assert_eq!(from_zero[0], 0.0);

        page.handle_key(
            KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE),
            &mut Context::default(),
        );
        assert!(!page.options().begin_at_zero);
        terminal.draw(|f| page.render(f, f.size(), &ctx)).unwrap();
        assert!(page.geometry().unwrap().y_bounds[0] > 0.0);
    }
}
