//! Mini sparkline widget for dashboard cards

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Scale `value` into one of the eight bar glyphs over `[min, max]`.
fn bar_for(value: f64, min: f64, max: f64) -> char {
    let span = max - min;
    let scaled = if span > 0.0 && value.is_finite() {
        (((value - min) / span) * 7.0).round() as usize
    } else {
        0
    };
    BARS[scaled.min(7)]
}

fn extent(data: &[f64]) -> (f64, f64) {
    let min = data.iter().copied().fold(f64::INFINITY, f64::min).min(0.0);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// A compact inline sparkline (single line)
pub struct MiniSparkline<'a> {
    data: &'a [f64],
    style: Style,
}

impl<'a> MiniSparkline<'a> {
    pub fn new(data: &'a [f64]) -> Self {
        Self {
            data,
            style: Style::default().fg(Color::Cyan),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> Widget for MiniSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.data.is_empty() {
            return;
        }
        let (min, max) = extent(self.data);

        // Take the last N values that fit in the area
        let data_len = self.data.len().min(area.width as usize);
        let data_start = self.data.len() - data_len;

        for (i, &value) in self.data[data_start..].iter().enumerate() {
            let x = area.x + i as u16;
            buf.get_mut(x, area.y)
                .set_char(bar_for(value, min, max))
                .set_style(self.style);
        }
    }
}

/// Sparkline as plain text, newest values last
pub fn sparkline_text(data: &[f64], width: usize) -> String {
    if data.is_empty() {
        return String::new();
    }
    let (min, max) = extent(data);
    let data_len = data.len().min(width);
    data[data.len() - data_len..]
        .iter()
        .map(|&value| bar_for(value, min, max))
        .collect()
}
