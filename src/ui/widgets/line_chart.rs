//! Line chart wrapper around ratatui's `Chart`.
//!
//! Gradient fills depend on where the plot area lands, which the chart only
//! knows after laying out its axes. [`ChartGeometry::layout`] reproduces that
//! layout so the fill can be resolved against the real plot rows and painted
//! underneath each line once the chart itself has been drawn.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition};
use ratatui::Frame;

use crate::domain::chart::{
    x_tick_labels, y_bounds, y_tick_labels, ChartData, ChartOptions, FillPaint, PlotBounds,
    ResolvedSeries, Rgba,
};

fn to_color(color: Rgba, backdrop: Rgba) -> Color {
    let solid = color.over(backdrop);
    Color::Rgb(solid.r, solid.g, solid.b)
}

fn label_width(label: &str) -> u16 {
    label.chars().count() as u16
}

/// Where the chart draws its plot, axes and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub plot: Rect,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartGeometry {
    /// Lay out the chart inside `area` (the block's inner area). Returns
    /// `None` when there is no room for a plot.
    pub fn layout(
        area: Rect,
        data: &ChartData,
        series: &[ResolvedSeries],
        options: &ChartOptions,
    ) -> Option<ChartGeometry> {
        if area.width < 4 || area.height < 3 {
            return None;
        }
        let points = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        let y_bounds = y_bounds(series, options);
        let y_labels: Vec<String> = y_tick_labels(y_bounds, options);
        let y_width = y_labels.iter().map(|l| label_width(l)).max().unwrap_or(0);
        let y_labels: Vec<String> = y_labels
            .into_iter()
            .map(|l| format!("{l:>width$}", width = y_width as usize))
            .collect();

        let max_x_labels = (area.width / 8).max(2) as usize;
        let x_labels = x_tick_labels(&data.labels, max_x_labels);
        let x_bounds = [0.0, points.saturating_sub(1).max(1) as f64];

        // Mirrors ratatui's chart layout: one row for x labels and one for
        // the axis line at the bottom, the y label gutter and axis line on
        // the left. A left-aligned first x label may widen the gutter.
        let mut x = area.left();
        let mut y = area.bottom() - 1;
        if !x_labels.is_empty() && y > area.top() {
            y -= 1;
        }
        let first_x = x_labels
            .first()
            .map(|l| label_width(l).saturating_sub(1))
            .unwrap_or(0);
        let gutter = y_width.max(first_x).min(area.width / 3);
        if x + gutter < area.right() {
            x += gutter;
        }
        if !x_labels.is_empty() && y > area.top() {
            y -= 1;
        }
        if x + 1 < area.right() {
            x += 1;
        }
        let plot = Rect::new(x, area.top(), area.right() - x, y - area.top() + 1);
        if plot.width == 0 || plot.height == 0 {
            return None;
        }

        Some(ChartGeometry {
            plot,
            x_labels,
            y_labels,
            x_bounds,
            y_bounds,
        })
    }

    pub fn bounds(&self) -> PlotBounds {
        PlotBounds {
            top: self.plot.top(),
            bottom: self.plot.bottom() - 1,
        }
    }

    /// Terminal row a data value lands on.
    fn row_for(&self, value: f64) -> u16 {
        let [lo, hi] = self.y_bounds;
        let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        let rows = (self.plot.height - 1) as f64;
        self.plot.bottom() - 1 - (t * rows).round() as u16
    }

    /// Data x coordinate under the centre of a terminal column.
    fn x_for(&self, column: u16) -> f64 {
        let [lo, hi] = self.x_bounds;
        let t = (column - self.plot.left()) as f64 + 0.5;
        lo + (hi - lo) * t / self.plot.width as f64
    }
}

/// Paint the area under a series. Cells keep their glyphs; only the
/// background changes.
fn paint_fill(
    f: &mut Frame,
    geometry: &ChartGeometry,
    series: &ResolvedSeries,
    paint: FillPaint,
    backdrop: Rgba,
) {
    if paint == FillPaint::None {
        return;
    }
    let buf = f.buffer_mut();
    for column in geometry.plot.left()..geometry.plot.right() {
        let Some(value) = series.value_at(geometry.x_for(column)) else {
            continue;
        };
        let top = geometry.row_for(value);
        for row in top..geometry.plot.bottom() {
            if let Some(color) = paint.color_at(row) {
                buf.get_mut(column, row).set_bg(to_color(color, backdrop));
            }
        }
    }
}

/// Draw the chart and return the geometry it was laid out with.
pub fn render_line_chart(
    f: &mut Frame,
    area: Rect,
    data: &ChartData,
    series: &[ResolvedSeries],
    options: &ChartOptions,
    focused: bool,
) -> Option<ChartGeometry> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = data.title.as_deref().unwrap_or("Chart");
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(border_style);
    let inner = block.inner(area);

    let geometry = ChartGeometry::layout(inner, data, series, options);
    let Some(geometry) = geometry else {
        f.render_widget(block, area);
        return None;
    };

    // Fills only set cell backgrounds, so they are painted after the chart.
    let plot_bounds = Some(geometry.bounds());
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();

    let mut datasets = Vec::new();
    for (s, data) in series.iter().zip(&points) {
        let color = to_color(s.color, options.backdrop);
        datasets.push(
            Dataset::default()
                .name(s.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(data),
        );
        if s.show_points {
            datasets.push(
                Dataset::default()
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .data(data),
            );
        }
    }

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds(geometry.x_bounds)
        .labels(geometry.x_labels.iter().cloned().map(Span::raw).collect());
    let y_axis = Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds(geometry.y_bounds)
        .labels(geometry.y_labels.iter().cloned().map(Span::raw).collect());

    let legend = options.show_legend.then_some(LegendPosition::Top);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend)
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 2)));
    f.render_widget(chart, area);

    for s in series {
        let paint = FillPaint::resolve(s, plot_bounds);
        paint_fill(f, &geometry, s, paint, options.backdrop);
    }

    Some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{resolve_series, sample_chart};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_layout_reserves_axes() {
        let data = sample_chart();
        let series = resolve_series(&data);
        let area = Rect::new(1, 1, 60, 20);
        let options = ChartOptions::default();
        let geometry = ChartGeometry::layout(area, &data, &series, &options).unwrap();
        // x labels row + axis row at the bottom
        assert_eq!(geometry.plot.bottom(), area.bottom() - 2);
        assert_eq!(geometry.plot.top(), area.top());
        assert!(geometry.plot.left() > area.left());
        assert_eq!(geometry.y_labels.first().map(|l| l.trim()), Some("0"));
    }

    #[test]
    fn test_layout_needs_room() {
        let data = sample_chart();
        let series = resolve_series(&data);
        let tiny = Rect::new(0, 0, 3, 2);
        assert!(ChartGeometry::layout(tiny, &data, &series, &ChartOptions::default()).is_none());
    }

    #[test]
    fn test_gradient_fill_fades_toward_bottom() {
        let data = sample_chart();
        let series = resolve_series(&data);
        let mut terminal = Terminal::new(TestBackend::new(70, 22)).unwrap();
        let mut geometry = None;
        terminal
            .draw(|f| {
                let options = ChartOptions::default();
                geometry = render_line_chart(f, f.size(), &data, &series, &options, false);
            })
            .unwrap();
        let geometry = geometry.unwrap();
        let buffer = terminal.backend().buffer();

        // Last column of the filled Sales series, first and last plot rows
        // under its line.
        let column = geometry.plot.right() - 1;
        let bottom = geometry.plot.bottom() - 1;
        let near_bottom = buffer.get(column, bottom).bg;
        let Color::Rgb(r, g, b) = near_bottom else {
            panic!("expected a blended fill, got {near_bottom:?}");
        };
        // Fully faded at the bottom row: the black backdrop shows through.
        assert_eq!((r, g, b), (0, 0, 0));

        let top = geometry.row_for(series[0].values[5]);
        let Color::Rgb(r, g, b) = buffer.get(column, top + 1).bg else {
            panic!("expected fill under the line");
        };
        assert!(r as u16 + g as u16 + b as u16 > 0);
    }
}
