//! Line chart payloads, series styling, and geometry-dependent fills.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChartLabel {
    Text(String),
    Number(f64),
}

impl fmt::Display for ChartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartLabel::Text(text) => f.write_str(text),
            ChartLabel::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            ChartLabel::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub fill: bool,
    #[serde(default)]
    pub point_radius: Option<f64>,
}

/// Wire shape `{ labels, datasets, title? }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<ChartLabel>,
    #[serde(default)]
    pub datasets: Vec<SeriesSpec>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Accepts `rgba(r,g,b,a)`, `rgb(r,g,b)` and `#rrggbb`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(hex) = raw.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::opaque(channel(0)?, channel(2)?, channel(4)?));
        }

        let lower = raw.to_ascii_lowercase();
        let (body, with_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let r = parts[0].parse().ok()?;
        let g = parts[1].parse().ok()?;
        let b = parts[2].parse().ok()?;
        let a = if with_alpha {
            parts[3].parse::<f32>().ok()?
        } else {
            1.0
        };
        Some(Self::opaque(r, g, b).with_alpha(a))
    }

    /// Composite this color over an opaque backdrop.
    pub fn over(self, backdrop: Rgba) -> Rgba {
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f32 * self.a + bg as f32 * (1.0 - self.a)).round() as u8
        };
        Rgba::opaque(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }
}

/// Default series colors, assigned by dataset index.
pub const PALETTE: [Rgba; 8] = [
    Rgba::opaque(59, 130, 246),
    Rgba::opaque(16, 185, 129),
    Rgba::opaque(244, 63, 94),
    Rgba::opaque(234, 179, 8),
    Rgba::opaque(139, 92, 246),
    Rgba::opaque(34, 197, 94),
    Rgba::opaque(251, 146, 60),
    Rgba::opaque(99, 102, 241),
];

pub const FILL_START_ALPHA: f32 = 0.25;
pub const FILL_END_ALPHA: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    None,
    Explicit(Rgba),
    Gradient,
}

/// A dataset with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub label: String,
    pub values: Vec<f64>,
    pub color: Rgba,
    pub background: Background,
    pub show_points: bool,
}

impl ResolvedSeries {
    /// Linear interpolation at fractional index `x`.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        if self.values.is_empty() || x < 0.0 {
            return None;
        }
        let last = self.values.len() - 1;
        if x >= last as f64 {
            return (x - last as f64 <= f64::EPSILON).then(|| self.values[last]);
        }
        let lo = x.floor() as usize;
        let t = x - lo as f64;
        Some(self.values[lo] + (self.values[lo + 1] - self.values[lo]) * t)
    }
}

pub fn resolve_series(data: &ChartData) -> Vec<ResolvedSeries> {
    data.datasets
        .iter()
        .enumerate()
        .map(|(i, dataset)| {
            let color = dataset
                .border_color
                .as_deref()
                .and_then(Rgba::parse)
                .unwrap_or(PALETTE[i % PALETTE.len()]);
            let explicit = dataset.background_color.as_deref().and_then(Rgba::parse);
            let background = match (dataset.fill, explicit) {
                (true, Some(bg)) => Background::Explicit(bg),
                (true, None) => Background::Gradient,
                (false, _) => Background::None,
            };
            ResolvedSeries {
                label: dataset.label.clone(),
                values: dataset.data.clone(),
                color,
                background,
                show_points: dataset.point_radius.map_or(true, |r| r > 0.0),
            }
        })
        .collect()
}

/// Vertical extent of the laid-out plot area, in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotBounds {
    pub top: u16,
    pub bottom: u16,
}

/// Fill resolved against the plot geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillPaint {
    None,
    Flat(Rgba),
    Gradient {
        top: u16,
        bottom: u16,
        start: Rgba,
        end: Rgba,
    },
}

impl FillPaint {
    /// Gradient fills need the plot bounds; before layout has produced them
    /// the start color is used flat.
    pub fn resolve(series: &ResolvedSeries, plot: Option<PlotBounds>) -> FillPaint {
        match series.background {
            Background::None => FillPaint::None,
            Background::Explicit(color) => FillPaint::Flat(color),
            Background::Gradient => {
                let start = series.color.with_alpha(FILL_START_ALPHA);
                let end = series.color.with_alpha(FILL_END_ALPHA);
                match plot {
                    Some(bounds) => FillPaint::Gradient {
                        top: bounds.top,
                        bottom: bounds.bottom,
                        start,
                        end,
                    },
                    None => FillPaint::Flat(start),
                }
            }
        }
    }

    pub fn color_at(&self, row: u16) -> Option<Rgba> {
        match *self {
            FillPaint::None => None,
            FillPaint::Flat(color) => Some(color),
            FillPaint::Gradient {
                top,
                bottom,
                start,
                end,
            } => {
                let span = bottom.saturating_sub(top).max(1) as f32;
                let t = (row.saturating_sub(top) as f32 / span).clamp(0.0, 1.0);
                Some(start.with_alpha(start.a + (end.a - start.a) * t))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub begin_at_zero: bool,
    pub y_precision: usize,
    pub y_ticks: usize,
    pub show_legend: bool,
    /// Color fills are blended onto
    pub backdrop: Rgba,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            begin_at_zero: true,
            y_precision: 0,
            y_ticks: 5,
            show_legend: true,
            backdrop: Rgba::opaque(0, 0, 0),
        }
    }
}

/// Y bounds rounded out to a readable step.
pub fn y_bounds(series: &[ResolvedSeries], options: &ChartOptions) -> [f64; 2] {
    let values = series.iter().flat_map(|s| s.values.iter().copied());
    let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if options.begin_at_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if max <= min {
        max = min + 1.0;
    }
    let intervals = options.y_ticks.saturating_sub(1).max(1) as f64;
    let step = nice_step((max - min) / intervals);
    [
        (min / step).floor() * step,
        (max / step).ceil() * step,
    ]
}

fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

pub fn y_tick_labels(bounds: [f64; 2], options: &ChartOptions) -> Vec<String> {
    let count = options.y_ticks.max(2);
    let step = (bounds[1] - bounds[0]) / (count - 1) as f64;
    (0..count)
        .map(|i| format!("{:.*}", options.y_precision, bounds[0] + step * i as f64))
        .collect()
}

/// Pick at most `max_labels` x labels that land exactly on data points
/// when spread evenly across the axis. First and last are always kept.
pub fn x_tick_labels(labels: &[ChartLabel], max_labels: usize) -> Vec<String> {
    match labels.len() {
        0 => Vec::new(),
        1 => vec![labels[0].to_string(), String::new()],
        n => {
            let limit = max_labels.clamp(2, n);
            let count = (2..=limit)
                .rev()
                .find(|m| (n - 1) % (m - 1) == 0)
                .unwrap_or(2);
            let stride = (n - 1) / (count - 1);
            (0..count)
                .map(|i| labels[i * stride].to_string())
                .collect()
        }
    }
}

pub fn sample_chart() -> ChartData {
    let labels = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
        .into_iter()
        .map(|m| ChartLabel::Text(m.to_string()))
        .collect();
    ChartData {
        labels,
        datasets: vec![
            SeriesSpec {
                label: "Sales".into(),
                data: vec![120.0, 150.0, 180.0, 160.0, 210.0, 260.0],
                border_color: None,
                background_color: None,
                fill: true,
                point_radius: None,
            },
            SeriesSpec {
                label: "Costs".into(),
                data: vec![80.0, 100.0, 130.0, 120.0, 140.0, 170.0],
                border_color: None,
                background_color: None,
                fill: false,
                point_radius: None,
            },
        ],
        title: Some("Monthly Performance".into()),
    }
}
