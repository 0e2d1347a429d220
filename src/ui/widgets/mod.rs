pub mod data_table;
pub mod line_chart;
pub mod sparkline;

pub use data_table::{render_table, PagerControl, TableHits};
pub use line_chart::{render_line_chart, ChartGeometry};
pub use sparkline::MiniSparkline;
