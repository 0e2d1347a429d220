//! Pure dashboard logic: row processing, table state, menus and charts.

pub mod chart;
pub mod menu;
pub mod rows;
pub mod table;

pub use chart::{ChartData, ChartOptions, FillPaint, PlotBounds, ResolvedSeries, Rgba};
pub use menu::{MenuItem, MenuLeaf, NavIntent, NavRow, NavRowKind, NavState};
pub use rows::{PageWindow, ProcessedPage, Row, SortDirection};
pub use table::{Align, Column, TableData, TableError, TableOptions, TableView};
