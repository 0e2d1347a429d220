//! gridboard: a terminal dashboard shell with a collapsible navigation
//! tree, a paginated and sortable data table, and a line chart, composed by
//! a small client-side router.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod input;
pub mod logging;
pub mod modules;
pub mod router;
pub mod ui;
