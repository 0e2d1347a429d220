//! Routed pages
//!
//! Each page implements the Module trait and handles its own:
//! - Key input processing
//! - Command handling
//! - Mouse hit-testing against its last frame
//! - Rendering
//!
//! Pages:
//! - dashboard: welcome text, summary cards and report links
//! - daily_output: the data table
//! - accumulated: the line chart
//! - export: CSV export shared by table pages

pub mod accumulated;
pub mod daily_output;
pub mod dashboard;
pub mod export;

use std::path::Path;

use crate::core::{Action, Command, Module};
use crate::infrastructure::runtime::LoadedPage;

pub use accumulated::Accumulated;
pub use daily_output::DailyOutput;
pub use dashboard::Dashboard;

/// Turn a loaded payload into the module that renders it.
pub fn mount(page: LoadedPage, export_dir: &Path) -> Box<dyn Module> {
    match page {
        LoadedPage::Dashboard { table, chart } => Box::new(Dashboard::new(&table, &chart)),
        LoadedPage::DailyOutput(view) => Box::new(DailyOutput::new(view, export_dir.to_path_buf())),
        LoadedPage::Accumulated(chart) => Box::new(Accumulated::new(chart)),
    }
}

/// Table commands sent to a page without a table.
pub(crate) fn table_command_unavailable(cmd: &Command) -> Action {
    match cmd {
        Command::Search(_)
        | Command::Sort(_)
        | Command::PageSize(_)
        | Command::Page(_)
        | Command::Export => Action::warn("Command not available on this page"),
        _ => Action::None,
    }
}
