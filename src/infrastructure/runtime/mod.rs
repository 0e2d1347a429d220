//! Runtime infrastructure - Tokio runtime bridge for deferred page loads

mod bridge;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
pub use worker::{
    load_page, run_async_worker, DataSource, FileSource, LoadError, LoadedPage, LoaderSettings,
    SampleSource,
};
