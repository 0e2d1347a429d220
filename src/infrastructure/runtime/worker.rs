//! Async worker - runs in Tokio runtime and builds pages off the UI thread

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use thiserror::Error;
use tokio::time::interval;

use crate::domain::chart::{sample_chart, ChartData};
use crate::domain::table::{sample_users, TableData, TableError, TableOptions, TableView};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::router::PageId;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("page took longer than {}ms to load", .0.as_millis())]
    Timeout(Duration),

    #[error("page panicked while loading: {0}")]
    Panicked(String),
}

/// Where page payloads come from.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn table(&self) -> Result<TableData, LoadError>;
    async fn chart(&self) -> Result<ChartData, LoadError>;
}

/// Built-in sample payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

#[async_trait]
impl DataSource for SampleSource {
    async fn table(&self) -> Result<TableData, LoadError> {
        Ok(sample_users())
    }

    async fn chart(&self) -> Result<ChartData, LoadError> {
        Ok(sample_chart())
    }
}

/// JSON files on disk; a missing path falls back to the samples.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    pub table: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

impl FileSource {
    pub fn new(table: Option<PathBuf>, chart: Option<PathBuf>) -> Self {
        Self { table, chart }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl DataSource for FileSource {
    async fn table(&self) -> Result<TableData, LoadError> {
        match &self.table {
            Some(path) => read_json(path).await,
            None => SampleSource.table().await,
        }
    }

    async fn chart(&self) -> Result<ChartData, LoadError> {
        match &self.chart {
            Some(path) => read_json(path).await,
            None => SampleSource.chart().await,
        }
    }
}

/// Page content ready to be mounted by the shell.
#[derive(Debug, Clone)]
pub enum LoadedPage {
    Dashboard { table: TableData, chart: ChartData },
    DailyOutput(TableView),
    Accumulated(ChartData),
}

impl LoadedPage {
    pub fn page(&self) -> PageId {
        match self {
            LoadedPage::Dashboard { .. } => PageId::Dashboard,
            LoadedPage::DailyOutput(_) => PageId::DailyOutput,
            LoadedPage::Accumulated(_) => PageId::Accumulated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub timeout: Duration,
    pub table_options: TableOptions,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::config::DEFAULT_LOAD_TIMEOUT_MS),
            table_options: TableOptions::default(),
        }
    }
}

async fn build_page(
    source: &dyn DataSource,
    page: PageId,
    options: &TableOptions,
) -> Result<LoadedPage, LoadError> {
    match page {
        PageId::Dashboard => {
            let table = source.table().await?.with_derived_columns();
            let chart = source.chart().await?;
            Ok(LoadedPage::Dashboard { table, chart })
        }
        PageId::DailyOutput => {
            let table = source.table().await?.with_derived_columns();
            Ok(LoadedPage::DailyOutput(TableView::new(table, options.clone())?))
        }
        PageId::Accumulated => Ok(LoadedPage::Accumulated(source.chart().await?)),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Build one page, bounded by the timeout and shielded from panics.
pub async fn load_page(
    source: &dyn DataSource,
    page: PageId,
    settings: &LoaderSettings,
) -> Result<LoadedPage, LoadError> {
    let build = AssertUnwindSafe(build_page(source, page, &settings.table_options)).catch_unwind();
    match tokio::time::timeout(settings.timeout, build).await {
        Err(_) => Err(LoadError::Timeout(settings.timeout)),
        Ok(Err(payload)) => Err(LoadError::Panicked(panic_message(payload))),
        Ok(Ok(result)) => result,
    }
}

/// Run the async worker loop
pub async fn run_async_worker(
    source: Arc<dyn DataSource>,
    settings: LoaderSettings,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut poll_interval = interval(Duration::from_millis(20));

    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::LoadPage { page, request_id } => {
                    let source = Arc::clone(&source);
                    let settings = settings.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        tracing::debug!(%page, request_id, "loading page");
                        let event = match load_page(source.as_ref(), page, &settings).await {
                            Ok(loaded) => RuntimeEvent::PageLoaded {
                                request_id,
                                page: loaded,
                            },
                            Err(err) => {
                                tracing::warn!(%page, request_id, error = %err, "page load failed");
                                RuntimeEvent::PageFailed {
                                    request_id,
                                    page,
                                    error: err.to_string(),
                                }
                            }
                        };
                        let _ = evt_tx.send(event);
                    });
                }
            }
        }

        poll_interval.tick().await;
    }
}
