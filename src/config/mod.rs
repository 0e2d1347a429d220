use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::menu::{default_menu, validate_menu, MenuError, MenuItem};
use crate::domain::table::{TableOptions, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};

pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid menu in {path}: {source}")]
    Menu {
        path: PathBuf,
        #[source]
        source: MenuError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub app_name: String,
    pub tagline: String,
    pub user_name: Option<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            app_name: "AppName".to_string(),
            tagline: "ratatui + crossterm".to_string(),
            user_name: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub collapsed: bool,
    pub open_menu: Option<String>,
    pub menu: Option<Vec<MenuItem>>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            collapsed: true,
            open_menu: Some("projects".to_string()),
            menu: None,
        }
    }
}

impl SidebarConfig {
    pub fn menu(&self) -> Vec<MenuItem> {
        self.menu.clone().unwrap_or_else(default_menu)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub page_size_options: Vec<usize>,
    pub initial_page_size: usize,
    pub striped: bool,
    pub dense: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            initial_page_size: DEFAULT_PAGE_SIZE,
            striped: true,
            dense: false,
        }
    }
}

impl TableConfig {
    pub fn options(&self) -> TableOptions {
        TableOptions {
            page_size_options: self.page_size_options.clone(),
            initial_page_size: self.initial_page_size,
            striped: self.striped,
            dense: self.dense,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub table: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub load_timeout_ms: u64,
    pub header: HeaderConfig,
    pub sidebar: SidebarConfig,
    pub table: TableConfig,
    pub data: DataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            header: HeaderConfig::default(),
            sidebar: SidebarConfig::default(),
            table: TableConfig::default(),
            data: DataConfig::default(),
        }
    }
}

/// Load from the default location. A missing file yields defaults; a
/// broken one yields defaults and a warning.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "using default configuration");
            Config::default()
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(menu) = &config.sidebar.menu {
        validate_menu(menu).map_err(|source| ConfigError::Menu {
            path: path.to_path_buf(),
            source,
        })?;
    }
    // Relative data paths are resolved against the config file.
    if let Some(dir) = path.parent() {
        config.data.table = config.data.table.map(|p| relative_to(dir, p));
        config.data.chart = config.data.chart.map(|p| relative_to(dir, p));
    }
    Ok(config)
}

fn relative_to(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GRIDBOARD_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("gridboard").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("gridboard").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "gridboard", "gridboard")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("gridboard"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("gridboard"));
    }
    directories::ProjectDirs::from("io", "gridboard", "gridboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_file_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("gridboard.log"))
}

pub fn export_dir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("exports"))
        .unwrap_or_else(|| PathBuf::from(".gridboard").join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = write_config("");
        let config = load_from(file.path()).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.load_timeout_ms, DEFAULT_LOAD_TIMEOUT_MS);
        assert!(config.sidebar.collapsed);
        assert_eq!(config.sidebar.open_menu.as_deref(), Some("projects"));
        assert_eq!(config.table.page_size_options, vec![5, 10, 20, 50]);
        assert_eq!(config.sidebar.menu().len(), default_menu().len());
    }

    #[test]
    fn test_sections_override_defaults() {
        let file = write_config(
            r#"
log_level = "debug"

[header]
app_name = "Ops"
user_name = "Alex"

[sidebar]
collapsed = false
menu = [
  { id = "home", label = "Home", to = "/" },
  { id = "reports", label = "Reports", children = [
      { id = "daily", label = "Daily", to = "/reports/dailyoutput" },
  ] },
]

[table]
page_size_options = [25, 50]
initial_page_size = 25
"#,
        );
        let config = load_from(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.header.app_name, "Ops");
        assert_eq!(config.header.tagline, "ratatui + crossterm");
        assert!(!config.sidebar.collapsed);
        let menu = config.sidebar.menu();
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[1].children[0].id, "daily");
        assert_eq!(config.table.options().initial_page_size, 25);
        assert!(config.table.striped);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let file = write_config("log_level = [");
        assert!(matches!(
            load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_duplicate_menu_ids_are_rejected() {
        let file = write_config(
            r#"
[sidebar]
menu = [
  { id = "a", label = "A" },
  { id = "a", label = "Again" },
]
"#,
        );
        assert!(matches!(
            load_from(file.path()),
            Err(ConfigError::Menu { .. })
        ));
    }

    #[test]
    fn test_data_paths_resolve_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\ntable = \"users.json\"\n").unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.data.table, Some(dir.path().join("users.json")));
        assert_eq!(config.data.chart, None);
    }
}
