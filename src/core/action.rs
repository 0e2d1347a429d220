//! Actions that modules return to the shell

/// What a module asks the shell to do after handling input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Push a location onto the router
    Navigate(String),

    /// Pop the router history
    Back,

    /// Copy text to the system clipboard
    Copy(String),

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Open command line with optional prefix
    OpenCommand(Option<String>),

    /// Open an absolute URL with the system opener
    OpenExternal(String),

    /// Collapse or expand the sidebar
    ToggleSidebar,

    /// Re-run the loader for the current page
    Reload,

    /// Close current overlay/popup
    CloseOverlay,

    /// Request quit
    Quit,
}

impl Action {
    pub fn info(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Warn)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Error)
    }
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
