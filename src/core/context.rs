//! Shared context passed to modules

/// Shell state visible to every module
#[derive(Debug, Clone)]
pub struct Context {
    /// Current router location
    pub location: String,

    /// Whether the content region has keyboard focus
    pub focused: bool,

    /// Whether the sidebar is collapsed (content gets more room)
    pub sidebar_collapsed: bool,

    /// Last text copied, mirrored for the status line
    pub clipboard: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            location: "/".to_string(),
            focused: false,
            sidebar_collapsed: true,
            clipboard: None,
        }
    }
}

impl Context {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Set clipboard content
    pub fn set_clipboard(&mut self, content: String) {
        self.clipboard = Some(content);
    }

    /// Get clipboard content
    pub fn get_clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }
}
