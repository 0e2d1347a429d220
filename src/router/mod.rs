//! Client-side router: maps a location path to a page, with history.

use std::fmt;

/// Pages the router can mount in the content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageId {
    Dashboard,
    DailyOutput,
    Accumulated,
}

impl PageId {
    pub const ALL: [PageId; 3] = [PageId::Dashboard, PageId::DailyOutput, PageId::Accumulated];

    pub fn title(&self) -> &'static str {
        match self {
            PageId::Dashboard => "Dashboard",
            PageId::DailyOutput => "Daily Output",
            PageId::Accumulated => "Accumulated",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            PageId::Dashboard => "/",
            PageId::DailyOutput => "/reports/dailyoutput",
            PageId::Accumulated => "/reports/accumulated",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where unknown paths are sent.
pub const FALLBACK_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Page(PageId),
    Redirect(&'static str),
}

/// Drop query/fragment, force a leading slash, trim trailing slashes.
pub fn normalize_path(raw: &str) -> String {
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn resolve(path: &str) -> Resolution {
    let path = normalize_path(path);
    PageId::ALL
        .into_iter()
        .find(|page| page.path() == path)
        .map(Resolution::Page)
        .unwrap_or(Resolution::Redirect(FALLBACK_PATH))
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: String,
    pub page: PageId,
    pub redirected_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Router {
    history: Vec<String>,
}

impl Router {
    pub fn new(initial: &str) -> Self {
        let mut router = Self {
            history: Vec::new(),
        };
        router.navigate(initial);
        router
    }

    pub fn location(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or(FALLBACK_PATH)
    }

    pub fn current_page(&self) -> PageId {
        match resolve(self.location()) {
            Resolution::Page(page) => page,
            Resolution::Redirect(_) => PageId::Dashboard,
        }
    }

    /// Push a new location. A redirect lands on its target without leaving
    /// the unknown path in history, and re-navigating to the current
    /// location does not grow history.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let requested = normalize_path(path);
        let (location, page, redirected_from) = match resolve(&requested) {
            Resolution::Page(page) => (requested, page, None),
            Resolution::Redirect(target) => {
                let page = match resolve(target) {
                    Resolution::Page(page) => page,
                    Resolution::Redirect(_) => PageId::Dashboard,
                };
                (target.to_string(), page, Some(requested))
            }
        };
        if self.history.last() != Some(&location) {
            self.history.push(location.clone());
        }
        Navigation {
            location,
            page,
            redirected_from,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.history.len() > 1
    }

    pub fn back(&mut self) -> Option<Navigation> {
        if !self.can_go_back() {
            return None;
        }
        self.history.pop();
        let location = self.location().to_string();
        Some(Navigation {
            page: self.current_page(),
            location,
            redirected_from: None,
        })
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(FALLBACK_PATH)
    }
}
