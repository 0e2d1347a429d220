//! Navigation menu model and active-path resolution.
//!
//! Menus are at most two levels deep: top-level [`MenuItem`]s may carry
//! [`MenuLeaf`] children, and leaves have no children of their own. The
//! depth limit is carried by the types, and deserialization rejects a
//! `children` key on a leaf.

use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

/// Top-level items plus one level of children.
pub const MAX_MENU_DEPTH: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("duplicate menu id `{id}` under {scope}")]
    DuplicateId { id: String, scope: String },

    #[error("menu item under {scope} has an empty id")]
    EmptyId { scope: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Home,
    Folder,
    BarChart,
    Settings,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Home => "⌂",
            Icon::Folder => "▤",
            Icon::BarChart => "▥",
            Icon::Settings => "⚙",
        }
    }
}

/// Shown in place of an icon for items that have none.
pub const DOT_GLYPH: &str = "·";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuLeaf {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub to: Option<String>,
}

impl MenuLeaf {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            to: None,
        }
    }

    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.to = Some(target.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub children: Vec<MenuLeaf>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            to: None,
            icon: None,
            children: Vec::new(),
        }
    }

    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.to = Some(target.into());
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn child(mut self, leaf: MenuLeaf) -> Self {
        self.children.push(leaf);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("dashboard", "Dashboard").to("/").icon(Icon::Home),
        MenuItem::new("projects", "Projects").icon(Icon::Folder),
        MenuItem::new("reports", "Reports")
            .to("/reports")
            .icon(Icon::BarChart)
            .child(MenuLeaf::new("dailyOutput", "Daily Output").to("/reports/dailyoutput"))
            .child(MenuLeaf::new("accumulateOutput", "Accumulated").to("/reports/accumulated")),
        MenuItem::new("settings", "Settings")
            .icon(Icon::Settings)
            .child(MenuLeaf::new("profile", "Profile").to("/settings/profile"))
            .child(MenuLeaf::new("billing", "Billing")),
        MenuItem::new("docs", "Docs (External)")
            .to("https://ratatui.rs")
            .icon(Icon::Folder),
    ]
}

/// Reject empty or repeated ids within a sibling list.
pub fn validate_menu(menu: &[MenuItem]) -> Result<(), MenuError> {
    check_siblings(menu.iter().map(|item| item.id.as_str()), "the top level")?;
    for item in menu {
        let scope = format!("`{}`", item.id);
        check_siblings(item.children.iter().map(|leaf| leaf.id.as_str()), &scope)?;
    }
    Ok(())
}

fn check_siblings<'a>(ids: impl Iterator<Item = &'a str>, scope: &str) -> Result<(), MenuError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(MenuError::EmptyId {
                scope: scope.to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(MenuError::DuplicateId {
                id: id.to_string(),
                scope: scope.to_string(),
            });
        }
    }
    Ok(())
}

fn explicit(target: Option<&String>) -> Option<&str> {
    target.map(String::as_str).filter(|t| !t.is_empty())
}

pub fn resolve_target(item: &MenuItem) -> String {
    explicit(item.to.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("/{}", item.id))
}

pub fn resolve_child_target(parent: &MenuItem, child: &MenuLeaf) -> String {
    explicit(child.to.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("/{}/{}", parent.id, child.id))
}

/// Absolute URL: optional `http:`/`https:` scheme followed by `//`.
pub fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https:")
        .or_else(|| lower.strip_prefix("http:"))
        .unwrap_or(&lower);
    rest.starts_with("//")
}

pub fn is_path_active(current: &str, target: &str) -> bool {
    if target.is_empty() {
        return false;
    }
    current == target
        || current
            .strip_prefix(target)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Which top-level submenu is open. Only one can be open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    pub open_menu_id: Option<String>,
}

impl NavState {
    pub fn new(open_menu_id: Option<String>) -> Self {
        Self { open_menu_id }
    }

    /// Header click: collapse the open item, or open another. Items without
    /// children leave the state untouched. Returns whether it changed.
    pub fn toggle(&mut self, item: &MenuItem) -> bool {
        if !item.has_children() {
            return false;
        }
        if self.is_open(&item.id) {
            self.open_menu_id = None;
        } else {
            self.open_menu_id = Some(item.id.clone());
        }
        true
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open_menu_id.as_deref() == Some(id)
    }

    /// A collapsed sidebar hides every submenu without forgetting which
    /// one is open.
    pub fn is_expanded(&self, id: &str, sidebar_collapsed: bool) -> bool {
        !sidebar_collapsed && self.is_open(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRowKind {
    /// Header with a submenu
    Group { open: bool, expanded: bool },
    Link {
        target: String,
        external: bool,
        active: bool,
    },
}

/// One visible line of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRow {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub icon: Option<Icon>,
    pub kind: NavRowKind,
}

impl NavRow {
    pub fn is_active(&self) -> bool {
        matches!(self.kind, NavRowKind::Link { active: true, .. })
    }

    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }
}

/// What activating a row asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavIntent {
    Toggle(String),
    Navigate(String),
    OpenExternal(String),
}

impl NavRow {
    pub fn intent(&self) -> NavIntent {
        match &self.kind {
            NavRowKind::Group { .. } => NavIntent::Toggle(self.id.clone()),
            NavRowKind::Link {
                target,
                external: true,
                ..
            } => NavIntent::OpenExternal(target.clone()),
            NavRowKind::Link { target, .. } => NavIntent::Navigate(target.clone()),
        }
    }
}

fn link(target: String, current_path: &str) -> NavRowKind {
    let external = is_external(&target);
    let active = !external && is_path_active(current_path, &target);
    NavRowKind::Link {
        target,
        external,
        active,
    }
}

/// Flatten the menu into visible rows for the current location.
pub fn nav_rows(
    menu: &[MenuItem],
    state: &NavState,
    current_path: &str,
    sidebar_collapsed: bool,
) -> Vec<NavRow> {
    let mut rows = Vec::new();
    for item in menu {
        if item.has_children() {
            let expanded = state.is_expanded(&item.id, sidebar_collapsed);
            rows.push(NavRow {
                id: item.id.clone(),
                parent: None,
                label: item.label.clone(),
                icon: item.icon,
                kind: NavRowKind::Group {
                    open: state.is_open(&item.id),
                    expanded,
                },
            });
            if expanded {
                rows.extend(item.children.iter().map(|child| NavRow {
                    id: child.id.clone(),
                    parent: Some(item.id.clone()),
                    label: child.label.clone(),
                    icon: None,
                    kind: link(resolve_child_target(item, child), current_path),
                }));
            }
        } else {
            rows.push(NavRow {
                id: item.id.clone(),
                parent: None,
                label: item.label.clone(),
                icon: item.icon,
                kind: link(resolve_target(item), current_path),
            });
        }
    }
    rows
}

pub fn find_item<'a>(menu: &'a [MenuItem], id: &str) -> Option<&'a MenuItem> {
    menu.iter().find(|item| item.id == id)
}
