use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::config::{self, Config, HeaderConfig};
use crate::core::{parse_command, Action, Command, Context, Module, NotifyLevel};
use crate::domain::menu::{find_item, nav_rows, MenuItem, NavIntent, NavRow, NavState};
use crate::infrastructure::runtime::LoadedPage;
use crate::modules;
use crate::router::{PageId, Router};

const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Content-region state of one routed page.
pub enum PageSlot {
    Loading { request_id: u64 },
    Ready(Box<dyn Module>),
    Failed { request_id: u64, error: String },
}

/// Side effects the event loop performs outside the state container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Copy(String),
    OpenExternal(String),
}

/// Sidebar regions from the last frame.
#[derive(Debug, Clone, Default)]
pub struct SidebarHits {
    pub area: Rect,
    pub toggle: Rect,
    /// Screen line of each visible nav row, by row index
    pub rows: Vec<(Rect, usize)>,
}

pub struct App {
    pub header: HeaderConfig,
    pub menu: Vec<MenuItem>,
    pub nav: NavState,
    /// Keyboard cursor into the visible nav rows
    pub nav_selected: usize,
    pub sidebar_collapsed: bool,
    pub router: Router,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub should_quit: bool,
    pub ctx: Context,
    pub export_dir: PathBuf,
    pub sidebar_hits: SidebarHits,
    pub content_area: Rect,
    pages: BTreeMap<PageId, PageSlot>,
    pending_loads: Vec<(PageId, u64)>,
    effects: Vec<Effect>,
    next_request_id: u64,
    dirty: bool,
}

impl App {
    pub fn new(config: &Config, initial_route: &str) -> Self {
        let router = Router::new(initial_route);
        let mut app = Self {
            header: config.header.clone(),
            menu: config.sidebar.menu(),
            nav: NavState::new(config.sidebar.open_menu.clone()),
            nav_selected: 0,
            sidebar_collapsed: config.sidebar.collapsed,
            ctx: Context::new(router.location()),
            router,
            focus: Focus::Content,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            help_open: false,
            should_quit: false,
            export_dir: config::export_dir(),
            sidebar_hits: SidebarHits::default(),
            content_area: Rect::default(),
            pages: BTreeMap::new(),
            pending_loads: Vec::new(),
            effects: Vec::new(),
            next_request_id: 1,
            dirty: true,
        };
        app.ensure_current_page();
        app.sync_context();
        app
    }

    // ----- status -----

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
        self.dirty = true;
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > STATUS_TTL {
                self.status = None;
                self.dirty = true;
            }
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ----- page loading -----

    fn next_request(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn request_load(&mut self, page: PageId) {
        let request_id = self.next_request();
        self.pages.insert(page, PageSlot::Loading { request_id });
        self.pending_loads.push((page, request_id));
        tracing::debug!(%page, request_id, "page load requested");
    }

    /// Queue a load for the routed page unless it is already mounted or in
    /// flight. Failed pages wait for an explicit retry.
    pub fn ensure_current_page(&mut self) {
        let page = self.router.current_page();
        if !self.pages.contains_key(&page) {
            self.request_load(page);
        }
    }

    pub fn take_load_requests(&mut self) -> Vec<(PageId, u64)> {
        std::mem::take(&mut self.pending_loads)
    }

    fn is_awaiting(&self, page: PageId, request_id: u64) -> bool {
        matches!(
            self.pages.get(&page),
            Some(PageSlot::Loading { request_id: pending }) if *pending == request_id
        )
    }

    pub fn apply_page_loaded(&mut self, request_id: u64, loaded: LoadedPage) {
        let page = loaded.page();
        if !self.is_awaiting(page, request_id) {
            tracing::debug!(%page, request_id, "dropping stale page load");
            return;
        }
        tracing::info!(%page, request_id, "page mounted");
        let module = modules::mount(loaded, &self.export_dir);
        self.pages.insert(page, PageSlot::Ready(module));
        self.dirty = true;
    }

    pub fn apply_page_failed(&mut self, request_id: u64, page: PageId, error: String) {
        if !self.is_awaiting(page, request_id) {
            tracing::debug!(%page, request_id, "dropping stale page failure");
            return;
        }
        self.pages.insert(page, PageSlot::Failed { request_id, error });
        self.set_status(format!("{} failed to load", page.title()), StatusLevel::Error);
    }

    pub fn reload_current(&mut self) {
        let page = self.router.current_page();
        self.request_load(page);
        self.set_status(format!("Reloading {}…", page.title()), StatusLevel::Info);
    }

    pub fn page_slot(&self, page: PageId) -> Option<&PageSlot> {
        self.pages.get(&page)
    }

    pub fn current_slot(&self) -> Option<&PageSlot> {
        self.pages.get(&self.router.current_page())
    }

    pub fn current_slot_mut(&mut self) -> Option<&mut PageSlot> {
        self.pages.get_mut(&self.router.current_page())
    }

    pub fn current_module_mut(&mut self) -> Option<&mut Box<dyn Module>> {
        match self.current_slot_mut() {
            Some(PageSlot::Ready(module)) => Some(module),
            _ => None,
        }
    }

    /// True while the mounted page is consuming raw keystrokes.
    pub fn content_captures_input(&self) -> bool {
        self.focus == Focus::Content
            && matches!(self.current_slot(), Some(PageSlot::Ready(module)) if module.captures_input())
    }

    // ----- navigation -----

    pub fn navigate(&mut self, path: &str) {
        let nav = self.router.navigate(path);
        if let Some(from) = &nav.redirected_from {
            tracing::info!(from = %from, to = %nav.location, "redirected unknown route");
            self.set_status(
                format!("No page at {from}, showing {}", nav.location),
                StatusLevel::Warn,
            );
        } else {
            tracing::info!(location = %nav.location, "navigated");
        }
        self.after_location_change();
    }

    pub fn back(&mut self) {
        match self.router.back() {
            Some(nav) => {
                tracing::info!(location = %nav.location, "navigated back");
                self.after_location_change();
            }
            None => self.set_status("No earlier page", StatusLevel::Warn),
        }
    }

    fn after_location_change(&mut self) {
        self.ensure_current_page();
        self.sync_context();
        self.clamp_nav_selection();
        self.dirty = true;
    }

    pub fn sync_context(&mut self) {
        self.ctx.location = self.router.location().to_string();
        self.ctx.focused = self.focus == Focus::Content;
        self.ctx.sidebar_collapsed = self.sidebar_collapsed;
    }

    // ----- sidebar -----

    pub fn nav_rows(&self) -> Vec<NavRow> {
        nav_rows(
            &self.menu,
            &self.nav,
            self.router.location(),
            self.sidebar_collapsed,
        )
    }

    fn clamp_nav_selection(&mut self) {
        let len = self.nav_rows().len();
        self.nav_selected = self.nav_selected.min(len.saturating_sub(1));
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        tracing::debug!(collapsed = self.sidebar_collapsed, "sidebar toggled");
        self.sync_context();
        self.clamp_nav_selection();
        self.dirty = true;
    }

    /// Toggle a submenu. Opening one while the sidebar is collapsed expands
    /// the sidebar so the children are visible.
    pub fn toggle_menu(&mut self, id: &str) {
        let Some(item) = find_item(&self.menu, id) else {
            self.set_status(format!("No menu named {id}"), StatusLevel::Warn);
            return;
        };
        if !item.has_children() {
            self.set_status(format!("{} has no submenu", item.label), StatusLevel::Warn);
            return;
        }
        let item = item.clone();
        self.nav.toggle(&item);
        if self.sidebar_collapsed && self.nav.is_open(&item.id) {
            self.toggle_sidebar();
        }
        self.clamp_nav_selection();
        self.dirty = true;
    }

    pub fn nav_select_next(&mut self) {
        if self.nav_selected + 1 < self.nav_rows().len() {
            self.nav_selected += 1;
            self.dirty = true;
        }
    }

    pub fn nav_select_prev(&mut self) {
        if self.nav_selected > 0 {
            self.nav_selected -= 1;
            self.dirty = true;
        }
    }

    /// Collapse the submenu owning the selected row, moving the cursor to
    /// its header.
    pub fn close_selected_group(&mut self) {
        let rows = self.nav_rows();
        let Some(row) = rows.get(self.nav_selected) else {
            return;
        };
        let owner = row.parent.clone().unwrap_or_else(|| row.id.clone());
        if !self.nav.is_open(&owner) {
            return;
        }
        self.nav.open_menu_id = None;
        self.nav_selected = self
            .nav_rows()
            .iter()
            .position(|r| r.id == owner && !r.is_child())
            .unwrap_or(0);
        self.dirty = true;
    }

    pub fn activate_nav_row(&mut self, index: usize) {
        let rows = self.nav_rows();
        let Some(row) = rows.get(index) else {
            return;
        };
        self.nav_selected = index;
        match row.intent() {
            NavIntent::Toggle(id) => self.toggle_menu(&id),
            NavIntent::Navigate(target) => self.navigate(&target),
            NavIntent::OpenExternal(url) => {
                self.set_status(format!("Opening {url}"), StatusLevel::Info);
                self.effects.push(Effect::OpenExternal(url));
            }
        }
        self.dirty = true;
    }

    // ----- focus & command line -----

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Content,
            Focus::Content => Focus::Sidebar,
        };
        self.sync_context();
        self.dirty = true;
    }

    pub fn enter_command(&mut self, prefix: Option<String>) {
        self.input_mode = InputMode::Command;
        self.command.input = prefix.unwrap_or_default();
        self.dirty = true;
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
        self.dirty = true;
    }

    pub fn apply_command(&mut self) {
        let input = std::mem::take(&mut self.command.input);
        self.input_mode = InputMode::Normal;
        if input.trim().is_empty() {
            return;
        }
        self.command.last = Some(input.clone());
        let command = parse_command(&input);
        self.run_command(command);
    }

    pub fn run_command(&mut self, command: Command) {
        match command {
            Command::Go(path) => self.navigate(&path),
            Command::Back => self.back(),
            Command::Sidebar => self.toggle_sidebar(),
            Command::Menu(id) => self.toggle_menu(&id),
            Command::Reload => self.reload_current(),
            Command::Help => self.help_open = true,
            Command::Quit => self.should_quit = true,
            Command::Unknown(raw) => {
                self.set_status(format!("Unknown command: {raw}"), StatusLevel::Warn)
            }
            table_command => {
                let mut ctx = self.ctx.clone();
                let action = match self.current_module_mut() {
                    Some(module) => module.handle_command(&table_command, &mut ctx),
                    None => Action::warn("Page is not ready"),
                };
                self.ctx = ctx;
                self.apply_action(action);
            }
        }
        self.dirty = true;
    }

    // ----- module plumbing -----

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(path) => self.navigate(&path),
            Action::Back => self.back(),
            Action::Copy(text) => {
                self.ctx.set_clipboard(text.clone());
                self.effects.push(Effect::Copy(text));
            }
            Action::Notify(text, level) => self.set_status(text, level.into()),
            Action::OpenCommand(prefix) => self.enter_command(prefix),
            Action::OpenExternal(url) => self.effects.push(Effect::OpenExternal(url)),
            Action::ToggleSidebar => self.toggle_sidebar(),
            Action::Reload => self.reload_current(),
            Action::CloseOverlay => self.help_open = false,
            Action::Quit => self.should_quit = true,
        }
        self.dirty = true;
    }

    /// Run a closure against the mounted module with the shared context,
    /// then apply the action it returns.
    pub fn with_module(
        &mut self,
        f: impl FnOnce(&mut dyn Module, &mut Context) -> Action,
    ) -> bool {
        let mut ctx = self.ctx.clone();
        let action = match self.current_module_mut() {
            Some(module) => f(module.as_mut(), &mut ctx),
            None => return false,
        };
        self.ctx = ctx;
        self.apply_action(action);
        true
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn focus_label(&self) -> &'static str {
        match (self.input_mode, self.focus) {
            (InputMode::Command, _) => "Command",
            (_, Focus::Sidebar) => "Sidebar",
            (_, Focus::Content) => "Content",
        }
    }
}
