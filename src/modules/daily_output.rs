//! Daily Output page: hosts a `TableView` and maps keys, commands and
//! clicks onto it.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use ratatui::Frame;

use super::export::{export_table, ExportError};
use crate::core::command::PageArg;
use crate::core::{Action, Command, Context, Module};
use crate::domain::table::TableView;
use crate::router::PageId;
use crate::ui::widgets::{render_table, PagerControl, TableHits};

const EXPORT_PREFIX: &str = "daily-output";

pub struct DailyOutput {
    view: TableView,
    table_state: TableState,
    hits: TableHits,
    searching: bool,
    export_dir: PathBuf,
}

impl DailyOutput {
    pub fn new(view: TableView, export_dir: PathBuf) -> Self {
        Self {
            view,
            table_state: TableState::default(),
            hits: TableHits::default(),
            searching: false,
            export_dir,
        }
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    fn matches_notice(&self) -> Action {
        let count = self.view.processed().filtered_count();
        match count {
            0 => Action::warn("No matching rows"),
            1 => Action::info("1 matching row"),
            n => Action::info(format!("{n} matching rows")),
        }
    }

    fn sort_by(&mut self, key: &str) -> Action {
        if !self.view.toggle_sort(key) {
            return Action::warn(format!("{key} is not a sortable column"));
        }
        self.sort_notice()
    }

    fn sort_notice(&self) -> Action {
        match self.view.effective_sort() {
            Some((key, direction)) => Action::info(format!("Sorted by {key} {}", direction.label())),
            None => Action::None,
        }
    }

    fn pager(&mut self, control: PagerControl) {
        match control {
            PagerControl::First => self.view.first_page(),
            PagerControl::Prev => self.view.prev_page(),
            PagerControl::Next => self.view.next_page(),
            PagerControl::Last => self.view.last_page(),
        }
    }

    fn cycle_page_size(&mut self, forward: bool) -> Action {
        self.view.cycle_page_size(forward);
        Action::info(format!("{} rows per page", self.view.state().page_size))
    }

    fn export(&self) -> Action {
        match export_table(&self.view, &self.export_dir, EXPORT_PREFIX) {
            Ok((path, count)) => {
                Action::info(format!("Exported {count} rows to {}", path.display()))
            }
            Err(ExportError::Empty) => Action::warn("Nothing to export"),
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                Action::error(format!("Export failed: {err}"))
            }
        }
    }

    fn copy_selected(&self) -> Action {
        let Some(row) = self.view.selected_row() else {
            return Action::warn("Nothing to copy");
        };
        match serde_json::to_string(row) {
            Ok(json) => Action::Copy(json),
            Err(err) => Action::error(format!("Failed to encode row: {err}")),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.searching = false;
                self.matches_notice()
            }
            KeyCode::Backspace => {
                self.view.pop_query_char();
                Action::None
            }
            KeyCode::Char(ch) => {
                self.view.push_query_char(ch);
                Action::None
            }
            _ => Action::None,
        }
    }
}

impl Module for DailyOutput {
    fn id(&self) -> PageId {
        PageId::DailyOutput
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        if self.searching {
            return self.handle_search_key(key);
        }

        match key.code {
            KeyCode::Char('/') => {
                self.searching = true;
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.view.select_next();
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.view.select_prev();
                Action::None
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
                self.view.prev_page();
                Action::None
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
                self.view.next_page();
                Action::None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.view.first_page();
                Action::None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.view.last_page();
                Action::None
            }
            KeyCode::Char(ch @ '1'..='9') => {
                let n = ch as usize - '1' as usize;
                match self.view.columns().get(n).map(|col| col.key.clone()) {
                    Some(key) => self.sort_by(&key),
                    None => Action::warn(format!("No column {ch}")),
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.cycle_page_size(true),
            KeyCode::Char('-') => self.cycle_page_size(false),
            KeyCode::Char('c') => {
                self.view.set_query("");
                Action::info("Search cleared")
            }
            KeyCode::Char('y') => self.copy_selected(),
            KeyCode::Char('e') => self.export(),
            _ => Action::None,
        }
    }

    fn handle_command(&mut self, cmd: &Command, _ctx: &mut Context) -> Action {
        match cmd {
            Command::Search(query) => {
                self.view.set_query(query.clone());
                self.matches_notice()
            }
            Command::Sort(key) => self.sort_by(key),
            Command::PageSize(size) => match self.view.set_page_size(*size) {
                Ok(()) => Action::info(format!("{size} rows per page")),
                Err(err) => Action::warn(err.to_string()),
            },
            Command::Page(arg) => {
                match arg {
                    PageArg::First => self.view.first_page(),
                    PageArg::Prev => self.view.prev_page(),
                    PageArg::Next => self.view.next_page(),
                    PageArg::Last => self.view.last_page(),
                    PageArg::Number(n) => self.view.set_page(*n),
                }
                let window = &self.view.processed().window;
                Action::info(format!("Page {} / {}", window.page, window.total_pages))
            }
            Command::Export => self.export(),
            _ => Action::None,
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, _ctx: &mut Context) -> Action {
        if self.hits.in_search(column, row) {
            self.searching = true;
            return Action::None;
        }
        self.searching = false;
        if self.hits.in_page_size(column, row) {
            return self.cycle_page_size(true);
        }
        if let Some(key) = self.hits.header_at(column, row).map(str::to_string) {
            return self.sort_by(&key);
        }
        if let Some(control) = self.hits.control_at(column, row) {
            self.pager(control);
            return Action::None;
        }
        if let Some(index) = self.hits.row_at(column, row) {
            self.view.select(index);
        }
        Action::None
    }

    fn handle_scroll(&mut self, delta: i32, _ctx: &mut Context) -> Action {
        if delta > 0 {
            self.view.select_next();
        } else if delta < 0 {
            self.view.select_prev();
        }
        Action::None
    }

    fn captures_input(&self) -> bool {
        self.searching
    }

    fn hints(&self) -> &'static str {
        if self.searching {
            "type to filter  Enter/Esc done"
        } else {
            "/ search  1-9 sort  h/l page  +/- rows  y copy  e export"
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &Context) {
        self.hits = render_table(
            frame,
            area,
            &self.view,
            &mut self.table_state,
            PageId::DailyOutput.title(),
            ctx.focused,
            self.searching,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rows::field;
    use crate::domain::table::{sample_users, TableOptions};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::Value;

    fn page() -> DailyOutput {
        let view = TableView::new(sample_users(), TableOptions::default()).unwrap();
        DailyOutput::new(view, std::env::temp_dir().join("gridboard-test-exports"))
    }

    fn press(page: &mut DailyOutput, code: KeyCode) -> Action {
        page.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &mut Context::default())
    }

    fn ages(page: &DailyOutput) -> Vec<Value> {
        page.view()
            .page_rows()
            .map(|(_, row)| field(row, "age").clone())
            .collect()
    }

    #[test]
    fn test_search_mode_captures_typing() {
        let mut page = page();
        press(&mut page, KeyCode::Char('/'));
        assert!(page.captures_input());
        for ch in "ava".chars() {
            press(&mut page, KeyCode::Char(ch));
        }
        assert_eq!(page.view().processed().filtered_count(), 1);
        assert_eq!(press(&mut page, KeyCode::Enter), Action::info("1 matching row"));
        assert!(!page.captures_input());
        assert_eq!(page.view().state().query, "ava");
    }

    #[test]
    fn test_number_keys_toggle_sort() {
        let mut page = page();
        // Third column is age.
        press(&mut page, KeyCode::Char('3'));
        assert_eq!(ages(&page), vec![Value::from(29), Value::from(34)]);
        press(&mut page, KeyCode::Char('3'));
        assert_eq!(ages(&page), vec![Value::from(34), Value::from(29)]);

        // Email is not sortable.
        assert!(matches!(
            press(&mut page, KeyCode::Char('2')),
            Action::Notify(_, crate::core::NotifyLevel::Warn)
        ));
    }

    #[test]
    fn test_copy_selected_row_as_json() {
        let mut page = page();
        let Action::Copy(json) = press(&mut page, KeyCode::Char('y')) else {
            panic!("expected a copy action");
        };
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Ava");
    }

    #[test]
    fn test_page_size_command_rejects_unknown_size() {
        let mut page = page();
        let mut ctx = Context::default();
        assert!(matches!(
            page.handle_command(&Command::PageSize(7), &mut ctx),
            Action::Notify(_, crate::core::NotifyLevel::Warn)
        ));
        assert_eq!(
            page.handle_command(&Command::PageSize(5), &mut ctx),
            Action::info("5 rows per page")
        );
        assert_eq!(page.view().state().page_size, 5);
    }

    #[test]
    fn test_clicking_header_sorts() {
        let mut page = page();
        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        let ctx = Context::default();
        terminal.draw(|f| page.render(f, f.size(), &ctx)).unwrap();

        let (rect, key) = page.hits.headers.last().cloned().unwrap();
        assert_eq!(key, "age");
        let action = page.handle_click(rect.x, rect.y, &mut Context::default());
        assert_eq!(action, Action::info("Sorted by age ascending"));
    }
}
