//! Key and mouse dispatch for the shell.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Focus, InputMode, PageSlot};
use crate::ui::layout::hit;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    app.mark_dirty();

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // A page reading raw text (the table search box) gets every key.
    if app.content_captures_input() {
        app.with_module(|module, ctx| module.handle_key(key, ctx));
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(None),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('[') => app.toggle_sidebar(),
        KeyCode::Backspace => app.back(),
        KeyCode::Char('r') if retry_applies(app) => app.reload_current(),
        _ => match app.focus {
            Focus::Sidebar => handle_sidebar_key(app, key),
            Focus::Content => {
                app.with_module(|module, ctx| module.handle_key(key, ctx));
            }
        },
    }
}

/// `r` retries a failed page from anywhere. On a mounted page it only
/// reloads when the page itself does not use the key.
fn retry_applies(app: &App) -> bool {
    match app.current_slot() {
        Some(PageSlot::Ready(_)) => app.focus == Focus::Sidebar,
        Some(PageSlot::Failed { .. }) | None => true,
        Some(PageSlot::Loading { .. }) => false,
    }
}

fn handle_sidebar_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_select_prev(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
            app.activate_nav_row(app.nav_selected)
        }
        KeyCode::Char('h') | KeyCode::Left => app.close_selected_group(),
        KeyCode::Esc => app.toggle_focus(),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            if app.command.input.pop().is_none() {
                app.exit_command();
            }
        }
        KeyCode::Up => {
            if let Some(last) = app.command.last.clone() {
                app.command.input = last;
            }
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.help_open || app.input_mode == InputMode::Command {
        return;
    }
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_click(app, col, row),
        MouseEventKind::ScrollUp => handle_scroll(app, col, row, -1),
        MouseEventKind::ScrollDown => handle_scroll(app, col, row, 1),
        _ => return,
    }
    app.mark_dirty();
}

fn handle_click(app: &mut App, col: u16, row: u16) {
    if hit(app.sidebar_hits.toggle, col, row) {
        app.toggle_sidebar();
        return;
    }
    let nav_row = app
        .sidebar_hits
        .rows
        .iter()
        .find(|(rect, _)| hit(*rect, col, row))
        .map(|(_, index)| *index);
    if let Some(index) = nav_row {
        app.focus = Focus::Sidebar;
        app.sync_context();
        app.activate_nav_row(index);
        return;
    }
    if hit(app.content_area, col, row) {
        if app.focus != Focus::Content {
            app.focus = Focus::Content;
            app.sync_context();
        }
        app.with_module(|module, ctx| module.handle_click(col, row, ctx));
    }
}

fn handle_scroll(app: &mut App, col: u16, row: u16, delta: i32) {
    if hit(app.sidebar_hits.area, col, row) {
        if delta > 0 {
            app.nav_select_next();
        } else {
            app.nav_select_prev();
        }
        return;
    }
    if hit(app.content_area, col, row) {
        app.with_module(|module, ctx| module.handle_scroll(delta, ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_command_line_roundtrip() {
        let mut app = App::new(&Config::default(), "/");
        press(&mut app, KeyCode::Char(':'));
        assert_eq!(app.input_mode, InputMode::Command);
        for ch in "go /reports/dailyoutput".chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.router.location(), "/reports/dailyoutput");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.router.location(), "/");
    }

    #[test]
    fn test_sidebar_keys_navigate() {
        let mut app = App::new(&Config::default(), "/");
        app.toggle_sidebar();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);

        // Rows: Dashboard, Projects, Reports ...
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(app.nav.is_open("reports"));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.router.location(), "/reports/dailyoutput");

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.nav.open_menu_id, None);
        assert_eq!(app.nav_selected, 2);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = App::new(&Config::default(), "/");
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help_open);
        press(&mut app, KeyCode::Char('['));
        assert!(app.sidebar_collapsed);
        press(&mut app, KeyCode::Esc);
        assert!(!app.help_open);
    }

    #[test]
    fn test_retry_after_failure() {
        let mut app = App::new(&Config::default(), "/");
        let (page, id) = app.take_load_requests()[0];
        app.apply_page_failed(id, page, "disk on fire".to_string());
        press(&mut app, KeyCode::Char('r'));
        assert!(matches!(app.current_slot(), Some(PageSlot::Loading { .. })));
        assert_eq!(app.take_load_requests().len(), 1);
    }
}
