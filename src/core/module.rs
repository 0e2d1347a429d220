//! Module trait for routed pages

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use super::{Action, Command, Context};
use crate::router::PageId;

/// A page mounted in the content region.
///
/// Modules own their state; the shell forwards input while the content
/// region has focus and calls `render` every frame.
pub trait Module: Send {
    fn id(&self) -> PageId;

    /// Handle keyboard input
    /// Returns an Action describing what should happen
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action;

    /// Handle a `:` command the shell does not consume itself
    fn handle_command(&mut self, _cmd: &Command, _ctx: &mut Context) -> Action {
        Action::None
    }

    /// Left click at absolute terminal coordinates
    fn handle_click(&mut self, _column: u16, _row: u16, _ctx: &mut Context) -> Action {
        Action::None
    }

    /// Mouse wheel, positive is down
    fn handle_scroll(&mut self, _delta: i32, _ctx: &mut Context) -> Action {
        Action::None
    }

    /// True while the module consumes raw characters (e.g. a search box),
    /// so the shell should not treat them as global shortcuts.
    fn captures_input(&self) -> bool {
        false
    }

    /// Key hints for the status line
    fn hints(&self) -> &'static str {
        ""
    }

    /// Modules cache geometry for hit-testing, hence `&mut self`.
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &Context);
}
