//! End-to-end shell behavior against a test backend

use gridboard::app::{App, PageSlot};
use gridboard::config::Config;
use gridboard::domain::chart::sample_chart;
use gridboard::domain::table::{sample_users, TableOptions, TableView};
use gridboard::infrastructure::runtime::LoadedPage;
use gridboard::input;
use gridboard::router::PageId;
use gridboard::ui;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

fn press(app: &mut App, code: KeyCode) {
    input::handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

fn render(app: &mut App) -> Buffer {
    let mut terminal = Terminal::new(TestBackend::new(100, 28)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    terminal.backend().buffer().clone()
}

fn screen_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            text.push_str(buffer.get(x, y).symbol());
        }
        text.push('\n');
    }
    text
}

/// Complete every pending load with the built-in samples.
fn finish_loads(app: &mut App) {
    for (page, request_id) in app.take_load_requests() {
        let loaded = match page {
            PageId::Dashboard => LoadedPage::Dashboard {
                table: sample_users(),
                chart: sample_chart(),
            },
            PageId::DailyOutput => LoadedPage::DailyOutput(
                TableView::new(sample_users(), TableOptions::default()).unwrap(),
            ),
            PageId::Accumulated => LoadedPage::Accumulated(sample_chart()),
        };
        app.apply_page_loaded(request_id, loaded);
    }
}

#[test]
fn test_placeholder_until_page_loads() {
    let mut app = App::new(&Config::default(), "/reports/dailyoutput");
    let text = screen_text(&render(&mut app));
    assert!(text.contains(ui::LOADING_TEXT));
    assert!(text.contains("AppName"));

    finish_loads(&mut app);
    let text = screen_text(&render(&mut app));
    assert!(!text.contains(ui::LOADING_TEXT));
    assert!(text.contains("Ava"));
    assert!(text.contains("Ben"));
    assert!(text.contains("Showing 1–2 of 2"));
}

#[test]
fn test_search_and_sort_through_keys() {
    let mut app = App::new(&Config::default(), "/reports/dailyoutput");
    finish_loads(&mut app);
    render(&mut app);

    press(&mut app, KeyCode::Char('/'));
    for ch in "ava".chars() {
        press(&mut app, KeyCode::Char(ch));
    }
    press(&mut app, KeyCode::Enter);
    let text = screen_text(&render(&mut app));
    assert!(text.contains("Ava"));
    assert!(!text.contains("Ben"));

    press(&mut app, KeyCode::Char('c'));
    press(&mut app, KeyCode::Char('3'));
    press(&mut app, KeyCode::Char('3'));
    let text = screen_text(&render(&mut app));
    let ben = text.find("Ben").unwrap();
    let ava = text.find("Ava").unwrap();
    assert!(ben < ava, "descending age puts Ben (34) first");
}

#[test]
fn test_error_boundary_keeps_shell_alive() {
    let mut app = App::new(&Config::default(), "/reports/accumulated");
    let (page, id) = app.take_load_requests()[0];
    app.apply_page_failed(id, page, "malformed JSON in chart.json".to_string());

    let text = screen_text(&render(&mut app));
    assert!(text.contains("malformed JSON in chart.json"));
    assert!(text.contains("press r to retry"));
    assert!(text.contains("AppName"));

    press(&mut app, KeyCode::Char('r'));
    finish_loads(&mut app);
    assert!(matches!(app.current_slot(), Some(PageSlot::Ready(_))));
    let text = screen_text(&render(&mut app));
    assert!(text.contains("Monthly Performance"));
}

#[test]
fn test_unknown_route_lands_on_dashboard() {
    let mut app = App::new(&Config::default(), "/nowhere");
    assert_eq!(app.router.location(), "/");
    finish_loads(&mut app);
    let text = screen_text(&render(&mut app));
    assert!(text.contains("Welcome"));
}

#[test]
fn test_sidebar_width_follows_collapse() {
    let mut app = App::new(&Config::default(), "/");
    finish_loads(&mut app);
    render(&mut app);
    assert_eq!(app.sidebar_hits.area.width, 6);

    press(&mut app, KeyCode::Char('['));
    let text = screen_text(&render(&mut app));
    assert_eq!(app.sidebar_hits.area.width, 22);
    assert!(text.contains("Dashboard"));
    assert!(text.contains("Docs (External)"));
}
