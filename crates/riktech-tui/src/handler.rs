use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputLine, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work on any screen
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.switch_screen();
            return;
        }
        KeyCode::F(1) => {
            app.screen = Screen::Chat;
            return;
        }
        KeyCode::F(2) => {
            app.screen = Screen::Code;
            return;
        }
        KeyCode::PageUp => {
            app.scroll_up(5);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_down(5);
            return;
        }
        KeyCode::Up if ctrl => {
            app.scroll_up(1);
            return;
        }
        KeyCode::Down if ctrl => {
            app.scroll_down(1);
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Chat => handle_chat_key(app, key, ctrl),
        Screen::Code => handle_code_key(app, key, ctrl),
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char('p') if ctrl => app.cycle_provider(),
        KeyCode::Char('l') if ctrl => app.clear_history(),
        KeyCode::Char('y') if ctrl => app.copy_last_reply(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        // Input is disabled while a reply is pending
        _ if app.chat.is_pending() => {}
        KeyCode::Enter => app.submit_chat(),
        _ => edit_input(&mut app.chat_input, key, ctrl),
    }
}

fn handle_code_key(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char('n') if ctrl => app.next_language(),
        KeyCode::Char('b') if ctrl => app.prev_language(),
        KeyCode::Char('y') if ctrl => app.copy_code_output(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        _ if app.code.is_pending() => {}
        KeyCode::Enter => app.submit_code(),
        _ => edit_input(&mut app.code_input, key, ctrl),
    }
}

fn edit_input(input: &mut InputLine, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char(c) if !ctrl => input.insert(c),
        _ => {}
    }
}

/// Pasted text goes into the active input, newlines flattened to spaces.
fn handle_paste(app: &mut App, text: &str) {
    if app.is_waiting() {
        return;
    }
    let input = match app.screen {
        Screen::Chat => &mut app.chat_input,
        Screen::Code => &mut app.code_input,
    };
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' | '\t' => input.insert(' '),
            c => input.insert(c),
        }
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let area = match app.screen {
        Screen::Chat => app.chat_area,
        Screen::Code => app.code_area,
    };
    let inside = area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !inside {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}
