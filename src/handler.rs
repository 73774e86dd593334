use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if key.code == KeyCode::Tab {
        app.next_screen();
        return;
    }

    match app.screen {
        Screen::Chat => handle_chat(app, key),
        Screen::Explore => handle_explore(app, key),
        Screen::History => handle_history(app, key),
        Screen::Settings => handle_settings(app, key),
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Editing => handle_chat_editing(app, key),
        InputMode::Normal => handle_chat_normal(app, key),
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_draft();
        }
        KeyCode::Backspace => {
            if app.draft_cursor > 0 {
                app.draft_cursor -= 1;
                let mut draft = app.conversation.draft().to_string();
                let byte_pos = char_to_byte_index(&draft, app.draft_cursor);
                draft.remove(byte_pos);
                app.conversation.update_draft(draft);
            }
        }
        KeyCode::Delete => {
            let mut draft = app.conversation.draft().to_string();
            if app.draft_cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(&draft, app.draft_cursor);
                draft.remove(byte_pos);
                app.conversation.update_draft(draft);
            }
        }
        KeyCode::Left => {
            app.draft_cursor = app.draft_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.conversation.draft().chars().count();
            app.draft_cursor = (app.draft_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.draft_cursor = 0;
        }
        KeyCode::End => {
            app.draft_cursor = app.conversation.draft().chars().count();
        }
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char(c) => {
            let mut draft = app.conversation.draft().to_string();
            let byte_pos = char_to_byte_index(&draft, app.draft_cursor);
            draft.insert(byte_pos, c);
            app.conversation.update_draft(draft);
            app.draft_cursor += 1;
        }
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('2') => app.enter_screen(Screen::Explore),
        KeyCode::Char('3') => app.enter_screen(Screen::History),
        KeyCode::Char('4') => app.enter_screen(Screen::Settings),
        _ => {}
    }
}

fn handle_explore(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.prompt_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.prompt_nav_up(),
        KeyCode::Enter => app.pick_prompt(),
        KeyCode::Char('1') | KeyCode::Esc => app.enter_screen(Screen::Chat),
        KeyCode::Char('3') => app.enter_screen(Screen::History),
        KeyCode::Char('4') => app.enter_screen(Screen::Settings),
        _ => {}
    }
}

fn handle_history(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),
        KeyCode::Char('p') => app.history.toggle_private_mode(),
        KeyCode::Char('r') => app.request_history(),
        KeyCode::Char('1') | KeyCode::Esc => app.enter_screen(Screen::Chat),
        KeyCode::Char('2') => app.enter_screen(Screen::Explore),
        KeyCode::Char('4') => app.enter_screen(Screen::Settings),
        _ => {}
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.theme_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.theme_nav_up(),
        KeyCode::Enter => app.select_theme(),
        KeyCode::Char('1') | KeyCode::Esc => app.enter_screen(Screen::Chat),
        KeyCode::Char('2') => app.enter_screen(Screen::Explore),
        KeyCode::Char('3') => app.enter_screen(Screen::History),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatClient;
    use crate::theme::ThemeStore;
    use crossterm::event::KeyEvent;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::load(dir.path().join("config.json"));
        (App::new(ChatClient::new("http://127.0.0.1:1"), store), dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::from(code));
    }

    #[test]
    fn test_typing_builds_the_draft() {
        let (mut app, _dir) = test_app();
        for c in "héllo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.conversation.draft(), "héllo");
        assert_eq!(app.draft_cursor, 5);
    }

    #[test]
    fn test_backspace_is_utf8_safe() {
        let (mut app, _dir) = test_app();
        for c in "né".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.conversation.draft(), "n");
        assert_eq!(app.draft_cursor, 1);
    }

    #[test]
    fn test_insert_at_cursor() {
        let (mut app, _dir) = test_app();
        for c in "ac".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.conversation.draft(), "abc");
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let (mut app, _dir) = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_explore_enter_prefills_chat_draft() {
        let (mut app, _dir) = test_app();
        app.enter_screen(Screen::Explore);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.conversation.draft(), crate::app::SUGGESTED_PROMPTS[0]);
    }

    #[test]
    fn test_private_mode_toggle_key() {
        let (mut app, _dir) = test_app();
        app.history.finish_load(Ok(Vec::new()));
        app.enter_screen(Screen::History);
        press(&mut app, KeyCode::Char('p'));
        assert!(app.history.is_private());
        press(&mut app, KeyCode::Char('p'));
        assert!(!app.history.is_private());
    }
}
