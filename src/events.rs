use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, FilterField};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If a filter prompt is active, handle text input
    if app.filter_input.is_some() {
        handle_filter_input(app, key);
        return;
    }

    // If the detail overlay is shown, handle overlay-specific keys
    if app.detail_open {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Retry is available from the overlay as well
            KeyCode::Char('R') => app.retry_selected(),
            // Allow scrolling through messages while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Enter detail overlay
        KeyCode::Enter => app.enter_detail(),

        // Go back
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Refresh now
        KeyCode::Char('r') => app.refresh_now(),

        // Retry the selected message
        KeyCode::Char('R') => app.retry_selected(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Filters
        KeyCode::Char('/') => app.start_filter(FilterField::PatientId),
        KeyCode::Char('t') => app.start_filter(FilterField::MessageType),
        KeyCode::Char('d') => app.cycle_direction_filter(),
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('c') => {
            if !app.criteria.is_empty() {
                app.clear_filters();
            }
        }

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("relay_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_notice(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_notice(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while a filter prompt is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.cancel_filter();
        }

        // Cancel input mode (keep text)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear everything and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filters();
        }

        // Backspace
        KeyCode::Backspace => {
            app.filter_pop();
            if app.active_filter_text().is_empty() {
                app.cancel_filter();
            }
        }

        // Type characters
        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Content rows start below the header bar, table border and
            // table header
            if clicked_row >= content_start_row {
                let item_row = (clicked_row - content_start_row) as usize;
                if item_row < app.filtered.len() {
                    app.selected_index = item_row;
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => {
            app.go_back();
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::{DashboardEvent, PollerHandle};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (command_tx, _command_rx) = mpsc::channel(8);
        let (_event_tx, event_rx) = mpsc::channel(8);
        let handle = PollerHandle {
            commands: command_tx,
            task: tokio::spawn(async {}),
        };
        App::new(handle, event_rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn load_messages(app: &mut App) {
        let messages = vec![
            serde_json::from_value(serde_json::json!({
                "id": "1", "direction": "order", "status": "failed", "patient_id": "P100"
            }))
            .unwrap(),
            serde_json::from_value(serde_json::json!({
                "id": "2", "direction": "report", "status": "failed", "patient_id": "P200"
            }))
            .unwrap(),
        ];
        app.apply_event(DashboardEvent::Messages(messages));
    }

    #[tokio::test]
    async fn test_quit_key() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_filter_prompt_captures_text() {
        let mut app = test_app();
        load_messages(&mut app);

        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.filter_input, Some(FilterField::PatientId));

        handle_key_event(&mut app, key(KeyCode::Char('P')));
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.criteria.patient_id, "P2");
        assert_eq!(app.filtered, vec![1]);

        // 'q' while the prompt is active types, rather than quits
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.criteria.patient_id, "P2q");
        handle_key_event(&mut app, key(KeyCode::Backspace));

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.filter_input.is_none());
        assert_eq!(app.criteria.patient_id, "P2");
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_enter_opens_detail_and_esc_closes() {
        let mut app = test_app();
        load_messages(&mut app);

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.detail_open);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.detail_open);
    }

    #[tokio::test]
    async fn test_enter_without_selection_does_nothing() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.detail_open);
    }

    #[tokio::test]
    async fn test_scroll_selects() {
        let mut app = test_app();
        load_messages(&mut app);

        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, scroll, 3);
        assert_eq!(app.selected_index, 1);
    }
}
