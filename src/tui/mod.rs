pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

/// Run the interactive decision screen until the user quits.
///
/// Edits live in `app.state` only; the session file is never written.
pub async fn run_tui(mut app: App) -> anyhow::Result<App> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e);
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result?;
    Ok(app)
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
                KeyCode::Char('l') | KeyCode::Right => app.next_column(),
                KeyCode::Char('h') | KeyCode::Left => app.previous_column(),

                // Tab switching
                KeyCode::Tab => app.next_tab(),
                KeyCode::Char('1') => app.select_tab(app::Tab::Scoring),
                KeyCode::Char('2') => app.select_tab(app::Tab::Comparison),
                KeyCode::Char('3') => app.select_tab(app::Tab::Voting),

                // Editing
                KeyCode::Char('w') => app.start_weight_input(),
                KeyCode::Char('+') | KeyCode::Char('=') => app.nudge_weight(1.0),
                KeyCode::Char('-') => app.nudge_weight(-1.0),
                KeyCode::Char('e') | KeyCode::Enter => match app.current_tab {
                    app::Tab::Voting => app.start_vote_input(),
                    _ => app.start_score_input(),
                },
                KeyCode::Char('v') => app.start_vote_input(),

                // Undo
                KeyCode::Char('z') => app.undo_last(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                // Score breakdown
                KeyCode::Char('b') => app.show_score_breakdown(),

                _ => {}
            }
        }
        app::InputMode::WeightInput | app::InputMode::ScoreInput => match key.code {
            KeyCode::Enter => app.confirm_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            // Numeric input only
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                app.input_buffer.push(c);
            }
            _ => {}
        },
        app::InputMode::VoteComment => match key.code {
            KeyCode::Enter => app.confirm_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            KeyCode::Char(c) => app.input_buffer.push(c),
            _ => {}
        },
        app::InputMode::ScoreBreakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => app.dismiss_score_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char('l') | KeyCode::Right => app.next_column(),
            KeyCode::Char('h') | KeyCode::Left => app.previous_column(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoterConfig;
    use crate::scoring::{CandidateScore, Criterion, EvaluationState};
    use std::collections::HashMap;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
        let state = EvaluationState::new(
            vec![Criterion {
                id: "price".to_string(),
                name: "Price".to_string(),
                description: String::new(),
                weight: 4.0,
            }],
            vec![CandidateScore {
                candidate_id: 1,
                candidate_name: "Acme".to_string(),
                scores: HashMap::new(),
            }],
            vec![],
        );
        App::new(
            "RFQ".to_string(),
            state,
            VoterConfig {
                id: "me".to_string(),
                name: "Me".to_string(),
            },
            ThemeColors::dark(),
        )
    }

    #[test]
    fn test_weight_edit_via_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('7'));
        press(&mut app, KeyCode::Char('x')); // ignored
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.criteria[0].weight, 7.0);
    }

    #[test]
    fn test_score_edit_escape_cancels() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.candidates[0].score_for("price"), 0.0);
    }

    #[test]
    fn test_vote_via_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('v'));
        for c in "ok!".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.votes.len(), 1);
        assert_eq!(app.state.votes[0].comment.as_deref(), Some("ok!"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);
    }
}
