use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Classify the selected scenario for the typed postcode
    RunScenario,
    /// Same as `RunScenario` with the next seed
    Reroll,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    // 'q' is a valid character while typing a postcode
    if key.code == Char('q') && key.modifiers.is_empty() && app.screen != Screen::LocationInput {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::ScenarioSelect => match key.code {
            Up | Char('k') => {
                app.scenario_index = app.scenario_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.scenario_index + 1 < app.scenarios.len() {
                    app.scenario_index += 1;
                }
            }
            Enter | Char(' ') => {
                app.select_current_scenario();
            }
            _ => {}
        },

        Screen::LocationInput => match key.code {
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.location_input.push(character);
                }
            }
            Backspace => {
                app.location_input.pop();
            }
            Enter => {
                action = Action::RunScenario;
            }
            Left | Esc => {
                app.error_message = None;
                app.screen = Screen::ScenarioSelect;
            }
            _ => {}
        },

        Screen::ResultView => match key.code {
            Up | Char('k') => {
                app.detail_index = app.detail_index.saturating_sub(1);
            }
            Down | Char('j') => {
                let count = app.result.as_ref().map_or(0, |result| result.detections.len());
                if app.detail_index + 1 < count {
                    app.detail_index += 1;
                }
            }
            Char('r') => {
                action = Action::Reroll;
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::LocationInput;
            }
            _ => {}
        },
    }
    action
}
