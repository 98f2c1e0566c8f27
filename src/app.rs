use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::controller::ViewStateController;
use crate::system::settings::Settings;
use crate::ui::theme::{Theme, resolve_color_support};
use crate::view::{Tab, ViewState};

/// Points added or removed by one threshold key press.
pub const THRESHOLD_STEP: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub next_tab: KeyCode,
    pub prev_tab: KeyCode,
    pub request_gc: KeyCode,
    pub export: KeyCode,
    pub dismiss_success: KeyCode,
    pub dismiss_failure: KeyCode,
    pub raise_thresholds: KeyCode,
    pub lower_thresholds: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            next_tab: parse_key(&kb.next_tab).unwrap_or(KeyCode::Tab),
            prev_tab: parse_key(&kb.prev_tab).unwrap_or(KeyCode::BackTab),
            request_gc: parse_key(&kb.request_gc).unwrap_or(KeyCode::Char('g')),
            export: parse_key(&kb.export).unwrap_or(KeyCode::Char('e')),
            dismiss_success: parse_key(&kb.dismiss_success).unwrap_or(KeyCode::Char('d')),
            dismiss_failure: parse_key(&kb.dismiss_failure).unwrap_or(KeyCode::Char('D')),
            raise_thresholds: parse_key(&kb.raise_thresholds).unwrap_or(KeyCode::Char('+')),
            lower_thresholds: parse_key(&kb.lower_thresholds).unwrap_or(KeyCode::Char('-')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.next_tab), "Next tab"),
            (key_label(self.prev_tab), "Previous tab"),
            (key_label(self.request_gc), "Request GC"),
            (key_label(self.export), "Export metrics"),
            (key_label(self.dismiss_success), "Dismiss export notice"),
            (key_label(self.dismiss_failure), "Dismiss export error"),
            (key_label(self.raise_thresholds), "Raise thresholds"),
            (key_label(self.lower_thresholds), "Lower thresholds"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("1-5".to_string(), "Jump to tab"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "S-Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Left => "\u{2190}".to_string(),
        KeyCode::Right => "\u{2192}".to_string(),
        KeyCode::Up => "\u{2191}".to_string(),
        KeyCode::Down => "\u{2193}".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub controller: ViewStateController,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    /// Threshold changes sent but not yet observed back, led by the value
    /// the first of them was shifted from.
    pending_settings: Vec<Settings>,
}

impl App {
    pub fn new(controller: ViewStateController, config: &Config) -> Self {
        let support = resolve_color_support(&config.colors.color_support);
        App {
            running: true,
            show_help: false,
            controller,
            theme: Theme::from_config(&config.colors.theme, support),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            pending_settings: Vec::new(),
        }
    }

    pub fn view(&self) -> ViewState {
        self.controller.view()
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.show_help {
            return self.map_key_help(key);
        }
        self.map_key_normal(key)
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Digit tab shortcuts are hardwired (not configurable)
        if let KeyCode::Char(c @ '1'..='9') = code
            && let Some(tab) = Tab::from_index(c as usize - '1' as usize)
        {
            return Action::SelectTab(tab);
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.next_tab {
            return Action::NextTab;
        }
        if code == kb.prev_tab {
            return Action::PrevTab;
        }
        if code == kb.request_gc {
            return Action::RequestGc;
        }
        if code == kb.export {
            return Action::Export;
        }
        if code == kb.dismiss_success {
            return Action::DismissExportSuccess;
        }
        if code == kb.dismiss_failure {
            return Action::DismissExportFailure;
        }
        if code == kb.raise_thresholds {
            return Action::ShiftThresholds(THRESHOLD_STEP);
        }
        if code == kb.lower_thresholds {
            return Action::ShiftThresholds(-THRESHOLD_STEP);
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    /// Apply an action. Export and threshold actions spawn work, so this
    /// must run inside a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::SelectTab(tab) => self.controller.select_tab(tab),
            Action::NextTab => {
                let tab = self.controller.selected_tab().next();
                self.controller.select_tab(tab);
            }
            Action::PrevTab => {
                let tab = self.controller.selected_tab().prev();
                self.controller.select_tab(tab);
            }
            Action::RequestGc => self.controller.request_gc(),
            Action::Export => self.controller.export_metrics(),
            Action::DismissExportSuccess => self.controller.dismiss_export_success(),
            Action::DismissExportFailure => self.controller.dismiss_export_failure(),
            Action::ShiftThresholds(delta) => {
                let base = self.threshold_base();
                let settings = base.shifted(delta);
                if self.pending_settings.is_empty() {
                    self.pending_settings.push(base);
                }
                self.pending_settings.push(settings);
                self.controller.update_settings(settings);
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::None => {}
        }
    }

    /// Settings the next threshold shift starts from. Presses that arrive
    /// before the previous update lands build on it instead of the stale
    /// provider value.
    fn threshold_base(&mut self) -> Settings {
        let observed = self.controller.settings();
        // observed is still somewhere short of the last send: keep building on it
        let in_flight = self
            .pending_settings
            .iter()
            .position(|s| *s == observed)
            .is_some_and(|i| i + 1 < self.pending_settings.len());
        if !in_flight {
            self.pending_settings.clear();
        }
        self.pending_settings.last().copied().unwrap_or(observed)
    }

    /// Consume the app, releasing the controller.
    pub fn shutdown(self) {
        self.controller.dispose();
    }
}
