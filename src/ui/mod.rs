pub mod banner;
pub mod body;
pub mod header;
pub mod help;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, ResolvedKeybinds};
use crate::ui::theme::Theme;
use crate::view::ViewState;

/// Render one frame from a view-state. Reads only.
pub fn draw(frame: &mut Frame, view: &ViewState, theme: &Theme, keybinds: &ResolvedKeybinds) {
    let banner_height = u16::from(banner::is_visible(&view.export));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], view, theme);
    header::render_tabs(frame, chunks[1], view.selected_tab, theme);
    if banner_height > 0 {
        banner::render(frame, chunks[2], &view.export, keybinds, theme);
    }
    body::render(frame, chunks[3], &view.projection, theme);
    statusbar::render(frame, chunks[4], keybinds, &view.export, theme);
}

/// Render the app's current view, with the help overlay on top when open.
pub fn draw_app(frame: &mut Frame, app: &App) {
    let view = app.view();
    draw(frame, &view, &app.theme, &app.keybinds);

    // help overlay goes last so it draws on top
    if app.show_help {
        help::render(
            frame,
            frame.area(),
            &app.help_entries(),
            &app.controller.settings(),
            &app.theme,
        );
    }
}
