use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::app::{ResolvedKeybinds, key_label};
use crate::export::ExportView;
use crate::format::truncate_unicode;
use crate::ui::theme::Theme;

/// Whether the banner has anything to show.
pub fn is_visible(export: &ExportView) -> bool {
    export.is_exporting || export.success.is_some() || export.failure.is_some()
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    export: &ExportView,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let width = area.width as usize;
    let bg = Style::default().bg(theme.statusbar_bg);

    let mut spans = Vec::new();
    if export.is_exporting {
        spans.push(Span::styled(
            " Exporting\u{2026}",
            Style::default().fg(theme.text_primary),
        ));
    }
    if let Some(message) = &export.failure {
        spans.push(Span::styled(
            format!(
                " {}",
                banner_text(message, &key_label(keybinds.dismiss_failure), width)
            ),
            Style::default()
                .fg(theme.banner_err)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(path) = &export.success {
        spans.push(Span::styled(
            format!(" {}", banner_text(
                    &format!("Exported to: {path}"),
                    &key_label(keybinds.dismiss_success),
                    width,
                )),
            Style::default()
                .fg(theme.banner_ok)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg), area);
}

/// Message plus its dismiss hint, truncated so the hint survives.
fn banner_text(message: &str, dismiss_key: &str, width: usize) -> String {
    let hint = format!(" [{dismiss_key}] dismiss");
    let room = width.saturating_sub(hint.width() + 1);
    format!("{}{hint}", truncate_unicode(message, room))
}
