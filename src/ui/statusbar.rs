use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{ResolvedKeybinds, key_label};
use crate::export::ExportView;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    keybinds: &ResolvedKeybinds,
    export: &ExportView,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let mut spans = Vec::new();
    spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
    spans.extend(pill_spans(key_label(keybinds.next_tab), "Tab", theme));
    spans.extend(pill_spans(key_label(keybinds.request_gc), "GC", theme));
    if !export.is_exporting {
        spans.extend(pill_spans(key_label(keybinds.export), "Export", theme));
    }
    spans.extend(pill_spans(
        format!(
            "{}{}",
            key_label(keybinds.raise_thresholds),
            key_label(keybinds.lower_thresholds)
        ),
        "Thresholds",
        theme,
    ));
    spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans(key: String, desc: &str, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
