use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::format::format_percent;
use crate::system::settings::Settings;
use crate::ui::theme::Theme;

/// Centered overlay listing keybinds and the thresholds currently in force.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    entries: &[(String, &str)],
    settings: &Settings,
    theme: &Theme,
) {
    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:>8} "),
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.extend(threshold_lines(settings).into_iter().map(|text| {
        Line::from(Span::styled(text, Style::default().fg(theme.text_secondary)))
    }));

    let width = 44u16.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2)); // +2 for borders
    let overlay = centered_rect(width, height, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keybinds ",
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(overlay);

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn threshold_lines(settings: &Settings) -> [String; 2] {
    [
        format!(
            " Memory  warn {}  crit {}",
            format_percent(settings.memory_warning_threshold_percent),
            format_percent(settings.memory_critical_threshold_percent)
        ),
        format!(
            " CPU     warn {}  crit {}",
            format_percent(settings.cpu_warning_threshold_percent),
            format_percent(settings.cpu_critical_threshold_percent)
        ),
    ]
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_lines_show_current_settings() {
        let [memory, cpu] = threshold_lines(&Settings::default());
        assert!(memory.contains("warn 75%"), "{memory}");
        assert!(memory.contains("crit 90%"), "{memory}");
        assert!(cpu.contains("warn 70%"), "{cpu}");
    }

    #[test]
    fn centered_rect_is_centered() {
        let r = centered_rect(10, 4, Rect::new(0, 0, 30, 12));
        assert_eq!(r, Rect::new(10, 4, 10, 4));
    }
}
