use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline, Tabs};

use crate::ui::theme::Theme;
use crate::view::{Tab, ViewState};

pub fn render(frame: &mut Frame, area: Rect, view: &ViewState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_branding(frame, chunks[0], view, theme);
    render_trend(frame, chunks[1], " Heap ", &view.trend.heap, theme);
    render_trend(frame, chunks[2], " CPU ", &view.trend.cpu, theme);
}

fn render_branding(frame: &mut Frame, area: Rect, view: &ViewState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(
        " perfpanel ",
        Style::default()
            .fg(theme.header_accent_fg)
            .bg(theme.header_accent_bg)
            .add_modifier(Modifier::BOLD),
    )];

    match view.health {
        Some(health) => spans.extend([
            Span::raw("  "),
            Span::styled(
                health.overall.label(),
                theme
                    .status_style(health.overall)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  mem {}  cpu {}", health.memory.label(), health.cpu.label()),
                Style::default().fg(theme.text_secondary),
            ),
        ]),
        None => spans.push(Span::styled(
            "  no data",
            Style::default().fg(theme.text_secondary),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_trend(frame: &mut Frame, area: Rect, title: &str, data: &[u64], theme: &Theme) {
    let latest = data.last().map(|v| *v as f64 / 100.0);
    let title = match latest {
        Some(v) => format!("{title}{v:.0}% "),
        None => title.to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    // newest samples stay visible when the history is wider than the box
    let width = block.inner(area).width as usize;
    let visible = &data[data.len().saturating_sub(width)..];

    let sparkline = Sparkline::default()
        .block(block)
        .data(visible)
        .max(10000)
        .style(Style::default().fg(theme.sparkline_color));

    frame.render_widget(sparkline, area);
}

/// Tab strip with the selected tab highlighted.
pub fn render_tabs(frame: &mut Frame, area: Rect, selected: Tab, theme: &Theme) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(selected.index())
        .style(Style::default().fg(theme.text_secondary))
        .highlight_style(
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}
