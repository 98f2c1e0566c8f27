//! Per-tab body rendering. Everything shown here is already formatted by the
//! projection; this module only lays it out.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::ui::theme::Theme;
use crate::view::Projection;
use crate::view::projection::{
    CpuView, GaugeView, MemoryView, OverviewView, ResourceRow, ResourcesView, TimingsView,
};

pub fn render(frame: &mut Frame, area: Rect, projection: &Projection, theme: &Theme) {
    match projection {
        Projection::AwaitingData { message, .. } => render_waiting(frame, area, message, theme),
        Projection::Overview(view) => render_overview(frame, area, view, theme),
        Projection::Memory(view) => render_memory(frame, area, view, theme),
        Projection::Cpu(view) => render_cpu(frame, area, view, theme),
        Projection::Timings(view) => render_timings(frame, area, view, theme),
        Projection::Resources(view) => render_resources(frame, area, view, theme),
    }
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_waiting(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    let text = Paragraph::new(Span::styled(
        message,
        Style::default().fg(theme.text_secondary),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(text, middle);
}

fn gauge<'a>(
    block: Block<'a>,
    ratio: f64,
    label: String,
    style: Style,
    theme: &Theme,
) -> Gauge<'a> {
    Gauge::default()
        .block(block)
        .gauge_style(style.bg(theme.gauge_unfilled))
        .ratio(ratio)
        .label(label)
}

fn render_overview(frame: &mut Frame, area: Rect, view: &OverviewView, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };
    let top = halves(rows[0]);
    let bottom = halves(rows[1]);
    let cells = [top[0], top[1], bottom[0], bottom[1]];

    for (g, cell) in view.gauges.iter().zip(cells) {
        frame.render_widget(overview_gauge(g, theme), cell);
    }

    let mut spans = Vec::new();
    for r in &view.resources {
        spans.push(Span::styled(
            format!(" {} ", r.label),
            Style::default().fg(theme.text_secondary),
        ));
        spans.push(Span::styled(
            format!("{}  ", r.count),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(panel("Resources", theme)),
        rows[2],
    );
}

fn overview_gauge<'a>(g: &'a GaugeView, theme: &Theme) -> Gauge<'a> {
    let title = format!("{} \u{2192} {}", g.label, g.target.index() + 1);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.text_secondary),
        ));
    gauge(
        block,
        g.ratio,
        g.value_text.clone(),
        theme.status_style(g.status),
        theme,
    )
}

fn render_memory(frame: &mut Frame, area: Rect, view: &MemoryView, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    frame.render_widget(
        gauge(
            panel("Heap", theme),
            view.heap_ratio,
            format!("{} ({})", view.heap_label, view.committed_label),
            Style::default().fg(theme.sparkline_color),
            theme,
        ),
        rows[0],
    );

    let lines: Vec<Line> = view
        .pools
        .iter()
        .map(|pool| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<21}", pool.name),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("{:<9}", pool.kind.label()),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(
                    bar(pool.ratio, 20),
                    theme.status_style(pool.status),
                ),
                Span::styled(
                    format!(" {}", pool.usage_label),
                    Style::default().fg(theme.text_primary),
                ),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(panel("Memory Pools", theme)),
        rows[1],
    );

    let non_heap = Line::from(vec![
        Span::styled(" Used ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            view.non_heap_used.as_str(),
            Style::default().fg(theme.text_primary),
        ),
        Span::styled("   Committed ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            view.non_heap_committed.as_str(),
            Style::default().fg(theme.text_primary),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(non_heap).block(panel("Non-Heap", theme)),
        rows[2],
    );
}

fn render_cpu(frame: &mut Frame, area: Rect, view: &CpuView, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    let loads = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    frame.render_widget(
        gauge(
            panel("Process CPU", theme),
            view.process_ratio,
            view.process_label.clone(),
            theme.status_style(view.process_status),
            theme,
        ),
        loads[0],
    );
    frame.render_widget(
        gauge(
            panel("System CPU", theme),
            view.system_ratio,
            view.system_label.clone(),
            Style::default().fg(theme.sparkline_color),
            theme,
        ),
        loads[1],
    );

    let lines: Vec<Line> = view
        .threads
        .iter()
        .map(|t| {
            Line::from(vec![
                Span::styled(
                    format!(" {:>6} ", t.id),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(
                    format!("{:<31}", t.name),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("{:<14}", t.state),
                    Style::default().fg(theme.thread_color(t.tone)),
                ),
                Span::styled(t.cpu_time.as_str(), Style::default().fg(theme.text_primary)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(panel(&view.thread_header, theme)),
        rows[1],
    );
}

fn render_timings(frame: &mut Frame, area: Rect, view: &TimingsView, theme: &Theme) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Total collections ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                view.total_collections.to_string(),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Total time ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                view.total_time.as_str(),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    if view.collectors.is_empty() {
        lines.push(Line::from(Span::styled(
            " No garbage collectors reported",
            Style::default().fg(theme.text_secondary),
        )));
    }

    for c in &view.collectors {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {}", c.name),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", c.summary),
                Style::default().fg(theme.text_secondary),
            ),
        ]));
        if let Some(last) = &c.last_gc {
            let mut detail = format!("   last: {}, {}", last.ago, last.duration);
            if let Some(reclaimed) = &last.reclaimed {
                detail.push_str(", ");
                detail.push_str(reclaimed);
            }
            lines.push(Line::from(Span::styled(
                detail,
                Style::default().fg(theme.text_secondary),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel("Garbage Collection", theme)),
        area,
    );
}

fn render_resources(frame: &mut Frame, area: Rect, view: &ResourcesView, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(20)])
        .split(area);

    let mut summary = vec![Line::from(vec![
        Span::styled(" Total ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            view.total.to_string(),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    for b in &view.breakdown {
        summary.push(Line::from(vec![
            Span::styled(
                format!(" {:<18}", b.label),
                Style::default().fg(theme.text_secondary),
            ),
            Span::styled(bar(b.ratio, 10), Style::default().fg(theme.sparkline_color)),
            Span::styled(
                format!(" {}", b.count),
                Style::default().fg(theme.text_primary),
            ),
        ]));
    }
    frame.render_widget(
        Paragraph::new(summary).block(panel("Breakdown", theme)),
        columns[0],
    );

    let mut lines = Vec::new();
    let sections: [(&str, &[ResourceRow]); 5] = [
        ("Browser tabs", &view.browser_tabs),
        ("Terminals", &view.terminals),
        ("Editor tabs", &view.editor_tabs),
        ("Panels", &view.panels),
        ("Windows", &view.windows),
    ];
    for (title, rows) in sections {
        if rows.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!(" {title}"),
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(rows.iter().map(|row| resource_line(row, theme)));
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel("Open Resources", theme)),
        columns[1],
    );
}

fn resource_line<'a>(row: &'a ResourceRow, theme: &Theme) -> Line<'a> {
    let marker = if row.is_active { "\u{25cf}" } else { " " };
    let mut spans = vec![
        Span::styled(
            format!("  {marker} "),
            Style::default().fg(theme.banner_ok),
        ),
        Span::styled(row.title.as_str(), Style::default().fg(theme.text_primary)),
    ];
    if row.is_modified {
        spans.push(Span::styled(" *", Style::default().fg(theme.health[1])));
    }
    if let Some(detail) = &row.detail {
        spans.push(Span::styled(
            format!("  {detail}"),
            Style::default().fg(theme.text_secondary),
        ));
    }
    Line::from(spans)
}

/// Fixed-width text bar for inline meters.
fn bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(width - filled)
    )
}
