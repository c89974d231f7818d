//! Terminal rendering: header, per-channel charts, status bar, overlays.

pub mod chart;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

/// Render the whole frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // An undersized surface gets a resize hint instead of charts; nothing
    // else about the app is affected.
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let hint = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let height = area.height.min(5);
        let centered = Rect::new(0, (area.height - height) / 2, area.width, height);
        frame.render_widget(hint, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(8),    // Charts
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    chart::render_all(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if app.prompt.is_some() {
        render_prompt(frame, app, area);
    }
    if app.show_help {
        render_help(frame, app, area);
    }
}

/// Header: title, per-channel state glyphs, formatted uptime.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" BROKERWATCH ", app.theme.header),
        Span::raw("│ "),
    ];

    for channel in &app.channels {
        let status = &app.status[channel];
        spans.push(Span::styled("● ", app.theme.state_style(status.state)));
        spans.push(Span::raw(format!("{channel} ")));
    }

    if app.counters.seen("uptime") {
        spans.push(Span::raw("│ up "));
        spans.push(Span::styled(
            format_uptime(app.counters.get("uptime")),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Status bar: endpoint, decode-error count, key hints.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(format!(" tcp://{} ", app.endpoint()))];

    if app.decode_errors > 0 {
        spans.push(Span::styled(
            format!("│ {} bad frames ", format_count(app.decode_errors)),
            Style::default().fg(app.theme.warning),
        ));
    }

    spans.push(Span::styled(
        "│ q:quit t:theme ?:help",
        Style::default().add_modifier(Modifier::DIM),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Modal asking the operator to retry or abandon a lost channel.
fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref prompt) = app.prompt else {
        return;
    };

    let popup = centered_rect(50, 7, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" connection lost ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let lines = vec![
        Line::from(vec![
            Span::raw("channel "),
            Span::styled(&prompt.channel, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": "),
            Span::raw(prompt.cause.as_str()),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[r]", app.theme.header),
            Span::raw("etry    "),
            Span::styled("[a]", app.theme.header),
            Span::raw("bandon"),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        popup,
    );
}

/// Help overlay listing the key bindings.
fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(44, 10, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = vec![
        Line::raw("q / Esc     quit"),
        Line::raw("t           toggle dark/light theme"),
        Line::raw("?           toggle this help"),
        Line::raw(""),
        Line::raw("on connection loss (interactive):"),
        Line::raw("r / Enter   retry"),
        Line::raw("a / Esc     abandon"),
        Line::raw(""),
        Line::raw("press any key to close"),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A centered rectangle of fixed size, clamped to the surrounding area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Format a seconds counter as "3d 04:12:09".
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "00:00:00");
        assert_eq!(format_uptime(59), "00:00:59");
        assert_eq!(format_uptime(3_661), "01:01:01");
        assert_eq!(format_uptime(90_061), "1d 01:01:01");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(1_234_567), "1.2M");
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 6);
        let popup = centered_rect(50, 10, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
        assert_eq!(popup.x, 0);
    }
}
