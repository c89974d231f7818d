//! Scrolling rate charts, one per channel.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::App;
use crate::channel::ConnectionState;

/// Render one chart per channel, stacked vertically.
pub fn render_all(frame: &mut Frame, app: &App, area: Rect) {
    if app.channels.is_empty() {
        return;
    }
    let rows: Vec<Constraint> = app
        .channels
        .iter()
        .map(|_| Constraint::Ratio(1, app.channels.len() as u32))
        .collect();
    let chunks = Layout::vertical(rows).split(area);

    for (channel, chunk) in app.channels.iter().zip(chunks.iter()) {
        render_chart(frame, app, channel, *chunk);
    }
}

/// One channel's scrolling rate chart.
///
/// The x bounds come straight from the series' time domain, which shifts by
/// one interval per tick - that shift is the scroll. A frozen (failed)
/// channel keeps its last drawn window.
fn render_chart(frame: &mut Frame, app: &App, channel: &str, area: Rect) {
    let Some(series) = app.series.get(channel) else {
        return;
    };
    let status = &app.status[channel];

    let points = series.points();
    let (x_start, x_end) = series.time_domain();
    let y_max = series.value_bound();

    let title = format!(
        " {} — total {} — {}{} ",
        channel,
        app.counters.get(channel),
        status.state.label(),
        if status.state == ConnectionState::Failed { ", frozen" } else { "" },
    );

    let block = Block::default()
        .title(Span::styled(title, app.theme.state_style(status.state)))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let datasets = vec![Dataset::default()
        .name(channel.to_string())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.highlight))
        .data(&points)];

    let width = x_end - x_start;
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_start, x_end])
                .style(app.theme.axis)
                .labels(vec![
                    Span::raw(format!("-{width:.0}s")),
                    Span::raw(format!("-{:.0}s", width / 2.0)),
                    Span::raw("now"),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .style(app.theme.axis)
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{y_max:.0}")),
                ]),
        );

    frame.render_widget(chart, area);
}
