//! Panel 2 — Market Data: symbol input, window tabs, closing-price chart and data table.

use chrono::{DateTime, NaiveDateTime};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs};
use ratatui::Frame;

use stocksnap_core::domain::{Granularity, WindowSelector};
use stocksnap_core::MarketSnapshot;

use crate::app::AppState;
use crate::theme;
use crate::ui::section_block;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(60),
            Constraint::Min(5),
        ])
        .split(area);

    render_controls(f, chunks[0], app);

    match &app.market.snapshot {
        Some(snapshot) => {
            render_chart(f, chunks[1], snapshot);
            render_table(f, chunks[2], snapshot, app.market.table_scroll);
        }
        None => render_empty(f, chunks[1].union(chunks[2]), app),
    }
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(10)])
        .split(area);

    let market = &app.market;
    let (text, style) = if market.editing {
        (format!("{}_", market.symbol_input), theme::accent_bold())
    } else if market.symbol_input.is_empty() {
        ("press s to type".to_string(), theme::muted())
    } else {
        (market.symbol_input.clone(), theme::accent())
    };
    let input = Paragraph::new(Span::styled(text, style)).block(section_block("Symbol"));
    f.render_widget(input, chunks[0]);

    let titles: Vec<Line> = WindowSelector::ALL
        .iter()
        .map(|s| Line::from(s.label()))
        .collect();
    let selected = WindowSelector::ALL
        .iter()
        .position(|&s| s == market.selector)
        .unwrap_or(0);
    let window_title = if market.pending.is_some() {
        "Window (loading)"
    } else {
        "Window [h/l]"
    };
    let tabs = Tabs::new(titles)
        .block(section_block(window_title))
        .select(selected)
        .style(theme::muted())
        .highlight_style(theme::accent().add_modifier(Modifier::REVERSED));
    f.render_widget(tabs, chunks[1]);
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let hint = if app.market.pending.is_some() {
        "Loading..."
    } else {
        "Type a stock symbol (press s), then Enter to chart its closing price."
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(hint, theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Axis label format for a granularity.
fn time_format(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Intraday => "%H:%M",
        Granularity::Daily | Granularity::Weekly => "%b %d",
        Granularity::Monthly => "%b %Y",
    }
}

fn unix_label(secs: f64, fmt: &str) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.naive_utc().format(fmt).to_string())
        .unwrap_or_default()
}

fn unix_secs(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn render_chart(f: &mut Frame, area: Rect, snapshot: &MarketSnapshot) {
    let chart = &snapshot.chart;
    let block = section_block(&chart.title);

    let (Some((x_min, x_max)), Some((y_min, y_max))) = (chart.x_bounds(), chart.y_bounds()) else {
        let para = Paragraph::new(Span::styled(
            "No records in the selected window.",
            theme::muted(),
        ))
        .block(block);
        f.render_widget(para, area);
        return;
    };
    // A single point still needs a non-empty x range.
    let x_max = if x_max > x_min { x_max } else { x_min + 60.0 };

    let data: Vec<(f64, f64)> = chart
        .points
        .iter()
        .map(|&(ts, close)| (unix_secs(ts), close))
        .collect();

    let dataset = Dataset::default()
        .name(snapshot.symbol.as_str())
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let fmt = time_format(snapshot.granularity);
    let x_mid = (x_min + x_max) / 2.0;
    let y_mid = (y_min + y_max) / 2.0;

    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::styled(unix_label(x_min, fmt), theme::muted()),
                    Span::styled(unix_label(x_mid, fmt), theme::muted()),
                    Span::styled(unix_label(x_max, fmt), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Close", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_mid:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(widget, area);
}

fn render_table(f: &mut Frame, area: Rect, snapshot: &MarketSnapshot, scroll: usize) {
    let header = Row::new(
        ["Timestamp", "Open", "High", "Low", "Close", "Volume"]
            .into_iter()
            .map(|h| Cell::from(h).style(theme::accent_bold())),
    );

    let records = snapshot.series.records();
    let start = scroll.min(records.len().saturating_sub(1));
    let rows: Vec<Row> = records[start..]
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(format!("{:.2}", r.open)),
                Cell::from(format!("{:.2}", r.high)),
                Cell::from(format!("{:.2}", r.low)),
                Cell::from(format!("{:.2}", r.close)),
                Cell::from(format!("{:.0}", r.volume)),
            ])
            .style(theme::secondary())
        })
        .collect();

    let title = format!(
        "Data [j/k] row {} of {} ({}, {})",
        (start + 1).min(records.len()),
        records.len(),
        snapshot.granularity,
        snapshot.source.label()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(section_block(&title));

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intraday_axis_shows_clock_time() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 6, 14)
            .unwrap()
            .and_hms_opt(15, 45, 0)
            .unwrap();
        assert_eq!(unix_label(unix_secs(ts), time_format(Granularity::Intraday)), "15:45");
        assert_eq!(unix_label(unix_secs(ts), time_format(Granularity::Monthly)), "Jun 2024");
    }
}
