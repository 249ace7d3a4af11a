//! Panel 4 — Insights: sector performance bars and the daily gainers filter.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use stocksnap_core::insights::{sector_performance, ChangeRange, SectorPerformance};

use crate::app::{AppState, InsightsPanelState, Load, RangeBound};
use crate::theme;
use crate::ui::section_block;

/// Width of the longest bar, in cells.
const BAR_WIDTH: usize = 30;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(8)])
        .split(area);

    render_sectors(f, chunks[0], sector_performance());
    render_gainers(f, chunks[1], &app.insights);
}

fn sector_bar(change_pct: f64, largest: f64) -> String {
    if largest <= 0.0 {
        return String::new();
    }
    let cells = ((change_pct.abs() / largest) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.max(1))
}

fn render_sectors(f: &mut Frame, area: Rect, sectors: &[SectorPerformance]) {
    let largest = sectors
        .iter()
        .map(|s| s.change_pct.abs())
        .fold(0.0, f64::max);

    let lines: Vec<Line> = sectors
        .iter()
        .map(|s| {
            let color = theme::change_color(s.change_pct);
            Line::from(vec![
                Span::styled(format!("{:>24} ", s.sector), theme::secondary()),
                Span::styled(format!("{:>+6.1}% ", s.change_pct), Style::default().fg(color)),
                Span::styled(sector_bar(s.change_pct, largest), Style::default().fg(color)),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).block(section_block("Sector Performance")),
        area,
    );
}

/// `[====|=====]`-style slider with the selected range highlighted.
fn range_slider(range: ChangeRange) -> String {
    let steps = ((ChangeRange::SLIDER_MAX - ChangeRange::SLIDER_MIN) / ChangeRange::STEP) as usize;
    let position = |v: f64| ((v - ChangeRange::SLIDER_MIN) / ChangeRange::STEP).round() as usize;
    let (lo, hi) = (position(range.min), position(range.max));
    let body: String = (0..=steps)
        .map(|i| if i >= lo && i <= hi { '=' } else { '-' })
        .collect();
    format!("[{body}]")
}

fn render_gainers(f: &mut Frame, area: Rect, insights: &InsightsPanelState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let bound_style = |bound: RangeBound| {
        if insights.active_bound == bound {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else {
            theme::accent()
        }
    };
    let range = insights.range;
    let slider = Line::from(vec![
        Span::styled(format!("{:+.0}%", ChangeRange::SLIDER_MIN), theme::muted()),
        Span::raw(" "),
        Span::styled(range_slider(range), theme::neutral()),
        Span::raw(" "),
        Span::styled(format!("{:+.0}%", ChangeRange::SLIDER_MAX), theme::muted()),
        Span::raw("   min "),
        Span::styled(format!("{:+.0}%", range.min), bound_style(RangeBound::Min)),
        Span::raw("  max "),
        Span::styled(format!("{:+.0}%", range.max), bound_style(RangeBound::Max)),
    ]);
    f.render_widget(
        Paragraph::new(slider).block(section_block("Change range [h/l adjust, b switch bound]")),
        chunks[0],
    );

    let block = section_block("Top Daily Gainers [r refresh]");
    match &insights.gainers {
        Load::NotLoaded | Load::Loading => {
            let para = Paragraph::new(Span::styled("Loading daily changes...", theme::muted()))
                .block(block);
            f.render_widget(para, chunks[1]);
        }
        Load::Failed(message) => {
            let para = Paragraph::new(Span::styled(message.as_str(), theme::warning())).block(block);
            f.render_widget(para, chunks[1]);
        }
        Load::Ready(_) => {
            let gainers = insights.visible_gainers();
            let mut rows: Vec<Row> = gainers
                .iter()
                .map(|g| {
                    Row::new(vec![
                        Cell::from(g.symbol.to_string()).style(theme::accent_bold()),
                        Cell::from(format!("{:.2}", g.close)),
                        Cell::from(format!("{:.2}", g.previous_close)),
                        Cell::from(format!("{:+.2}%", g.change_pct))
                            .style(Style::default().fg(theme::change_color(g.change_pct))),
                        Cell::from(g.as_of.format("%Y-%m-%d").to_string()),
                    ])
                })
                .collect();
            if gainers.is_empty() {
                rows.push(Row::new(vec![Cell::from(Span::styled(
                    "No symbols in range",
                    theme::muted(),
                ))]));
            }
            for (symbol, message) in &insights.failures {
                rows.push(
                    Row::new(vec![
                        Cell::from(symbol.clone()),
                        Cell::from(message.clone()),
                    ])
                    .style(theme::warning()),
                );
            }

            let header = Row::new(
                ["Symbol", "Close", "Prev", "Change", "As of"]
                    .into_iter()
                    .map(|h| Cell::from(h).style(theme::accent_bold())),
            );
            let table = Table::new(
                rows,
                [
                    Constraint::Length(8),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Min(12),
                ],
            )
            .header(header)
            .block(block);
            f.render_widget(table, chunks[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slider_highlights_zero_to_five() {
        let slider = range_slider(ChangeRange::default());
        assert_eq!(slider.len(), 23);
        assert_eq!(&slider[1..11], "----------");
        assert_eq!(&slider[11..17], "======");
        assert_eq!(&slider[17..22], "-----");
    }

    #[test]
    fn bars_scale_to_the_largest_move() {
        assert_eq!(sector_bar(3.0, 3.0).chars().count(), BAR_WIDTH);
        assert_eq!(sector_bar(-1.5, 3.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(sector_bar(0.01, 3.0).chars().count(), 1);
    }
}
