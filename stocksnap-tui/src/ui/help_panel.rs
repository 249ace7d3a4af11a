//! Panel 5 — Help: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q / Ctrl+C", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Home");
    key(&mut lines, "Enter", "Go to Market Data and type a symbol");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Market Data");
    key(&mut lines, "s / i / /", "Edit the symbol (Enter loads, Esc cancels)");
    key(&mut lines, "h / l", "Previous / next window (reloads the chart)");
    key(&mut lines, "j / k", "Scroll the data table");
    key(&mut lines, "g / G", "Jump to first / last row");
    key(&mut lines, "Enter / r", "Reload the current symbol");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — News");
    key(&mut lines, "j / k", "Move between headlines");
    key(&mut lines, "r", "Refresh headlines and location");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 — Insights");
    key(&mut lines, "h / l", "Lower / raise the selected range bound");
    key(&mut lines, "b", "Switch between min and max bound");
    key(&mut lines, "r", "Refresh daily changes");
    lines.push(Line::from(""));

    section(&mut lines, "Windows");
    key(&mut lines, "Latest", "Intraday bars of the most recent session");
    key(&mut lines, "1 Month", "Daily bars");
    key(&mut lines, "6M / YTD / 1Y", "Monthly bars");
    key(&mut lines, "5Y / 10Y", "Monthly bars; needs that much history");
    key(&mut lines, "All Time", "Every monthly bar available");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>20}  "), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
