//! Panel 1 — Home: welcome text and getting-started steps.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to StockSnap", theme::accent_bold())),
        Line::from(Span::styled(
            "Closing prices, market news and daily movers in your terminal.",
            theme::secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme::accent_bold())),
        Line::from(Span::styled(
            "  1. Press Enter (or 2) to open Market Data and type a symbol such as AAPL",
            theme::muted(),
        )),
        Line::from(Span::styled(
            "  2. Use h / l to pick a window: Latest, 1 Month, 6 Months, YTD, 1 Year, 5 Years, 10 Years, All Time",
            theme::muted(),
        )),
        Line::from(Span::styled(
            "  3. Press 3 for top business headlines and your location on the map",
            theme::muted(),
        )),
        Line::from(Span::styled(
            "  4. Press 4 for sector performance and the day's top gainers",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Price data: ", theme::neutral()),
            Span::styled(app.data_source.as_str(), theme::accent()),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
