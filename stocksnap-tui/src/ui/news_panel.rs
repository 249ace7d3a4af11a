//! Panel 3 — News: top headlines beside a world map with the detected location.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use stocksnap_core::geo::GeoLocation;
use stocksnap_core::news::NewsArticle;

use crate::app::{AppState, Load};
use crate::theme;
use crate::ui::section_block;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_articles(f, chunks[0], &app.news.articles, app.news.cursor);
    render_map(f, chunks[1], &app.news.location);
}

fn render_articles(f: &mut Frame, area: Rect, articles: &Load<Vec<NewsArticle>>, cursor: usize) {
    let block = section_block("Top Headlines [j/k, r]");
    let lines: Vec<Line> = match articles {
        Load::NotLoaded | Load::Loading => {
            vec![Line::from(Span::styled("Loading headlines...", theme::muted()))]
        }
        Load::Failed(message) => vec![Line::from(Span::styled(message.as_str(), theme::warning()))],
        Load::Ready(list) if list.is_empty() => {
            vec![Line::from(Span::styled("No headlines right now.", theme::muted()))]
        }
        Load::Ready(list) => article_lines(list, cursor),
    };

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn article_lines(articles: &[NewsArticle], cursor: usize) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for (i, article) in articles.iter().enumerate().skip(cursor) {
        let title_style = if i == cursor {
            theme::accent_bold().add_modifier(Modifier::REVERSED)
        } else {
            theme::accent_bold()
        };
        lines.push(Line::from(Span::styled(article.title.as_str(), title_style)));
        if let Some(source) = &article.source_name {
            lines.push(Line::from(Span::styled(source.as_str(), theme::neutral())));
        }
        lines.push(Line::from(Span::styled(
            article.description.as_str(),
            theme::secondary(),
        )));
        if let Some(image) = &article.image_url {
            lines.push(Line::from(vec![
                Span::styled("Image: ", theme::neutral()),
                Span::styled(image.as_str(), theme::muted()),
            ]));
        }
        lines.push(Line::from(Span::styled(article.article_url.as_str(), theme::muted())));
        lines.push(Line::from(""));
    }
    lines
}

fn render_map(f: &mut Frame, area: Rect, location: &Load<GeoLocation>) {
    let title = match location {
        Load::Ready(loc) => match &loc.place {
            Some(place) => format!("Your location: {place}"),
            None => format!("Your location: {:.2}, {:.2}", loc.latitude, loc.longitude),
        },
        Load::Failed(message) => message.clone(),
        Load::NotLoaded | Load::Loading => "Locating...".to_string(),
    };

    let canvas = Canvas::default()
        .block(section_block(&title))
        .marker(symbols::Marker::Braille)
        .x_bounds([-180.0, 180.0])
        .y_bounds([-90.0, 90.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: theme::MUTED,
            });
            if let Load::Ready(loc) = location {
                ctx.layer();
                ctx.print(
                    loc.longitude,
                    loc.latitude,
                    Span::styled("X", theme::negative().add_modifier(Modifier::BOLD)),
                );
            }
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(image_url: Option<&str>) -> NewsArticle {
        NewsArticle {
            title: "Markets rally".into(),
            description: "Stocks rose.".into(),
            image_url: image_url.map(Into::into),
            article_url: "https://news.example/rally".into(),
            source_name: None,
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn image_link_follows_the_description() {
        let articles = [article(Some("https://img.example/rally.jpg"))];
        let lines = article_lines(&articles, 0);
        assert_eq!(
            text(&lines),
            vec![
                "Markets rally",
                "Stocks rose.",
                "Image: https://img.example/rally.jpg",
                "https://news.example/rally",
                "",
            ]
        );
    }

    #[test]
    fn articles_without_images_skip_the_line() {
        let articles = [article(None)];
        let lines = article_lines(&articles, 0);
        assert_eq!(lines.len(), 4);
        assert!(!text(&lines).iter().any(|l| l.starts_with("Image:")));
    }
}
