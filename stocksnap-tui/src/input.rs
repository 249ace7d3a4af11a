//! Keyboard input dispatch — symbol entry → global keys → panel-specific handlers.

use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Panel};

/// Longest symbol the input box accepts.
const MAX_SYMBOL_LEN: usize = 12;

/// Handle a key event. `now` is the instant any resulting request is evaluated at.
pub fn handle_key(app: &mut AppState, key: KeyEvent, now: NaiveDateTime) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Symbol entry consumes input first.
    if app.market.editing {
        handle_symbol_input(app, key, now);
        return;
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(panel) = Panel::from_index(index) {
                app.select_panel(panel);
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.select_panel(app.active_panel.prev());
            } else {
                app.select_panel(app.active_panel.next());
            }
            return;
        }
        KeyCode::BackTab => {
            app.select_panel(app.active_panel.prev());
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Home => handle_home_key(app, key),
        Panel::MarketData => handle_market_key(app, key, now),
        Panel::News => handle_news_key(app, key),
        Panel::Insights => handle_insights_key(app, key),
        Panel::Help => {} // display only
    }
}

fn handle_symbol_input(app: &mut AppState, key: KeyEvent, now: NaiveDateTime) {
    match key.code {
        KeyCode::Esc => {
            app.market.editing = false;
        }
        KeyCode::Enter => {
            app.market.editing = false;
            app.request_snapshot(now);
        }
        KeyCode::Backspace => {
            app.market.symbol_input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if app.market.symbol_input.chars().count() < MAX_SYMBOL_LEN {
                app.market.symbol_input.push(c.to_ascii_uppercase());
            }
        }
        _ => {}
    }
}

fn handle_home_key(app: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.select_panel(Panel::MarketData);
        app.market.editing = true;
    }
}

fn handle_market_key(app: &mut AppState, key: KeyEvent, now: NaiveDateTime) {
    match key.code {
        KeyCode::Char('s') | KeyCode::Char('/') | KeyCode::Char('i') => {
            app.market.editing = true;
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            if !app.market.symbol_input.is_empty() {
                app.request_snapshot(now);
            } else {
                app.market.editing = true;
            }
        }
        KeyCode::Char('h') | KeyCode::Left => app.cycle_window(false, now),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_window(true, now),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_table(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_table(false),
        KeyCode::Char('g') | KeyCode::Home => app.market.table_scroll = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.market.table_scroll = app.market.row_count().saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_news_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_articles(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_articles(false),
        KeyCode::Char('r') => {
            if !app.news.articles.is_loading() {
                app.request_news();
            }
        }
        _ => {}
    }
}

fn handle_insights_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.insights.shift_active_bound(-1),
        KeyCode::Char('l') | KeyCode::Right => app.insights.shift_active_bound(1),
        KeyCode::Char('b') | KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up
        | KeyCode::Down => app.insights.toggle_bound(),
        KeyCode::Char('r') => {
            if !app.insights.gainers.is_loading() {
                app.request_gainers();
            }
        }
        _ => {}
    }
}
