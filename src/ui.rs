//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is a vertical split: the employee filter line, the
//!   transaction list, an optional "View More" row and a one-line status bar.
//! * The employee picker is drawn last, as a popup over the list.
//! * Colours and styles are defined inline; extract them into a theme struct
//!   if the palette grows.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::coordinator::ViewPhase;
use crate::source::Transaction;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let more_height = if app.view.view_more_visible { 1 } else { 0 };
    let [filter_area, list_area, more_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(more_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_filter_line(app, frame, filter_area);
    draw_transaction_list(app, frame, list_area);
    if app.view.view_more_visible {
        draw_view_more(app, frame, more_area);
    }
    draw_status_bar(app, frame, status_area);

    if app.picker.is_some() {
        draw_picker(app, frame, list_area);
    }
}

fn draw_filter_line(app: &App, frame: &mut Frame, area: Rect) {
    let value = if app.view.employees_loading {
        Span::styled("Loading employees…", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.filter.full_name(), Style::default().fg(Color::Cyan))
    };
    let line = Line::from(vec![Span::raw(" Filter by employee: "), value]);
    frame.render_widget(Paragraph::new(line), area);
}

fn phase_title(phase: ViewPhase) -> &'static str {
    match phase {
        ViewPhase::Uninitialized => " Transactions ",
        ViewPhase::LoadingAll => " All transactions (loading) ",
        ViewPhase::ShowingAll => " All transactions ",
        ViewPhase::LoadingFiltered => " Employee transactions (loading) ",
        ViewPhase::ShowingFiltered => " Employee transactions ",
    }
}

fn transaction_line(txn: &Transaction) -> Line<'_> {
    let check = if txn.approved { "[x]" } else { "[ ]" };
    Line::from(vec![
        Span::styled(
            format!("{} ", txn.date.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:<24}", txn.merchant), Style::default().fg(Color::White)),
        Span::styled(format!("{:>10.2}", txn.amount), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(
            format!("{:<20}", txn.employee.full_name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(check),
    ])
}

fn draw_transaction_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(phase_title(app.view.phase))
        .borders(Borders::ALL);

    let Some(transactions) = app.view.transactions.as_deref() else {
        let placeholder = match app.view.phase {
            ViewPhase::Uninitialized => "Nothing loaded yet.  Press r to load.",
            ViewPhase::LoadingAll | ViewPhase::LoadingFiltered => "Loading…",
            ViewPhase::ShowingAll | ViewPhase::ShowingFiltered => "Nothing to show.",
        };
        let text = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    };

    let items: Vec<ListItem> = transactions
        .iter()
        .map(|txn| ListItem::new(transaction_line(txn)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_view_more(app: &App, frame: &mut Frame, area: Rect) {
    let style = if app.view.view_more_enabled {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let row = Paragraph::new(Line::from(Span::styled(" View More (m) ", style)))
        .alignment(Alignment::Center);
    frame.render_widget(row, area);
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} shown", app.transactions().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  f: filter  m: more  space: approve  r: reload"),
    ]));
    frame.render_widget(status, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Rows needed for `entries` picker lines plus the two border rows.
fn picker_height(entries: usize) -> u16 {
    u16::try_from(entries).unwrap_or(u16::MAX).saturating_add(2)
}

fn draw_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let employees = app.picker_items();
    let popup = centered(area, 36, picker_height(employees.len()));

    let items: Vec<ListItem> = employees
        .iter()
        .map(|employee| ListItem::new(employee.full_name()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(" Filter by employee ")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Blue))
        .highlight_symbol("▸ ");

    frame.render_widget(Clear, popup);
    if let Some(state) = app.picker.as_mut() {
        frame.render_stateful_widget(list, popup, state);
    }
}
