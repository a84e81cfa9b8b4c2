//! Failed-message (DLQ) table rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::message::text_or_dash;

/// Render the failed-message table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = table_title(app);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.filtered.is_empty() {
        let text = if app.messages.is_empty() {
            "  Dead-letter queue is empty"
        } else {
            "  No messages match the active filters"
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text, Style::default().add_modifier(Modifier::DIM))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Dir"),
        Cell::from("Type"),
        Cell::from("Patient"),
        Cell::from("Control ID"),
        Cell::from("Retries"),
        Cell::from("Last Error"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .filtered
        .iter()
        .map(|&index| {
            let message = &app.messages[index];
            Row::new(vec![
                Cell::from(message.display_timestamp()),
                Cell::from(message.direction.label().to_string())
                    .style(app.theme.direction_style(&message.direction)),
                Cell::from(text_or_dash(message.message_type.as_deref()).to_string()),
                Cell::from(text_or_dash(message.patient_id.as_deref()).to_string()),
                Cell::from(text_or_dash(message.message_control_id.as_deref()).to_string()),
                Cell::from(if message.retry_count > 0 {
                    message.retry_count.to_string()
                } else {
                    "-".to_string()
                }),
                Cell::from(text_or_dash(message.last_error.as_deref()).to_string())
                    .style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(message.status.label().to_string())
                    .style(app.theme.delivery_style(&message.status)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(19), // Time
        Constraint::Length(7),  // Dir
        Constraint::Length(9),  // Type
        Constraint::Length(12), // Patient
        Constraint::Length(12), // Control ID
        Constraint::Length(7),  // Retries
        Constraint::Fill(1),    // Last Error - takes the remaining space
        Constraint::Length(10), // Status
    ];

    let selected = app.selected_index.min(app.filtered.len().saturating_sub(1));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn table_title(app: &App) -> String {
    let filter_info = if app.criteria.is_empty() {
        String::new()
    } else {
        format!(" /{}/ [c:clear]", app.criteria.summary())
    };

    let position_info = if app.filtered.is_empty() {
        String::new()
    } else {
        format!(
            " [{}/{}]",
            app.selected_index.min(app.filtered.len() - 1) + 1,
            app.filtered.len()
        )
    };

    format!(
        " Failed Messages ({}/{}){}{} ",
        app.filtered.len(),
        app.messages.len(),
        filter_info,
        position_info
    )
}
