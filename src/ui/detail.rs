//! Message detail overlay rendering.
//!
//! Displays a modal overlay with every field of the selected failed
//! message, including the raw wire payload.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::message::{format_timestamp, text_or_dash};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the message detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if the terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(message) = app.selected_message() else {
        return;
    };

    // Width: 90% of screen, clamped to [MIN_OVERLAY_WIDTH, 110]
    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    // Height: 90% of screen, clamped to [MIN_OVERLAY_HEIGHT, 45]
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 45);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(10), // Message fields
        Constraint::Min(5),     // Raw payload
        Constraint::Length(1),  // Footer
    ])
    .split(overlay_area);

    // ===== FIELDS SECTION =====
    let direction_style = app.theme.direction_style(&message.direction);
    let status_style = app.theme.delivery_style(&message.status);

    let field_lines = vec![
        Line::from(vec![
            Span::raw(" Id: "),
            Span::styled(
                text_or_dash(Some(message.id.as_str())).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Direction: "),
            Span::styled(message.direction.label().to_string(), direction_style),
            Span::raw("    Status: "),
            Span::styled(message.status.label().to_string(), status_style),
        ]),
        Line::from(vec![
            Span::raw(" Received: "),
            Span::raw(message.display_timestamp()),
            Span::raw("    Processed: "),
            Span::raw(format_timestamp(message.processed_at.as_deref())),
        ]),
        Line::from(vec![
            Span::raw(" Route: "),
            Span::raw(text_or_dash(message.source_addr.as_deref()).to_string()),
            Span::raw(" -> "),
            Span::raw(text_or_dash(message.destination_addr.as_deref()).to_string()),
        ]),
        Line::from(vec![
            Span::raw(" Type: "),
            Span::raw(text_or_dash(message.message_type.as_deref()).to_string()),
            Span::raw("    Control ID: "),
            Span::raw(text_or_dash(message.message_control_id.as_deref()).to_string()),
        ]),
        Line::from(vec![
            Span::raw(" Patient: "),
            Span::raw(text_or_dash(message.patient_id.as_deref()).to_string()),
            Span::raw("  "),
            Span::raw(text_or_dash(message.patient_name.as_deref()).to_string()),
        ]),
        Line::from(vec![
            Span::raw(" Retries: "),
            Span::raw(message.retry_count.to_string()),
        ]),
        Line::from(vec![
            Span::raw(" Last error: "),
            Span::styled(
                text_or_dash(message.last_error.as_deref()).to_string(),
                Style::default().fg(app.theme.critical),
            ),
        ]),
    ];

    let fields_block = Block::default()
        .title(" Message Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let fields = Paragraph::new(field_lines).block(fields_block);
    frame.render_widget(fields, chunks[0]);

    // ===== RAW PAYLOAD SECTION =====
    let payload_block = Block::default()
        .title(" Raw Payload ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let payload = match message.raw_message.as_deref() {
        Some(raw) if !raw.is_empty() => Paragraph::new(raw.to_string())
            .wrap(Wrap { trim: false })
            .block(payload_block),
        _ => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No payload captured",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(payload_block),
    };
    frame.render_widget(payload, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " R:retry  Esc:close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}
