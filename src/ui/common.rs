//! Common UI components shared across the dashboard.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::health::SystemStatus;

/// Render the header bar with the system banner and aggregate counters.
///
/// Displays: status indicator, backend status label, delivery counters,
/// DLQ size.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status_style = app.theme.system_style(&app.status);

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("RELAY DOCTOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(app.status.label(), status_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", app.stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" total "),
        Span::styled(
            format!("{}", app.stats.successful),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" ok "),
        if app.stats.failed > 0 {
            Span::styled(
                format!("{}", app.stats.failed),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" failed "),
        if app.stats.pending > 0 {
            Span::styled(
                format!("{}", app.stats.pending),
                Style::default().fg(app.theme.warning),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" pending │ DLQ: "),
        Span::styled(
            format!("{}", app.messages.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows, in order of precedence: the active filter prompt, a transient
/// notice, or the time since the last update plus available controls and
/// any refresh diagnostics.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(field) = app.filter_input {
        let prompt = format!(
            " {} filter: {}_  | Enter:apply Esc:cancel Ctrl-C:clear",
            field.label(),
            app.active_filter_text()
        );
        let paragraph =
            Paragraph::new(prompt).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(notice) = app.notice() {
        let paragraph = Paragraph::new(format!(" {} ", notice))
            .style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.last_updated {
        Some(at) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None => "Waiting for first refresh".to_string(),
    };

    let controls = "↑↓:select Enter:detail R:retry /:patient t:type d:dir s:status c:clear r:refresh ?:help q:quit";

    let mut status = format!(" {} | {}", updated, controls);

    if app.status == SystemStatus::Degraded {
        if let Some(detail) = &app.health_detail {
            status.push_str(&format!(" | {}", detail));
        }
    }
    if let Some(error) = app.refresh_error() {
        status.push_str(&format!(" | {}", error));
    }

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select message"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View message detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Filtering",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Filter by patient id"),
        Line::from("  t         Filter by message type"),
        Line::from("  d         Cycle direction filter"),
        Line::from("  s         Cycle status filter"),
        Line::from("  c         Clear all filters"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Actions",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  R         Retry selected message"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export snapshot to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
