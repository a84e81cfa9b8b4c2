//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::health::SystemStatus;
use crate::data::message::{DeliveryStatus, Direction};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic selection based on terminal
/// background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level states (pending, degraded).
    pub warning: Color,
    /// Color for failure-level states.
    pub critical: Color,
    /// Color for success-level states.
    pub healthy: Color,
    /// Color for neutral/unknown values.
    pub neutral: Color,
    /// Color for outbound orders.
    pub order: Color,
    /// Color for inbound reports.
    pub report: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            neutral: Color::Gray,
            order: Color::Blue,
            report: Color::Magenta,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            neutral: Color::DarkGray,
            order: Color::Blue,
            report: Color::Magenta,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for the system status banner
    pub fn system_style(&self, status: &SystemStatus) -> Style {
        match status {
            SystemStatus::Loading => Style::default().fg(self.warning),
            SystemStatus::Running => Style::default().fg(self.healthy),
            SystemStatus::Degraded => {
                Style::default().fg(self.warning).add_modifier(Modifier::BOLD)
            }
            SystemStatus::ConnectionError => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Get style for a message direction
    pub fn direction_style(&self, direction: &Direction) -> Style {
        match direction {
            Direction::Order => Style::default().fg(self.order),
            Direction::Report => Style::default().fg(self.report),
            Direction::Other(_) => Style::default().fg(self.neutral),
        }
    }

    /// Get style for a delivery status
    pub fn delivery_style(&self, status: &DeliveryStatus) -> Style {
        match status {
            DeliveryStatus::Forwarded => Style::default().fg(self.healthy),
            DeliveryStatus::Failed => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            DeliveryStatus::Pending => Style::default().fg(self.warning),
            DeliveryStatus::Other(_) => Style::default().fg(self.neutral),
        }
    }
}
