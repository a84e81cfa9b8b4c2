//! Dashboard state and interaction logic.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::data::filter::{filter_messages, FilterCriteria};
use crate::data::health::SystemStatus;
use crate::data::message::{DeliveryStatus, Direction, Hl7Message};
use crate::data::stats::RelayStats;
use crate::poller::{DashboardEvent, PollerHandle, RefreshStep};
use crate::ui::Theme;

/// How long a transient notice stays on the status line.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Which text criterion the filter prompt is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    PatientId,
    MessageType,
}

impl FilterField {
    /// Prompt label.
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::PatientId => "patient",
            FilterField::MessageType => "type",
        }
    }
}

/// Main application state.
///
/// Owns the view model synchronized from the poller plus all transient UI
/// state. Constructed with zero-valued defaults and a `Loading` banner;
/// nothing persists across runs. The filtered view is recomputed in the
/// same step as any change to the snapshot or the criteria.
pub struct App {
    pub running: bool,

    // View model, synchronized from the poller
    pub status: SystemStatus,
    pub health_detail: Option<String>,
    pub stats: RelayStats,
    pub messages: Vec<Hl7Message>,
    /// Indices into `messages` after applying `criteria`; an
    /// order-preserving subset by construction.
    pub filtered: Vec<usize>,
    pub criteria: FilterCriteria,
    pub last_updated: Option<Instant>,
    refresh_errors: BTreeMap<RefreshStep, String>,

    // Transient UI state
    pub selected_index: usize,
    pub detail_open: bool,
    pub show_help: bool,
    pub filter_input: Option<FilterField>,
    pub theme: Theme,
    notice: Option<(String, Instant)>,

    // Background resources
    poller: PollerHandle,
    events: mpsc::Receiver<DashboardEvent>,
}

impl App {
    /// Create a new App wired to a spawned poller.
    pub fn new(poller: PollerHandle, events: mpsc::Receiver<DashboardEvent>) -> Self {
        Self {
            running: true,
            status: SystemStatus::Loading,
            health_detail: None,
            stats: RelayStats::default(),
            messages: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::default(),
            last_updated: None,
            refresh_errors: BTreeMap::new(),
            selected_index: 0,
            detail_open: false,
            show_help: false,
            filter_input: None,
            theme: Theme::auto_detect(),
            notice: None,
            poller,
            events,
        }
    }

    /// Apply all pending poller events. Non-blocking.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    /// Apply a single poller event to the view model.
    pub fn apply_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Stats(stats) => {
                self.stats = stats;
                self.refresh_errors.remove(&RefreshStep::Stats);
                self.last_updated = Some(Instant::now());
            }
            DashboardEvent::Messages(messages) => {
                self.messages = messages;
                self.apply_filter();
                self.refresh_errors.remove(&RefreshStep::Messages);
                self.last_updated = Some(Instant::now());
            }
            DashboardEvent::Health(check) => {
                self.status = check.status;
                self.health_detail = check.body.as_ref().and_then(|body| {
                    let failing = body.failing_components();
                    if failing.is_empty() {
                        None
                    } else {
                        Some(failing.join(", "))
                    }
                });
            }
            DashboardEvent::RefreshError { step, detail } => {
                self.refresh_errors.insert(step, detail);
            }
            DashboardEvent::RetryFinished { id, result } => match result {
                Ok(()) => self.set_notice(format!("Message {} requeued", id)),
                Err(detail) => self.set_notice(format!("Retry of {} failed: {}", id, detail)),
            },
        }
    }

    /// Recompute the filtered view. Called whenever the snapshot or the
    /// criteria change.
    pub fn apply_filter(&mut self) {
        self.filtered = filter_messages(&self.messages, &self.criteria);
        if self.filtered.is_empty() {
            self.selected_index = 0;
            self.detail_open = false;
        } else if self.selected_index >= self.filtered.len() {
            self.selected_index = self.filtered.len() - 1;
        }
    }

    /// The currently selected message, when the filtered view has one.
    pub fn selected_message(&self) -> Option<&Hl7Message> {
        self.filtered
            .get(self.selected_index)
            .map(|&index| &self.messages[index])
    }

    /// Latest refresh-step diagnostics, joined for the status line.
    pub fn refresh_error(&self) -> Option<String> {
        if self.refresh_errors.is_empty() {
            return None;
        }
        let joined = self
            .refresh_errors
            .iter()
            .map(|(step, detail)| format!("{}: {}", step.label(), detail))
            .collect::<Vec<_>>()
            .join(" | ");
        Some(joined)
    }

    /// Set a transient status-line notice.
    pub fn set_notice(&mut self, text: String) {
        self.notice = Some((text, Instant::now()));
    }

    /// The current notice, if it has not expired.
    pub fn notice(&self) -> Option<&str> {
        if let Some((text, since)) = &self.notice {
            if since.elapsed() < NOTICE_TTL {
                return Some(text);
            }
        }
        None
    }

    // ----- navigation -----

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.filtered.len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        self.selected_index = self.filtered.len().saturating_sub(1);
    }

    /// Open the detail overlay for the selected message.
    pub fn enter_detail(&mut self) {
        if self.selected_message().is_some() {
            self.detail_open = true;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.detail_open = false;
    }

    /// Navigate back: close the overlay first, then cancel filter input.
    pub fn go_back(&mut self) {
        if self.detail_open {
            self.detail_open = false;
        } else if self.filter_input.is_some() {
            self.cancel_filter();
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- filtering -----

    /// Start editing a text criterion.
    pub fn start_filter(&mut self, field: FilterField) {
        self.filter_input = Some(field);
    }

    /// Exit filter input mode without clearing the criterion.
    pub fn cancel_filter(&mut self) {
        self.filter_input = None;
    }

    /// Clear every criterion and exit filter input mode.
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.filter_input = None;
        self.apply_filter();
    }

    /// Append a character to the criterion being edited.
    pub fn filter_push(&mut self, c: char) {
        match self.filter_input {
            Some(FilterField::PatientId) => self.criteria.patient_id.push(c),
            Some(FilterField::MessageType) => self.criteria.message_type.push(c),
            None => return,
        }
        self.apply_filter();
    }

    /// Remove the last character from the criterion being edited.
    pub fn filter_pop(&mut self) {
        match self.filter_input {
            Some(FilterField::PatientId) => {
                self.criteria.patient_id.pop();
            }
            Some(FilterField::MessageType) => {
                self.criteria.message_type.pop();
            }
            None => return,
        }
        self.apply_filter();
    }

    /// The text of the criterion currently being edited.
    pub fn active_filter_text(&self) -> &str {
        match self.filter_input {
            Some(FilterField::PatientId) => &self.criteria.patient_id,
            Some(FilterField::MessageType) => &self.criteria.message_type,
            None => "",
        }
    }

    /// Cycle the direction criterion: none -> order -> report -> none.
    pub fn cycle_direction_filter(&mut self) {
        self.criteria.direction = match self.criteria.direction.take() {
            None => Some(Direction::Order),
            Some(Direction::Order) => Some(Direction::Report),
            Some(_) => None,
        };
        self.apply_filter();
    }

    /// Cycle the status criterion: none -> failed -> pending -> forwarded
    /// -> none.
    pub fn cycle_status_filter(&mut self) {
        self.criteria.status = match self.criteria.status.take() {
            None => Some(DeliveryStatus::Failed),
            Some(DeliveryStatus::Failed) => Some(DeliveryStatus::Pending),
            Some(DeliveryStatus::Pending) => Some(DeliveryStatus::Forwarded),
            Some(_) => None,
        };
        self.apply_filter();
    }

    // ----- actions -----

    /// Request an immediate refresh cycle.
    pub fn refresh_now(&self) {
        self.poller.refresh_now();
    }

    /// Request a retry of the selected message. No client-side lock:
    /// repeated requests all reach the backend.
    pub fn retry_selected(&mut self) {
        let Some(message) = self.selected_message() else {
            return;
        };
        let id = message.id.clone();
        if id.is_empty() {
            self.set_notice("Selected message has no id".to_string());
            return;
        }
        self.poller.retry(id.clone());
        self.set_notice(format!("Retry requested for {}", id));
    }

    /// Export the current snapshot to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use std::io::Write;

        let export = serde_json::json!({
            "status": self.status.label(),
            "stats": self.stats,
            "failed_messages": self.messages,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Stop the background poller. After this, no further refresh fires.
    pub fn shutdown(&self) {
        self.poller.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::health::{HealthBody, HealthCheck};
    use crate::poller::PollerCommand;

    fn message(id: &str, direction: &str, patient: &str) -> Hl7Message {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "direction": direction,
            "status": "failed",
            "patient_id": patient,
        }))
        .unwrap()
    }

    fn test_app() -> (App, mpsc::Receiver<PollerCommand>, mpsc::Sender<DashboardEvent>) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let handle = PollerHandle {
            commands: command_tx,
            task: tokio::spawn(async {}),
        };
        (App::new(handle, event_rx), command_rx, event_tx)
    }

    #[tokio::test]
    async fn test_initial_state_is_zeroed() {
        let (app, _commands, _events) = test_app();
        assert_eq!(app.status, SystemStatus::Loading);
        assert_eq!(app.stats, RelayStats::default());
        assert!(app.messages.is_empty());
        assert!(app.filtered.is_empty());
        assert!(app.criteria.is_empty());
        assert!(!app.detail_open);
    }

    #[tokio::test]
    async fn test_messages_event_recomputes_filter() {
        let (mut app, _commands, _events) = test_app();
        app.criteria.patient_id = "P1".to_string();

        app.apply_event(DashboardEvent::Messages(vec![
            message("1", "order", "P100"),
            message("2", "report", "P200"),
        ]));

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.filtered, vec![0]);
    }

    #[tokio::test]
    async fn test_criteria_edit_recomputes_filter() {
        let (mut app, _commands, _events) = test_app();
        app.apply_event(DashboardEvent::Messages(vec![
            message("1", "order", "P100"),
            message("2", "report", "P200"),
        ]));
        assert_eq!(app.filtered.len(), 2);

        app.start_filter(FilterField::PatientId);
        app.filter_push('P');
        app.filter_push('2');
        assert_eq!(app.filtered, vec![1]);

        app.filter_pop();
        assert_eq!(app.filtered, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_stats_error_keeps_previous_value() {
        let (mut app, _commands, _events) = test_app();
        app.apply_event(DashboardEvent::RefreshError {
            step: RefreshStep::Stats,
            detail: "backend returned 503 Service Unavailable".to_string(),
        });

        assert_eq!(app.stats, RelayStats::default());
        assert!(app.refresh_error().unwrap().contains("stats"));

        // A later success clears the diagnostic
        app.apply_event(DashboardEvent::Stats(RelayStats {
            total: 7,
            ..RelayStats::default()
        }));
        assert_eq!(app.stats.total, 7);
        assert!(app.refresh_error().is_none());
    }

    #[tokio::test]
    async fn test_health_result_never_sticks() {
        let (mut app, _commands, _events) = test_app();

        app.apply_event(DashboardEvent::Health(HealthCheck {
            status: SystemStatus::ConnectionError,
            body: None,
        }));
        assert_eq!(app.status, SystemStatus::ConnectionError);

        app.apply_event(DashboardEvent::Health(HealthCheck {
            status: SystemStatus::Running,
            body: Some(HealthBody::default()),
        }));
        assert_eq!(app.status, SystemStatus::Running);
        assert!(app.health_detail.is_none());
    }

    #[tokio::test]
    async fn test_retry_events_surface_notices() {
        let (mut app, _commands, _events) = test_app();

        app.apply_event(DashboardEvent::RetryFinished {
            id: "m1".to_string(),
            result: Ok(()),
        });
        assert!(app.notice().unwrap().contains("requeued"));

        app.apply_event(DashboardEvent::RetryFinished {
            id: "m2".to_string(),
            result: Err("backend returned 500 Internal Server Error".to_string()),
        });
        assert!(app.notice().unwrap().contains("failed"));
    }

    #[tokio::test]
    async fn test_retry_selected_sends_command() {
        let (mut app, mut commands, _events) = test_app();
        app.apply_event(DashboardEvent::Messages(vec![message("m7", "order", "P1")]));

        app.retry_selected();

        match commands.try_recv().unwrap() {
            PollerCommand::Retry(id) => assert_eq!(id, "m7"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(app.notice().unwrap().contains("m7"));
    }

    #[tokio::test]
    async fn test_overlay_closes_when_selection_vanishes() {
        let (mut app, _commands, _events) = test_app();
        app.apply_event(DashboardEvent::Messages(vec![message("1", "order", "P100")]));
        app.enter_detail();
        assert!(app.detail_open);
        assert!(app.selected_message().is_some());

        app.apply_event(DashboardEvent::Messages(Vec::new()));
        assert!(!app.detail_open);
        assert!(app.selected_message().is_none());
    }

    #[tokio::test]
    async fn test_selection_clamps_to_filtered() {
        let (mut app, _commands, _events) = test_app();
        app.apply_event(DashboardEvent::Messages(vec![
            message("1", "order", "P100"),
            message("2", "order", "P101"),
            message("3", "order", "P102"),
        ]));
        app.select_last();
        assert_eq!(app.selected_index, 2);

        app.apply_event(DashboardEvent::Messages(vec![message("1", "order", "P100")]));
        assert_eq!(app.selected_index, 0);

        app.select_next_n(10);
        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test]
    async fn test_cycle_filters() {
        let (mut app, _commands, _events) = test_app();

        app.cycle_direction_filter();
        assert_eq!(app.criteria.direction, Some(Direction::Order));
        app.cycle_direction_filter();
        assert_eq!(app.criteria.direction, Some(Direction::Report));
        app.cycle_direction_filter();
        assert!(app.criteria.direction.is_none());

        app.cycle_status_filter();
        assert_eq!(app.criteria.status, Some(DeliveryStatus::Failed));
        app.cycle_status_filter();
        app.cycle_status_filter();
        app.cycle_status_filter();
        assert!(app.criteria.status.is_none());
    }

    #[tokio::test]
    async fn test_export_state_writes_snapshot() {
        let (mut app, _commands, _events) = test_app();
        app.apply_event(DashboardEvent::Messages(vec![message("1", "order", "P100")]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_state(&path).unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["failed_messages"].as_array().unwrap().len(), 1);
        assert_eq!(exported["status"], "Loading");
    }
}
