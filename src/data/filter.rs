//! Client-side filter over the failed-message snapshot.
//!
//! Filtering is pure and synchronous: the view recomputes it whenever the
//! snapshot or the criteria change, so the filtered list always reflects
//! both inputs.

use super::message::{DeliveryStatus, Direction, Hl7Message};

/// Operator-supplied filter criteria.
///
/// Unset/empty fields apply no constraint. The text fields are
/// case-sensitive substring matches against the backend values; direction
/// and status match exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub direction: Option<Direction>,
    pub status: Option<DeliveryStatus>,
    pub patient_id: String,
    pub message_type: String,
}

impl FilterCriteria {
    /// True when no constraint is active.
    pub fn is_empty(&self) -> bool {
        self.direction.is_none()
            && self.status.is_none()
            && self.patient_id.is_empty()
            && self.message_type.is_empty()
    }

    /// All active criteria must pass. A message without a value for a
    /// non-empty substring criterion never matches.
    pub fn matches(&self, message: &Hl7Message) -> bool {
        if let Some(direction) = &self.direction {
            if message.direction != *direction {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if message.status != *status {
                return false;
            }
        }
        if !self.patient_id.is_empty()
            && !field_contains(message.patient_id.as_deref(), &self.patient_id)
        {
            return false;
        }
        if !self.message_type.is_empty()
            && !field_contains(message.message_type.as_deref(), &self.message_type)
        {
            return false;
        }
        true
    }

    /// Short summary of the active criteria for the table title.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(direction) = &self.direction {
            parts.push(format!("dir={}", direction.label()));
        }
        if let Some(status) = &self.status {
            parts.push(format!("status={}", status.label()));
        }
        if !self.patient_id.is_empty() {
            parts.push(format!("patient~{}", self.patient_id));
        }
        if !self.message_type.is_empty() {
            parts.push(format!("type~{}", self.message_type));
        }
        parts.join(" ")
    }
}

fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.contains(needle))
}

/// Apply `criteria` to a snapshot, returning the indices of the matching
/// messages in their original order.
pub fn filter_messages(messages: &[Hl7Message], criteria: &FilterCriteria) -> Vec<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, message)| criteria.matches(message))
        .map(|(index, _)| index)
        .collect()
}
