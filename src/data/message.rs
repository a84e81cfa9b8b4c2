//! Failed-message model as served by the relay backend.
//!
//! Messages are owned by the backend; the client holds read-only snapshots
//! and passes payload fields through unmodified for display.

use serde::{Deserialize, Serialize};

/// Direction of a message within the relay pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    /// Outbound order.
    Order,
    /// Inbound report.
    Report,
    /// Unrecognized direction, carried verbatim.
    Other(String),
}

impl From<String> for Direction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "order" => Direction::Order,
            "report" => Direction::Report,
            _ => Direction::Other(value),
        }
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Order => "order".to_string(),
            Direction::Report => "report".to_string(),
            Direction::Other(raw) => raw,
        }
    }
}

impl Direction {
    /// Returns the display label; unknown values display as-is.
    pub fn label(&self) -> &str {
        match self {
            Direction::Order => "Order",
            Direction::Report => "Report",
            Direction::Other(raw) => raw,
        }
    }
}

/// Delivery status of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    Forwarded,
    Failed,
    Pending,
    /// Unrecognized status, carried verbatim.
    Other(String),
}

impl From<String> for DeliveryStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "forwarded" => DeliveryStatus::Forwarded,
            "failed" => DeliveryStatus::Failed,
            "pending" => DeliveryStatus::Pending,
            _ => DeliveryStatus::Other(value),
        }
    }
}

impl From<DeliveryStatus> for String {
    fn from(value: DeliveryStatus) -> Self {
        match value {
            DeliveryStatus::Forwarded => "forwarded".to_string(),
            DeliveryStatus::Failed => "failed".to_string(),
            DeliveryStatus::Pending => "pending".to_string(),
            DeliveryStatus::Other(raw) => raw,
        }
    }
}

impl DeliveryStatus {
    /// Returns the display label; unknown values display as-is.
    pub fn label(&self) -> &str {
        match self {
            DeliveryStatus::Forwarded => "Forwarded",
            DeliveryStatus::Failed => "Failed",
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Other(raw) => raw,
        }
    }
}

/// A single HL7 message as reported by the backend.
///
/// All fields beyond `direction` and `status` are optional: absent or empty
/// values never fail decoding. `raw_message` is the opaque wire payload
/// (base64 from the backend) and is displayed without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hl7Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub direction: Direction,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub source_addr: Option<String>,
    #[serde(default)]
    pub destination_addr: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub message_control_id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub raw_message: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl Hl7Message {
    /// Local-time rendering of the backend timestamp for display.
    pub fn display_timestamp(&self) -> String {
        format_timestamp(self.timestamp.as_deref())
    }
}

/// Format a backend timestamp for display.
///
/// Absent or empty values render as a dash. Values that do not parse as
/// RFC 3339 are passed through verbatim rather than dropped.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return "-".to_string();
    };
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => instant
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Display helper for optional backend strings: empty and absent values
/// both render as a dash.
pub fn text_or_dash(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_message() {
        let json = r#"{
            "id": "a1b2c3",
            "timestamp": "2024-03-01T10:30:00Z",
            "direction": "order",
            "source_addr": "10.0.0.5:6661",
            "destination_addr": "10.0.0.9:7777",
            "message_type": "ORM^O01",
            "message_control_id": "MSG00042",
            "patient_id": "P100",
            "patient_name": "DOE^JANE",
            "raw_message": "TVNIfF5+XCY=",
            "status": "failed",
            "retry_count": 3,
            "last_error": "connection refused",
            "created_at": "2024-03-01T10:30:00Z"
        }"#;

        let message: Hl7Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, "a1b2c3");
        assert_eq!(message.direction, Direction::Order);
        assert_eq!(message.status, DeliveryStatus::Failed);
        assert_eq!(message.patient_id.as_deref(), Some("P100"));
        assert_eq!(message.retry_count, 3);
        assert_eq!(message.raw_message.as_deref(), Some("TVNIfF5+XCY="));
        assert!(message.processed_at.is_none());
    }

    #[test]
    fn test_parse_minimal_message() {
        let message: Hl7Message =
            serde_json::from_str(r#"{"direction": "report", "status": "failed"}"#).unwrap();
        assert_eq!(message.direction, Direction::Report);
        assert!(message.id.is_empty());
        assert!(message.patient_id.is_none());
        assert_eq!(message.retry_count, 0);
    }

    #[test]
    fn test_unknown_enum_values_carry_raw() {
        let message: Hl7Message =
            serde_json::from_str(r#"{"direction": "loopback", "status": "quarantined"}"#).unwrap();
        assert_eq!(message.direction, Direction::Other("loopback".to_string()));
        assert_eq!(message.direction.label(), "loopback");
        assert_eq!(message.status, DeliveryStatus::Other("quarantined".to_string()));
        assert_eq!(message.status.label(), "quarantined");
    }

    #[test]
    fn test_direction_round_trip() {
        for raw in ["order", "report", "loopback"] {
            let direction = Direction::from(raw.to_string());
            assert_eq!(String::from(direction), raw);
        }
    }

    #[test]
    fn test_format_timestamp_absent() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some("")), "-");
    }

    #[test]
    fn test_format_timestamp_malformed_passes_through() {
        assert_eq!(format_timestamp(Some("yesterday-ish")), "yesterday-ish");
    }

    #[test]
    fn test_format_timestamp_valid() {
        let formatted = format_timestamp(Some("2024-03-01T10:30:00.123456Z"));
        // Rendered in local time, so only the shape is stable
        assert_eq!(formatted.len(), "2024-03-01 10:30:00".len());
        assert!(formatted.starts_with("2024-"));
    }

    #[test]
    fn test_text_or_dash() {
        assert_eq!(text_or_dash(None), "-");
        assert_eq!(text_or_dash(Some("")), "-");
        assert_eq!(text_or_dash(Some("P100")), "P100");
    }
}
