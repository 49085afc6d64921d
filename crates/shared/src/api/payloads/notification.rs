use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound push payload.
///
/// Every field is optional on the wire; the worker applies its documented
/// defaults when it turns the payload into a displayed notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Where a click on the notification should navigate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<DateTime<Utc>>,
}

/// Blob attached to a displayed notification and read back on click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
    /// Millisecond timestamp recorded when the notification was displayed
    pub timestamp: i64,
}
