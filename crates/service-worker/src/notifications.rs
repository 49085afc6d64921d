//! Push payload handling and notification click routing.

use chrono::{DateTime, Utc};
use gloo::utils::format::JsValueSerdeExt;
use serde::Serialize;
use shared::api::{
    error::WorkerError,
    payloads::{NotificationData, PushPayload},
};
use tracing::{debug, error, warn};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    js_sys::Array, ClientQueryOptions, ClientType, NotificationEvent, NotificationOptions,
    PushEvent, ServiceWorkerGlobalScope, WindowClient,
};

// web-sys doesn't bind `NotificationEvent.action`, so declare the getter here
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = web_sys::Event)]
    type NotificationEventWithAction;

    #[wasm_bindgen(structural, method, getter)]
    fn action(this: &NotificationEventWithAction) -> String;
}

trait NotificationEventExt {
    fn action(&self) -> String;
}

impl NotificationEventExt for NotificationEvent {
    fn action(&self) -> String {
        self.unchecked_ref::<NotificationEventWithAction>().action()
    }
}

pub const DEFAULT_TITLE: &str = "Murmur";
pub const DEFAULT_BODY: &str = "You have a new anonymous message!";
pub const DEFAULT_ICON: &str = "/icon-192.png";
pub const DEFAULT_IMAGE: &str = "/icon-512.png";
pub const DEFAULT_URL: &str = "/";

const VIBRATION_PATTERN: [f64; 3] = [100.0, 50.0, 100.0];

const ACTION_OPEN: &str = "open";
const ACTION_CLOSE: &str = "close";

/// Everything needed to display one notification: a push payload with the
/// documented defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub image: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationIntent {
    pub fn from_payload(payload: PushPayload, received: DateTime<Utc>) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: DEFAULT_ICON.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            url: payload.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            timestamp: payload.sent.unwrap_or(received),
        }
    }
}

#[derive(Debug, Serialize)]
struct NotificationAction<'a> {
    action: &'a str,
    title: &'a str,
}

async fn show(sw: &ServiceWorkerGlobalScope, intent: &NotificationIntent) -> Result<(), WorkerError> {
    let mut options = NotificationOptions::new();
    options
        .body(&intent.body)
        .icon(&intent.icon)
        .badge(&intent.icon)
        .image(&intent.image)
        .timestamp(intent.timestamp.timestamp_millis() as f64);

    let vibration = VIBRATION_PATTERN.iter().copied().map(JsValue::from).collect::<Array>();
    options.vibrate(&vibration);

    let data = NotificationData {
        url: intent.url.clone(),
        timestamp: Utc::now().timestamp_millis(),
    };
    options.data(
        &<JsValue as JsValueSerdeExt>::from_serde(&data)
            .map_err(|e| WorkerError::from(e).context("serializing notification data"))?,
    );

    let actions = [
        NotificationAction { action: ACTION_OPEN, title: "Open" },
        NotificationAction { action: ACTION_CLOSE, title: "Dismiss" },
    ];
    options.actions(
        &<JsValue as JsValueSerdeExt>::from_serde(&actions)
            .map_err(|e| WorkerError::from(e).context("serializing notification actions"))?,
    );

    JsFuture::from(
        sw.registration().show_notification_with_options(&intent.title, &options)?,
    )
    .await?;

    Ok(())
}

/// Turn an inbound push event into an OS notification.
///
/// A malformed or missing payload still produces a notification built from
/// defaults; display failures are logged and never escalated so a broken
/// notification path can't take down fetch interception.
pub async fn push(sw: ServiceWorkerGlobalScope, event: PushEvent) -> Result<JsValue, JsValue> {
    let payload = match event.data() {
        Some(data) => match data.json().map(|json| JsValueSerdeExt::into_serde::<PushPayload>(&json)) {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                error!("push payload deserialize: {e}");
                PushPayload::default()
            }
            Err(e) => {
                error!("push payload is not json: {:?}", e);
                PushPayload::default()
            }
        },
        None => {
            warn!("push event carried no data");
            PushPayload::default()
        }
    };

    let intent = NotificationIntent::from_payload(payload, Utc::now());
    debug!("showing notification: {}", intent.title);

    if let Err(e) = show(&sw, &intent).await {
        error!("notification display failed: {e}");
    }

    Ok(JsValue::undefined())
}

/// First open window whose URL exactly matches the notification target
pub fn find_focus_target(client_urls: &[String], target: &str) -> Option<usize> {
    client_urls.iter().position(|url| url == target)
}

/// Close the notification, then focus an exactly-matching open window or
/// open a new one at the stored target URL. A press on the dismiss action
/// button skips navigation; a generic click behaves like "open".
pub async fn click(
    sw: ServiceWorkerGlobalScope,
    event: NotificationEvent,
) -> Result<JsValue, JsValue> {
    let notification = event.notification();

    // Chrome doesn't close the notification by itself
    notification.close();

    if event.action() == ACTION_CLOSE {
        return Ok(JsValue::undefined());
    }

    let target = match JsValueSerdeExt::into_serde::<NotificationData>(&notification.data()) {
        Ok(data) => data.url,
        Err(e) => {
            warn!("notification carried no routable data ({e}); using {DEFAULT_URL}");
            DEFAULT_URL.to_string()
        }
    };

    let mut query = ClientQueryOptions::new();
    query.type_(ClientType::Window).include_uncontrolled(true);

    let clients: Array = JsFuture::from(sw.clients().match_all_with_options(&query)).await?.into();
    let urls = clients
        .iter()
        .map(|client| WindowClient::from(client).url())
        .collect::<Vec<_>>();

    if let Some(index) = find_focus_target(&urls, &target) {
        debug!("focusing existing window at {target}");
        let client: WindowClient = clients.get(index as u32).into();
        JsFuture::from(client.focus()?).await?;
    } else {
        debug!("opening new window at {target}");
        JsFuture::from(sw.clients().open_window(&target)).await?;
    }

    Ok(JsValue::undefined())
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_intent_from_full_payload() {
        let payload: PushPayload =
            serde_json::from_str(r#"{ "title": "X", "body": "Y", "url": "/u/bob" }"#).unwrap();
        let received = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let intent = NotificationIntent::from_payload(payload, received);
        assert_eq!(intent.title, "X");
        assert_eq!(intent.body, "Y");
        assert_eq!(intent.url, "/u/bob");
        assert_eq!(intent.icon, DEFAULT_ICON);
        assert_eq!(intent.image, DEFAULT_IMAGE);
        assert_eq!(intent.timestamp, received);
    }

    #[test]
    fn test_intent_defaults_for_empty_payload() {
        let received = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let intent = NotificationIntent::from_payload(PushPayload::default(), received);

        assert_eq!(intent.title, DEFAULT_TITLE);
        assert_eq!(intent.body, DEFAULT_BODY);
        assert_eq!(intent.url, DEFAULT_URL);
    }

    #[test]
    fn test_sent_timestamp_wins_over_receipt_time() {
        let sent = Utc.with_ymd_and_hms(2024, 6, 1, 11, 59, 0).unwrap();
        let received = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let payload = PushPayload { sent: Some(sent), ..Default::default() };
        let intent = NotificationIntent::from_payload(payload, received);
        assert_eq!(intent.timestamp, sent);
    }

    #[test]
    fn test_focus_target_requires_exact_match() {
        let urls = vec![
            "https://murmur.app/".to_string(),
            "https://murmur.app/u/bob".to_string(),
        ];

        assert_eq!(find_focus_target(&urls, "https://murmur.app/u/bob"), Some(1));
        assert_eq!(find_focus_target(&urls, "https://murmur.app/u/bob/"), None);
        assert_eq!(find_focus_target(&urls, "https://murmur.app/u/alice"), None);
        assert_eq!(find_focus_target(&[], "https://murmur.app/"), None);
    }
}
