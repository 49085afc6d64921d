use serde::{Deserialize, Serialize};

/// Control messages a page can post to the worker.
///
/// The wire format is an object with a `type` discriminator so new directives
/// can be added without breaking older workers; anything unrecognized fails
/// to deserialize and is logged and ignored by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientDirective {
    /// Ask a waiting worker version to take over immediately instead of
    /// waiting for every tab running the old version to close
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_skip_waiting_wire_format() {
        let directive: ClientDirective =
            serde_json::from_str(r#"{ "type": "SKIP_WAITING" }"#).unwrap();
        assert_eq!(directive, ClientDirective::SkipWaiting);

        assert_eq!(
            serde_json::to_string(&ClientDirective::SkipWaiting).unwrap(),
            r#"{"type":"SKIP_WAITING"}"#
        );
    }

    #[test]
    fn test_unrecognized_directive_is_an_error() {
        assert!(serde_json::from_str::<ClientDirective>(r#"{ "type": "REFRESH" }"#).is_err());
        assert!(serde_json::from_str::<ClientDirective>(r#""SKIP_WAITING""#).is_err());
    }
}
