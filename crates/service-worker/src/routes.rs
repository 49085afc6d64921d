//! Route classification for intercepted requests.
//!
//! The decision is a pure function of the request's method, scheme, origin
//! and path so the precedence table can be tested without any browser
//! plumbing. First match wins; the ordering is the contract.

use wasm_bindgen::JsValue;
use web_sys::{Request, ServiceWorkerGlobalScope, Url};

/// Bundler output directory. Left entirely to the hosting platform so a new
/// deploy never serves stale bundles out of our partitions.
pub const BUNDLE_PATH_MARKER: &str = "/static/";

/// The anonymous-message send route. Never intercepted so submitting a
/// message behaves exactly as if no worker was registered.
pub const SEND_PATH_MARKER: &str = "/send/";

/// Host suffix of the remote data store. Real-time reads and inserts must
/// never be served stale from a partition.
pub const DATA_STORE_HOST_SUFFIX: &str = "supabase.co";

/// What the worker does with one intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Not our request at all: non-GET or a non-http scheme
    Ignore,
    /// Serve from the static partition, populating it on first miss
    CacheFirst,
    /// Decline so the hosting platform's own delivery and caching applies
    Passthrough,
    /// Decline so the request always hits the network
    NetworkOnly,
    /// Try the network, degrading to cached root or the offline page
    NetworkFirst,
}

impl RouteDecision {
    /// True when the worker must not call respondWith for this request
    pub fn declines_interception(&self) -> bool {
        matches!(self, Self::Ignore | Self::Passthrough | Self::NetworkOnly)
    }
}

/// The parts of a request the routing table looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestShape {
    pub method: String,
    /// Scheme without the trailing colon, e.g. "https"
    pub scheme: String,
    pub same_origin: bool,
    pub host: String,
    pub path: String,
}

impl RequestShape {
    pub fn from_request(
        sw: &ServiceWorkerGlobalScope,
        request: &Request,
    ) -> Result<Self, JsValue> {
        let url = Url::new(&request.url())?;
        let origin = sw.location().origin();

        Ok(Self {
            method: request.method(),
            scheme: url.protocol().trim_end_matches(':').to_string(),
            same_origin: url.origin() == origin,
            host: url.hostname(),
            path: url.pathname(),
        })
    }

    /// The fixed-precedence routing table
    pub fn classify(&self) -> RouteDecision {
        if self.method != "GET" || !matches!(self.scheme.as_str(), "http" | "https") {
            return RouteDecision::Ignore;
        }

        if self.same_origin && is_shell_asset(&self.path) {
            return RouteDecision::CacheFirst;
        }

        if self.same_origin && self.path.contains(BUNDLE_PATH_MARKER) {
            return RouteDecision::Passthrough;
        }

        if self.path.contains(SEND_PATH_MARKER) {
            return RouteDecision::NetworkOnly;
        }

        if !self.same_origin && self.host.ends_with(DATA_STORE_HOST_SUFFIX) {
            return RouteDecision::NetworkOnly;
        }

        RouteDecision::NetworkFirst
    }
}

/// The small fixed set of root-level files the app needs to render offline
pub fn is_shell_asset(path: &str) -> bool {
    path == "/"
        || path == "/manifest.json"
        || path.contains("/icon-")
        || path == "/favicon.ico"
}

#[cfg(test)]
mod test {
    use super::*;

    fn shape(method: &str, scheme: &str, same_origin: bool, host: &str, path: &str) -> RequestShape {
        RequestShape {
            method: method.to_string(),
            scheme: scheme.to_string(),
            same_origin,
            host: host.to_string(),
            path: path.to_string(),
        }
    }

    fn same_origin_get(path: &str) -> RequestShape {
        shape("GET", "https", true, "murmur.app", path)
    }

    #[test]
    fn test_non_get_is_never_intercepted() {
        for method in ["POST", "PUT", "DELETE", "HEAD", "OPTIONS"] {
            let s = shape(method, "https", true, "murmur.app", "/");
            assert_eq!(s.classify(), RouteDecision::Ignore, "{method}");
        }
    }

    #[test]
    fn test_browser_internal_schemes_are_ignored() {
        let s = shape("GET", "chrome-extension", false, "abcdef", "/script.js");
        assert_eq!(s.classify(), RouteDecision::Ignore);

        let s = shape("GET", "about", false, "", "blank");
        assert_eq!(s.classify(), RouteDecision::Ignore);
    }

    #[test]
    fn test_shell_assets_are_cache_first() {
        for path in ["/", "/manifest.json", "/icon-192.png", "/icon-512.png", "/favicon.ico"] {
            assert_eq!(same_origin_get(path).classify(), RouteDecision::CacheFirst, "{path}");
        }
    }

    #[test]
    fn test_cross_origin_shell_lookalike_is_not_cache_first() {
        let s = shape("GET", "https", false, "cdn.example.com", "/favicon.ico");
        assert_eq!(s.classify(), RouteDecision::NetworkFirst);
    }

    #[test]
    fn test_bundle_output_is_left_to_the_host() {
        assert_eq!(
            same_origin_get("/static/js/main.3f2a.chunk.js").classify(),
            RouteDecision::Passthrough
        );
        assert_eq!(
            same_origin_get("/static/css/main.css").classify(),
            RouteDecision::Passthrough
        );
    }

    #[test]
    fn test_send_route_is_network_only() {
        assert_eq!(same_origin_get("/send/bob").classify(), RouteDecision::NetworkOnly);
    }

    #[test]
    fn test_send_marker_applies_to_any_origin() {
        let s = shape("GET", "https", false, "mirror.example.com", "/send/bob");
        assert_eq!(s.classify(), RouteDecision::NetworkOnly);
    }

    #[test]
    fn test_data_store_is_network_only() {
        let s = shape("GET", "https", false, "xyzcompany.supabase.co", "/rest/v1/users");
        assert_eq!(s.classify(), RouteDecision::NetworkOnly);
    }

    #[test]
    fn test_everything_else_is_network_first() {
        assert_eq!(same_origin_get("/u/bob").classify(), RouteDecision::NetworkFirst);
        assert_eq!(same_origin_get("/index.html").classify(), RouteDecision::NetworkFirst);

        let s = shape("GET", "https", false, "fonts.example.com", "/inter.woff2");
        assert_eq!(s.classify(), RouteDecision::NetworkFirst);
    }

    #[test]
    fn test_shell_match_beats_bundle_marker() {
        // An icon that happens to live under /static/ still hits the shell
        // rule first
        assert_eq!(
            same_origin_get("/static/icon-192.png").classify(),
            RouteDecision::CacheFirst
        );
    }

    #[test]
    fn test_declines_interception() {
        assert!(RouteDecision::Ignore.declines_interception());
        assert!(RouteDecision::Passthrough.declines_interception());
        assert!(RouteDecision::NetworkOnly.declines_interception());
        assert!(!RouteDecision::CacheFirst.declines_interception());
        assert!(!RouteDecision::NetworkFirst.declines_interception());
    }
}
