//! Request interception layer for the Murmur PWA.
//!
//! The worker owns two versioned cache partitions (static shell, runtime),
//! dispatches every intercepted request through a fixed-precedence routing
//! table and relays push payloads as OS notifications. The JS bootstrap
//! constructs one [`WorkerScope`] per deployed version and hands each
//! platform event to it, passing the returned promise to `waitUntil` so the
//! platform keeps the worker alive until the handler settles.

use console_error_panic_hook::set_once as set_panic_hook;
use gloo::utils::format::JsValueSerdeExt;
use shared::{
    api::{error::JsError, payloads::ClientDirective},
    utils::tracing::configure_tracing_once as configure_tracing,
};
use tracing::{debug, error, info, warn};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    js_sys::Promise, ErrorEvent, Event, FetchEvent, MessageEvent, NotificationEvent,
    PromiseRejectionEvent, PushEvent, ServiceWorkerGlobalScope,
};

pub mod cache;
pub mod notifications;
pub mod offline;
pub mod routes;
pub mod strategies;

use routes::{RequestShape, RouteDecision};

/// Per-version handle to the worker global scope.
///
/// Constructed exactly once by the bootstrap script; every event handler
/// goes through it, so there is no global mutable state on the Rust side and
/// two coexisting worker versions never share partitions.
#[wasm_bindgen]
pub struct WorkerScope {
    sw: ServiceWorkerGlobalScope,
    version: String,
}

impl WorkerScope {
    fn static_cache_name(&self) -> String {
        cache::static_cache_name(&self.version)
    }

    fn runtime_cache_name(&self) -> String {
        cache::runtime_cache_name(&self.version)
    }
}

#[wasm_bindgen]
impl WorkerScope {
    #[wasm_bindgen(constructor)]
    pub fn new(sw: ServiceWorkerGlobalScope, version: String) -> WorkerScope {
        set_panic_hook();
        configure_tracing();

        WorkerScope { sw, version }
    }

    pub fn install(&self) -> Promise {
        future_to_promise(install(self.sw.clone(), self.static_cache_name()))
    }

    pub fn activate(&self) -> Promise {
        let keep = vec![self.static_cache_name(), self.runtime_cache_name()];
        future_to_promise(activate(self.sw.clone(), self.version.clone(), keep))
    }

    /// Classify the request and either respond with a strategy future or
    /// decline so the platform handles it natively
    pub fn fetch(&self, event: FetchEvent) -> Result<(), JsValue> {
        let request = event.request();
        let shape = RequestShape::from_request(&self.sw, &request)?;

        let decision = shape.classify();
        debug!("{} {} -> {decision:?}", shape.method, request.url());

        if decision.declines_interception() {
            return Ok(());
        }

        let sw = self.sw.clone();
        let static_cache = self.static_cache_name();
        let response = if decision == RouteDecision::CacheFirst {
            future_to_promise(async move {
                strategies::cache_first(sw, static_cache, request).await.map(JsValue::from)
            })
        } else {
            future_to_promise(async move {
                strategies::network_first(sw, static_cache, shape.path, request)
                    .await
                    .map(JsValue::from)
            })
        };

        event.respond_with(&response)?;
        Ok(())
    }

    pub fn message(&self, event: MessageEvent) -> Promise {
        future_to_promise(message(self.sw.clone(), event))
    }

    pub fn push(&self, event: PushEvent) -> Promise {
        future_to_promise(notifications::push(self.sw.clone(), event))
    }

    pub fn notification_click(&self, event: NotificationEvent) -> Promise {
        future_to_promise(notifications::click(self.sw.clone(), event))
    }

    /// Reserved: background sync carries no behavior yet
    pub fn sync(&self, event: Event) {
        debug!("sync event received: {}", event.type_());
    }

    pub fn error(&self, event: ErrorEvent) {
        error!("uncaught worker error: {}", event.message());
    }

    pub fn unhandled_rejection(&self, event: PromiseRejectionEvent) {
        error!("unhandled rejection: {}", JsError::from(event.reason()));
    }
}

/// Pre-populate the static partition and ask to take over immediately.
///
/// A failed shell download is logged and leaves the partition incomplete
/// rather than failing the install.
async fn install(sw: ServiceWorkerGlobalScope, static_cache: String) -> Result<JsValue, JsValue> {
    info!("installing, static partition {static_cache}");

    if let Err(e) = cache::precache_shell(&sw.caches()?, &static_cache).await {
        error!("shell precache failed: {}", JsError::from(e));
    }

    // MDN states the promise returned can be safely ignored
    let _ = sw.skip_waiting()?;

    Ok(JsValue::undefined())
}

/// Drop every partition belonging to another version, then claim the open
/// pages so this version intercepts their requests without a reload
async fn activate(
    sw: ServiceWorkerGlobalScope,
    version: String,
    keep: Vec<String>,
) -> Result<JsValue, JsValue> {
    if let Err(e) = cache::prune_stale_partitions(&sw.caches()?, &keep).await {
        error!("stale partition cleanup failed: {}", JsError::from(e));
    }

    JsFuture::from(sw.clients().claim()).await?;
    info!("{version} active");

    Ok(JsValue::undefined())
}

async fn message(sw: ServiceWorkerGlobalScope, event: MessageEvent) -> Result<JsValue, JsValue> {
    match JsValueSerdeExt::into_serde(&event.data()) {
        Ok(ClientDirective::SkipWaiting) => {
            info!("skip-waiting directive received");

            // MDN states the promise returned can be safely ignored
            let _ = sw.skip_waiting()?;
        }
        Err(_) => {
            warn!("unrecognized client message: {:?}", event.data());
        }
    }

    Ok(JsValue::undefined())
}
