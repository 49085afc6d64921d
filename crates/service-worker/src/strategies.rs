//! The two fetch strategies that actually intercept: cache-first for the
//! shell and network-first with offline fallback for everything else.
//! Routes the worker declines never reach this module.

use js_sys::{Object as JsObject, Reflect};
use shared::api::error::JsError;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, Response, ResponseInit, ServiceWorkerGlobalScope};

use crate::{cache, offline};

/// Serve from the static partition, else fetch and populate.
///
/// The cache write happens off the critical path: the page gets the live
/// response immediately while a clone is stored concurrently. A response
/// body has exactly one consumer, so the clone is taken before either side
/// reads it.
pub async fn cache_first(
    sw: ServiceWorkerGlobalScope,
    cache_name: String,
    request: Request,
) -> Result<Response, JsValue> {
    let caches = sw.caches()?;

    if let Some(cached) = cache::match_cached(&caches, &cache_name, &request).await? {
        debug!("HIT: {}", request.url());
        return Ok(cached);
    }
    debug!("MISS: {}", request.url());

    let response = fetch_direct(&sw, &request).await?;

    if cache::is_cacheable(response.status(), response.type_()) {
        let copy = response.clone()?;
        let url = request.url();
        spawn_local(async move {
            if let Err(e) = cache::put(&caches, &cache_name, &request, &copy).await {
                warn!("cache write failed for {url}: {}", JsError::from(e));
            }
        });
    }

    Ok(response)
}

/// Try the network; degrade only for the root document.
///
/// A failed root navigation falls back to the cached root, then to the
/// synthesized offline page. Any other path gets its request re-issued so
/// the page sees the natural network failure.
pub async fn network_first(
    sw: ServiceWorkerGlobalScope,
    static_cache_name: String,
    path: String,
    request: Request,
) -> Result<Response, JsValue> {
    match fetch_direct(&sw, &request).await {
        Ok(response) => Ok(response),
        Err(e) => {
            warn!("network fetch failed for {path}: {}", JsError::from(e));

            if is_root_document(&path) {
                let root = Request::new_with_str("/")?;
                if let Some(cached) =
                    cache::match_cached(&sw.caches()?, &static_cache_name, &root).await?
                {
                    debug!("serving cached root");
                    return Ok(cached);
                }
                return offline::offline_response();
            }

            // Surface the retry's natural failure to the page
            JsFuture::from(sw.fetch_with_request(&request)).await.map(Into::into)
        }
    }
}

/// The only paths that may degrade to the cached root or the offline page;
/// every other path surfaces its natural network failure
pub fn is_root_document(path: &str) -> bool {
    path == "/" || path == "/index.html"
}

/// Plain passthrough fetch via the worker scope
pub async fn fetch_direct(
    sw: &ServiceWorkerGlobalScope,
    request: &Request,
) -> Result<Response, JsValue> {
    let response = JsFuture::from(sw.fetch_with_request(request)).await?;

    if response.is_instance_of::<Response>() {
        Ok(response.into())
    } else {
        let e = format!("Fetch returned something other than a Response: {:?}", response);
        warn!("{e}");

        // We have to construct some kind of response
        let headers = JsObject::new();
        Reflect::set(
            &headers,
            &JsValue::from_str("Content-Type"),
            &JsValue::from_str("text/plain"),
        )?;

        let mut r_init = ResponseInit::new();
        r_init.status(500).headers(&headers);
        let response = Response::new_with_opt_str_and_init(Some(&e), &r_init)?;

        Ok(response)
    }
}
