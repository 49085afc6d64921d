//! Named, versioned cache partitions.
//!
//! Exactly one partition is current per role (static shell, runtime) for a
//! given deployed version; activate deletes every partition whose name
//! doesn't match one of the two current names.

use tracing::{debug, error};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{js_sys::Array, Cache, CacheStorage, Request, Response, ResponseType};

pub const CACHE_PREFIX: &str = "murmur";

/// Root-relative paths pre-fetched into the static partition at install
pub const SHELL_MANIFEST: &[&str] = &[
    "/",
    "/manifest.json",
    "/icon-192.png",
    "/icon-512.png",
    "/favicon.ico",
];

pub fn static_cache_name(version: &str) -> String {
    format!("{CACHE_PREFIX}-static-{version}")
}

pub fn runtime_cache_name(version: &str) -> String {
    format!("{CACHE_PREFIX}-pwa-{version}")
}

/// Only successful same-origin responses are eligible for a partition.
/// Opaque, cors and error responses are still returned to the page but are
/// never stored.
pub fn is_cacheable(status: u16, kind: ResponseType) -> bool {
    status == 200 && kind == ResponseType::Basic
}

/// Partitions that belong to neither current role name
pub fn stale_partitions<'a>(existing: &'a [String], keep: &[String]) -> Vec<&'a str> {
    existing
        .iter()
        .filter(|name| !keep.iter().any(|k| k == *name))
        .map(|name| name.as_str())
        .collect()
}

pub async fn open_cache(caches: &CacheStorage, name: &str) -> Result<Cache, JsValue> {
    let cache: Cache = JsFuture::from(caches.open(name)).await?.into();
    Ok(cache)
}

/// Batched all-or-nothing fetch-and-store of the shell manifest
pub async fn precache_shell(caches: &CacheStorage, name: &str) -> Result<(), JsValue> {
    let cache = open_cache(caches, name).await?;

    let paths = SHELL_MANIFEST.iter().map(|p| JsValue::from_str(p)).collect::<Array>();
    JsFuture::from(cache.add_all_with_str_sequence(&JsValue::from(paths))).await?;

    debug!("shell manifest cached into {name}");
    Ok(())
}

pub async fn match_cached(
    caches: &CacheStorage,
    name: &str,
    request: &Request,
) -> Result<Option<Response>, JsValue> {
    let cache = open_cache(caches, name).await?;

    let cached = JsFuture::from(cache.match_with_request(request)).await?;
    if cached.is_instance_of::<Response>() {
        Ok(Some(cached.into()))
    } else if cached.is_undefined() {
        Ok(None)
    } else {
        error!("cache match returned something other than Response or undefined: {cached:?}");
        Ok(None)
    }
}

pub async fn put(
    caches: &CacheStorage,
    name: &str,
    request: &Request,
    response: &Response,
) -> Result<(), JsValue> {
    let cache = open_cache(caches, name).await?;
    JsFuture::from(cache.put_with_request(request, response)).await?;
    Ok(())
}

/// Delete every partition whose name isn't one of `keep`
pub async fn prune_stale_partitions(
    caches: &CacheStorage,
    keep: &[String],
) -> Result<(), JsValue> {
    let names: Array = JsFuture::from(caches.keys()).await?.into();
    let existing = names.iter().filter_map(|v| v.as_string()).collect::<Vec<_>>();

    for name in stale_partitions(&existing, keep) {
        debug!("deleting stale partition: {name}");
        JsFuture::from(caches.delete(name)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partition_names_carry_role_and_version() {
        assert_eq!(static_cache_name("v1.0"), "murmur-static-v1.0");
        assert_eq!(runtime_cache_name("v1.0"), "murmur-pwa-v1.0");
        assert_ne!(static_cache_name("v1.0"), static_cache_name("v1.1"));
    }

    #[test]
    fn test_only_basic_200_responses_are_cacheable() {
        assert!(is_cacheable(200, ResponseType::Basic));

        assert!(!is_cacheable(404, ResponseType::Basic));
        assert!(!is_cacheable(500, ResponseType::Basic));
        assert!(!is_cacheable(304, ResponseType::Basic));
        assert!(!is_cacheable(200, ResponseType::Opaque));
        assert!(!is_cacheable(200, ResponseType::Cors));
        assert!(!is_cacheable(200, ResponseType::Error));
    }

    #[test]
    fn test_stale_partition_selection() {
        let keep = vec![static_cache_name("v1.0"), runtime_cache_name("v1.0")];
        let existing = vec![
            "murmur-static-v1.0".to_string(),
            "murmur-pwa-v1.0".to_string(),
            "murmur-static-v0.9".to_string(),
            "murmur-pwa-v0.8".to_string(),
        ];

        let stale = stale_partitions(&existing, &keep);
        assert_eq!(stale, vec!["murmur-static-v0.9", "murmur-pwa-v0.8"]);
    }

    #[test]
    fn test_nothing_stale_when_only_current_partitions_exist() {
        let keep = vec![static_cache_name("v1.0"), runtime_cache_name("v1.0")];
        let existing = keep.clone();
        assert!(stale_partitions(&existing, &keep).is_empty());
    }

    #[test]
    fn test_shell_manifest_is_root_relative() {
        assert!(SHELL_MANIFEST.contains(&"/"));
        for path in SHELL_MANIFEST {
            assert!(path.starts_with('/'), "{path}");
        }
    }
}
