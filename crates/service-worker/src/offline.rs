//! Synthesized offline fallback for the root document.
//!
//! Fully self-contained: inline styles only, no sub-resources, so it renders
//! with nothing but this response body available.

use js_sys::{Object as JsObject, Reflect};
use wasm_bindgen::JsValue;
use web_sys::{Response, ResponseInit};

pub const OFFLINE_MARKER: &str = "You are currently offline";

pub const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Murmur - offline</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
        background: linear-gradient(135deg, #8B5CF6, #EC4899);
        height: 100vh;
        margin: 0;
        display: flex;
        align-items: center;
        justify-content: center;
        color: white;
        text-align: center;
      }
      .container {
        padding: 2rem;
        max-width: 400px;
      }
      h1 {
        font-size: 2rem;
        margin-bottom: 1rem;
        font-weight: bold;
      }
      p {
        font-size: 1.1rem;
        opacity: 0.9;
        margin-bottom: 0.5rem;
      }
    </style>
  </head>
  <body>
    <div class="container">
      <h1>Murmur</h1>
      <p>You are currently offline</p>
      <p>Reconnect to keep receiving anonymous messages</p>
    </div>
  </body>
</html>
"#;

pub fn offline_response() -> Result<Response, JsValue> {
    let headers = JsObject::new();
    Reflect::set(
        &headers,
        &JsValue::from_str("Content-Type"),
        &JsValue::from_str("text/html"),
    )?;
    Reflect::set(
        &headers,
        &JsValue::from_str("Cache-Control"),
        &JsValue::from_str("no-cache"),
    )?;

    let mut r_init = ResponseInit::new();
    r_init.status(200).headers(&headers);
    Response::new_with_opt_str_and_init(Some(OFFLINE_PAGE), &r_init)
}
