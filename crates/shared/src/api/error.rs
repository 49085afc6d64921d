#[cfg(feature = "wasm")]
pub use wasm::*;

#[cfg(feature = "wasm")]
mod wasm {
    use thiserror::Error;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::js_sys::{
        Error as GenericJsError,
        RangeError as JsRangeError,
        ReferenceError as JsReferenceError,
        SyntaxError as JsSyntaxError,
        TypeError as JsTypeError,
        UriError as JsUriError,
    };

    /// Classified wrapper for raw JsValue exceptions so log lines carry the
    /// JS error class instead of an opaque `JsValue(Object)` debug dump
    #[derive(Debug, Clone, Error)]
    pub enum JsError {
        #[error("GenericJs Error: {0:?}")]
        GenericJs(GenericJsError),
        #[error("JsRange Error: {0:?}")]
        JsRange(JsRangeError),
        #[error("JsReference Error: {0:?}")]
        JsReference(JsReferenceError),
        #[error("JsSyntax Error: {0:?}")]
        JsSyntax(JsSyntaxError),
        #[error("JsType Error: {0:?}")]
        JsType(JsTypeError),
        #[error("JsUri Error: {0:?}")]
        JsUri(JsUriError),
        #[error("UnknownJsValue Error: {0:?}")]
        UnknownJsValue(String),
    }

    impl From<JsValue> for JsError {
        fn from(err: JsValue) -> JsError {
            if err.is_instance_of::<JsRangeError>() {
                return JsError::JsRange(err.into());
            }
            if err.is_instance_of::<JsReferenceError>() {
                return JsError::JsReference(err.into());
            }
            if err.is_instance_of::<JsSyntaxError>() {
                return JsError::JsSyntax(err.into());
            }
            if err.is_instance_of::<JsTypeError>() {
                return JsError::JsType(err.into());
            }
            if err.is_instance_of::<JsUriError>() {
                return JsError::JsUri(err.into());
            }
            if err.is_instance_of::<GenericJsError>() {
                return JsError::GenericJs(err.into());
            }
            JsError::UnknownJsValue(format!("{:?}", err))
        }
    }

    /// Errors crossing the worker's internal seams.
    ///
    /// Converted back to a JsValue only at the wasm boundary; everything on
    /// the way there uses `?` over this type.
    #[derive(Debug, Clone, Error)]
    pub enum WorkerError {
        #[error(transparent)]
        Js(#[from] JsError),
        #[error("Serde Error: {0}")]
        Serde(String),
        #[error("{context}: {inner}")]
        WithContext { context: String, inner: Box<WorkerError> },
    }

    impl WorkerError {
        pub fn context<S: Into<String>>(self, context: S) -> Self {
            WorkerError::WithContext { context: context.into(), inner: Box::new(self) }
        }
    }

    impl From<JsValue> for WorkerError {
        fn from(value: JsValue) -> Self {
            WorkerError::Js(JsError::from(value))
        }
    }

    impl From<serde_json::Error> for WorkerError {
        fn from(value: serde_json::Error) -> Self {
            WorkerError::Serde(value.to_string())
        }
    }

    impl From<WorkerError> for JsValue {
        fn from(value: WorkerError) -> Self {
            JsValue::from_str(&value.to_string())
        }
    }
}
