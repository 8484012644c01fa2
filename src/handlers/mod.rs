// Route handlers, one async function per method + path.
//
// Every handler follows the same order: route parameters, then session,
// then body validation, then exactly one controller call. The whole sequence
// runs inside `guarded`, so nothing escapes to the framework as a raw error.

pub mod notification;
pub mod organization;
pub mod project;
pub mod root;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use serde_json::Value;

use crate::error::{default_server_error_response, ApiError};
use crate::schema::{parse_value_to_schema, FormSchema};

/// Runs a handler body, turning errors and panics into the generic 500
pub async fn guarded<F>(route: &'static str, handler: F) -> Response
where
    F: Future<Output = anyhow::Result<Response>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            tracing::error!(route, error = ?error, "Unhandled error in route handler");
            default_server_error_response()
        }
        Err(panic) => {
            tracing::error!(route, panic = %panic_message(panic.as_ref()), "Route handler panicked");
            default_server_error_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Validates the parsed body, or produces the 400 carrying the first error
pub(crate) fn validate<T: FormSchema>(body: &Value) -> Result<T, Response> {
    parse_value_to_schema::<T>(body.clone())
        .into_result()
        .map_err(|message| ApiError::bad_request(message).into_response())
}
