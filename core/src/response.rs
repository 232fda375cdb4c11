//! The wrapped-operation result contract.
//!
//! The engine imposes no transport or serialization format; a wrapped
//! operation resolves to a [`Response`] and that is the sole boundary to
//! networking. Classification reads only the four fields defined here.

use crate::error::codes;
use serde::{Deserialize, Serialize};

/// The result a wrapped operation reports back to the engine.
///
/// # Classification
///
/// - `success && data.is_some()` → payload returned to the caller
/// - `success && data.is_none()` → empty-data policy applies
/// - `!success` → the code selects the auth path or the business-error path
///
/// # Examples
///
/// ```
/// use reqflow_core::response::Response;
///
/// let ok = Response::ok("payload");
/// assert!(ok.is_success());
///
/// let fail: Response<String> = Response::fail(500, Some("server down"));
/// assert_eq!(fail.code(), 500);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    success: bool,
    code: i32,
    msg: Option<String>,
    data: Option<T>,
}

impl<T> Response<T> {
    /// A successful response carrying a payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            code: codes::SUCCESS,
            msg: None,
            data: Some(data),
        }
    }

    /// A successful response with no payload.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            success: true,
            code: codes::SUCCESS,
            msg: None,
            data: None,
        }
    }

    /// A failed response with the given code and message.
    #[must_use]
    pub fn fail(code: i32, msg: Option<&str>) -> Self {
        Self {
            success: false,
            code,
            msg: msg.map(str::to_string),
            data: None,
        }
    }

    /// Whether the operation reported success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// The result code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// The human-readable message, if any.
    #[must_use]
    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// Borrow the payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Split the response into its classification fields and payload.
    #[must_use]
    pub fn into_parts(self) -> (bool, i32, Option<String>, Option<T>) {
        (self.success, self.code, self.msg, self.data)
    }
}
