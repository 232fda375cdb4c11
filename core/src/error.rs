//! Classified error values.
//!
//! The engine converts every failed invocation into an [`ErrorModel`] before
//! a presentation ever sees it: transport/server failures carry the wire
//! code, empty-data promotions carry the reserved [`codes::EMPTY_DATA`] code,
//! and local failures carry [`codes::LOCAL_FAILURE`] with a fallback message
//! when the underlying error has none. Authentication-expiry failures are
//! wrapped in an [`AuthError`] and bypass generic routing entirely.

use crate::config::ShowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Reserved result codes and fallback strings.
pub mod codes {
    /// Code reported by a successful operation.
    pub const SUCCESS: i32 = 0;

    /// Reserved code for success-with-no-data promoted to an error.
    pub const EMPTY_DATA: i32 = -2;

    /// Code for failures raised locally (inside the operation or during
    /// classification) rather than reported by the server.
    pub const LOCAL_FAILURE: i32 = -1;

    /// Fallback message used when a local failure carries no message of its
    /// own.
    pub const FALLBACK_SERVICE_MSG: &str = "Service error, please try again later";

    /// Message attached to promoted empty-data errors when the response
    /// carried none.
    pub const EMPTY_DATA_MSG: &str = "No data returned";
}

/// Unique identifier of one materialized error value.
///
/// Result ids come from the injected
/// [`IdGenerator`](crate::environment::IdGenerator) and are what makes
/// auth-expiry consumption idempotent: consuming with a stale id is a no-op.
///
/// # Examples
///
/// ```
/// use reqflow_core::error::ResultId;
///
/// let id = ResultId::new(7);
/// assert_eq!(id.value(), 7);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(i64);

impl ResultId {
    /// Sentinel for error values synthesized at the presentation edge, which
    /// never participate in consumption.
    pub const UNSPECIFIED: Self = Self(0);

    /// Create a new `ResultId` with the given value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResultId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A classified error value routed to a presentation channel.
///
/// Owned by whichever component last read it and discarded after routing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorModel {
    code: i32,
    msg: Option<String>,
    show_type: ShowType,
    result_id: ResultId,
    timestamp: DateTime<Utc>,
}

impl ErrorModel {
    /// Create a new error value.
    #[must_use]
    pub const fn new(
        code: i32,
        msg: Option<String>,
        show_type: ShowType,
        result_id: ResultId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            msg,
            show_type,
            result_id,
            timestamp,
        }
    }

    /// Create a display-only error value for presentation-edge synthesis
    /// (e.g. rendering an `Empty` event). Carries the
    /// [`ResultId::UNSPECIFIED`] sentinel and the current time.
    #[must_use]
    pub fn display_only(code: i32, msg: Option<String>, show_type: ShowType) -> Self {
        Self::new(code, msg, show_type, ResultId::UNSPECIFIED, Utc::now())
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

    /// The presentation channel this error routes to.
    #[must_use]
    pub const fn show_type(&self) -> ShowType {
        self.show_type
    }

    /// The unique id of this error value.
    #[must_use]
    pub const fn result_id(&self) -> ResultId {
        self.result_id
    }

    /// When this error value was materialized.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Override the presentation channel.
    #[must_use]
    pub const fn with_show_type(mut self, show_type: ShowType) -> Self {
        self.show_type = show_type;
        self
    }

    /// Override the message.
    #[must_use]
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }
}

impl fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msg {
            Some(msg) => write!(f, "[{}] {msg}", self.code),
            None => write!(f, "[{}]", self.code),
        }
    }
}

/// An authentication-expiry error.
///
/// Auth errors pre-empt generic error routing: they are held in the
/// [`AuthErrorGate`](https://docs.rs/reqflow-runtime) single slot and
/// surfaced through its replayed status channel, never through the generic
/// `Error` event. The `consumed` flag is one-shot: a consumer marks its copy
/// after acting on it so re-deliveries are visibly stale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthError {
    error: ErrorModel,
    session_expired: bool,
    consumed: bool,
}

impl AuthError {
    /// Wrap a classified error value as an auth-expiry signal.
    #[must_use]
    pub const fn new(error: ErrorModel, session_expired: bool) -> Self {
        Self {
            error,
            session_expired,
            consumed: false,
        }
    }

    /// The underlying error value.
    #[must_use]
    pub const fn error(&self) -> &ErrorModel {
        &self.error
    }

    /// Whether the session is known to be expired (as opposed to e.g. a
    /// login-elsewhere kick).
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        self.session_expired
    }

    /// The unique id of the underlying error value.
    #[must_use]
    pub const fn result_id(&self) -> ResultId {
        self.error.result_id()
    }

    /// Whether this signal was already acted upon.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Mark this signal as acted upon. Idempotent.
    pub const fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "auth error {} (session_expired: {})",
            self.error, self.session_expired
        )
    }
}

/// The fixed-per-deployment set of result codes classified as
/// authentication-expiry.
///
/// The classification table is externally configurable but fixed once the
/// engine is constructed: codes in the set take the auth path, everything
/// else is business/transport.
///
/// # Examples
///
/// ```
/// use reqflow_core::error::AuthCodeSet;
///
/// let codes = AuthCodeSet::new([401, 402]);
/// assert!(codes.contains(401));
/// assert!(!codes.contains(500));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCodeSet(HashSet<i32>);

impl AuthCodeSet {
    /// Build a code set from the given codes.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self(codes.into_iter().collect())
    }

    /// An empty set: no code is classified as auth-expiry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the given code is classified as auth-expiry.
    #[must_use]
    pub fn contains(&self, code: i32) -> bool {
        self.0.contains(&code)
    }

    /// Number of codes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<i32> for AuthCodeSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(code: i32, msg: Option<&str>) -> ErrorModel {
        ErrorModel::new(
            code,
            msg.map(str::to_string),
            ShowType::Toast,
            ResultId::new(1),
            Utc::now(),
        )
    }

    #[test]
    fn error_model_accessors() {
        let error = model(500, Some("server down"));
        assert_eq!(error.code(), 500);
        assert_eq!(error.msg(), Some("server down"));
        assert_eq!(error.show_type(), ShowType::Toast);
        assert_eq!(error.result_id(), ResultId::new(1));
    }

    #[test]
    fn error_model_overrides() {
        let error = model(500, None)
            .with_show_type(ShowType::View)
            .with_msg("replaced");
        assert_eq!(error.show_type(), ShowType::View);
        assert_eq!(error.msg(), Some("replaced"));
    }

    #[test]
    fn error_model_display() {
        assert_eq!(format!("{}", model(500, Some("down"))), "[500] down");
        assert_eq!(format!("{}", model(500, None)), "[500]");
    }

    #[test]
    fn display_only_carries_sentinel_id() {
        let error = ErrorModel::display_only(codes::EMPTY_DATA, None, ShowType::Toast);
        assert_eq!(error.result_id(), ResultId::UNSPECIFIED);
    }

    #[test]
    fn auth_error_consumption_flag() {
        let mut auth = AuthError::new(model(401, Some("expired")), true);
        assert!(!auth.is_consumed());
        auth.mark_consumed();
        assert!(auth.is_consumed());
        auth.mark_consumed();
        assert!(auth.is_consumed());
    }

    #[test]
    fn auth_code_set_membership() {
        let set = AuthCodeSet::new([401, 402, 407]);
        assert!(set.contains(401));
        assert!(set.contains(407));
        assert!(!set.contains(500));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn auth_code_set_empty() {
        let set = AuthCodeSet::empty();
        assert!(set.is_empty());
        assert!(!set.contains(401));
    }

    #[test]
    fn auth_code_set_from_iterator() {
        let set: AuthCodeSet = [1, 2, 2, 3].into_iter().collect();
        assert_eq!(set.len(), 3);
    }
}
