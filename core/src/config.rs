//! Invocation descriptors.
//!
//! A [`RequestConfig`] describes one logical invocation: which operation it
//! correlates with, what the presentation should label its feedback with, and
//! which presentation channel renders a failure. Configs are immutable,
//! created per call-site, and discarded once the invocation completes.

use crate::error::ErrorModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Integer tag identifying which logical operation an event belongs to.
///
/// Correlation ids are used purely for log correlation and per-request UI
/// targeting. The namespace is partitioned into reserved ranges per logical
/// module by convention (e.g. `1100..1200` for the profile module); no engine
/// behavior depends on specific numeric values except the
/// [`UNSPECIFIED`](Self::UNSPECIFIED) sentinel.
///
/// # Examples
///
/// ```
/// use reqflow_core::config::CorrelationId;
///
/// let id = CorrelationId::new(1101);
/// assert_eq!(id.value(), 1101);
/// assert!(!id.is_unspecified());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(i32);

impl CorrelationId {
    /// The reserved "default/unspecified" sentinel.
    pub const UNSPECIFIED: Self = Self(0);

    /// Create a new `CorrelationId` with the given value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Check whether this is the reserved unspecified sentinel.
    #[must_use]
    pub const fn is_unspecified(self) -> bool {
        self.0 == Self::UNSPECIFIED.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CorrelationId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<CorrelationId> for i32 {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Declarative selector for which presentation channel renders an error.
///
/// The router dispatches an unintercepted `Error`/`Empty` event to the
/// renderer registered for the config's show-type, falling back to the
/// lightweight notice channel when none is registered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowType {
    /// Lightweight transient notice (the fail-open default).
    #[default]
    Toast,
    /// Single-button confirm dialog.
    Confirm,
    /// Two-button conventional dialog.
    Conventional,
    /// Tips dialog.
    Tips,
    /// Inline error-state view.
    View,
}

impl fmt::Display for ShowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toast => write!(f, "toast"),
            Self::Confirm => write!(f, "confirm"),
            Self::Conventional => write!(f, "conventional"),
            Self::Tips => write!(f, "tips"),
            Self::View => write!(f, "view"),
        }
    }
}

/// Reshapes the engine-built [`ErrorModel`] for a single call-site.
///
/// The executor constructs the default error value (code, message, the
/// config's show-type, a fresh result id, a timestamp) and hands it to the
/// factory, which owns the final shape. This replaces field-poking the error
/// after the fact: overriding the show-type or message is part of the
/// config's public contract.
pub type ErrorFactory = Arc<dyn Fn(ErrorModel) -> ErrorModel + Send + Sync>;

/// Immutable descriptor of one logical invocation.
///
/// Created per call-site with builder-style `with_*` methods and discarded
/// after the invocation completes. Every [`RequestEvent`](crate::event::RequestEvent)
/// of an invocation carries a clone of its config so subscribers can target
/// feedback without shared lookup state.
///
/// # Examples
///
/// ```
/// use reqflow_core::config::{CorrelationId, RequestConfig, ShowType};
///
/// let config = RequestConfig::new(CorrelationId::new(1101))
///     .with_title("Delete account")
///     .with_submit_text("Delete")
///     .with_cancel_text("Keep it")
///     .with_show_type(ShowType::Conventional);
///
/// assert_eq!(config.title(), Some("Delete account"));
/// ```
#[derive(Clone)]
pub struct RequestConfig {
    correlation_id: CorrelationId,
    title: Option<String>,
    submit_text: Option<String>,
    cancel_text: Option<String>,
    show_type: ShowType,
    error_factory: Option<ErrorFactory>,
}

impl RequestConfig {
    /// Create a config for the given correlation id with default show-type
    /// ([`ShowType::Toast`]) and no texts.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            title: None,
            submit_text: None,
            cancel_text: None,
            show_type: ShowType::Toast,
            error_factory: None,
        }
    }

    /// Set the dialog/notice title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the submit button text.
    #[must_use]
    pub fn with_submit_text(mut self, text: impl Into<String>) -> Self {
        self.submit_text = Some(text.into());
        self
    }

    /// Set the cancel button text.
    #[must_use]
    pub fn with_cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    /// Set the presentation show-type.
    #[must_use]
    pub const fn with_show_type(mut self, show_type: ShowType) -> Self {
        self.show_type = show_type;
        self
    }

    /// Install a call-site error factory.
    #[must_use]
    pub fn with_error_factory(mut self, factory: ErrorFactory) -> Self {
        self.error_factory = Some(factory);
        self
    }

    /// The correlation id of this invocation.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// The dialog/notice title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The submit button text, if any.
    #[must_use]
    pub fn submit_text(&self) -> Option<&str> {
        self.submit_text.as_deref()
    }

    /// The cancel button text, if any.
    #[must_use]
    pub fn cancel_text(&self) -> Option<&str> {
        self.cancel_text.as_deref()
    }

    /// The presentation show-type.
    #[must_use]
    pub const fn show_type(&self) -> ShowType {
        self.show_type
    }

    /// Apply the call-site error factory, if one is installed.
    #[must_use]
    pub fn shape_error(&self, error: ErrorModel) -> ErrorModel {
        match &self.error_factory {
            Some(factory) => factory(error),
            None => error,
        }
    }
}

// Manual Debug implementation since the error factory closure doesn't implement Debug
impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("correlation_id", &self.correlation_id)
            .field("title", &self.title)
            .field("submit_text", &self.submit_text)
            .field("cancel_text", &self.cancel_text)
            .field("show_type", &self.show_type)
            .field("error_factory", &self.error_factory.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResultId;
    use chrono::Utc;

    #[test]
    fn unspecified_sentinel() {
        assert!(CorrelationId::UNSPECIFIED.is_unspecified());
        assert!(!CorrelationId::new(1).is_unspecified());
    }

    #[test]
    fn correlation_id_conversions() {
        let id = CorrelationId::from(42);
        assert_eq!(id.value(), 42);

        let raw: i32 = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = RequestConfig::new(CorrelationId::new(7))
            .with_title("title")
            .with_submit_text("ok")
            .with_cancel_text("cancel")
            .with_show_type(ShowType::Tips);

        assert_eq!(config.correlation_id(), CorrelationId::new(7));
        assert_eq!(config.title(), Some("title"));
        assert_eq!(config.submit_text(), Some("ok"));
        assert_eq!(config.cancel_text(), Some("cancel"));
        assert_eq!(config.show_type(), ShowType::Tips);
    }

    #[test]
    fn default_show_type_is_toast() {
        let config = RequestConfig::new(CorrelationId::UNSPECIFIED);
        assert_eq!(config.show_type(), ShowType::Toast);
    }

    #[test]
    fn shape_error_without_factory_is_identity() {
        let config = RequestConfig::new(CorrelationId::new(1));
        let error = ErrorModel::new(500, Some("boom".to_string()), ShowType::Toast, ResultId::new(1), Utc::now());
        let shaped = config.shape_error(error.clone());
        assert_eq!(shaped, error);
    }

    #[test]
    fn shape_error_applies_factory() {
        let config = RequestConfig::new(CorrelationId::new(1)).with_error_factory(Arc::new(|error| {
            error.with_show_type(ShowType::View)
        }));

        let error = ErrorModel::new(500, None, ShowType::Toast, ResultId::new(1), Utc::now());
        let shaped = config.shape_error(error);
        assert_eq!(shaped.show_type(), ShowType::View);
    }

    #[test]
    fn show_type_display() {
        assert_eq!(format!("{}", ShowType::Toast), "toast");
        assert_eq!(format!("{}", ShowType::Conventional), "conventional");
    }
}
