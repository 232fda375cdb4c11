//! The request lifecycle event stream.
//!
//! Every invocation publishes an ordered sequence of [`RequestEvent`]s on its
//! controller's channel. For any single invocation, a subscriber present for
//! the whole invocation observes exactly:
//!
//! ```text
//! Begin, LogicEnd, [Error | Empty]?, End
//! ```
//!
//! - `Begin` occurs exactly once and strictly first
//! - `LogicEnd` occurs exactly once, after `Begin`, and before the resolved
//!   payload is visible to the caller
//! - at most one of `Error`/`Empty` occurs; success-with-data produces
//!   neither
//! - `End` occurs exactly once and strictly last, on every code path
//!   including local failures and abandoned invocations

use crate::config::RequestConfig;
use crate::error::ErrorModel;

/// One lifecycle notification of a single invocation.
///
/// Events carry a clone of the invocation's [`RequestConfig`] so subscribers
/// can target per-request feedback without shared lookup state.
#[derive(Clone, Debug)]
pub enum RequestEvent {
    /// The invocation started; the presentation should enter its busy state.
    Begin(RequestConfig),

    /// The operation resolved and classification is about to run; the
    /// presentation should leave its busy state. Published before the caller
    /// receives the payload.
    LogicEnd {
        /// The invocation's config.
        config: RequestConfig,
        /// The resolved result code.
        code: i32,
        /// The resolved result message, if any.
        msg: Option<String>,
    },

    /// The invocation failed with a business/transport error (or a promoted
    /// empty-data error) that no call-site hook intercepted.
    Error {
        /// The invocation's config.
        config: RequestConfig,
        /// The classified error to render.
        error: ErrorModel,
    },

    /// The operation succeeded with no payload and the call-site opted out
    /// of empty-as-error promotion.
    Empty {
        /// The invocation's config.
        config: RequestConfig,
        /// The resolved result code.
        code: i32,
        /// The resolved result message, if any.
        msg: Option<String>,
    },

    /// An application-defined custom action keyed by an integer code.
    Action {
        /// The invocation's config.
        config: RequestConfig,
        /// Application-defined action code.
        action_code: i32,
        /// Opaque payload interpreted by the registered hook.
        extra: Option<serde_json::Value>,
    },

    /// The invocation finished; guaranteed terminal event on every path.
    End(RequestConfig),
}

impl RequestEvent {
    /// The config of the invocation this event belongs to.
    #[must_use]
    pub const fn config(&self) -> &RequestConfig {
        match self {
            Self::Begin(config) | Self::End(config) => config,
            Self::LogicEnd { config, .. }
            | Self::Error { config, .. }
            | Self::Empty { config, .. }
            | Self::Action { config, .. } => config,
        }
    }

    /// A stable identifier for the event kind, for logs and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Begin(_) => "begin",
            Self::LogicEnd { .. } => "logic_end",
            Self::Error { .. } => "error",
            Self::Empty { .. } => "empty",
            Self::Action { .. } => "action",
            Self::End(_) => "end",
        }
    }

    /// Whether this is the guaranteed terminal event.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::End(_))
    }
}
