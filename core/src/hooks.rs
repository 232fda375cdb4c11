//! Interception hooks.
//!
//! Hooks are the two override surfaces of the engine:
//!
//! - [`RequestHooks`] is consulted by the executor during classification,
//!   before anything is published.
//! - [`PresentationHook`] is consulted by the router after classification,
//!   before an event is rendered.
//!
//! Every method has a pass-through default so implementors override only
//! what they need. A hook can suppress an event but can never cause a second
//! `Error`/`Empty` to be published for the same invocation.

use crate::config::{CorrelationId, RequestConfig};
use crate::error::ErrorModel;
use crate::event::RequestEvent;

/// Call-site interception consulted by the executor.
pub trait RequestHooks: Send + Sync {
    /// Called on success-with-data before the payload is returned. Return
    /// `true` to consume the result: the caller then receives `None` and no
    /// further event is published.
    fn intercept_success(&self, _config: &RequestConfig) -> bool {
        false
    }

    /// Called when the operation succeeded with no payload, before the
    /// empty-data policy is applied.
    fn on_empty_data(&self, _config: &RequestConfig) {}

    /// Whether success-with-no-data is promoted to an error for this
    /// correlation id. Defaults to `true` (promote).
    fn empty_as_error(&self, _correlation_id: CorrelationId) -> bool {
        true
    }

    /// Called before a business error is published. Return `true` to swallow
    /// it: no `Error` event is published for this invocation.
    fn intercept_error(&self, _config: &RequestConfig, _error: &ErrorModel) -> bool {
        false
    }
}

/// The pass-through [`RequestHooks`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestHooks;

impl RequestHooks for DefaultRequestHooks {}

/// Presentation-side interception consulted by the router.
///
/// Hooks form a chain: the first hook whose [`intercept`](Self::intercept)
/// returns `true` handles the event and stops dispatch.
pub trait PresentationHook: Send + Sync {
    /// Inspect an `Error`/`Empty` event before it is rendered. Return `true`
    /// to mark it handled; the router then takes no further action.
    fn intercept(&self, _event: &RequestEvent) -> bool {
        false
    }

    /// Handle an application-defined custom action.
    fn on_action(
        &self,
        _config: &RequestConfig,
        _action_code: i32,
        _extra: Option<&serde_json::Value>,
    ) {
    }
}
