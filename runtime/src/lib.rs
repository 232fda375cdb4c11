//! # Reqflow Runtime
//!
//! Runtime for the reqflow request orchestration engine.
//!
//! This crate wires the core types into the working engine:
//!
//! - **[`RequestExecutor`](executor::RequestExecutor)**: executes one wrapped
//!   operation end-to-end (begin, await, classify, emit, guaranteed terminal
//!   event)
//! - **[`AuthErrorGate`](auth_gate::AuthErrorGate)**: single-slot holder and
//!   correlation dedup for session-expiry signals
//! - **[`PresentationRouter`](router::PresentationRouter)**: consumes the
//!   event stream and maps events to concrete feedback surfaces
//! - **[`Controller`](controller::Controller)**: the composition root owning
//!   one executor and one router per presentation lifetime
//!
//! ## Ordering Guarantees
//!
//! For any single invocation, the event order observed by a subscriber
//! present for the whole invocation is exactly
//! `Begin, LogicEnd, [Error | Empty]?, End`, and `LogicEnd` always precedes
//! the resolved payload being visible to the caller. All events of one
//! invocation are published from the task driving `execute`, never
//! concurrently with each other; the wrapped operation itself runs on the
//! runtime's worker scheduler.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use reqflow_core::config::{CorrelationId, RequestConfig};
//! use reqflow_core::environment::{SequenceIds, SystemClock};
//! use reqflow_core::error::AuthCodeSet;
//! use reqflow_core::response::Response;
//! use reqflow_runtime::executor::RequestExecutor;
//! use reqflow_runtime::EngineConfig;
//!
//! # tokio_test::block_on(async {
//! let engine = EngineConfig::default().with_auth_codes(AuthCodeSet::new([401]));
//! let executor = RequestExecutor::new(engine, Arc::new(SystemClock), Arc::new(SequenceIds::new()));
//!
//! let config = RequestConfig::new(CorrelationId::new(1));
//! let value = executor
//!     .execute(config, false, || async { Ok(Response::ok("payload")) })
//!     .await;
//!
//! assert_eq!(value.as_deref(), Some("payload"));
//! # });
//! ```

use reqflow_core::channel::DEFAULT_TRANSIENT_CAPACITY;
use reqflow_core::error::{codes, AuthCodeSet};

/// One-invocation orchestration: begin → await → classify → emit → end.
pub mod executor;

/// Single-slot dedup holder for session-expiry signals.
pub mod auth_gate;

/// Presentation-side event consumption and feedback dispatch.
pub mod router;

/// Composition root: one executor plus one router per presentation lifetime.
pub mod controller;

pub use auth_gate::{AuthErrorGate, AuthStatus};
pub use controller::{Controller, ErrorRoutable, Loadable, Navigable};
pub use executor::RequestExecutor;
pub use router::{PresentationRouter, RouterState};

/// Engine-wide configuration.
///
/// Constructed once per session and passed into each controller at
/// construction time; there is no process-wide configuration holder. The
/// auth-code classification table is fixed for the lifetime of the engine.
///
/// # Example
///
/// ```
/// use reqflow_core::error::AuthCodeSet;
/// use reqflow_runtime::EngineConfig;
///
/// let engine = EngineConfig::default()
///     .with_auth_codes(AuthCodeSet::new([401, 402]))
///     .with_event_capacity(32);
///
/// assert!(engine.auth_codes().contains(401));
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    auth_codes: AuthCodeSet,
    fallback_error_msg: String,
    event_capacity: usize,
}

impl EngineConfig {
    /// Set the auth-error classification table.
    #[must_use]
    pub fn with_auth_codes(mut self, auth_codes: AuthCodeSet) -> Self {
        self.auth_codes = auth_codes;
        self
    }

    /// Set the message used for local failures that carry none of their own.
    #[must_use]
    pub fn with_fallback_error_msg(mut self, msg: impl Into<String>) -> Self {
        self.fallback_error_msg = msg.into();
        self
    }

    /// Set the request-event channel's per-subscriber buffer capacity.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// The auth-error classification table.
    #[must_use]
    pub const fn auth_codes(&self) -> &AuthCodeSet {
        &self.auth_codes
    }

    /// The fallback message for local failures.
    #[must_use]
    pub fn fallback_error_msg(&self) -> &str {
        &self.fallback_error_msg
    }

    /// The request-event channel capacity.
    #[must_use]
    pub const fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auth_codes: AuthCodeSet::empty(),
            fallback_error_msg: codes::FALLBACK_SERVICE_MSG.to_string(),
            event_capacity: DEFAULT_TRANSIENT_CAPACITY,
        }
    }
}
