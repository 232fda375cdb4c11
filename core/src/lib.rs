//! # Reqflow Core
//!
//! Core types for the reqflow request orchestration engine.
//!
//! This crate provides the data model and the seams through which a
//! presentation layer talks to the engine:
//!
//! - **`RequestConfig`**: immutable descriptor of one logical invocation
//! - **`ErrorModel` / `AuthError`**: classified error values
//! - **`Response`**: the sole contract with the transport layer
//! - **`RequestEvent`**: the ordered lifecycle event stream
//! - **`EventChannel`**: lifecycle-scoped multicast delivery (transient or
//!   replayed retention)
//! - **Hooks and renderer traits**: narrow interfaces implemented by the
//!   presentation, never by the engine
//!
//! ## Architecture Principles
//!
//! - Classification happens once, inside the engine; presentations only ever
//!   see already-classified events
//! - Explicit dependencies (clock, id generation) injected at construction
//! - Interfaces at the seams: rendering, loading surfaces, and navigation
//!   are collaborators the engine invokes but does not implement
//!
//! ## Example
//!
//! ```
//! use reqflow_core::config::{CorrelationId, RequestConfig, ShowType};
//!
//! let config = RequestConfig::new(CorrelationId::new(1101))
//!     .with_title("Sign in")
//!     .with_show_type(ShowType::Conventional);
//!
//! assert_eq!(config.show_type(), ShowType::Conventional);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Invocation descriptors: correlation ids, show-types, `RequestConfig`.
pub mod config;

/// Classified error values and the auth-code classification table.
pub mod error;

/// The wrapped-operation result contract (`Response`).
pub mod response;

/// The request lifecycle event stream (`RequestEvent`).
pub mod event;

/// Multicast event channels with transient or replayed retention.
pub mod channel;

/// Interception hooks for call sites and presentations.
pub mod hooks;

/// Renderer and loading-surface traits consumed by the router.
pub mod render;

/// Injected environment dependencies (clock, id generation).
pub mod environment;

pub use channel::{ChannelError, EventChannel, Retention, Subscription};
pub use config::{CorrelationId, RequestConfig, ShowType};
pub use error::{AuthCodeSet, AuthError, ErrorModel, ResultId};
pub use event::RequestEvent;
pub use response::Response;
