//! Single-slot dedup holder for session-expiry signals.
//!
//! Auth-expiry failures bypass generic error routing entirely: the executor
//! stores them in the gate, and the presentation reacts through the gate's
//! replayed status channel. The slot has exactly one writer (the executor's
//! auth path) and one external mutator (the presentation's explicit
//! [`consume`](AuthErrorGate::consume) call).
//!
//! # Dedup Semantics
//!
//! - Storing is last-write-wins; overwriting a still-unconsumed signal is
//!   logged so re-delivery storms stay visible.
//! - Consumption is idempotent per [`ResultId`]: consuming with the held
//!   id clears the slot, consuming with a stale id (or an empty slot) is a
//!   no-op logged as a stale/duplicate signal.
//!
//! Because the status channel replays its latest value, a freshly-attached
//! presentation immediately learns whether an expiry signal is pending.

use reqflow_core::channel::{EventChannel, Subscription};
use reqflow_core::error::{AuthError, ResultId};
use std::sync::{Arc, Mutex};

/// The gate's observable state, broadcast on a replayed channel.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthStatus {
    /// An unconsumed session-expiry signal is pending.
    Pending(AuthError),
    /// No session-expiry signal is pending.
    Cleared,
}

/// Single-slot holder with correlation-id dedup for session-expiry signals.
///
/// Cloning the gate clones handles to the same slot and status channel.
///
/// # Examples
///
/// ```
/// use reqflow_core::config::ShowType;
/// use reqflow_core::error::{AuthError, ErrorModel, ResultId};
/// use reqflow_runtime::auth_gate::AuthErrorGate;
/// use chrono::Utc;
///
/// let gate = AuthErrorGate::new();
/// let error = ErrorModel::new(401, None, ShowType::Toast, ResultId::new(7), Utc::now());
/// gate.store(AuthError::new(error, true));
///
/// assert!(gate.consume(ResultId::new(7)));
/// assert!(!gate.consume(ResultId::new(7))); // idempotent
/// ```
#[derive(Clone, Debug)]
pub struct AuthErrorGate {
    slot: Arc<Mutex<Option<AuthError>>>,
    status: EventChannel<AuthStatus>,
}

impl AuthErrorGate {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            status: EventChannel::replayed(),
        }
    }

    /// Store a session-expiry signal. Last-write-wins.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub fn store(&self, error: AuthError) {
        let mut slot = self.slot.lock().unwrap();

        if let Some(previous) = slot.as_ref() {
            if !previous.is_consumed() {
                tracing::warn!(
                    previous = %previous.result_id(),
                    incoming = %error.result_id(),
                    "overwriting unconsumed auth error"
                );
            }
        }

        metrics::counter!("auth_gate.stored").increment(1);
        *slot = Some(error.clone());
        drop(slot);

        self.status.publish(AuthStatus::Pending(error));
    }

    /// The currently pending signal, if any.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    #[must_use]
    pub fn pending(&self) -> Option<AuthError> {
        self.slot.lock().unwrap().clone()
    }

    /// Acknowledge the signal with the given id.
    ///
    /// Returns `true` and clears the slot when `result_id` matches the held
    /// signal; otherwise the held signal is left unchanged and the call is
    /// logged as stale/duplicate.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub fn consume(&self, result_id: ResultId) -> bool {
        let mut slot = self.slot.lock().unwrap();

        match slot.as_ref() {
            Some(held) if held.result_id() == result_id => {
                *slot = None;
                drop(slot);

                tracing::debug!(result_id = %result_id, "auth error consumed");
                metrics::counter!("auth_gate.consumed").increment(1);

                self.status.publish(AuthStatus::Cleared);
                true
            }
            Some(held) => {
                tracing::debug!(
                    held = %held.result_id(),
                    stale = %result_id,
                    "stale auth consume ignored"
                );
                metrics::counter!("auth_gate.stale").increment(1);
                false
            }
            None => {
                tracing::debug!(stale = %result_id, "auth consume on empty slot ignored");
                metrics::counter!("auth_gate.stale").increment(1);
                false
            }
        }
    }

    /// Subscribe to the gate's status. Replays the latest status to late
    /// subscribers.
    #[must_use]
    pub fn subscribe_status(&self) -> Subscription<AuthStatus> {
        self.status.subscribe()
    }
}

impl Default for AuthErrorGate {
    fn default() -> Self {
        Self::new()
    }
}
