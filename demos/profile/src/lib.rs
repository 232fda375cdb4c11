//! # Profile Demo
//!
//! A profile-fetch screen built on the reqflow engine.
//!
//! This demo showcases:
//! - Building per-call-site [`RequestConfig`]s in a reserved correlation-id
//!   range
//! - A presentation advertising its capabilities (`Loadable`,
//!   `ErrorRoutable`, `Navigable`) as separate traits
//! - The full classification surface: success, business error, empty data,
//!   and auth expiry with gate consumption
//!
//! ## Example
//!
//! ```
//! use profile::{fetch_profile, ProfileScreen, ids};
//! use reqflow_core::config::RequestConfig;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let screen = Arc::new(ProfileScreen::new());
//! let (controller, _executor) = profile::build_controller(&screen);
//!
//! let config = RequestConfig::new(ids::FETCH_PROFILE);
//! let profile = controller
//!     .execute(config, false, || fetch_profile("ada"))
//!     .await;
//!
//! assert!(profile.is_some());
//! # });
//! ```

use reqflow_core::config::{RequestConfig, ShowType};
use reqflow_core::error::{AuthCodeSet, AuthError, ErrorModel};
use reqflow_core::environment::{SequenceIds, SystemClock};
use reqflow_core::render::{ErrorRenderer, LoadingView};
use reqflow_core::response::Response;
use reqflow_runtime::controller::{Controller, ErrorRoutable, Loadable, Navigable};
use reqflow_runtime::executor::RequestExecutor;
use reqflow_runtime::EngineConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Correlation ids reserved for the profile module (1100..1200).
pub mod ids {
    use reqflow_core::config::CorrelationId;

    /// Fetch the signed-in user's profile.
    pub const FETCH_PROFILE: CorrelationId = CorrelationId::new(1101);

    /// Update the user's nickname.
    pub const UPDATE_NICKNAME: CorrelationId = CorrelationId::new(1102);
}

/// Result codes the demo backend reports.
pub mod backend_codes {
    /// Session token expired.
    pub const TOKEN_EXPIRED: i32 = 401;

    /// Signed in from another device.
    pub const SESSION_ELSEWHERE: i32 = 402;

    /// Generic server failure.
    pub const SERVER_ERROR: i32 = 500;
}

/// A user profile as reported by the demo backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Account name.
    pub username: String,
    /// Display nickname.
    pub nickname: String,
}

/// Simulated fetch operation: known users resolve, `"expired"` triggers the
/// auth path, `"ghost"` resolves successfully with no data, anything else is
/// a server error.
///
/// # Errors
///
/// Never returns `Err`; failures are reported through the [`Response`]
/// contract the way a transport layer would.
pub async fn fetch_profile(username: &str) -> anyhow::Result<Response<Profile>> {
    match username {
        "ada" => Ok(Response::ok(Profile {
            username: "ada".to_string(),
            nickname: "Countess".to_string(),
        })),
        "expired" => Ok(Response::fail(
            backend_codes::TOKEN_EXPIRED,
            Some("session expired"),
        )),
        "ghost" => Ok(Response::ok_empty()),
        _ => Ok(Response::fail(
            backend_codes::SERVER_ERROR,
            Some("profile service unavailable"),
        )),
    }
}

/// Console notice renderer: the demo's lightweight feedback channel.
#[derive(Debug, Default)]
pub struct ConsoleNotice;

impl ErrorRenderer for ConsoleNotice {
    fn render(&self, config: &RequestConfig, error: &ErrorModel) {
        tracing::info!(
            correlation_id = %config.correlation_id(),
            code = error.code(),
            msg = error.msg().unwrap_or("(no message)"),
            "notice"
        );
    }
}

/// Console dialog renderer standing in for the two-button conventional
/// dialog.
#[derive(Debug, Default)]
pub struct ConsoleDialog;

impl ErrorRenderer for ConsoleDialog {
    fn render(&self, config: &RequestConfig, error: &ErrorModel) {
        tracing::info!(
            title = config.title().unwrap_or("Error"),
            submit = config.submit_text().unwrap_or("OK"),
            cancel = config.cancel_text().unwrap_or("Cancel"),
            code = error.code(),
            msg = error.msg().unwrap_or("(no message)"),
            "dialog"
        );
    }
}

/// Console loading surface.
#[derive(Debug, Default)]
pub struct ConsoleLoading;

impl LoadingView for ConsoleLoading {
    fn loading_started(&self, config: &RequestConfig) {
        tracing::info!(correlation_id = %config.correlation_id(), "loading…");
    }

    fn loading_finished(&self, config: &RequestConfig) {
        tracing::info!(correlation_id = %config.correlation_id(), "loading done");
    }
}

/// The demo presentation: advertises its capabilities as separate traits
/// instead of inheriting controller behavior.
#[derive(Debug, Default)]
pub struct ProfileScreen {
    reauth_requests: AtomicUsize,
}

impl ProfileScreen {
    /// Create the screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the screen was asked to re-authenticate.
    #[must_use]
    pub fn reauth_requests(&self) -> usize {
        self.reauth_requests.load(Ordering::SeqCst)
    }
}

impl Loadable for ProfileScreen {
    fn loading_view(&self) -> Arc<dyn LoadingView> {
        Arc::new(ConsoleLoading)
    }
}

impl ErrorRoutable for ProfileScreen {
    fn notice_renderer(&self) -> Box<dyn ErrorRenderer> {
        Box::new(ConsoleNotice)
    }

    fn renderers(&self) -> Vec<(ShowType, Box<dyn ErrorRenderer>)> {
        vec![(ShowType::Conventional, Box::new(ConsoleDialog))]
    }
}

impl Navigable for ProfileScreen {
    fn reauthenticate(&self, error: &AuthError) {
        self.reauth_requests.fetch_add(1, Ordering::SeqCst);
        tracing::warn!(
            result_id = %error.result_id(),
            session_expired = error.is_session_expired(),
            "navigating to sign-in"
        );
    }
}

/// The demo's engine configuration: token-expiry and session-elsewhere codes
/// take the auth path.
#[must_use]
pub fn engine_config() -> EngineConfig {
    EngineConfig::default().with_auth_codes(AuthCodeSet::new([
        backend_codes::TOKEN_EXPIRED,
        backend_codes::SESSION_ELSEWHERE,
    ]))
}

/// Assemble a controller for the screen, returning the shared executor for
/// direct access to the event stream and auth gate.
#[must_use]
pub fn build_controller(screen: &Arc<ProfileScreen>) -> (Controller, Arc<RequestExecutor>) {
    let executor = Arc::new(
        RequestExecutor::new(
            engine_config(),
            Arc::new(SystemClock),
            Arc::new(SequenceIds::new()),
        )
        .with_loading_view(screen.loading_view()),
    );

    let controller = Controller::from_capabilities(Arc::clone(&executor), screen.as_ref())
        .with_navigator(Arc::clone(screen) as Arc<dyn Navigable>);
    (controller, executor)
}

/// Convenience config for the fetch-profile call-site.
#[must_use]
pub fn fetch_config() -> RequestConfig {
    RequestConfig::new(ids::FETCH_PROFILE)
        .with_title("Profile")
        .with_show_type(ShowType::Conventional)
        .with_submit_text("Retry")
        .with_cancel_text("Dismiss")
}
