//! One-invocation orchestration.
//!
//! [`RequestExecutor::execute`] wraps a single asynchronous operation and
//! turns its outcome into the ordered event stream the presentation consumes:
//! publish `Begin`, await the operation, publish `LogicEnd`, classify,
//! publish at most one of `Error`/`Empty`, and always publish `End` on every
//! exit path, including local failures, panics inside the operation, and the
//! executing scope being dropped mid-flight.
//!
//! # Suspension and Scheduling
//!
//! The operation is the sole suspension point. It is spawned onto the
//! runtime so that an invocation abandoned by its owning scope keeps running
//! to completion instead of being aborted. Everything else (classification
//! and every publish) runs synchronously on the task driving `execute`, so
//! no two events of the same invocation are ever published concurrently.
//!
//! # Classification
//!
//! | Outcome | Path |
//! |---|---|
//! | success, data | payload returned (unless success hook intercepts) |
//! | success, no data | empty-data policy: promote to `Error` (default) or publish `Empty` |
//! | failure, auth code | [`AuthErrorGate`] slot; generic routing pre-empted |
//! | failure, other code | `Error` event (unless error hook intercepts) |
//! | local failure (`Err`/panic) | `Error` event with fallback message |
//! | abandoned scope | nothing routed, nothing logged as failure; `End` only |

use crate::auth_gate::AuthErrorGate;
use crate::EngineConfig;
use reqflow_core::channel::{EventChannel, Subscription};
use reqflow_core::config::RequestConfig;
use reqflow_core::environment::{Clock, IdGenerator};
use reqflow_core::error::{codes, AuthError, ErrorModel};
use reqflow_core::event::RequestEvent;
use reqflow_core::hooks::{DefaultRequestHooks, RequestHooks};
use reqflow_core::render::LoadingView;
use reqflow_core::response::Response;
use std::future::Future;
use std::sync::Arc;

/// Orchestrates one wrapped operation end-to-end.
///
/// An executor is owned by exactly one controller. Distinct invocations on
/// the same executor are independent and may run concurrently; the ordering
/// guarantees hold per invocation.
pub struct RequestExecutor {
    events: EventChannel<RequestEvent>,
    gate: AuthErrorGate,
    hooks: Arc<dyn RequestHooks>,
    loading: Option<Arc<dyn LoadingView>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    engine: EngineConfig,
}

impl RequestExecutor {
    /// Create an executor with the given engine configuration and injected
    /// environment.
    #[must_use]
    pub fn new(engine: EngineConfig, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            events: EventChannel::transient(engine.event_capacity()),
            gate: AuthErrorGate::new(),
            hooks: Arc::new(DefaultRequestHooks),
            loading: None,
            clock,
            ids,
            engine,
        }
    }

    /// Install call-site interception hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Install the blocking loading surface invoked for `show_loading`
    /// invocations.
    #[must_use]
    pub fn with_loading_view(mut self, loading: Arc<dyn LoadingView>) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Attach a subscriber to the request-event stream.
    ///
    /// The stream is transient: a subscriber only observes events of
    /// invocations that publish while it is attached.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<RequestEvent> {
        self.events.subscribe()
    }

    /// The session-expiry gate fed by this executor's auth path.
    #[must_use]
    pub const fn auth_gate(&self) -> &AuthErrorGate {
        &self.gate
    }

    /// Publish an application-defined custom action on the event stream.
    pub fn publish_action(
        &self,
        config: &RequestConfig,
        action_code: i32,
        extra: Option<serde_json::Value>,
    ) {
        self.events.publish(RequestEvent::Action {
            config: config.clone(),
            action_code,
            extra,
        });
    }

    /// Execute one wrapped operation.
    ///
    /// Publishes `Begin`, awaits `op`, publishes `LogicEnd` before the
    /// payload is handed back, classifies the outcome, and always publishes
    /// `End` last. Returns the payload on unintercepted success-with-data,
    /// `None` otherwise.
    ///
    /// Dropping the returned future mid-flight (the owning scope ended)
    /// leaves the spawned operation running to completion; the terminal
    /// `End` is published at drop and is simply undelivered if the
    /// subscription was already released.
    #[tracing::instrument(
        skip(self, config, op),
        fields(correlation_id = %config.correlation_id())
    )]
    pub async fn execute<T, F, Fut>(
        &self,
        config: RequestConfig,
        show_loading: bool,
        op: F,
    ) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Response<T>>> + Send + 'static,
    {
        metrics::counter!("executor.requests.total").increment(1);

        if show_loading {
            if let Some(loading) = &self.loading {
                loading.loading_started(&config);
            }
        }

        self.events.publish(RequestEvent::Begin(config.clone()));
        let _end_guard = EndGuard::new(self.events.clone(), config.clone());

        let started = std::time::Instant::now();
        let joined = tokio::spawn(op()).await;
        metrics::histogram!("executor.operation.duration_seconds")
            .record(started.elapsed().as_secs_f64());

        // Loading must clear before classification so the surface is
        // responsive while feedback is being dispatched.
        if show_loading {
            if let Some(loading) = &self.loading {
                loading.loading_finished(&config);
            }
        }

        match joined {
            Ok(Ok(response)) => self.classify(&config, response),
            Ok(Err(error)) => {
                self.local_failure(&config, error.to_string());
                None
            }
            Err(join_error) if join_error.is_cancelled() => {
                // An abandoned operation is not a business failure: nothing
                // is routed and nothing is logged as an error.
                tracing::debug!("operation abandoned before completion");
                metrics::counter!("executor.outcome", "class" => "cancelled").increment(1);
                None
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "operation panicked");
                self.local_failure(&config, String::new());
                None
            }
        }
    }

    /// Classify a resolved [`Response`]. `LogicEnd` is published here,
    /// before any payload can reach the caller.
    fn classify<T>(&self, config: &RequestConfig, response: Response<T>) -> Option<T> {
        let (success, code, msg, data) = response.into_parts();

        self.events.publish(RequestEvent::LogicEnd {
            config: config.clone(),
            code,
            msg: msg.clone(),
        });

        if success {
            return self.classify_success(config, code, msg, data);
        }

        if self.engine.auth_codes().contains(code) {
            tracing::warn!(code, "auth-expiry result, pre-empting error routing");
            metrics::counter!("executor.outcome", "class" => "auth").increment(1);

            let error = self.build_error(config, code, msg);
            self.gate.store(AuthError::new(error, true));
            return None;
        }

        tracing::debug!(code, msg = msg.as_deref(), "business error");
        metrics::counter!("executor.outcome", "class" => "error").increment(1);

        let error = self.build_error(config, code, msg);
        self.route_business_error(config, error);
        None
    }

    fn classify_success<T>(
        &self,
        config: &RequestConfig,
        code: i32,
        msg: Option<String>,
        data: Option<T>,
    ) -> Option<T> {
        match data {
            Some(payload) => {
                if self.hooks.intercept_success(config) {
                    tracing::debug!("success intercepted by call-site hook");
                    metrics::counter!("executor.outcome", "class" => "intercepted").increment(1);
                    return None;
                }

                metrics::counter!("executor.outcome", "class" => "success").increment(1);
                Some(payload)
            }
            None => {
                self.hooks.on_empty_data(config);

                if self.hooks.empty_as_error(config.correlation_id()) {
                    metrics::counter!("executor.outcome", "class" => "empty_promoted").increment(1);

                    let msg = msg.or_else(|| Some(codes::EMPTY_DATA_MSG.to_string()));
                    let error = self.build_error(config, codes::EMPTY_DATA, msg);
                    self.route_business_error(config, error);
                } else {
                    metrics::counter!("executor.outcome", "class" => "empty").increment(1);

                    self.events.publish(RequestEvent::Empty {
                        config: config.clone(),
                        code,
                        msg,
                    });
                }

                None
            }
        }
    }

    /// A failure raised locally rather than reported by the server: publish
    /// `LogicEnd` with the local code, then route through the business-error
    /// path with the fallback message when the failure carries none.
    fn local_failure(&self, config: &RequestConfig, raw_msg: String) {
        let msg = if raw_msg.trim().is_empty() {
            self.engine.fallback_error_msg().to_string()
        } else {
            raw_msg
        };

        tracing::debug!(msg = %msg, "local failure");
        metrics::counter!("executor.outcome", "class" => "local_failure").increment(1);

        self.events.publish(RequestEvent::LogicEnd {
            config: config.clone(),
            code: codes::LOCAL_FAILURE,
            msg: Some(msg.clone()),
        });

        let error = self.build_error(config, codes::LOCAL_FAILURE, Some(msg));
        self.route_business_error(config, error);
    }

    fn route_business_error(&self, config: &RequestConfig, error: ErrorModel) {
        if self.hooks.intercept_error(config, &error) {
            tracing::debug!(code = error.code(), "error intercepted by call-site hook");
            metrics::counter!("executor.errors.intercepted").increment(1);
            return;
        }

        self.events.publish(RequestEvent::Error {
            config: config.clone(),
            error,
        });
    }

    fn build_error(&self, config: &RequestConfig, code: i32, msg: Option<String>) -> ErrorModel {
        let model = ErrorModel::new(
            code,
            msg,
            config.show_type(),
            self.ids.next_id(),
            self.clock.now(),
        );
        config.shape_error(model)
    }
}

/// Publishes the guaranteed terminal `End` event when dropped.
///
/// Arming this guard right after `Begin` is what makes the terminal
/// guarantee hold on every exit path: normal return, early return, panic
/// unwind, and the executing future being dropped mid-flight.
struct EndGuard {
    events: EventChannel<RequestEvent>,
    config: Option<RequestConfig>,
}

impl EndGuard {
    fn new(events: EventChannel<RequestEvent>, config: RequestConfig) -> Self {
        Self {
            events,
            config: Some(config),
        }
    }
}

impl Drop for EndGuard {
    fn drop(&mut self) {
        if let Some(config) = self.config.take() {
            self.events.publish(RequestEvent::End(config));
        }
    }
}
