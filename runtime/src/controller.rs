//! Composition root for one presentation lifetime.
//!
//! A [`Controller`] owns exactly one [`RequestExecutor`] and one
//! [`PresentationRouter`]; optional capabilities are advertised as separate
//! traits ([`Loadable`], [`ErrorRoutable`], [`Navigable`]) rather than
//! accumulated through subclass depth. Constructing a controller spawns the
//! router's drive task; dropping it releases the subscription immediately
//! while in-flight operations run to completion detached.

use crate::auth_gate::AuthStatus;
use crate::executor::RequestExecutor;
use crate::router::PresentationRouter;
use reqflow_core::channel::ChannelError;
use reqflow_core::config::{RequestConfig, ShowType};
use reqflow_core::error::{AuthError, ResultId};
use reqflow_core::render::{ErrorRenderer, LoadingView};
use reqflow_core::response::Response;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Capability: the presentation provides a blocking loading surface.
pub trait Loadable: Send + Sync {
    /// The surface toggled around `show_loading` invocations.
    fn loading_view(&self) -> Arc<dyn LoadingView>;
}

/// Capability: the presentation provides error feedback channels.
pub trait ErrorRoutable: Send + Sync {
    /// The mandatory lightweight notice renderer (fail-open default).
    fn notice_renderer(&self) -> Box<dyn ErrorRenderer>;

    /// Additional renderers keyed by show-type. Defaults to none: every
    /// error then routes through the notice channel.
    fn renderers(&self) -> Vec<(ShowType, Box<dyn ErrorRenderer>)> {
        Vec::new()
    }
}

/// Capability: the presentation can navigate to re-authentication.
pub trait Navigable: Send + Sync {
    /// React to a pending session-expiry signal. Invoked at most once per
    /// distinct result id; the presentation acknowledges by calling
    /// [`AuthErrorGate::consume`](crate::auth_gate::AuthErrorGate::consume).
    fn reauthenticate(&self, error: &AuthError);
}

/// One presentation's engine instance: executor + router + lifecycle.
///
/// # Lifecycle
///
/// The router drive task and the auth watcher live exactly as long as the
/// controller. Dropping the controller aborts both, which releases their
/// channel subscriptions; an operation still in flight keeps running to
/// completion, and its terminal `End` event is simply undelivered.
pub struct Controller {
    executor: Arc<RequestExecutor>,
    router_task: JoinHandle<()>,
    reauth_task: Option<JoinHandle<()>>,
}

impl Controller {
    /// Wire an executor and a router together and start consuming events.
    #[must_use]
    pub fn new(executor: Arc<RequestExecutor>, router: PresentationRouter) -> Self {
        let subscription = executor.subscribe();
        let router_task = tokio::spawn(router.drive(subscription));

        Self {
            executor,
            router_task,
            reauth_task: None,
        }
    }

    /// Build the router from the presentation's advertised capabilities.
    #[must_use]
    pub fn from_capabilities<P>(executor: Arc<RequestExecutor>, presentation: &P) -> Self
    where
        P: ErrorRoutable + Loadable,
    {
        let mut router = PresentationRouter::new(presentation.notice_renderer())
            .with_loading_view(Box::new(presentation.loading_view()));
        for (show_type, renderer) in presentation.renderers() {
            router = router.with_renderer(show_type, renderer);
        }

        Self::new(executor, router)
    }

    /// Watch the auth gate and forward pending signals to the navigator, at
    /// most once per distinct result id even if a signal is re-delivered.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigable>) -> Self {
        let mut status = self.executor.auth_gate().subscribe_status();

        self.reauth_task = Some(tokio::spawn(async move {
            let mut last_seen: Option<ResultId> = None;

            loop {
                match status.recv().await {
                    Ok(AuthStatus::Pending(error)) => {
                        if last_seen == Some(error.result_id()) {
                            tracing::debug!(
                                result_id = %error.result_id(),
                                "auth signal re-delivered, ignoring"
                            );
                            continue;
                        }

                        last_seen = Some(error.result_id());
                        navigator.reauthenticate(&error);
                    }
                    Ok(AuthStatus::Cleared) => {}
                    Err(ChannelError::Lagged { .. }) => {}
                    Err(ChannelError::Closed) => break,
                }
            }
        }));

        self
    }

    /// The owned executor.
    #[must_use]
    pub const fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Execute one wrapped operation through the owned executor.
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
        self.executor.execute(config, show_loading, op).await
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.router_task.abort();
        if let Some(task) = &self.reauth_task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use reqflow_core::config::CorrelationId;
    use reqflow_core::error::AuthCodeSet;
    use reqflow_testing::mocks::{
        test_clock, RecordingLoadingView, RecordingRenderer, SequentialIdGenerator,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Screen {
        notice: Arc<RecordingRenderer>,
        loading: Arc<RecordingLoadingView>,
    }

    impl ErrorRoutable for Screen {
        fn notice_renderer(&self) -> Box<dyn ErrorRenderer> {
            Box::new(Arc::clone(&self.notice))
        }
    }

    impl Loadable for Screen {
        fn loading_view(&self) -> Arc<dyn LoadingView> {
            Arc::clone(&self.loading) as Arc<dyn LoadingView>
        }
    }

    struct CountingNavigator(AtomicUsize);

    impl Navigable for CountingNavigator {
        fn reauthenticate(&self, _error: &AuthError) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn executor(auth_codes: AuthCodeSet) -> Arc<RequestExecutor> {
        Arc::new(RequestExecutor::new(
            EngineConfig::default().with_auth_codes(auth_codes),
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new()),
        ))
    }

    #[tokio::test]
    async fn routed_error_reaches_screen_notice() {
        let screen = Screen {
            notice: Arc::new(RecordingRenderer::new()),
            loading: Arc::new(RecordingLoadingView::new()),
        };
        let controller = Controller::from_capabilities(executor(AuthCodeSet::empty()), &screen);

        let value: Option<String> = controller
            .execute(RequestConfig::new(CorrelationId::new(1)), false, || async {
                Ok(Response::fail(500, Some("down")))
            })
            .await;
        assert_eq!(value, None);

        // The drive task consumes asynchronously.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(screen.notice.rendered_count(), 1);
    }

    #[tokio::test]
    async fn navigator_fires_once_per_result_id() {
        let executor = executor(AuthCodeSet::new([401]));
        let screen = Screen {
            notice: Arc::new(RecordingRenderer::new()),
            loading: Arc::new(RecordingLoadingView::new()),
        };
        let navigator = Arc::new(CountingNavigator(AtomicUsize::new(0)));
        let _controller = Controller::from_capabilities(Arc::clone(&executor), &screen)
            .with_navigator(Arc::clone(&navigator) as Arc<dyn Navigable>);

        let _: Option<String> = executor
            .execute(RequestConfig::new(CorrelationId::new(1)), false, || async {
                Ok(Response::fail(401, Some("expired")))
            })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(navigator.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_controller_releases_subscription() {
        let executor = executor(AuthCodeSet::empty());
        let screen = Screen {
            notice: Arc::new(RecordingRenderer::new()),
            loading: Arc::new(RecordingLoadingView::new()),
        };
        let notice = Arc::clone(&screen.notice);

        let controller = Controller::from_capabilities(Arc::clone(&executor), &screen);
        drop(controller);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let _: Option<String> = executor
            .execute(RequestConfig::new(CorrelationId::new(1)), false, || async {
                Ok(Response::fail(500, Some("down")))
            })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        // Nothing is rendered after detachment.
        assert_eq!(notice.rendered_count(), 0);
    }
}
