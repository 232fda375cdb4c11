//! Presentation-side event consumption and feedback dispatch.
//!
//! A [`PresentationRouter`] is bound to one controller's lifetime. It
//! consumes the request-event stream and drives two things:
//!
//! - the per-screen busy state, as a small `{Idle, Active}` machine whose
//!   `LogicEnd` transition clears the indicator *before* the caller's data
//!   is rendered, with `End` as the idempotent fallback so the surface can
//!   never be left permanently blocked
//! - error feedback, dispatched by the config's show-type through narrow
//!   [`ErrorRenderer`] interfaces after the interception-hook chain declined
//!   to handle the event
//!
//! Routing is fail-open: an `Error`/`Empty` with no renderer registered for
//! its show-type falls back to the lightweight notice renderer rather than
//! being dropped silently.

use reqflow_core::channel::{ChannelError, Subscription};
use reqflow_core::config::{RequestConfig, ShowType};
use reqflow_core::error::ErrorModel;
use reqflow_core::event::RequestEvent;
use reqflow_core::hooks::PresentationHook;
use reqflow_core::render::{ErrorRenderer, LoadingView};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Busy state of the presentation surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RouterState {
    /// No invocation in flight; interaction enabled.
    #[default]
    Idle,
    /// An invocation is in flight; indicator on, interaction disabled.
    Active,
}

/// Maps request events to concrete feedback for one controller instance.
pub struct PresentationRouter {
    state: RouterState,
    notice: Box<dyn ErrorRenderer>,
    renderers: HashMap<ShowType, Box<dyn ErrorRenderer>>,
    hooks: SmallVec<[Box<dyn PresentationHook>; 2]>,
    loading: Option<Box<dyn LoadingView>>,
}

impl PresentationRouter {
    /// Create a router around the mandatory lightweight notice renderer,
    /// which doubles as the fail-open default for unregistered show-types.
    #[must_use]
    pub fn new(notice: Box<dyn ErrorRenderer>) -> Self {
        Self {
            state: RouterState::Idle,
            notice,
            renderers: HashMap::new(),
            hooks: SmallVec::new(),
            loading: None,
        }
    }

    /// Register the renderer for a show-type.
    #[must_use]
    pub fn with_renderer(mut self, show_type: ShowType, renderer: Box<dyn ErrorRenderer>) -> Self {
        self.renderers.insert(show_type, renderer);
        self
    }

    /// Append an interception hook to the chain. The first hook that reports
    /// an event handled stops dispatch.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn PresentationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Install the per-screen busy surface driven by `Begin`/`LogicEnd`.
    #[must_use]
    pub fn with_loading_view(mut self, loading: Box<dyn LoadingView>) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Current busy state.
    #[must_use]
    pub const fn state(&self) -> RouterState {
        self.state
    }

    /// Process one event.
    pub fn handle(&mut self, event: &RequestEvent) {
        match event {
            RequestEvent::Begin(config) => {
                self.state = RouterState::Active;
                if let Some(loading) = &self.loading {
                    loading.loading_started(config);
                }
            }
            RequestEvent::LogicEnd { config, .. } => {
                self.leave_active(config, false);
            }
            RequestEvent::End(config) => {
                // Guaranteed fallback: a no-op when LogicEnd already ran.
                self.leave_active(config, true);
            }
            RequestEvent::Error { config, error } => {
                if self.intercepted(event) {
                    return;
                }
                self.dispatch(config, error);
            }
            RequestEvent::Empty { config, code, msg } => {
                if self.intercepted(event) {
                    return;
                }
                let error = ErrorModel::display_only(*code, msg.clone(), config.show_type());
                self.dispatch(config, &error);
            }
            RequestEvent::Action {
                config,
                action_code,
                extra,
            } => {
                metrics::counter!("router.actions").increment(1);
                for hook in &self.hooks {
                    hook.on_action(config, *action_code, extra.as_ref());
                }
            }
        }
    }

    /// Consume the subscription until the channel closes, processing every
    /// event. Lag is logged and skipped, never fatal.
    pub async fn drive(mut self, mut subscription: Subscription<RequestEvent>) {
        loop {
            match subscription.recv().await {
                Ok(event) => self.handle(&event),
                Err(ChannelError::Lagged { skipped }) => {
                    tracing::warn!(skipped, "router lagged behind the event stream");
                    metrics::counter!("router.lagged").increment(skipped);
                }
                Err(ChannelError::Closed) => break,
            }
        }
    }

    fn leave_active(&mut self, config: &RequestConfig, fallback: bool) {
        if self.state == RouterState::Idle {
            return;
        }

        self.state = RouterState::Idle;
        if fallback {
            // LogicEnd was never observed for this invocation; the terminal
            // event still unblocks the surface.
            tracing::warn!(
                correlation_id = %config.correlation_id(),
                "busy state cleared by terminal event"
            );
            metrics::counter!("router.end_fallback").increment(1);
        }

        if let Some(loading) = &self.loading {
            loading.loading_finished(config);
        }
    }

    fn intercepted(&self, event: &RequestEvent) -> bool {
        for hook in &self.hooks {
            if hook.intercept(event) {
                tracing::debug!(kind = event.kind(), "event handled by interception hook");
                metrics::counter!("router.intercepted").increment(1);
                return true;
            }
        }
        false
    }

    fn dispatch(&self, config: &RequestConfig, error: &ErrorModel) {
        // The error's show-type mirrors the config's unless a call-site
        // factory overrode it, so the error value is authoritative here.
        let show_type = error.show_type();

        let renderer = if let Some(renderer) = self.renderers.get(&show_type) {
            metrics::counter!("router.rendered", "show_type" => show_type.to_string()).increment(1);
            renderer.as_ref()
        } else {
            // Fail-open: never drop an error silently.
            tracing::warn!(%show_type, "no renderer registered, falling back to notice");
            metrics::counter!("router.fallback").increment(1);
            self.notice.as_ref()
        };

        renderer.render(config, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqflow_core::config::CorrelationId;
    use reqflow_core::error::codes;
    use reqflow_testing::mocks::{RecordingLoadingView, RecordingRenderer};
    use std::sync::Arc;

    fn config() -> RequestConfig {
        RequestConfig::new(CorrelationId::new(3))
    }

    fn error(code: i32, show_type: ShowType) -> ErrorModel {
        ErrorModel::display_only(code, Some("failed".to_string()), show_type)
    }

    #[test]
    fn begin_and_logic_end_drive_busy_state() {
        let loading = Arc::new(RecordingLoadingView::new());
        let mut router = PresentationRouter::new(Box::new(RecordingRenderer::new()))
            .with_loading_view(Box::new(Arc::clone(&loading)));

        assert_eq!(router.state(), RouterState::Idle);

        router.handle(&RequestEvent::Begin(config()));
        assert_eq!(router.state(), RouterState::Active);
        assert_eq!(loading.started_count(), 1);

        router.handle(&RequestEvent::LogicEnd {
            config: config(),
            code: 0,
            msg: None,
        });
        assert_eq!(router.state(), RouterState::Idle);
        assert_eq!(loading.finished_count(), 1);
    }

    #[test]
    fn end_after_logic_end_is_a_noop() {
        let loading = Arc::new(RecordingLoadingView::new());
        let mut router = PresentationRouter::new(Box::new(RecordingRenderer::new()))
            .with_loading_view(Box::new(Arc::clone(&loading)));

        router.handle(&RequestEvent::Begin(config()));
        router.handle(&RequestEvent::LogicEnd {
            config: config(),
            code: 0,
            msg: None,
        });
        router.handle(&RequestEvent::End(config()));

        // The terminal event must not double-clear.
        assert_eq!(loading.finished_count(), 1);
        assert_eq!(router.state(), RouterState::Idle);
    }

    #[test]
    fn end_alone_unblocks_the_surface() {
        let loading = Arc::new(RecordingLoadingView::new());
        let mut router = PresentationRouter::new(Box::new(RecordingRenderer::new()))
            .with_loading_view(Box::new(Arc::clone(&loading)));

        router.handle(&RequestEvent::Begin(config()));
        router.handle(&RequestEvent::End(config()));

        assert_eq!(router.state(), RouterState::Idle);
        assert_eq!(loading.finished_count(), 1);
    }

    #[test]
    fn error_dispatches_to_registered_renderer() {
        let notice = Arc::new(RecordingRenderer::new());
        let confirm = Arc::new(RecordingRenderer::new());
        let mut router = PresentationRouter::new(Box::new(Arc::clone(&notice)))
            .with_renderer(ShowType::Confirm, Box::new(Arc::clone(&confirm)));

        router.handle(&RequestEvent::Error {
            config: config().with_show_type(ShowType::Confirm),
            error: error(500, ShowType::Confirm),
        });

        assert_eq!(confirm.rendered_count(), 1);
        assert_eq!(notice.rendered_count(), 0);
    }

    #[test]
    fn unregistered_show_type_fails_open_to_notice() {
        let notice = Arc::new(RecordingRenderer::new());
        let mut router = PresentationRouter::new(Box::new(Arc::clone(&notice)));

        router.handle(&RequestEvent::Error {
            config: config().with_show_type(ShowType::Tips),
            error: error(500, ShowType::Tips),
        });

        assert_eq!(notice.rendered_count(), 1);
    }

    #[test]
    fn handled_event_is_not_rendered() {
        struct Swallow;
        impl PresentationHook for Swallow {
            fn intercept(&self, _event: &RequestEvent) -> bool {
                true
            }
        }

        let notice = Arc::new(RecordingRenderer::new());
        let mut router = PresentationRouter::new(Box::new(Arc::clone(&notice)))
            .with_hook(Box::new(Swallow));

        router.handle(&RequestEvent::Error {
            config: config(),
            error: error(500, ShowType::Toast),
        });

        assert_eq!(notice.rendered_count(), 0);
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: test will fail if nothing was rendered
    fn empty_event_renders_display_only_error() {
        let notice = Arc::new(RecordingRenderer::new());
        let mut router = PresentationRouter::new(Box::new(Arc::clone(&notice)));

        router.handle(&RequestEvent::Empty {
            config: config(),
            code: codes::SUCCESS,
            msg: Some("nothing here".to_string()),
        });

        assert_eq!(notice.rendered_count(), 1);
        let (_, rendered) = notice.last_rendered().expect("one render call");
        assert_eq!(rendered.msg(), Some("nothing here"));
    }

    #[test]
    fn action_reaches_every_hook() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Counting(Arc<AtomicUsize>);
        impl PresentationHook for Counting {
            fn on_action(
                &self,
                _config: &RequestConfig,
                _action_code: i32,
                _extra: Option<&serde_json::Value>,
            ) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = PresentationRouter::new(Box::new(RecordingRenderer::new()))
            .with_hook(Box::new(Counting(Arc::clone(&calls))))
            .with_hook(Box::new(Counting(Arc::clone(&calls))));

        router.handle(&RequestEvent::Action {
            config: config(),
            action_code: 9,
            extra: None,
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
