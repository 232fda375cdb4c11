//! # Reqflow Testing
//!
//! Testing utilities and deterministic mocks for the reqflow engine.
//!
//! This crate provides:
//! - Deterministic environment implementations (fixed clock, sequential ids)
//! - Recording implementations of the presentation seams (renderer, loading
//!   surface, interception hooks)
//! - [`EventCollector`](collector::EventCollector) for asserting on an
//!   invocation's exact event sequence
//!
//! ## Example
//!
//! ```
//! use reqflow_testing::mocks::{test_clock, SequentialIdGenerator};
//! use reqflow_core::environment::{Clock, IdGenerator};
//!
//! let clock = test_clock();
//! assert_eq!(clock.now(), clock.now()); // Always the same!
//!
//! let ids = SequentialIdGenerator::new();
//! assert_ne!(ids.next_id(), ids.next_id());
//! ```

use chrono::{DateTime, Utc};
use reqflow_core::config::RequestConfig;
use reqflow_core::environment::{Clock, IdGenerator};
use reqflow_core::error::ResultId;

/// Deterministic mock implementations for tests.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, RequestConfig, ResultId, Utc};
    use reqflow_core::config::CorrelationId;
    use reqflow_core::error::ErrorModel;
    use reqflow_core::event::RequestEvent;
    use reqflow_core::hooks::{PresentationHook, RequestHooks};
    use reqflow_core::render::{ErrorRenderer, LoadingView};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests.
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable id generator: 1, 2, 3, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicI64,
    }

    impl SequentialIdGenerator {
        /// Create a generator starting at 1.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicI64::new(1),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> ResultId {
            ResultId::new(self.next.fetch_add(1, Ordering::Relaxed))
        }
    }

    /// Renderer that records every render call instead of drawing anything.
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        calls: Mutex<Vec<(RequestConfig, ErrorModel)>>,
    }

    impl RecordingRenderer {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of render calls observed.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        #[must_use]
        pub fn rendered_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// The most recent render call, if any.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        #[must_use]
        pub fn last_rendered(&self) -> Option<(RequestConfig, ErrorModel)> {
            self.calls.lock().unwrap().last().cloned()
        }

        /// All recorded error values, in call order.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        #[must_use]
        pub fn errors(&self) -> Vec<ErrorModel> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, error)| error.clone())
                .collect()
        }
    }

    impl ErrorRenderer for RecordingRenderer {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        fn render(&self, config: &RequestConfig, error: &ErrorModel) {
            self.calls
                .lock()
                .unwrap()
                .push((config.clone(), error.clone()));
        }
    }

    /// Loading surface that counts start/finish calls.
    #[derive(Debug, Default)]
    pub struct RecordingLoadingView {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl RecordingLoadingView {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of `loading_started` calls observed.
        #[must_use]
        pub fn started_count(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }

        /// Number of `loading_finished` calls observed.
        #[must_use]
        pub fn finished_count(&self) -> usize {
            self.finished.load(Ordering::SeqCst)
        }
    }

    impl LoadingView for RecordingLoadingView {
        fn loading_started(&self, _config: &RequestConfig) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn loading_finished(&self, _config: &RequestConfig) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Scriptable call-site hooks for exercising interception paths.
    #[derive(Debug, Clone, Copy)]
    pub struct StaticRequestHooks {
        /// Returned from `intercept_success`.
        pub intercept_success: bool,
        /// Returned from `intercept_error`.
        pub intercept_error: bool,
        /// Returned from `empty_as_error`.
        pub empty_as_error: bool,
    }

    impl Default for StaticRequestHooks {
        fn default() -> Self {
            Self {
                intercept_success: false,
                intercept_error: false,
                empty_as_error: true,
            }
        }
    }

    impl RequestHooks for StaticRequestHooks {
        fn intercept_success(&self, _config: &RequestConfig) -> bool {
            self.intercept_success
        }

        fn empty_as_error(&self, _correlation_id: CorrelationId) -> bool {
            self.empty_as_error
        }

        fn intercept_error(&self, _config: &RequestConfig, _error: &ErrorModel) -> bool {
            self.intercept_error
        }
    }

    /// Presentation hook that records intercepted events and reports them
    /// handled (or not) according to `handle`.
    #[derive(Debug, Default)]
    pub struct RecordingHook {
        /// Whether `intercept` reports events as handled.
        pub handle: bool,
        seen: Mutex<Vec<&'static str>>,
    }

    impl RecordingHook {
        /// Create a hook that observes without handling.
        #[must_use]
        pub fn observing() -> Self {
            Self::default()
        }

        /// Create a hook that handles everything it sees.
        #[must_use]
        pub fn handling() -> Self {
            Self {
                handle: true,
                seen: Mutex::new(Vec::new()),
            }
        }

        /// Kinds of events seen so far, in order.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        #[must_use]
        pub fn seen_kinds(&self) -> Vec<&'static str> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl PresentationHook for RecordingHook {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        fn intercept(&self, event: &RequestEvent) -> bool {
            self.seen.lock().unwrap().push(event.kind());
            self.handle
        }
    }
}

/// Event-sequence assertion helpers.
pub mod collector {
    use reqflow_core::channel::Subscription;
    use reqflow_core::event::RequestEvent;

    /// Drains buffered request events from a subscription for exact-order
    /// assertions.
    ///
    /// Subscribe before executing, run the invocation to completion, then
    /// drain: because `execute` publishes the terminal event before
    /// returning, every event of the invocation is already buffered.
    #[derive(Debug)]
    pub struct EventCollector {
        subscription: Subscription<RequestEvent>,
        events: Vec<RequestEvent>,
    }

    impl EventCollector {
        /// Wrap a subscription taken *before* the invocation under test.
        #[must_use]
        pub const fn new(subscription: Subscription<RequestEvent>) -> Self {
            Self {
                subscription,
                events: Vec::new(),
            }
        }

        /// Pull every buffered event into the collector and return the full
        /// recorded sequence. Lag is surfaced as a test-visible marker event
        /// count mismatch rather than being silently skipped.
        pub fn drain(&mut self) -> &[RequestEvent] {
            while let Ok(Some(event)) = self.subscription.try_recv() {
                self.events.push(event);
            }
            &self.events
        }

        /// Kinds of all recorded events, in publish order.
        pub fn kinds(&mut self) -> Vec<&'static str> {
            self.drain();
            self.events.iter().map(RequestEvent::kind).collect()
        }

        /// All recorded events so far without draining again.
        #[must_use]
        pub fn events(&self) -> &[RequestEvent] {
            &self.events
        }
    }
}

// Re-export commonly used items
pub use collector::EventCollector;
pub use mocks::{test_clock, FixedClock, RecordingLoadingView, RecordingRenderer, SequentialIdGenerator};
