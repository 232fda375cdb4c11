//! Integration tests for outcome classification: the empty-data policy, the
//! auth-expiry pre-emption with consumption dedup, exception fallback
//! messages, and call-site interception.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reqflow_core::config::{CorrelationId, RequestConfig};
use reqflow_core::error::{codes, AuthCodeSet, ResultId};
use reqflow_core::event::RequestEvent;
use reqflow_core::response::Response;
use reqflow_runtime::executor::RequestExecutor;
use reqflow_runtime::EngineConfig;
use reqflow_testing::mocks::{test_clock, SequentialIdGenerator, StaticRequestHooks};
use reqflow_testing::EventCollector;
use std::sync::Arc;

fn executor_with(engine: EngineConfig, hooks: StaticRequestHooks) -> RequestExecutor {
    RequestExecutor::new(
        engine,
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::new()),
    )
    .with_hooks(Arc::new(hooks))
}

fn config() -> RequestConfig {
    RequestConfig::new(CorrelationId::new(1))
}

// Default policy: success-with-no-data is promoted to exactly one Error
// event carrying the reserved empty-data code, and zero Empty events.
#[tokio::test]
async fn empty_data_promoted_to_error_by_default() {
    let executor = executor_with(EngineConfig::default(), StaticRequestHooks::default());
    let mut collector = EventCollector::new(executor.subscribe());

    let value: Option<String> = executor
        .execute(config(), false, || async { Ok(Response::ok_empty()) })
        .await;

    assert_eq!(value, None);
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "error", "end"]);

    let RequestEvent::Error { error, .. } = &collector.events()[2] else {
        panic!("third event must be Error");
    };
    assert_eq!(error.code(), codes::EMPTY_DATA);
}

// Opt-out policy: the same input emits exactly one Empty event and zero
// Error events.
#[tokio::test]
async fn empty_data_opt_out_emits_empty_event() {
    let hooks = StaticRequestHooks {
        empty_as_error: false,
        ..StaticRequestHooks::default()
    };
    let executor = executor_with(EngineConfig::default(), hooks);
    let mut collector = EventCollector::new(executor.subscribe());

    let value: Option<String> = executor
        .execute(config(), false, || async { Ok(Response::ok_empty()) })
        .await;

    assert_eq!(value, None);
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "empty", "end"]);
}

// An operation failing with an empty message yields an Error whose message
// equals the configured default service-error string.
#[tokio::test]
async fn exception_with_empty_message_gets_fallback() {
    let executor = executor_with(
        EngineConfig::default().with_fallback_error_msg("default service error"),
        StaticRequestHooks::default(),
    );
    let mut collector = EventCollector::new(executor.subscribe());

    let value: Option<String> = executor
        .execute(config(), false, || async { Err(anyhow::anyhow!("")) })
        .await;

    assert_eq!(value, None);

    collector.drain();
    let RequestEvent::Error { error, .. } = &collector.events()[2] else {
        panic!("third event must be Error");
    };
    assert_eq!(error.msg(), Some("default service error"));
}

// Scenario: a 401 in the auth-code set publishes one auth signal, zero
// generic Error events; consuming by its result id clears the gate and a
// second consume is a no-op.
#[tokio::test]
async fn auth_expiry_preempts_and_dedups() {
    let executor = executor_with(
        EngineConfig::default().with_auth_codes(AuthCodeSet::new([401])),
        StaticRequestHooks::default(),
    );
    let mut collector = EventCollector::new(executor.subscribe());

    let value: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(401, Some("expired")))
        })
        .await;

    assert_eq!(value, None);
    // No Error event: auth errors bypass generic routing entirely.
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "end"]);

    let pending = executor.auth_gate().pending().expect("auth error pending");
    assert!(pending.is_session_expired());
    let result_id = pending.result_id();

    assert!(executor.auth_gate().consume(result_id));
    assert!(executor.auth_gate().pending().is_none());
    assert!(!executor.auth_gate().consume(result_id));
}

// A consume with a result id that was never stored leaves the held signal
// untouched.
#[tokio::test]
async fn stale_consume_leaves_pending_auth_error() {
    let executor = executor_with(
        EngineConfig::default().with_auth_codes(AuthCodeSet::new([401])),
        StaticRequestHooks::default(),
    );

    let _: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(401, Some("expired")))
        })
        .await;

    let held = executor.auth_gate().pending().expect("auth error pending");
    assert!(!executor.auth_gate().consume(ResultId::new(9999)));
    assert_eq!(
        executor.auth_gate().pending().map(|p| p.result_id()),
        Some(held.result_id())
    );
}

// A second auth failure overwrites the slot last-write-wins; the first
// signal's id becomes stale.
#[tokio::test]
async fn newer_auth_signal_overwrites_slot() {
    let executor = executor_with(
        EngineConfig::default().with_auth_codes(AuthCodeSet::new([401])),
        StaticRequestHooks::default(),
    );

    let _: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(401, Some("first")))
        })
        .await;
    let first = executor.auth_gate().pending().expect("first pending");

    let _: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(401, Some("second")))
        })
        .await;
    let second = executor.auth_gate().pending().expect("second pending");

    assert_ne!(first.result_id(), second.result_id());
    assert!(!executor.auth_gate().consume(first.result_id()));
    assert!(executor.auth_gate().consume(second.result_id()));
}

// A success interception hook consumes the payload: the caller sees None
// and no Error/Empty is published.
#[tokio::test]
async fn success_interception_consumes_payload() {
    let hooks = StaticRequestHooks {
        intercept_success: true,
        ..StaticRequestHooks::default()
    };
    let executor = executor_with(EngineConfig::default(), hooks);
    let mut collector = EventCollector::new(executor.subscribe());

    let value = executor
        .execute(config(), false, || async { Ok(Response::ok("x")) })
        .await;

    assert_eq!(value, None);
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "end"]);
}

// An error interception hook swallows the failure: no Error event, but the
// lifecycle events still bracket the invocation.
#[tokio::test]
async fn error_interception_swallows_error_event() {
    let hooks = StaticRequestHooks {
        intercept_error: true,
        ..StaticRequestHooks::default()
    };
    let executor = executor_with(EngineConfig::default(), hooks);
    let mut collector = EventCollector::new(executor.subscribe());

    let value: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(500, Some("down")))
        })
        .await;

    assert_eq!(value, None);
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "end"]);
}

// Auth classification is exact: a non-auth code never reaches the gate.
#[tokio::test]
async fn non_auth_code_never_reaches_gate() {
    let executor = executor_with(
        EngineConfig::default().with_auth_codes(AuthCodeSet::new([401])),
        StaticRequestHooks::default(),
    );

    let _: Option<String> = executor
        .execute(config(), false, || async {
            Ok(Response::fail(500, Some("down")))
        })
        .await;

    assert!(executor.auth_gate().pending().is_none());
}
