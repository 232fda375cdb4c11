//! End-to-end test of the profile screen wired through the engine.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use profile::{build_controller, fetch_config, fetch_profile, ProfileScreen};
use reqflow_testing::EventCollector;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn full_surface_through_the_controller() {
    let screen = Arc::new(ProfileScreen::new());
    let (controller, executor) = build_controller(&screen);
    let mut collector = EventCollector::new(executor.subscribe());

    // Success.
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("ada"))
        .await;
    assert!(profile.is_some_and(|p| p.username == "ada"));
    assert_eq!(collector.kinds(), vec!["begin", "logic_end", "end"]);

    // Business error adds exactly one error event.
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("nobody"))
        .await;
    assert!(profile.is_none());
    assert_eq!(
        collector.kinds(),
        vec!["begin", "logic_end", "end", "begin", "logic_end", "error", "end"]
    );

    // Auth expiry lands in the gate, not on the error channel.
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("expired"))
        .await;
    assert!(profile.is_none());

    let pending = executor.auth_gate().pending().expect("pending auth error");
    assert!(pending.is_session_expired());

    // The navigator fires once for the signal.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(screen.reauth_requests(), 1);

    // Consumption is idempotent.
    assert!(executor.auth_gate().consume(pending.result_id()));
    assert!(!executor.auth_gate().consume(pending.result_id()));
}
