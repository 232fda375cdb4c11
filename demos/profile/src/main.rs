//! Profile demo binary
//!
//! Drives the reqflow engine through the full classification surface:
//! success, business error, empty data, and auth expiry with consumption.

use profile::{build_controller, fetch_config, fetch_profile, ProfileScreen};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile=info,reqflow_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Profile Demo: reqflow engine ===\n");

    let screen = Arc::new(ProfileScreen::new());
    let (controller, executor) = build_controller(&screen);

    // Success: the payload comes back, events are Begin/LogicEnd/End.
    println!(">>> Fetching profile for 'ada'");
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("ada"))
        .await;
    println!("Got: {profile:?}\n");

    // Business error: routed to the conventional dialog renderer.
    println!(">>> Fetching profile for 'nobody'");
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("nobody"))
        .await;
    println!("Got: {profile:?}\n");

    // Empty data: promoted to an error by the default policy.
    println!(">>> Fetching profile for 'ghost'");
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("ghost"))
        .await;
    println!("Got: {profile:?}\n");

    // Auth expiry: pre-empts error routing, lands in the gate, and asks the
    // screen to re-authenticate exactly once.
    println!(">>> Fetching profile for 'expired'");
    let profile = controller
        .execute(fetch_config(), true, || fetch_profile("expired"))
        .await;
    println!("Got: {profile:?}");

    // Give the detached router and auth watcher a beat to catch up.
    tokio::time::sleep(Duration::from_millis(100)).await;

    if let Some(pending) = executor.auth_gate().pending() {
        println!(
            "Pending auth error: {} (reauth requests so far: {})",
            pending,
            screen.reauth_requests()
        );
        let consumed = executor.auth_gate().consume(pending.result_id());
        println!("Consumed: {consumed}");
        let again = executor.auth_gate().consume(pending.result_id());
        println!("Consumed again (stale, must be false): {again}");
    }

    println!("\n=== Demo complete ===");
}
