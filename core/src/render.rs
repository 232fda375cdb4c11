//! Renderer and loading-surface traits.
//!
//! Concrete widgets are out of scope for the engine; the router only ever
//! talks to collaborators through these narrow interfaces. One
//! [`ErrorRenderer`] is registered per show-type; the lightweight notice
//! renderer doubles as the fail-open default so an unrendered error is never
//! dropped silently.

use crate::config::RequestConfig;
use crate::error::ErrorModel;
use std::sync::Arc;

/// Renders one classified error through a concrete presentation channel.
pub trait ErrorRenderer: Send + Sync {
    /// Render the error using the config's texts and targeting.
    fn render(&self, config: &RequestConfig, error: &ErrorModel);
}

impl<T: ErrorRenderer + ?Sized> ErrorRenderer for Arc<T> {
    fn render(&self, config: &RequestConfig, error: &ErrorModel) {
        (**self).render(config, error);
    }
}

/// The busy-state surface of a presentation.
///
/// While the surface is busy, interaction with the triggering control is
/// expected to be disabled; `loading_finished` re-enables it.
pub trait LoadingView: Send + Sync {
    /// The invocation started; show the indicator and disable interaction.
    fn loading_started(&self, config: &RequestConfig);

    /// The invocation's logic finished; hide the indicator and re-enable
    /// interaction. Must be idempotent per invocation.
    fn loading_finished(&self, config: &RequestConfig);
}

impl<T: LoadingView + ?Sized> LoadingView for Arc<T> {
    fn loading_started(&self, config: &RequestConfig) {
        (**self).loading_started(config);
    }

    fn loading_finished(&self, config: &RequestConfig) {
        (**self).loading_finished(config);
    }
}
