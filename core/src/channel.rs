//! Multicast event channels.
//!
//! An [`EventChannel`] is a lifecycle-scoped, multicast event stream with two
//! retention flavors:
//!
//! - [`Retention::Transient`]: no buffering for absent subscribers. An event
//!   published while no subscriber is active is lost, and new subscribers
//!   never see past events. Used for the request-event stream.
//! - [`Retention::Replayed`]: buffers the single most recent event so a late
//!   subscriber immediately receives it; drop-oldest on overflow. Used for
//!   state broadcasts a freshly-attached presentation must reconcile with.
//!
//! # Concurrency
//!
//! `publish` is non-blocking and safe from any producer context. Delivery to
//! each subscriber is strictly in publish order. A subscriber that detaches
//! mid-stream (drops its [`Subscription`]) never blocks producers. A slow
//! subscriber that overflows its buffer observes [`ChannelError::Lagged`]
//! and resumes at the oldest retained event rather than stalling the
//! channel.

use futures::Stream;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default per-subscriber buffer for transient channels.
pub const DEFAULT_TRANSIENT_CAPACITY: usize = 16;

/// Errors observed by a channel subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The subscriber fell behind and `skipped` events were dropped
    /// (drop-oldest). The subscription is repositioned at the oldest event
    /// still retained; the next `recv` yields it.
    #[error("subscriber lagged, {skipped} events dropped")]
    Lagged {
        /// Number of events dropped for this subscriber.
        skipped: u64,
    },

    /// The channel was closed (the producer side was dropped).
    #[error("channel closed")]
    Closed,
}

/// Retention flavor of an [`EventChannel`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Retention {
    /// No replay; events published with no active subscriber are lost.
    Transient,
    /// The single most recent event is replayed to late subscribers.
    Replayed,
}

/// A multicast event stream.
///
/// Cloning the channel clones the producer handle; all clones publish into
/// the same stream.
///
/// # Examples
///
/// ```
/// use reqflow_core::channel::EventChannel;
///
/// # tokio_test::block_on(async {
/// let channel = EventChannel::transient(8);
/// let mut sub = channel.subscribe();
///
/// channel.publish(1_u32);
/// channel.publish(2_u32);
///
/// assert_eq!(sub.recv().await, Ok(1));
/// assert_eq!(sub.recv().await, Ok(2));
/// # });
/// ```
#[derive(Debug)]
pub struct EventChannel<T> {
    sender: broadcast::Sender<T>,
    last: Option<Arc<Mutex<Option<T>>>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            last: self.last.clone(),
        }
    }
}

impl<T: Clone> EventChannel<T> {
    /// Create a transient channel with the given per-subscriber buffer
    /// capacity (clamped to at least 1).
    #[must_use]
    pub fn transient(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, last: None }
    }

    /// Create a replayed channel: capacity 1, drop-oldest, latest event
    /// replayed to late subscribers.
    ///
    /// The replay buffer assumes a single producer; a subscribe racing a
    /// publish may observe the raced event both replayed and live.
    #[must_use]
    pub fn replayed() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            last: Some(Arc::new(Mutex::new(None))),
        }
    }

    /// The retention flavor of this channel.
    #[must_use]
    pub const fn retention(&self) -> Retention {
        if self.last.is_some() {
            Retention::Replayed
        } else {
            Retention::Transient
        }
    }

    /// Publish an event. Non-blocking.
    ///
    /// On a transient channel an event published while no subscriber is
    /// active is dropped. On a replayed channel the event additionally
    /// becomes the value handed to future subscribers.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub fn publish(&self, event: T) {
        if let Some(last) = &self.last {
            *last.lock().unwrap() = Some(event.clone());
        }

        // A send error only means no subscriber is currently active; by
        // transient semantics the event is simply lost.
        let _ = self.sender.send(event);
    }

    /// Attach a new subscriber.
    ///
    /// On a replayed channel the subscription's first `recv` yields the most
    /// recently published event, if there is one.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        let receiver = self.sender.subscribe();
        let replay = self
            .last
            .as_ref()
            .and_then(|last| last.lock().unwrap().clone());

        Subscription { receiver, replay }
    }

    /// Number of currently attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A subscriber handle for an [`EventChannel`].
///
/// Dropping the subscription detaches it; producers are never blocked by a
/// detached or slow subscriber.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: broadcast::Receiver<T>,
    replay: Option<T>,
}

impl<T: Clone> Subscription<T> {
    /// Receive the next event, waiting if none is available.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Lagged`] when this subscriber overflowed its
    /// buffer; the subscription is repositioned at the oldest event still
    /// retained (drop-oldest), so the caller should log and call `recv`
    /// again. Returns [`ChannelError::Closed`] once the channel's producer
    /// side is gone.
    pub async fn recv(&mut self) -> Result<T, ChannelError> {
        if let Some(replayed) = self.replay.take() {
            return Ok(replayed);
        }

        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                Err(ChannelError::Lagged { skipped })
            }
            Err(broadcast::error::RecvError::Closed) => Err(ChannelError::Closed),
        }
    }

    /// Receive the next event without waiting.
    ///
    /// Returns `Ok(None)` when no event is currently buffered.
    ///
    /// # Errors
    ///
    /// Same contract as [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Result<Option<T>, ChannelError> {
        if let Some(replayed) = self.replay.take() {
            return Ok(Some(replayed));
        }

        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                Err(ChannelError::Lagged { skipped })
            }
            Err(broadcast::error::TryRecvError::Closed) => Err(ChannelError::Closed),
        }
    }

    /// Convert the subscription into a [`Stream`] of events.
    ///
    /// Lag is skipped silently; the stream ends when the channel closes.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send
    where
        T: Send,
    {
        futures::stream::unfold(self, |mut sub| async move {
            loop {
                match sub.recv().await {
                    Ok(event) => return Some((event, sub)),
                    Err(ChannelError::Lagged { .. }) => {}
                    Err(ChannelError::Closed) => return None,
                }
            }
        })
    }
}
