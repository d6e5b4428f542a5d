//! # Outbox
//!
//! Tasks that produce telemetry do not own the [`Session`](crate::session::Session).
//! They hand [`PublishRequest`]s to a [`PublisherHandle`] instead, and the task
//! that owns the session drains the channel with
//! [`Session::flush_outbox`](crate::session::Session::flush_outbox).

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::packet::QoS;

/// A message waiting to be published.
///
/// Topic and payload are borrowed and must outlive the request; on embedded
/// targets they are usually `'static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishRequest<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

impl<'a> PublishRequest<'a> {
    pub const fn new(topic: &'a str, payload: &'a [u8], qos: QoS) -> Self {
        Self {
            topic,
            payload,
            qos,
            retain: false,
        }
    }

    pub const fn retained(mut self) -> Self {
        self.retain = true;
        self
    }
}

pub type OutboxChannel<'a, M, const DEPTH: usize> = Channel<M, PublishRequest<'a>, DEPTH>;

pub type OutboxSender<'ch, 'a, M, const DEPTH: usize> = Sender<'ch, M, PublishRequest<'a>, DEPTH>;

pub type OutboxReceiver<'ch, 'a, M, const DEPTH: usize> =
    Receiver<'ch, M, PublishRequest<'a>, DEPTH>;

/// Cloneable handle for queueing publishes from any task.
pub struct PublisherHandle<'ch, 'a, M: RawMutex, const DEPTH: usize> {
    tx: OutboxSender<'ch, 'a, M, DEPTH>,
}

impl<M: RawMutex, const DEPTH: usize> Clone for PublisherHandle<'_, '_, M, DEPTH> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<'ch, 'a, M: RawMutex, const DEPTH: usize> PublisherHandle<'ch, 'a, M, DEPTH> {
    pub fn new(tx: OutboxSender<'ch, 'a, M, DEPTH>) -> Self {
        Self { tx }
    }

    /// Queues a non-retained message, waiting while the outbox is full.
    pub async fn publish(&self, topic: &'a str, payload: &'a [u8], qos: QoS) {
        self.tx.send(PublishRequest::new(topic, payload, qos)).await;
    }

    /// Queues a non-retained message without waiting.
    ///
    /// Returns `false` if the outbox is full.
    pub fn try_publish(&self, topic: &'a str, payload: &'a [u8], qos: QoS) -> bool {
        self.try_send(PublishRequest::new(topic, payload, qos))
    }

    /// Queues a prepared request, waiting while the outbox is full.
    pub async fn send(&self, request: PublishRequest<'a>) {
        self.tx.send(request).await;
    }

    /// Queues a prepared request without waiting. Returns `false` if full.
    pub fn try_send(&self, request: PublishRequest<'a>) -> bool {
        self.tx.try_send(request).is_ok()
    }
}
