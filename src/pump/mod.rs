//! Push-producer channel
//!
//! A producer that pushes chunks into a book instead of being pulled.
//! The producer half ([`BookPump`]) and the consumer half
//! ([`PumpSubscription`]) are created together; the subscription is
//! handed to a `Book` at construction and drained by the pump load
//! strategy.
//!
//! Delivery is an unbounded FIFO channel, so chunk order is exactly push
//! order, and a termination signal is honored only after every chunk
//! pushed before it.

use thiserror::Error;
use tokio::sync::mpsc;

/// Pump channel error
#[derive(Debug, Error)]
pub enum PumpError {
    /// The consuming book went away before the producer finished
    #[error("Pump consumer disconnected")]
    Disconnected,
}

/// Events delivered by a push producer
#[derive(Debug, Clone)]
pub enum PumpEvent {
    /// One chunk of book bytes
    Data(Vec<u8>),
    /// The producer finished; no more chunks follow
    End,
    /// The producer failed; the load must abort
    Error(String),
}

/// Producer half of the push channel
#[derive(Debug)]
pub struct BookPump {
    tx: mpsc::UnboundedSender<PumpEvent>,
}

/// Consumer half, held by the book source until the load begins
#[derive(Debug)]
pub struct PumpSubscription {
    pub(crate) rx: mpsc::UnboundedReceiver<PumpEvent>,
}

impl BookPump {
    /// Create a connected producer/consumer pair
    pub fn new() -> (Self, PumpSubscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, PumpSubscription { rx })
    }

    /// Push one chunk
    ///
    /// Chunks reach the book strictly in push order.
    pub fn push(&self, chunk: impl Into<Vec<u8>>) -> Result<(), PumpError> {
        self.tx
            .send(PumpEvent::Data(chunk.into()))
            .map_err(|_| PumpError::Disconnected)
    }

    /// Signal that all chunks have been delivered
    ///
    /// Consumes the producer; nothing can be pushed afterwards.
    pub fn finish(self) -> Result<(), PumpError> {
        self.tx
            .send(PumpEvent::End)
            .map_err(|_| PumpError::Disconnected)
    }

    /// Abort the load with a producer-side failure
    ///
    /// Consumes the producer.
    pub fn fail(self, cause: impl Into<String>) -> Result<(), PumpError> {
        self.tx
            .send(PumpEvent::Error(cause.into()))
            .map_err(|_| PumpError::Disconnected)
    }
}
