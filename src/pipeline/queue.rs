//! FIFO queue connecting two pipeline stages
//!
//! Every message is either an item or the end-of-stream marker. The marker is
//! its own variant, so no item value (however empty or zero) can be mistaken
//! for it. A producer sends the marker by consuming itself in `finish`, which
//! makes "exactly one marker, always last" hold by construction.

use thiserror::Error;
use tokio::sync::mpsc;

/// A message travelling through the queue
#[derive(Debug, Clone, PartialEq)]
pub enum Message<T> {
    Item(T),
    EndOfStream,
}

/// Errors that can occur on either end of the queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The producer went away without sending end-of-stream
    #[error("Queue producer disconnected before end of stream")]
    Disconnected,

    /// The consumer went away; nothing will read further items
    #[error("Queue consumer is closed")]
    Closed,
}

/// Sending half of a stage queue
#[derive(Debug)]
pub struct QueueProducer<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
}

/// Receiving half of a stage queue
#[derive(Debug)]
pub struct QueueConsumer<T> {
    rx: mpsc::UnboundedReceiver<Message<T>>,
    finished: bool,
}

/// Creates a connected producer/consumer pair
pub fn queue<T>() -> (QueueProducer<T>, QueueConsumer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        QueueProducer { tx },
        QueueConsumer {
            rx,
            finished: false,
        },
    )
}

impl<T> QueueProducer<T> {
    /// Enqueues one item
    pub fn put(&self, item: T) -> Result<(), QueueError> {
        self.tx
            .send(Message::Item(item))
            .map_err(|_| QueueError::Closed)
    }

    /// Enqueues the end-of-stream marker and retires the producer
    pub fn finish(self) -> Result<(), QueueError> {
        self.tx
            .send(Message::EndOfStream)
            .map_err(|_| QueueError::Closed)
    }
}

impl<T> QueueConsumer<T> {
    /// Waits for the next item
    ///
    /// # Returns
    /// * `Ok(Some(item))` for every item, in the order they were sent
    /// * `Ok(None)` once end-of-stream has been received, and on every call after
    /// * `Err(QueueError::Disconnected)` if the producer was dropped without finishing
    pub async fn next(&mut self) -> Result<Option<T>, QueueError> {
        if self.finished {
            return Ok(None);
        }

        match self.rx.recv().await {
            Some(Message::Item(item)) => Ok(Some(item)),
            Some(Message::EndOfStream) => {
                self.finished = true;
                self.rx.close();
                Ok(None)
            }
            None => Err(QueueError::Disconnected),
        }
    }

    /// Collects every remaining item up to end-of-stream
    pub async fn drain(&mut self) -> Result<Vec<T>, QueueError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Whether end-of-stream has been observed
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
