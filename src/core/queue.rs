//! Ordered multi-producer, single-consumer queue of formatted lines
//!
//! The producer half ([`LineQueue`]) is shared by every caller; the consumer
//! half ([`LineReceiver`]) exists exactly once and is moved into the worker.
//! Both submission paths feed the same channel, so delivery order is the
//! order in which sends complete.

use super::{
    error::{LoggerError, Result},
    log_entry::FormattedLine,
};
use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
enum QueueSender {
    Unbounded(mpsc::UnboundedSender<FormattedLine>),
    Bounded(mpsc::Sender<FormattedLine>),
}

enum QueueReceiver {
    Unbounded(mpsc::UnboundedReceiver<FormattedLine>),
    Bounded(mpsc::Receiver<FormattedLine>),
}

/// Producer side of the queue
pub struct LineQueue {
    sender: RwLock<Option<QueueSender>>,
    closed: CancellationToken,
    capacity: Option<usize>,
}

/// Consumer side of the queue; there is exactly one per [`LineQueue`].
pub struct LineReceiver {
    receiver: QueueReceiver,
    closed: CancellationToken,
}

impl LineQueue {
    /// Create an unbounded queue; `enqueue` can then only fail after `close`.
    pub fn unbounded() -> (Self, LineReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::assemble(QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx), None)
    }

    /// Create a bounded queue holding at most `capacity` lines (minimum 1).
    pub fn bounded(capacity: usize) -> (Self, LineReceiver) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self::assemble(
            QueueSender::Bounded(tx),
            QueueReceiver::Bounded(rx),
            Some(capacity),
        )
    }

    /// `None` selects the unbounded queue
    pub fn with_capacity(capacity: Option<usize>) -> (Self, LineReceiver) {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    fn assemble(
        sender: QueueSender,
        receiver: QueueReceiver,
        capacity: Option<usize>,
    ) -> (Self, LineReceiver) {
        let closed = CancellationToken::new();
        let queue = Self {
            sender: RwLock::new(Some(sender)),
            closed: closed.clone(),
            capacity,
        };
        (queue, LineReceiver { receiver, closed })
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Add a line without ever blocking the caller.
    ///
    /// Fails with [`LoggerError::LoggerStopped`] once the queue is closed, and
    /// with [`LoggerError::QueueFull`] when a bounded queue has no free slot.
    pub fn enqueue(&self, line: FormattedLine) -> Result<()> {
        if self.closed.is_cancelled() {
            return Err(LoggerError::LoggerStopped);
        }

        let guard = self.sender.read();
        match guard.as_ref() {
            None => Err(LoggerError::LoggerStopped),
            Some(QueueSender::Unbounded(tx)) => {
                tx.send(line).map_err(|_| LoggerError::LoggerStopped)
            }
            Some(QueueSender::Bounded(tx)) => match tx.try_send(line) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    Err(LoggerError::queue_full(self.capacity.unwrap_or_default()))
                }
                Err(TrySendError::Closed(_)) => Err(LoggerError::LoggerStopped),
            },
        }
    }

    /// Add a line, suspending the calling task until the queue accepts it.
    ///
    /// Completes immediately on an unbounded queue; on a bounded queue the
    /// task waits for a free slot. The OS thread is never blocked.
    pub async fn enqueue_async(&self, line: FormattedLine) -> Result<()> {
        if self.closed.is_cancelled() {
            return Err(LoggerError::LoggerStopped);
        }

        // Clone the handle so the lock is not held across the await.
        let sender = self.sender.read().clone();
        match sender {
            None => Err(LoggerError::LoggerStopped),
            Some(QueueSender::Unbounded(tx)) => {
                tx.send(line).map_err(|_| LoggerError::LoggerStopped)
            }
            Some(QueueSender::Bounded(tx)) => {
                tx.send(line).await.map_err(|_| LoggerError::LoggerStopped)
            }
        }
    }

    /// Stop accepting lines. Lines already queued stay drainable.
    ///
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        self.closed.cancel();
        self.sender.write().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl LineReceiver {
    /// Next line in submission order; `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<FormattedLine> {
        match &mut self.receiver {
            QueueReceiver::Unbounded(rx) => rx.recv().await,
            QueueReceiver::Bounded(rx) => rx.recv().await,
        }
    }

    /// Token cancelled once the producer side calls [`LineQueue::close`].
    pub fn close_signal(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Refuse any send still in flight while keeping buffered lines.
    pub fn seal(&mut self) {
        match &mut self.receiver {
            QueueReceiver::Unbounded(rx) => rx.close(),
            QueueReceiver::Bounded(rx) => rx.close(),
        }
    }
}
