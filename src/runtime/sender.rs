//! Producer side of the program queue.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::runtime::message::Message;

/// Cloneable handle for pushing messages into a running program.
///
/// Sends wait for queue space but give up once the program is cancelled, so producers
/// never block past shutdown.
pub struct Sender<M> {
    tx: mpsc::Sender<Message<M>>,
    token: CancellationToken,
}

impl<M> Clone for Sender<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            token: self.token.clone(),
        }
    }
}

impl<M> Sender<M> {
    pub(crate) fn new(tx: mpsc::Sender<Message<M>>, token: CancellationToken) -> Self {
        Self { tx, token }
    }

    /// Enqueue `msg`. Returns `false` if it was dropped because the program stopped.
    pub async fn send(&self, msg: impl Into<Message<M>>) -> bool {
        let msg = msg.into();
        if self.token.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            sent = self.tx.send(msg) => sent.is_ok(),
        }
    }

    /// Enqueue an application message.
    pub async fn send_app(&self, msg: M) -> bool {
        self.send(Message::app(msg)).await
    }

    /// Enqueue without waiting. Fails when the queue is full or the program stopped.
    pub fn try_send(&self, msg: impl Into<Message<M>>) -> bool {
        !self.token.is_cancelled() && self.tx.try_send(msg.into()).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}
