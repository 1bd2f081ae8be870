//! Subscriptions: long-lived message sources started with the program.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::runtime::command::BoxFuture;
use crate::runtime::sender::Sender;

type StartFn<M> = Box<dyn FnOnce(CancellationToken, Sender<M>) -> BoxFuture<()> + Send>;

/// A message source that runs until the program's cancellation token fires.
pub struct Sub<M> {
    name: &'static str,
    start: StartFn<M>,
}

impl<M: Send + 'static> Sub<M> {
    /// Custom source. `f` receives the shared cancellation token and a queue sender and
    /// should return once the token is cancelled.
    pub fn new<F, Fut>(name: &'static str, f: F) -> Self
    where
        F: FnOnce(CancellationToken, Sender<M>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            start: Box::new(
                move |token: CancellationToken, sender: Sender<M>| -> BoxFuture<()> {
                    Box::pin(f(token, sender))
                },
            ),
        }
    }

    /// Emit `f(now)` every `interval`, first after one full interval. Late ticks are
    /// skipped rather than bunched up.
    pub fn every<F>(interval: Duration, f: F) -> Self
    where
        F: Fn(Instant) -> M + Send + 'static,
    {
        Self::new("every", move |token, sender| async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if !sender.send_app(f(Instant::now())).await {
                            break;
                        }
                    }
                }
            }
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn start(self, token: CancellationToken, sender: Sender<M>) -> BoxFuture<()> {
        (self.start)(token, sender)
    }
}
