//! Commands: deferred work that yields at most one message.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use crate::runtime::message::Message;

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
pub(crate) type BlockingFn<M> = Box<dyn FnOnce() -> Option<Message<M>> + Send + 'static>;

pub(crate) enum CmdKind<M> {
    None,
    /// Runs on the blocking pool.
    Task(BlockingFn<M>),
    Future(BoxFuture<Option<Message<M>>>),
    /// Run concurrently, no ordering between results.
    Batch(Vec<Cmd<M>>),
}

/// Work returned from `init` and `update`.
///
/// Every command runs as its own task; a produced message is queued like any other.
/// Commands are cancelled when the program stops.
#[must_use]
pub struct Cmd<M> {
    pub(crate) kind: CmdKind<M>,
}

impl<M> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CmdKind::None => f.write_str("Cmd::None"),
            CmdKind::Task(_) => f.write_str("Cmd::Task"),
            CmdKind::Future(_) => f.write_str("Cmd::Future"),
            CmdKind::Batch(cmds) => f.debug_tuple("Cmd::Batch").field(cmds).finish(),
        }
    }
}

impl<M: Send + 'static> Default for Cmd<M> {
    fn default() -> Self {
        Self::none()
    }
}

impl<M: Send + 'static> Cmd<M> {
    pub fn none() -> Self {
        Self {
            kind: CmdKind::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, CmdKind::None)
    }

    /// Queue an arbitrary message, including control messages.
    pub fn message(msg: Message<M>) -> Self {
        Self::from_future(async move { Some(msg) })
    }

    pub fn quit() -> Self {
        Self::message(Message::Quit)
    }

    pub fn msg(msg: M) -> Self {
        Self::message(Message::app(msg))
    }

    /// Run several commands concurrently. `None` entries are dropped.
    pub fn batch(cmds: impl IntoIterator<Item = Cmd<M>>) -> Self {
        let mut cmds: Vec<Cmd<M>> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Self::none(),
            1 => cmds.remove(0),
            _ => Self {
                kind: CmdKind::Batch(cmds),
            },
        }
    }

    /// Deliver the messages as one batch: in order, one render.
    pub fn batch_msgs(msgs: impl IntoIterator<Item = Message<M>>) -> Self {
        Self::message(Message::Batch(msgs.into_iter().collect()))
    }

    pub fn delay(duration: Duration, msg: M) -> Self {
        Self::from_future(async move {
            tokio::time::sleep(duration).await;
            Some(Message::app(msg))
        })
    }

    /// After `duration`, call `f` with the firing time.
    pub fn tick<F>(duration: Duration, f: F) -> Self
    where
        F: FnOnce(Instant) -> M + Send + 'static,
    {
        Self::from_future(async move {
            tokio::time::sleep(duration).await;
            Some(Message::app(f(Instant::now())))
        })
    }

    pub fn window_size() -> Self {
        Self::message(Message::QueryWindowSize)
    }

    pub fn enable_report_focus() -> Self {
        Self::message(Message::EnableReportFocus)
    }

    pub fn disable_report_focus() -> Self {
        Self::message(Message::DisableReportFocus)
    }

    /// Run a blocking closure off the event loop.
    ///
    /// Cancellation stops waiting for the result but cannot interrupt the closure.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self {
            kind: CmdKind::Task(Box::new(move || Some(Message::app(f())))),
        }
    }

    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = M> + Send + 'static,
    {
        Self::from_future(async move { Some(Message::app(future.await)) })
    }

    /// An async command that may produce nothing.
    pub fn future_opt<F>(future: F) -> Self
    where
        F: Future<Output = Option<Message<M>>> + Send + 'static,
    {
        Self::from_future(future)
    }

    fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Option<Message<M>>> + Send + 'static,
    {
        Self {
            kind: CmdKind::Future(Box::pin(future)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cmd, CmdKind};
    use crate::runtime::message::Message;
    use std::time::Duration;

    async fn resolve(cmd: Cmd<u32>) -> Option<Message<u32>> {
        match cmd.kind {
            CmdKind::Future(future) => future.await,
            CmdKind::Task(task) => task(),
            other => panic!("not a leaf command: {:?}", Cmd { kind: other }),
        }
    }

    #[test]
    fn default_is_none() {
        assert!(Cmd::<String>::default().is_none());
    }

    #[test]
    fn batch_drops_nones_and_unwraps_singletons() {
        assert!(Cmd::<u32>::batch([Cmd::none(), Cmd::none()]).is_none());
        let single = Cmd::batch([Cmd::none(), Cmd::msg(1)]);
        assert!(matches!(single.kind, CmdKind::Future(_)));
        let many = Cmd::batch([Cmd::msg(1), Cmd::quit(), Cmd::none()]);
        assert!(matches!(many.kind, CmdKind::Batch(ref cmds) if cmds.len() == 2));
    }

    #[tokio::test]
    async fn constructors_yield_their_messages() {
        assert_eq!(resolve(Cmd::msg(3)).await, Some(Message::app(3)));
        assert_eq!(resolve(Cmd::quit()).await, Some(Message::Quit));
        assert_eq!(
            resolve(Cmd::window_size()).await,
            Some(Message::QueryWindowSize)
        );
        assert_eq!(resolve(Cmd::task(|| 9)).await, Some(Message::app(9)));
        assert_eq!(
            resolve(Cmd::batch_msgs([Message::app(1), Message::app(2)])).await,
            Some(Message::Batch(vec![Message::app(1), Message::app(2)]))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delay_waits_before_yielding() {
        let started = tokio::time::Instant::now();
        let msg = resolve(Cmd::delay(Duration::from_secs(2), 5)).await;
        assert_eq!(msg, Some(Message::app(5)));
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
