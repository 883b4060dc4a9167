use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::FutureExt;
use tokio::sync::oneshot;

use crate::Error;
use crate::Result;

/// Result of a deferred invocation.
///
/// Resolves with the value produced by the execution that consumed the
/// invocation, or with [`Error::Cancelled`] if that cycle was discarded
/// (`clear()`, or a suppression window that ended with nothing to run).
#[must_use = "a deferred result does nothing unless awaited"]
pub struct Deferred<R> {
    rx: oneshot::Receiver<R>,
}

impl<R> Deferred<R> {
    pub(crate) fn channel() -> (oneshot::Sender<R>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<R> Future for Deferred<R> {
    type Output = Result<R>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|r| r.map_err(|_| Error::Cancelled))
    }
}
