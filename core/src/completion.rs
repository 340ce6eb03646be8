//! Single-use completion slot for request outcomes.
//!
//! # Design
//! A thin layer over `tokio::sync::oneshot`. `Completer::complete` takes
//! `self`, so a slot can only ever be filled once. A completer that is
//! dropped unfilled (the worker panicked, the runtime shut down) resolves
//! the `Pending` side to `HttpError::Canceled` instead of hanging.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::HttpError;

pub type Outcome<T> = Result<T, HttpError>;

/// Create a connected completer / pending pair.
pub fn completion<T>() -> (Completer<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, Pending { rx, taken: false })
}

#[derive(Debug)]
pub struct Completer<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> Completer<T> {
    /// Deliver the terminal outcome. Returns `false` if nobody is waiting
    /// any more; the outcome is dropped in that case.
    pub fn complete(self, outcome: Outcome<T>) -> bool {
        let delivered = self.tx.send(outcome).is_ok();
        if !delivered {
            tracing::debug!(target: "courier::completion", "outcome dropped, receiver is gone");
        }
        delivered
    }

    /// True once the `Pending` side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The receiving half; await it for the request outcome.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Outcome<T>>,
    taken: bool,
}

impl<T> Pending<T> {
    /// Block the current thread until the outcome arrives.
    ///
    /// Panics when called from inside an async runtime, like
    /// `oneshot::Receiver::blocking_recv`.
    pub fn wait(self) -> Outcome<T> {
        self.rx.blocking_recv().unwrap_or(Err(HttpError::Canceled))
    }

    /// Take the outcome if it is already there.
    ///
    /// Yields the outcome (or `Canceled` for a dropped completer) exactly
    /// once; `None` before it arrives and after it has been taken.
    pub fn try_take(&mut self) -> Option<Outcome<T>> {
        if self.taken {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(HttpError::Canceled),
        };
        self.taken = true;
        Some(outcome)
    }
}

impl<T> Future for Pending<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(HttpError::Canceled)))
    }
}
