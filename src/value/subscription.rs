use std::{
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use futures::{Stream, stream::BoxStream, task::AtomicWaker};

pub(crate) struct ControlState {
    paused: AtomicBool,
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

impl ControlState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            paused: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        })
    }

    pub(crate) fn register(&self, cx: &Context<'_>) {
        self.waker.register(cx.waker());
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cloneable control handle for one subscription pipeline.
///
/// Controls only its own pipeline: pausing or cancelling here never touches
/// the store or any sibling subscription.
#[derive(Clone)]
pub struct SubscriptionControl {
    state: Arc<ControlState>,
}

impl SubscriptionControl {
    pub(crate) fn new(state: Arc<ControlState>) -> Self {
        Self { state }
    }

    /// Stops forwarding values. Events delivered while paused are discarded,
    /// not queued; a resumed subscriber observes future events only.
    pub fn pause(&self) {
        self.state.paused.store(true, Ordering::Release);
        self.state.waker.wake();
    }

    /// Resumes forwarding future values.
    pub fn resume(&self) {
        self.state.paused.store(false, Ordering::Release);
        self.state.waker.wake();
    }

    /// Ends the subscription. The stream yields nothing further and detaches
    /// from the change bus when dropped or next polled.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        self.state.waker.wake();
    }

    /// Whether the pipeline is currently paused.
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Whether the pipeline has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }
}

/// One subscriber's replay-then-follow pipeline.
///
/// Yields the subscribe-time value first, then the re-read current value for
/// every matching change-bus event. Dropping the subscription unsubscribes.
pub struct Subscription<T> {
    stream: BoxStream<'static, T>,
    state: Arc<ControlState>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(stream: BoxStream<'static, T>) -> Self {
        Self {
            stream,
            state: ControlState::new(),
        }
    }

    /// A cloneable handle controlling this subscription.
    pub fn control(&self) -> SubscriptionControl {
        SubscriptionControl::new(self.state.clone())
    }

    /// Pauses forwarding. See [`SubscriptionControl::pause`].
    pub fn pause(&self) {
        self.control().pause();
    }

    /// Resumes forwarding. See [`SubscriptionControl::resume`].
    pub fn resume(&self) {
        self.control().resume();
    }

    /// Ends the subscription. See [`SubscriptionControl::cancel`].
    pub fn cancel(&self) {
        self.control().cancel();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        this.state.register(cx);

        loop {
            if this.state.is_cancelled() {
                return Poll::Ready(None);
            }
            match Pin::new(&mut this.stream).poll_next(cx) {
                Poll::Ready(Some(value)) => {
                    if this.state.is_paused() {
                        continue;
                    }
                    return Poll::Ready(Some(value));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
