//! Combine-latest aggregation over watched values.
//!
//! A [`Combined`] merges any number of watched values, possibly of
//! different types, into one stream of ordered [`Snapshot`]s. Construction
//! reads every input's current value synchronously before subscribing to
//! any of them, so the initial snapshot races against nothing. Afterwards
//! every upstream change replaces its slot and emits a fresh immutable
//! snapshot; there is no barrier waiting for all inputs to change together.

mod slot;

use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{
    Stream, StreamExt,
    stream::{BoxStream, SelectAll},
};

use crate::{
    Result,
    value::{SubscriptionControl, WatchedValue, subscription::ControlState},
};

pub use slot::{Slot, SlotValue, Snapshot};

/// How a [`Combined`] reacts to an error on one input branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Propagate the error, cancel every sibling subscription, and complete.
    /// The default: it avoids a half-alive aggregate.
    #[default]
    CancelAll,
    /// Forward the error; the other branches keep running.
    Isolate,
}

/// The stream half of a [`CombineInput`]: erased slots or branch errors.
pub type SlotStream = BoxStream<'static, Result<Slot>>;

/// The erased face of one combinator input: a synchronous current-value
/// read and a deferred subscription.
///
/// The subscription is deferred so the combinator can read every input's
/// current value before attaching to any of them.
pub struct CombineInput {
    read: Box<dyn Fn() -> Slot + Send>,
    subscribe: Box<dyn FnOnce() -> SlotStream + Send>,
}

impl CombineInput {
    /// Builds an input from a current-value read and a deferred
    /// subscription. The stream's errors follow the combinator's
    /// [`ErrorMode`].
    pub fn new(
        read: impl Fn() -> Slot + Send + 'static,
        subscribe: impl FnOnce() -> SlotStream + Send + 'static,
    ) -> Self {
        Self {
            read: Box::new(read),
            subscribe: Box::new(subscribe),
        }
    }
}

impl<T> WatchedValue<T>
where
    T: Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static,
{
    /// This value as a combinator input.
    ///
    /// The input subscribes through the dedup transform, so an unchanged
    /// value never produces a snapshot emission.
    pub fn combine_input(&self) -> CombineInput {
        let read_handle = self.clone();
        let subscribe_handle = self.clone();
        CombineInput::new(
            move || Arc::new(read_handle.value()) as Slot,
            move || {
                subscribe_handle
                    .subscribe_distinct()
                    .map(|value| Ok(Arc::new(value) as Slot))
                    .boxed()
            },
        )
    }
}

enum CombinedState {
    Running {
        initial: Option<Snapshot>,
        slots: Vec<Slot>,
        events: SelectAll<BoxStream<'static, (usize, Result<Slot>)>>,
    },
    Done,
}

/// Combine-latest stream of snapshots over N inputs.
///
/// Yields the initial snapshot first, then one snapshot per upstream
/// change. Completes only once every input stream completes; an empty input
/// list completes immediately with no emission. Pause, resume, and cancel
/// apply uniformly to the whole aggregate; no partial-pause state exists.
pub struct Combined {
    mode: ErrorMode,
    state: CombinedState,
    control: Arc<ControlState>,
}

impl Combined {
    /// Builds the aggregate, reading every input's current value
    /// synchronously before subscribing to any of them.
    pub fn new(inputs: Vec<CombineInput>, mode: ErrorMode) -> Self {
        Self {
            mode,
            state: Self::build(inputs),
            control: ControlState::new(),
        }
    }

    /// Replaces the input list.
    ///
    /// Tears down every existing subscription first, then rebuilds from
    /// scratch exactly as on first construction, initial read included.
    /// Old and new subscriptions never coexist.
    pub fn rebuild(&mut self, inputs: Vec<CombineInput>) {
        self.state = CombinedState::Done;
        self.state = Self::build(inputs);
    }

    /// A cloneable handle pausing, resuming, or cancelling the whole
    /// aggregate.
    pub fn control(&self) -> SubscriptionControl {
        SubscriptionControl::new(self.control.clone())
    }

    fn build(inputs: Vec<CombineInput>) -> CombinedState {
        if inputs.is_empty() {
            return CombinedState::Done;
        }

        let slots: Vec<Slot> = inputs.iter().map(|input| (input.read)()).collect();
        let initial = Snapshot::new(slots.clone());

        let mut events = SelectAll::new();
        for (index, input) in inputs.into_iter().enumerate() {
            events.push(
                (input.subscribe)()
                    .map(move |item| (index, item))
                    .boxed(),
            );
        }

        CombinedState::Running {
            initial: Some(initial),
            slots,
            events,
        }
    }
}

impl Stream for Combined {
    type Item = Result<Snapshot>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.control.register(cx);

        loop {
            if this.control.is_cancelled() {
                this.state = CombinedState::Done;
                return Poll::Ready(None);
            }

            let CombinedState::Running {
                initial,
                slots,
                events,
            } = &mut this.state
            else {
                return Poll::Ready(None);
            };

            // The initial snapshot is construction-time state, not an
            // event: it is held through a pause rather than discarded.
            if !this.control.is_paused()
                && let Some(snapshot) = initial.take()
            {
                return Poll::Ready(Some(Ok(snapshot)));
            }

            match Pin::new(&mut *events).poll_next(cx) {
                Poll::Ready(Some((index, Ok(slot)))) => {
                    if this.control.is_paused() {
                        continue;
                    }
                    if slot.slot_eq(slots[index].as_ref()) {
                        continue;
                    }
                    slots[index] = slot;
                    let snapshot = Snapshot::new(slots.clone());
                    return Poll::Ready(Some(Ok(snapshot)));
                }
                Poll::Ready(Some((_, Err(error)))) => {
                    if this.control.is_paused() {
                        continue;
                    }
                    match this.mode {
                        ErrorMode::CancelAll => {
                            // Dropping the running state cancels every
                            // sibling subscription.
                            this.state = CombinedState::Done;
                            return Poll::Ready(Some(Err(error)));
                        }
                        ErrorMode::Isolate => return Poll::Ready(Some(Err(error))),
                    }
                }
                Poll::Ready(None) => {
                    this.state = CombinedState::Done;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
