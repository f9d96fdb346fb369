use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;

/// Suppresses consecutive structurally equal values.
///
/// The last-forwarded value is owned by this stream instance, so state is
/// per subscription and dies with it: a respawned subscription always starts
/// clean and treats its first value (default included) as new.
pub struct Distinct<S: Stream> {
    inner: S,
    last: Option<S::Item>,
}

impl<S: Stream> Distinct<S> {
    /// Wraps `inner` with no last value; its first item always passes.
    pub fn new(inner: S) -> Self {
        Self { inner, last: None }
    }

    /// Wraps `inner` pre-seeded, so a first item equal to `seed` is
    /// suppressed.
    pub fn seeded(inner: S, seed: S::Item) -> Self {
        Self {
            inner,
            last: Some(seed),
        }
    }
}

impl<S: Stream + Unpin> Unpin for Distinct<S> {}

impl<S> Stream for Distinct<S>
where
    S: Stream + Unpin,
    S::Item: Clone + PartialEq,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if this.last.as_ref() == Some(&item) {
                        continue;
                    }
                    this.last = Some(item.clone());
                    return Poll::Ready(Some(item));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use futures::{StreamExt, stream};

    use super::*;

    #[tokio::test]
    async fn consecutive_repeats_are_suppressed() {
        let values = Distinct::new(stream::iter([1, 1, 2, 2, 2, 3]))
            .collect::<Vec<_>>()
            .await;
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn non_consecutive_repeats_pass() {
        let values = Distinct::new(stream::iter([1, 2, 1]))
            .collect::<Vec<_>>()
            .await;
        assert_eq!(values, vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn seed_suppresses_an_equal_first_item() {
        let values = Distinct::seeded(stream::iter([5, 5, 6]), 5)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(values, vec![6]);
    }

    #[tokio::test]
    async fn fresh_instance_starts_clean() {
        let first = Distinct::new(stream::iter([7])).collect::<Vec<_>>().await;
        let second = Distinct::new(stream::iter([7])).collect::<Vec<_>>().await;
        assert_eq!(first, vec![7]);
        assert_eq!(second, vec![7]);
    }
}
