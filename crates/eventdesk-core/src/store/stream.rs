// ── Reactive store snapshots ──
//
// Subscription handle vended by `PaginatedStore::subscribe`. UI consumers
// read the current sequence and await changes without touching the lock.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::CategoryId;

/// Point-in-time view of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    pub items: Vec<T>,
    pub filter: Option<CategoryId>,
    pub next_page: u32,
    pub has_more: bool,
    pub loading: bool,
    /// Items found by `check_for_new` and not yet shown.
    pub staged: usize,
}

impl<T> Default for StoreSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filter: None,
            next_page: 0,
            has_more: true,
            loading: false,
            staged: 0,
        }
    }
}

pub struct SequenceStream<T: Clone + Send + Sync + 'static> {
    current: Arc<StoreSnapshot<T>>,
    receiver: watch::Receiver<Arc<StoreSnapshot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> SequenceStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<StoreSnapshot<T>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<StoreSnapshot<T>> {
        &self.current
    }

    pub fn latest(&self) -> Arc<StoreSnapshot<T>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<StoreSnapshot<T>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> SnapshotWatchStream<T> {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding every published snapshot.
pub struct SnapshotWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Arc<StoreSnapshot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for SnapshotWatchStream<T> {
    type Item = Arc<StoreSnapshot<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
