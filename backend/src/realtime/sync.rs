//! Realtime sync client
//!
//! A [`SyncView`] keeps one query result fresh: it subscribes to the query's
//! topics, fetches once, and refetches whenever a watched topic changes.

use futures::stream::{self, Stream};
use serde::Serialize;

use super::feed::{ChangeFeed, Subscription, Topic};
use crate::error::AppResult;

/// A query a view can keep live
#[axum::async_trait]
pub trait LiveQuery: Send + Sync + 'static {
    type Output: Clone + Serialize + Send + Sync + 'static;

    /// Topics whose changes invalidate the result
    fn topics(&self) -> Vec<Topic>;

    /// Full, ordered result
    async fn fetch(&self) -> AppResult<Self::Output>;
}

/// What a view currently holds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// A mounted live query. Dropping it releases the subscription and abandons
/// any fetch still in flight.
pub struct SyncView<Q: LiveQuery> {
    query: Q,
    subscription: Subscription,
    state: ViewState<Q::Output>,
}

impl<Q: LiveQuery> SyncView<Q> {
    /// Subscribe, then fetch. Changes landing between the two trigger a
    /// refetch on the next [`SyncView::next_change`].
    pub async fn mount(feed: &ChangeFeed, query: Q) -> Self {
        let subscription = feed.subscribe(query.topics());
        let mut view = Self {
            query,
            subscription,
            state: ViewState::Loading,
        };
        view.refresh().await;
        view
    }

    pub fn state(&self) -> &ViewState<Q::Output> {
        &self.state
    }

    async fn refresh(&mut self) {
        self.state = match self.query.fetch().await {
            Ok(value) => ViewState::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "live view fetch failed");
                ViewState::Error(e.to_string())
            }
        };
    }

    /// Refetch unconditionally
    pub async fn invalidate(&mut self) -> &ViewState<Q::Output> {
        self.refresh().await;
        &self.state
    }

    /// Wait for the next invalidation and refetch.
    /// `None` when the change feed has shut down.
    pub async fn next_change(&mut self) -> Option<&ViewState<Q::Output>> {
        if !self.subscription.invalidated().await {
            return None;
        }
        self.refresh().await;
        Some(&self.state)
    }

    pub fn unmount(self) {}

    /// Current state, then one state per invalidation
    pub fn into_stream(self) -> impl Stream<Item = ViewState<Q::Output>> + Send {
        stream::unfold((self, true), |(mut view, first)| async move {
            if first {
                let state = view.state.clone();
                return Some((state, (view, false)));
            }
            let state = view.next_change().await.cloned()?;
            Some((state, (view, false)))
        })
    }
}
