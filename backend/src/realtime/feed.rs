//! Change feed
//!
//! Services publish one [`ChangeEvent`] per committed row change. Subscribers
//! pick the topics they care about and are woken when any matching event
//! arrives. Events carry no row data; they only tell a view to refetch.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

/// Tables that publish change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Products,
    CommunityPosts,
    PostComments,
    Conversations,
    Messages,
    PlantDiagnoses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Equality filter on one column, e.g. `conversation_id = X`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    pub column: &'static str,
    pub value: Uuid,
}

impl Filter {
    pub fn eq(column: &'static str, value: Uuid) -> Self {
        Self { column, value }
    }
}

/// A row changed. `columns` lists the filterable column values of that row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub row_id: Uuid,
    pub columns: Vec<Filter>,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind, row_id: Uuid) -> Self {
        Self {
            table,
            kind,
            row_id,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: &'static str, value: Uuid) -> Self {
        self.columns.push(Filter::eq(column, value));
        self
    }
}

/// What a subscriber listens to: a whole table, or the rows matching a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    pub table: Table,
    pub filter: Option<Filter>,
}

impl Topic {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filter: None,
        }
    }

    pub fn filtered(table: Table, column: &'static str, value: Uuid) -> Self {
        Self {
            table,
            filter: Some(Filter::eq(column, value)),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if self.table != event.table {
            return false;
        }
        match &self.filter {
            None => true,
            Some(filter) => event.columns.contains(filter),
        }
    }
}

/// Process-wide broadcast of change events
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fan an event out to every current subscriber
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(table = ?event.table, kind = ?event.kind, row_id = %event.row_id, "change published");
        // No receivers is not an error; nobody is watching.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self, topics: Vec<Topic>) -> Subscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        Subscription {
            rx: self.tx.subscribe(),
            topics,
            active: Arc::clone(&self.active),
        }
    }

    /// Subscriptions currently held open
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A topic-scoped receiver. Dropping it releases the subscription.
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    topics: Vec<Topic>,
    active: Arc<AtomicUsize>,
}

impl Subscription {
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        self.topics.iter().any(|t| t.matches(event))
    }

    /// Wait until something on a watched topic changes.
    ///
    /// Everything already queued behind the first match is drained, so a burst
    /// of writes yields a single wake-up. Returns `false` once the feed is gone.
    pub async fn invalidated(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.is_relevant(&event) => break,
                Ok(_) => continue,
                // Missed events may have been relevant
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change subscriber lagged");
                    break;
                }
                Err(RecvError::Closed) => return false,
            }
        }

        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_topic_matching() {
        let conv = Uuid::new_v4();
        let event = ChangeEvent::new(Table::Messages, ChangeKind::Insert, Uuid::new_v4())
            .with_column("conversation_id", conv);

        assert!(Topic::table(Table::Messages).matches(&event));
        assert!(Topic::filtered(Table::Messages, "conversation_id", conv).matches(&event));
        assert!(!Topic::filtered(Table::Messages, "conversation_id", Uuid::new_v4()).matches(&event));
        assert!(!Topic::table(Table::Products).matches(&event));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let feed = ChangeFeed::new(8);
        let a = feed.subscribe(vec![Topic::table(Table::Products)]);
        let b = feed.subscribe(vec![Topic::table(Table::Products)]);
        assert_eq!(feed.active_subscriptions(), 2);
        drop(a);
        assert_eq!(feed.active_subscriptions(), 1);
        drop(b);
        assert_eq!(feed.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_burst_coalesces_into_one_wakeup() {
        let feed = ChangeFeed::new(64);
        let mut sub = feed.subscribe(vec![Topic::table(Table::CommunityPosts)]);

        for _ in 0..5 {
            feed.publish(ChangeEvent::new(
                Table::CommunityPosts,
                ChangeKind::Insert,
                Uuid::new_v4(),
            ));
        }

        assert!(sub.invalidated().await);
        let second = tokio::time::timeout(Duration::from_millis(50), sub.invalidated()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_unrelated_topics_do_not_wake() {
        let feed = ChangeFeed::new(64);
        let mut sub = feed.subscribe(vec![Topic::table(Table::Products)]);

        feed.publish(ChangeEvent::new(Table::Messages, ChangeKind::Insert, Uuid::new_v4()));

        let woke = tokio::time::timeout(Duration::from_millis(50), sub.invalidated()).await;
        assert!(woke.is_err());
    }

    #[tokio::test]
    async fn test_lagged_counts_as_invalidation() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe(vec![Topic::table(Table::Products)]);

        for _ in 0..10 {
            feed.publish(ChangeEvent::new(Table::Messages, ChangeKind::Insert, Uuid::new_v4()));
        }

        assert!(sub.invalidated().await);
    }
}
