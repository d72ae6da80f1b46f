//! Live view streams (server-sent events)
//!
//! Each stream mounts a [`SyncView`] and emits a `snapshot` event with the
//! full view state on connect and after every invalidation. Disconnecting
//! drops the view, which releases its subscription.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use super::marketplace::ProductQuery;
use crate::middleware::CurrentUser;
use crate::realtime::views::{CommunityFeed, ConversationList, ConversationMessages, Marketplace};
use crate::realtime::{LiveQuery, SyncView, ViewState};
use crate::services::{CommunityService, ConversationService, MarketplaceService};
use crate::AppState;

fn snapshot_events<T: Serialize + Send + 'static>(
    states: impl Stream<Item = ViewState<T>> + Send + 'static,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    states.filter_map(|state| async move {
        match Event::default().event("snapshot").json_data(&state) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Failed to encode live snapshot: {}", e);
                None
            }
        }
    })
}

async fn stream_view<Q: LiveQuery>(state: &AppState, query: Q) -> Response {
    let view = SyncView::mount(&state.changes, query).await;
    tracing::debug!(
        active = state.changes.active_subscriptions(),
        "live view mounted"
    );

    Sse::new(snapshot_events(view.into_stream()))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// GET /live/feed
pub async fn live_feed(State(state): State<AppState>, _current_user: CurrentUser) -> Response {
    let query = CommunityFeed {
        service: CommunityService::new(state.store.clone(), state.changes.clone()),
    };
    stream_view(&state, query).await
}

/// GET /live/conversations
pub async fn live_conversations(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Response {
    let query = ConversationList {
        service: ConversationService::new(state.store.clone(), state.changes.clone()),
        user_id: current_user.id(),
    };
    stream_view(&state, query).await
}

/// GET /live/conversations/:conversation_id/messages
///
/// Opening the thread marks the viewer's incoming messages read.
pub async fn live_messages(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> Response {
    let service = ConversationService::new(state.store.clone(), state.changes.clone());

    if let Err(e) = service.mark_read(conversation_id, current_user.id()).await {
        return e.into_response();
    }

    let query = ConversationMessages {
        service,
        conversation_id,
        viewer_id: current_user.id(),
    };
    stream_view(&state, query).await
}

/// GET /live/products
pub async fn live_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> Response {
    let query = Marketplace {
        service: MarketplaceService::new(state.store.clone(), state.changes.clone()),
        search: query.search,
    };
    stream_view(&state, query).await
}
