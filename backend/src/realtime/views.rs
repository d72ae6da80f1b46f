//! Live queries behind the `/live` streams

use shared::{ConversationSummary, Message, PostWithComments, Product};
use uuid::Uuid;

use super::feed::{Table, Topic};
use super::sync::LiveQuery;
use crate::error::AppResult;
use crate::services::{CommunityService, ConversationService, MarketplaceService};

/// Community feed: posts with authors and comments
pub struct CommunityFeed {
    pub service: CommunityService,
}

#[axum::async_trait]
impl LiveQuery for CommunityFeed {
    type Output = Vec<PostWithComments>;

    fn topics(&self) -> Vec<Topic> {
        vec![
            Topic::table(Table::CommunityPosts),
            Topic::table(Table::PostComments),
        ]
    }

    async fn fetch(&self) -> AppResult<Self::Output> {
        self.service.list_feed().await
    }
}

/// The viewer's conversation list
pub struct ConversationList {
    pub service: ConversationService,
    pub user_id: Uuid,
}

#[axum::async_trait]
impl LiveQuery for ConversationList {
    type Output = Vec<ConversationSummary>;

    fn topics(&self) -> Vec<Topic> {
        vec![
            Topic::filtered(Table::Conversations, "participant1_id", self.user_id),
            Topic::filtered(Table::Conversations, "participant2_id", self.user_id),
        ]
    }

    async fn fetch(&self) -> AppResult<Self::Output> {
        self.service.list_for(self.user_id).await
    }
}

/// Messages of one conversation, for one participant
pub struct ConversationMessages {
    pub service: ConversationService,
    pub conversation_id: Uuid,
    pub viewer_id: Uuid,
}

#[axum::async_trait]
impl LiveQuery for ConversationMessages {
    type Output = Vec<Message>;

    fn topics(&self) -> Vec<Topic> {
        vec![Topic::filtered(
            Table::Messages,
            "conversation_id",
            self.conversation_id,
        )]
    }

    async fn fetch(&self) -> AppResult<Self::Output> {
        self.service
            .messages(self.conversation_id, self.viewer_id)
            .await
    }
}

/// Available products, optionally searched
pub struct Marketplace {
    pub service: MarketplaceService,
    pub search: Option<String>,
}

#[axum::async_trait]
impl LiveQuery for Marketplace {
    type Output = Vec<Product>;

    fn topics(&self) -> Vec<Topic> {
        vec![Topic::table(Table::Products)]
    }

    async fn fetch(&self) -> AppResult<Self::Output> {
        self.service.list_available(self.search.as_deref()).await
    }
}
