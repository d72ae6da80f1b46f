//! Conversation service: pair addressing, sending and read receipts

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use shared::{
    canonical_participants, validate_content, Conversation, ConversationSummary, Message,
    ProfileSummary,
};
use uuid::Uuid;

use super::check;
use crate::error::{AppError, AppResult};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{NewMessage, Store};

#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn Store>,
    changes: ChangeFeed,
}

#[derive(Debug, Deserialize)]
pub struct StartConversationInput {
    pub other_user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    pub content: String,
}

impl ConversationService {
    pub fn new(store: Arc<dyn Store>, changes: ChangeFeed) -> Self {
        Self { store, changes }
    }

    /// The conversation between two users, created on first contact.
    ///
    /// Either argument order yields the same conversation.
    pub async fn resolve(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Conversation> {
        if user_a == user_b {
            return Err(AppError::validation(
                "other_user_id",
                "Cannot start a conversation with yourself",
            ));
        }

        let (participant1_id, participant2_id) = canonical_participants(user_a, user_b);
        let (conversation, created) = self
            .store
            .find_or_create_conversation(participant1_id, participant2_id)
            .await?;

        if created {
            tracing::info!(conversation_id = %conversation.id, "conversation created");
            self.publish_conversation(&conversation, ChangeKind::Insert);
        }

        Ok(conversation)
    }

    /// Append a message and bump the conversation's activity time
    pub async fn send(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        input: SendMessageInput,
    ) -> AppResult<Message> {
        check("content", validate_content(&input.content))?;
        let conversation = self.participant_conversation(conversation_id, sender_id).await?;

        let message = self
            .store
            .append_message(NewMessage {
                conversation_id,
                sender_id,
                content: input.content.trim().to_string(),
            })
            .await?;

        tracing::debug!(conversation_id = %conversation_id, message_id = %message.id, "message sent");
        self.changes.publish(
            ChangeEvent::new(Table::Messages, ChangeKind::Insert, message.id)
                .with_column("conversation_id", conversation_id),
        );
        self.publish_conversation(&conversation, ChangeKind::Update);

        Ok(message)
    }

    /// Mark everything the other participant sent as read; returns rows changed
    pub async fn mark_read(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64> {
        let conversation = self.participant_conversation(conversation_id, viewer_id).await?;

        let changed = self.store.mark_read(conversation_id, viewer_id).await?;
        if changed > 0 {
            self.changes.publish(
                ChangeEvent::new(Table::Messages, ChangeKind::Update, conversation_id)
                    .with_column("conversation_id", conversation_id),
            );
            // unread counts live on the conversation list
            self.publish_conversation(&conversation, ChangeKind::Update);
        }

        Ok(changed)
    }

    /// Messages oldest first; participants only
    pub async fn messages(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<Vec<Message>> {
        self.participant_conversation(conversation_id, viewer_id).await?;
        self.store.list_messages(conversation_id).await
    }

    /// The viewer's conversations, most recent activity first
    pub async fn list_for(&self, viewer_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        let conversations = self.store.list_conversations_for(viewer_id).await?;

        let others: Vec<Uuid> = conversations
            .iter()
            .map(|c| c.other_participant(viewer_id))
            .collect();
        let profiles: HashMap<Uuid, ProfileSummary> = self
            .store
            .get_profiles(&others)
            .await?
            .iter()
            .map(|p| (p.id, ProfileSummary::from(p)))
            .collect();

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let unread_count = self.store.count_unread(conversation.id, viewer_id).await?;
            summaries.push(ConversationSummary {
                other_user: profiles
                    .get(&conversation.other_participant(viewer_id))
                    .cloned(),
                unread_count,
                conversation,
            });
        }

        Ok(summaries)
    }

    /// Load a conversation the user takes part in
    pub async fn participant_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Conversation> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation".to_string()))?;

        if !conversation.has_participant(user_id) {
            return Err(AppError::Forbidden(
                "Not a participant in this conversation".to_string(),
            ));
        }

        Ok(conversation)
    }

    fn publish_conversation(&self, conversation: &Conversation, kind: ChangeKind) {
        self.changes.publish(
            ChangeEvent::new(Table::Conversations, kind, conversation.id)
                .with_column("participant1_id", conversation.participant1_id)
                .with_column("participant2_id", conversation.participant2_id),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> ConversationService {
        ConversationService::new(Arc::new(MemoryStore::new()), ChangeFeed::new(16))
    }

    fn text(content: &str) -> SendMessageInput {
        SendMessageInput {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_is_symmetric() {
        let service = service();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let ab = service.resolve(a, b).await.unwrap();
        let ba = service.resolve(b, a).await.unwrap();
        assert_eq!(ab.id, ba.id);
        assert!(ab.participant1_id.to_string() < ab.participant2_id.to_string());
    }

    #[tokio::test]
    async fn test_resolve_self_rejected() {
        let me = Uuid::new_v4();
        let result = service().resolve(me, me).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_outsider_cannot_send() {
        let service = service();
        let conv = service.resolve(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        let result = service.send(conv.id, Uuid::new_v4(), text("hi")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let service = service();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conv = service.resolve(a, b).await.unwrap();
        service.send(conv.id, a, text("one")).await.unwrap();
        service.send(conv.id, a, text("two")).await.unwrap();
        service.send(conv.id, b, text("mine")).await.unwrap();

        assert_eq!(service.mark_read(conv.id, b).await.unwrap(), 2);
        assert_eq!(service.mark_read(conv.id, b).await.unwrap(), 0);

        let messages = service.messages(conv.id, b).await.unwrap();
        let own = messages.iter().find(|m| m.sender_id == b).unwrap();
        assert!(!own.read);
    }

    #[tokio::test]
    async fn test_list_for_counts_unread() {
        let service = service();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conv = service.resolve(a, b).await.unwrap();
        service.send(conv.id, a, text("hello")).await.unwrap();

        let for_b = service.list_for(b).await.unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].unread_count, 1);

        let for_a = service.list_for(a).await.unwrap();
        assert_eq!(for_a[0].unread_count, 0);
    }
}
