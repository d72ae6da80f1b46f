//! In-process store
//!
//! All tables live behind one `RwLock`, so every trait method is atomic with
//! respect to the others, including the multi-row operations.

use std::collections::HashSet;

use chrono::Utc;
use shared::{
    Comment, Conversation, DiagnosisRecord, Message, Post, Product, ProductStatus, Profile,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NewComment, NewDiagnosis, NewMessage, NewPost, NewProduct, NewProfile, ProfileChanges, Store,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    products: Vec<Product>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    diagnoses: Vec<DiagnosisRecord>,
}

/// Store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; rows with equal timestamps keep latest-inserted first
fn newest_first<T: Clone, K: Ord>(rows: impl DoubleEndedIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[axum::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.id == profile.id) {
            return Err(AppError::Conflict("A profile already exists for this user".to_string()));
        }

        let now = Utc::now();
        let row = Profile {
            id: profile.id,
            full_name: profile.full_name,
            role: profile.role,
            location: profile.location,
            phone: profile.phone,
            bio: profile.bio,
            crop_types: profile.crop_types,
            business_type: profile.business_type,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(full_name) = changes.full_name {
            profile.full_name = full_name;
        }
        if let Some(location) = changes.location {
            profile.location = location;
        }
        if let Some(phone) = changes.phone {
            profile.phone = phone;
        }
        if let Some(bio) = changes.bio {
            profile.bio = bio;
        }
        if let Some(crop_types) = changes.crop_types {
            profile.crop_types = crop_types;
        }
        if let Some(business_type) = changes.business_type {
            profile.business_type = business_type;
        }
        profile.updated_at = Utc::now();

        Ok(Some(profile.clone()))
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        let mut profiles = tables.profiles.clone();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(profiles)
    }

    async fn insert_product(&self, product: NewProduct) -> AppResult<Product> {
        let row = Product {
            id: Uuid::new_v4(),
            seller_id: product.seller_id,
            name: product.name,
            description: product.description,
            category: product.category,
            price: product.price,
            quantity: product.quantity,
            unit: product.unit,
            status: ProductStatus::Available,
            created_at: Utc::now(),
        };
        self.tables.write().await.products.push(row.clone());
        Ok(row)
    }

    async fn list_products_by_status(&self, status: ProductStatus) -> AppResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.products.iter().filter(|p| p.status == status).cloned(),
            |p| p.created_at,
        ))
    }

    async fn list_products_by_seller(&self, seller_id: Uuid) -> AppResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.products.iter().filter(|p| p.seller_id == seller_id).cloned(),
            |p| p.created_at,
        ))
    }

    async fn insert_post(&self, post: NewPost) -> AppResult<Post> {
        let row = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            content: post.content,
            created_at: Utc::now(),
        };
        self.tables.write().await.posts.push(row.clone());
        Ok(row)
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> AppResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.posts.iter().cloned(), |p| p.created_at))
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(AppError::NotFound("Post".to_string()));
        }

        let row = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        tables.comments.push(row.clone());
        Ok(row)
    }

    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> AppResult<Vec<Comment>> {
        let wanted: HashSet<&Uuid> = post_ids.iter().collect();
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| wanted.contains(&c.post_id))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn find_or_create_conversation(
        &self,
        participant1_id: Uuid,
        participant2_id: Uuid,
    ) -> AppResult<(Conversation, bool)> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .conversations
            .iter()
            .find(|c| c.participant1_id == participant1_id && c.participant2_id == participant2_id)
        {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let row = Conversation {
            id: Uuid::new_v4(),
            participant1_id,
            participant2_id,
            created_at: now,
            updated_at: now,
        };
        tables.conversations.push(row.clone());
        Ok((row, true))
    }

    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .conversations
                .iter()
                .filter(|c| c.has_participant(user_id))
                .cloned(),
            |c| c.updated_at,
        ))
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let conversation = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or_else(|| AppError::NotFound("Conversation".to_string()))?;
        conversation.updated_at = now;

        let row = Message {
            id: Uuid::new_v4(),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content,
            created_at: now,
            read: false,
        };
        tables.messages.push(row.clone());
        Ok(row)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn mark_read(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for message in tables.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.sender_id != viewer_id && !m.read
        }) {
            message.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count_unread(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != viewer_id && !m.read)
            .count() as i64)
    }

    async fn insert_diagnosis(&self, record: NewDiagnosis) -> AppResult<DiagnosisRecord> {
        let row = DiagnosisRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            image_url: record.image_url,
            diagnosis: record.diagnosis,
            disease_detected: record.disease_detected,
            confidence: record.confidence,
            recommendations: record.recommendations,
            status: record.status,
            created_at: Utc::now(),
        };
        self.tables.write().await.diagnoses.push(row.clone());
        Ok(row)
    }

    async fn list_diagnoses(&self, user_id: Uuid) -> AppResult<Vec<DiagnosisRecord>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.diagnoses.iter().filter(|d| d.user_id == user_id).cloned(),
            |d| d.created_at,
        ))
    }
}
