//! Store boundary
//!
//! Every table read and write goes through [`Store`]. `PgStore` is the
//! production implementation; `MemoryStore` keeps the same semantics in
//! process for local runs and tests.
//!
//! Orderings are part of the contract: feeds newest first, threads (comments,
//! messages) oldest first, conversations by most recent activity.

use rust_decimal::Decimal;
use shared::{
    Comment, Conversation, DiagnosisRecord, Message, Post, Product, ProductStatus, Profile,
    UserRole,
};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Profile created at sign-up
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub crop_types: Vec<String>,
    pub business_type: Option<String>,
}

/// Owner edits; `None` leaves a field unchanged, `Some(None)` clears it
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub location: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub crop_types: Option<Vec<String>>,
    pub business_type: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewDiagnosis {
    pub user_id: Uuid,
    pub image_url: String,
    pub diagnosis: String,
    pub disease_detected: String,
    pub confidence: i32,
    pub recommendations: String,
    pub status: String,
}

/// Relational store collaborator
#[axum::async_trait]
pub trait Store: Send + Sync {
    /// Connectivity check for the health endpoint
    async fn ping(&self) -> AppResult<()>;

    // Profiles
    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile>;
    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;
    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges)
        -> AppResult<Option<Profile>>;
    /// All profiles ordered by full name
    async fn list_profiles(&self) -> AppResult<Vec<Profile>>;

    // Products
    async fn insert_product(&self, product: NewProduct) -> AppResult<Product>;
    async fn list_products_by_status(&self, status: ProductStatus) -> AppResult<Vec<Product>>;
    async fn list_products_by_seller(&self, seller_id: Uuid) -> AppResult<Vec<Product>>;

    // Community
    async fn insert_post(&self, post: NewPost) -> AppResult<Post>;
    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>>;
    async fn list_posts(&self) -> AppResult<Vec<Post>>;
    /// Deletes the post and its own comments. Returns false if it did not exist.
    async fn delete_post(&self, id: Uuid) -> AppResult<bool>;
    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment>;
    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> AppResult<Vec<Comment>>;

    // Conversations
    /// Atomic find-or-create keyed by the canonical pair.
    /// The flag is true when the row was created by this call.
    async fn find_or_create_conversation(
        &self,
        participant1_id: Uuid,
        participant2_id: Uuid,
    ) -> AppResult<(Conversation, bool)>;
    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>>;
    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;
    /// Inserts the message and bumps the conversation's `updated_at` in one
    /// transaction.
    async fn append_message(&self, message: NewMessage) -> AppResult<Message>;
    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;
    /// Marks messages not sent by `viewer_id` as read; returns rows changed
    async fn mark_read(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64>;
    async fn count_unread(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<i64>;

    // Diagnoses
    async fn insert_diagnosis(&self, record: NewDiagnosis) -> AppResult<DiagnosisRecord>;
    async fn list_diagnoses(&self, user_id: Uuid) -> AppResult<Vec<DiagnosisRecord>>;
}
