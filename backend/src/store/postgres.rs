//! PostgreSQL store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    Comment, Conversation, DiagnosisRecord, Message, Post, Product, ProductStatus, Profile,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    NewComment, NewDiagnosis, NewMessage, NewPost, NewProduct, NewProfile, ProfileChanges, Store,
};
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Database row for a profile
#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    role: String,
    location: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    crop_types: Vec<String>,
    business_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            full_name: row.full_name,
            role: row.role.parse().map_err(AppError::Store)?,
            location: row.location,
            phone: row.phone,
            bio: row.bio,
            crop_types: row.crop_types,
            business_type: row.business_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for a product
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    seller_id: Uuid,
    name: String,
    description: Option<String>,
    category: String,
    price: Decimal,
    quantity: Decimal,
    unit: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            seller_id: row.seller_id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            quantity: row.quantity,
            unit: row.unit,
            status: row.status.parse().map_err(AppError::Store)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ConversationRow {
    id: Uuid,
    participant1_id: Uuid,
    participant2_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: row.id,
            participant1_id: row.participant1_id,
            participant2_id: row.participant2_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Upsert result; `inserted` is false when the pair already existed
#[derive(Debug, FromRow)]
struct UpsertedConversationRow {
    #[sqlx(flatten)]
    conversation: ConversationRow,
    inserted: bool,
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            content: row.content,
            created_at: row.created_at,
            read: row.read,
        }
    }
}

#[derive(Debug, FromRow)]
struct DiagnosisRow {
    id: Uuid,
    user_id: Uuid,
    image_url: String,
    diagnosis: String,
    disease_detected: String,
    confidence: i32,
    recommendations: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<DiagnosisRow> for DiagnosisRecord {
    fn from(row: DiagnosisRow) -> Self {
        DiagnosisRecord {
            id: row.id,
            user_id: row.user_id,
            image_url: row.image_url,
            diagnosis: row.diagnosis,
            disease_detected: row.disease_detected,
            confidence: row.confidence,
            recommendations: row.recommendations,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const PROFILE_COLUMNS: &str = "id, full_name, role, location, phone, bio, crop_types, \
                               business_type, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, seller_id, name, description, category, price, quantity, unit, status, created_at";
const POST_COLUMNS: &str = "id, user_id AS author_id, content, created_at";
const COMMENT_COLUMNS: &str = "id, post_id, user_id AS author_id, content, created_at";
const CONVERSATION_COLUMNS: &str = "id, participant1_id, participant2_id, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, read, created_at";
const DIAGNOSIS_COLUMNS: &str = "id, user_id, image_url, diagnosis, disease_detected, \
                                 confidence, recommendations, status, created_at";

fn profiles(rows: Vec<ProfileRow>) -> AppResult<Vec<Profile>> {
    rows.into_iter().map(Profile::try_from).collect()
}

fn products(rows: Vec<ProductRow>) -> AppResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

#[axum::async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (id, full_name, role, location, phone, bio, crop_types, business_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(&profile.location)
        .bind(&profile.phone)
        .bind(&profile.bio)
        .bind(&profile.crop_types)
        .bind(&profile.business_type)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A profile already exists for this user".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        row.try_into()
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.db)
        .await?;

        profiles(rows)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($1, full_name),
                location = CASE WHEN $2 THEN $3 ELSE location END,
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                bio = CASE WHEN $6 THEN $7 ELSE bio END,
                crop_types = COALESCE($8, crop_types),
                business_type = CASE WHEN $9 THEN $10 ELSE business_type END,
                updated_at = NOW()
            WHERE id = $11
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&changes.full_name)
        .bind(changes.location.is_some())
        .bind(changes.location.flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.flatten())
        .bind(changes.bio.is_some())
        .bind(changes.bio.flatten())
        .bind(&changes.crop_types)
        .bind(changes.business_type.is_some())
        .bind(changes.business_type.flatten())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name"
        ))
        .fetch_all(&self.db)
        .await?;

        profiles(rows)
    }

    async fn insert_product(&self, product: NewProduct) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (seller_id, name, description, category, price, quantity, unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.seller_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.quantity)
        .bind(&product.unit)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn list_products_by_status(&self, status: ProductStatus) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.db)
        .await?;

        products(rows)
    }

    async fn list_products_by_seller(&self, seller_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.db)
        .await?;

        products(rows)
    }

    async fn insert_post(&self, post: NewPost) -> AppResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO community_posts (user_id, content) VALUES ($1, $2) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.author_id)
        .bind(&post.content)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM community_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_posts(&self) -> AppResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM community_posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        // post_comments cascades on its foreign key
        let result = sqlx::query("DELETE FROM community_posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO post_comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound("Post".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        Ok(row.into())
    }

    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> AppResult<Vec<Comment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM post_comments WHERE post_id = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(post_ids.to_vec())
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_or_create_conversation(
        &self,
        participant1_id: Uuid,
        participant2_id: Uuid,
    ) -> AppResult<(Conversation, bool)> {
        // The no-op update makes RETURNING yield the existing row on conflict;
        // xmax is 0 only for a freshly inserted tuple.
        let row = sqlx::query_as::<_, UpsertedConversationRow>(&format!(
            r#"
            INSERT INTO conversations (participant1_id, participant2_id)
            VALUES ($1, $2)
            ON CONFLICT (participant1_id, participant2_id)
            DO UPDATE SET participant1_id = EXCLUDED.participant1_id
            RETURNING {CONVERSATION_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(participant1_id)
        .bind(participant2_id)
        .fetch_one(&self.db)
        .await?;

        Ok((row.conversation.into(), row.inserted))
    }

    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE participant1_id = $1 OR participant2_id = $1
            ORDER BY updated_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut tx = self.db.begin().await?;

        let touched = sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(message.conversation_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(AppError::NotFound("Conversation".to_string()));
        }

        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_read(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read = TRUE
            WHERE conversation_id = $1 AND sender_id <> $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(viewer_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE conversation_id = $1 AND sender_id <> $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(viewer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn insert_diagnosis(&self, record: NewDiagnosis) -> AppResult<DiagnosisRecord> {
        let row = sqlx::query_as::<_, DiagnosisRow>(&format!(
            r#"
            INSERT INTO plant_diagnoses
                (user_id, image_url, diagnosis, disease_detected, confidence, recommendations, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DIAGNOSIS_COLUMNS}
            "#
        ))
        .bind(record.user_id)
        .bind(&record.image_url)
        .bind(&record.diagnosis)
        .bind(&record.disease_detected)
        .bind(record.confidence)
        .bind(&record.recommendations)
        .bind(&record.status)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_diagnoses(&self, user_id: Uuid) -> AppResult<Vec<DiagnosisRecord>> {
        let rows = sqlx::query_as::<_, DiagnosisRow>(&format!(
            "SELECT {DIAGNOSIS_COLUMNS} FROM plant_diagnoses WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
