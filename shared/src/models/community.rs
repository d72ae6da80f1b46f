//! Community feed models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProfileSummary;

/// A community post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment with its author, as rendered under a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<ProfileSummary>,
}

/// Post with author and comments (oldest first)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<ProfileSummary>,
    pub comments: Vec<CommentView>,
}
