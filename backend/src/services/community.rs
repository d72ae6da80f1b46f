//! Community service: posts and comments

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use shared::{
    validate_content, Comment, CommentView, Post, PostWithComments, ProfileSummary,
};
use uuid::Uuid;

use super::check;
use crate::error::{AppError, AppResult};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{NewComment, NewPost, Store};

#[derive(Clone)]
pub struct CommunityService {
    store: Arc<dyn Store>,
    changes: ChangeFeed,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentInput {
    pub content: String,
}

impl CommunityService {
    pub fn new(store: Arc<dyn Store>, changes: ChangeFeed) -> Self {
        Self { store, changes }
    }

    pub async fn create_post(&self, author_id: Uuid, input: CreatePostInput) -> AppResult<Post> {
        check("content", validate_content(&input.content))?;

        let post = self
            .store
            .insert_post(NewPost {
                author_id,
                content: input.content.trim().to_string(),
            })
            .await?;

        self.changes.publish(
            ChangeEvent::new(Table::CommunityPosts, ChangeKind::Insert, post.id)
                .with_column("user_id", author_id),
        );

        Ok(post)
    }

    /// Delete one of the caller's posts together with its comments
    pub async fn delete_post(&self, user_id: Uuid, post_id: Uuid) -> AppResult<()> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post".to_string()))?;

        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }

        if !self.store.delete_post(post_id).await? {
            return Err(AppError::NotFound("Post".to_string()));
        }

        tracing::info!(post_id = %post_id, "post deleted");
        self.changes.publish(
            ChangeEvent::new(Table::CommunityPosts, ChangeKind::Delete, post_id)
                .with_column("user_id", user_id),
        );

        Ok(())
    }

    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        input: AddCommentInput,
    ) -> AppResult<Comment> {
        check("content", validate_content(&input.content))?;

        let comment = self
            .store
            .insert_comment(NewComment {
                post_id,
                author_id,
                content: input.content.trim().to_string(),
            })
            .await?;

        self.changes.publish(
            ChangeEvent::new(Table::PostComments, ChangeKind::Insert, comment.id)
                .with_column("post_id", post_id),
        );

        Ok(comment)
    }

    /// Posts newest first, each with its author and its comments oldest first
    pub async fn list_feed(&self) -> AppResult<Vec<PostWithComments>> {
        let posts = self.store.list_posts().await?;
        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let comments = self.store.list_comments_for_posts(&post_ids).await?;

        let mut author_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.author_id)
            .chain(comments.iter().map(|c| c.author_id))
            .collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<Uuid, ProfileSummary> = self
            .store
            .get_profiles(&author_ids)
            .await?
            .iter()
            .map(|p| (p.id, ProfileSummary::from(p)))
            .collect();

        let mut by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            let author = authors.get(&comment.author_id).cloned();
            by_post
                .entry(comment.post_id)
                .or_default()
                .push(CommentView { comment, author });
        }

        Ok(posts
            .into_iter()
            .map(|post| PostWithComments {
                author: authors.get(&post.author_id).cloned(),
                comments: by_post.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> CommunityService {
        CommunityService::new(Arc::new(MemoryStore::new()), ChangeFeed::new(16))
    }

    fn post(content: &str) -> CreatePostInput {
        CreatePostInput {
            content: content.to_string(),
        }
    }

    fn comment(content: &str) -> AddCommentInput {
        AddCommentInput {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_post_rejected() {
        let result = service().create_post(Uuid::new_v4(), post("   ")).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_keeps_other_posts_comments() {
        let service = service();
        let author = Uuid::new_v4();
        let first = service.create_post(author, post("first")).await.unwrap();
        let second = service.create_post(author, post("second")).await.unwrap();
        service.add_comment(author, first.id, comment("on first")).await.unwrap();
        service.add_comment(author, second.id, comment("on second")).await.unwrap();

        service.delete_post(author, first.id).await.unwrap();

        let feed = service.list_feed().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].post.id, second.id);
        assert_eq!(feed[0].comments.len(), 1);
        assert_eq!(feed[0].comments[0].comment.content, "on second");
    }

    #[tokio::test]
    async fn test_only_author_can_delete() {
        let service = service();
        let created = service.create_post(Uuid::new_v4(), post("mine")).await.unwrap();

        let result = service.delete_post(Uuid::new_v4(), created.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let missing = service.delete_post(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let result = service()
            .add_comment(Uuid::new_v4(), Uuid::new_v4(), comment("hello"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_comments_oldest_first() {
        let service = service();
        let author = Uuid::new_v4();
        let p = service.create_post(author, post("crop tips")).await.unwrap();
        for text in ["a", "b", "c"] {
            service.add_comment(author, p.id, comment(text)).await.unwrap();
        }

        let feed = service.list_feed().await.unwrap();
        let texts: Vec<&str> = feed[0]
            .comments
            .iter()
            .map(|c| c.comment.content.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
