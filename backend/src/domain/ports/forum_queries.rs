//! Read ports over authored content, replies and their aggregates.

use async_trait::async_trait;

use crate::domain::{ContentFilter, ContentSummary, NewReply, Page, Reply, ReplyFilter, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by content and reply adapters.
    pub enum ForumPersistenceError {
        /// Store connection could not be established.
        Connection { message: String } => "forum store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "forum store query failed: {message}",
    }
}

/// Grouped counters for statistics pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumStatsRepository: Send + Sync {
    /// `(content kind label, count)` pairs, restricted to `user` when given.
    async fn group_count_content_by_kind(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<(String, i64)>, ForumPersistenceError>;

    /// Number of replies, restricted to `user` when given.
    async fn count_replies(&self, user: Option<UserId>) -> Result<i64, ForumPersistenceError>;
}

/// Paged content listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentQuery: Send + Sync {
    async fn list(&self, filter: &ContentFilter) -> Result<Page<ContentSummary>, ForumPersistenceError>;
}

/// Reply storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyRepository: Send + Sync {
    async fn list(&self, filter: &ReplyFilter) -> Result<Page<Reply>, ForumPersistenceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Reply>, ForumPersistenceError>;

    async fn create(&self, reply: &NewReply) -> Result<Reply, ForumPersistenceError>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: i64) -> Result<bool, ForumPersistenceError>;
}
