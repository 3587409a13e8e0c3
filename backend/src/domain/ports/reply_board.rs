//! Driving port for reply use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Page, Reply, ReplyDraft, ReplyFilter, RequestContext};

/// Reply operations exposed to the HTTP layer.
#[async_trait(?Send)]
pub trait ReplyBoard: Send + Sync {
    async fn list(&self, filter: ReplyFilter) -> Result<Page<Reply>, Error>;

    /// Store a reply authored by the session user.
    async fn create(&self, ctx: &RequestContext<'_>, draft: ReplyDraft) -> Result<Reply, Error>;

    /// Delete a reply. Authors may delete their own; admins any.
    async fn delete(&self, ctx: &RequestContext<'_>, id: i64) -> Result<(), Error>;
}
