//! Reply use-cases behind [`ReplyBoard`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{ForumPersistenceError, ReplyBoard, ReplyRepository};
use crate::domain::{Error, Page, Reply, ReplyDraft, ReplyFilter, RequestContext};

fn map_persistence_error(error: ForumPersistenceError) -> Error {
    match error {
        ForumPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("reply store unavailable: {message}"))
        }
        ForumPersistenceError::Query { message } => {
            Error::internal(format!("reply store error: {message}"))
        }
    }
}

/// Reply use-cases over [`ReplyRepository`].
#[derive(Clone)]
pub struct ReplyService {
    replies: Arc<dyn ReplyRepository>,
}

impl ReplyService {
    /// Build the service over reply storage.
    pub fn new(replies: Arc<dyn ReplyRepository>) -> Self {
        Self { replies }
    }
}

#[async_trait(?Send)]
impl ReplyBoard for ReplyService {
    async fn list(&self, filter: ReplyFilter) -> Result<Page<Reply>, Error> {
        self.replies
            .list(&filter)
            .await
            .map_err(map_persistence_error)
    }

    async fn create(&self, ctx: &RequestContext<'_>, draft: ReplyDraft) -> Result<Reply, Error> {
        let author = ctx.require_user()?;
        let new_reply = draft
            .into_new_reply(author.id)
            .map_err(|err| Error::invalid_request(err.to_string()).with_field(err.field(), "invalid"))?;
        let reply = self
            .replies
            .create(&new_reply)
            .await
            .map_err(map_persistence_error)?;
        info!(reply_id = reply.id, user_id = %author.id, "reply created");
        Ok(reply)
    }

    async fn delete(&self, ctx: &RequestContext<'_>, id: i64) -> Result<(), Error> {
        let caller = ctx.require_user()?;
        let reply = self
            .replies
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("reply {id} not found")))?;
        if reply.user_id != caller.id && !caller.is_admin {
            warn!(reply_id = id, caller = %caller.id, "reply delete refused");
            return Err(Error::forbidden("only the author or an admin may delete a reply"));
        }
        if !self
            .replies
            .delete(id)
            .await
            .map_err(map_persistence_error)?
        {
            return Err(Error::not_found(format!("reply {id} not found")));
        }
        info!(reply_id = id, caller = %caller.id, "reply deleted");
        Ok(())
    }
}
