//! Replies ("messages") attached to content.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::content::PageRequest;
use super::user::UserId;

/// Maximum reply title length in characters.
pub const REPLY_TITLE_MAX: usize = 200;
/// Maximum target type length in characters.
pub const TARGET_TYPE_MAX: usize = 16;

/// Validation failures for new replies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyValidationError {
    #[error("reply title must not be empty")]
    EmptyTitle,
    #[error("reply title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("reply content must not be empty")]
    EmptyContent,
    #[error("target type must not be empty")]
    EmptyTargetType,
    #[error("target type must be at most {max} characters")]
    TargetTypeTooLong { max: usize },
    #[error("target id must be positive")]
    InvalidTargetId,
}

impl ReplyValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyContent => "content",
            Self::EmptyTargetType | Self::TargetTypeTooLong { .. } => "targetType",
            Self::InvalidTargetId => "targetId",
        }
    }
}

/// Reply row as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: i64,
    /// Reply being answered; 0 for a top-level reply.
    pub parent_id: i64,
    /// Kind of content replied to, such as `article`.
    pub target_type: String,
    pub target_id: i64,
    /// Author.
    #[schema(value_type = i64)]
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Filters for a reply listing. `None` fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyFilter {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub user_id: Option<UserId>,
    pub page: PageRequest,
}

/// Validated reply about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub parent_id: i64,
    pub target_type: String,
    pub target_id: i64,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
}

/// Reply body as submitted, before the author is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    pub parent_id: i64,
    pub target_type: String,
    pub target_id: i64,
    pub title: String,
    pub content: String,
}

impl ReplyDraft {
    /// Validate the draft and attach its author.
    pub fn into_new_reply(self, author: UserId) -> Result<NewReply, ReplyValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ReplyValidationError::EmptyTitle);
        }
        if title.chars().count() > REPLY_TITLE_MAX {
            return Err(ReplyValidationError::TitleTooLong {
                max: REPLY_TITLE_MAX,
            });
        }
        if self.content.trim().is_empty() {
            return Err(ReplyValidationError::EmptyContent);
        }
        let target_type = self.target_type.trim();
        if target_type.is_empty() {
            return Err(ReplyValidationError::EmptyTargetType);
        }
        if target_type.chars().count() > TARGET_TYPE_MAX {
            return Err(ReplyValidationError::TargetTypeTooLong {
                max: TARGET_TYPE_MAX,
            });
        }
        if self.target_id <= 0 {
            return Err(ReplyValidationError::InvalidTargetId);
        }
        Ok(NewReply {
            parent_id: self.parent_id.max(0),
            target_type: target_type.to_owned(),
            target_id: self.target_id,
            user_id: author,
            title: title.to_owned(),
            content: self.content,
        })
    }
}
