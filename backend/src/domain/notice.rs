//! One-shot notices shown to a visitor on their next page view.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient `(kind, content)` message stored in the session until read.
///
/// # Examples
/// ```
/// use focus::domain::{Notice, NoticeKind};
///
/// let notice = Notice::success("welcome aboard");
/// assert_eq!(notice.kind, NoticeKind::Success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    /// Presentation style.
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    /// Message shown to the visitor.
    pub content: String,
}

impl Notice {
    /// Notice of the given kind.
    pub fn new(kind: NoticeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Informational notice.
    pub fn info(content: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, content)
    }

    /// Notice confirming a completed action.
    pub fn success(content: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, content)
    }
}
