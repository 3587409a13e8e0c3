//! Read-side model for authored content and the paging filters shared by
//! content and reply listings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Kind of authored content. Stored as its lowercase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Article,
    Topic,
    Ask,
}

impl ContentKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::Article, Self::Topic, Self::Ask];

    /// Label used in storage, paths and stats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Topic => "topic",
            Self::Ask => "ask",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown content kind label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind `{0}`")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownContentKind(s.to_owned()))
    }
}

/// Ordering applied to content listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentSort {
    /// Newest first.
    #[default]
    Latest,
    /// Most recently updated first.
    Active,
    /// Most viewed first.
    Hot,
}

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalised 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub size: u32,
}

impl PageRequest {
    /// Clamp raw query values into a valid window. Missing or zero values fall
    /// back to the first page and the default size.
    ///
    /// # Examples
    /// ```
    /// use focus::domain::PageRequest;
    ///
    /// let page = PageRequest::new(Some(0), Some(500));
    /// assert_eq!((page.page, page.size), (1, 100));
    /// ```
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let size = size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, size }
    }

    /// Rows to skip.
    pub fn offset(self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }

    /// Rows to fetch.
    pub fn limit(self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filters for a content listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub kind: Option<ContentKind>,
    pub category_id: Option<i64>,
    pub user_id: Option<UserId>,
    /// Listing order.
    pub sort: ContentSort,
    pub page: PageRequest,
}

/// Content row as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub id: i64,
    pub kind: ContentKind,
    pub category_id: i64,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    pub title: String,
    /// Replies attached to this content.
    pub reply_count: i64,
    /// Times the content was opened.
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Matching rows across all pages.
    pub total: i64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    /// Page of `items` out of `total` matching rows.
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
        }
    }

    /// Page with no rows.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}
