//! Driving port for account use-cases.
//!
//! Inbound adapters call this port with the caller's [`RequestContext`];
//! implementations read and resync the session through it. The futures are
//! not `Send` because the context borrows request-local session state.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AvatarUrl, ContentFilter, ContentSummary, Error, LoginCredentials, Page, PasswordChange,
    ProfileChanges, Registration, Reply, ReplyFilter, RequestContext, SessionUser, User, UserId,
    UserProfile, UserStats,
};

/// A user's content page: their listing, profile and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserContentListing {
    /// The requested page of content.
    pub content: Page<ContentSummary>,
    /// Owner of the listed content.
    pub profile: UserProfile,
    /// Counters shown beside the listing.
    pub stats: UserStats,
}

/// Replies visible to the caller plus the caller's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListing {
    /// The requested page of replies.
    pub messages: Page<Reply>,
    /// Counters of the listing's viewer.
    pub stats: UserStats,
}

/// Account operations exposed to the HTTP layer.
#[async_trait(?Send)]
pub trait UserAccounts: Send + Sync {
    /// Verify credentials, write the user into the session and refresh `ctx`.
    async fn login(
        &self,
        ctx: &RequestContext<'_>,
        credentials: &LoginCredentials,
    ) -> Result<SessionUser, Error>;

    async fn logout(&self, ctx: &RequestContext<'_>) -> Result<(), Error>;

    async fn register(&self, registration: Registration) -> Result<User, Error>;

    async fn update_password(
        &self,
        ctx: &RequestContext<'_>,
        change: PasswordChange,
    ) -> Result<(), Error>;

    async fn update_avatar(&self, ctx: &RequestContext<'_>, avatar: AvatarUrl) -> Result<(), Error>;

    async fn update_profile(
        &self,
        ctx: &RequestContext<'_>,
        changes: ProfileChanges,
    ) -> Result<(), Error>;

    async fn disable(&self, ctx: &RequestContext<'_>, user_id: UserId) -> Result<(), Error>;

    async fn get_profile(&self, ctx: &RequestContext<'_>, user_id: UserId)
    -> Result<UserProfile, Error>;

    /// Counters for `user_id`, or global counters for `None`.
    async fn get_stats(
        &self,
        ctx: &RequestContext<'_>,
        user_id: Option<UserId>,
    ) -> Result<UserStats, Error>;

    async fn get_content_and_profile_list(
        &self,
        ctx: &RequestContext<'_>,
        user_id: UserId,
        filter: ContentFilter,
    ) -> Result<UserContentListing, Error>;

    async fn get_message_list(
        &self,
        ctx: &RequestContext<'_>,
        filter: ReplyFilter,
    ) -> Result<MessageListing, Error>;
}
