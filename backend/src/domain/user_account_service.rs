//! Account use-cases: login, registration, profile edits and the user-facing
//! aggregates (profile, statistics, content and message pages).
//!
//! Multi-step writes run inside one [`UserUnitOfWork`]. Session resyncs
//! happen after the unit commits so a rolled-back change never leaks into the
//! cached session user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AvatarError, AvatarStore, ContentQuery, ForumPersistenceError, ForumStatsRepository,
    MessageListing, NewUserRecord, ReplyRepository, UserAccounts, UserContentListing,
    UserPersistenceError, UserRepository, UserUnitOfWork,
};
use crate::domain::{
    AvatarUrl, ContentFilter, CredentialHasher, Error, LoginCredentials, Nickname, Passport,
    PasswordChange, ProfileChanges, Registration, ReplyFilter, RequestContext, SessionUser, User,
    UserId, UserProfile, UserStats, UserStatus, generated_avatar_url,
};

/// Adapters the account service is assembled from.
pub struct UserAccountPorts<W> {
    /// Account lookups outside transactions.
    pub users: Arc<dyn UserRepository>,
    /// Transactional writes.
    pub unit_of_work: Arc<W>,
    /// Per-kind and reply counters.
    pub stats: Arc<dyn ForumStatsRepository>,
    /// Content listings.
    pub content: Arc<dyn ContentQuery>,
    /// Reply listings for the message page.
    pub replies: Arc<dyn ReplyRepository>,
    /// Generated avatar rendering and storage.
    pub avatars: Arc<dyn AvatarStore>,
    /// Password digest function.
    pub hasher: Arc<dyn CredentialHasher>,
}

/// Account service implementing [`UserAccounts`].
pub struct UserAccountService<W> {
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<W>,
    stats: Arc<dyn ForumStatsRepository>,
    content: Arc<dyn ContentQuery>,
    replies: Arc<dyn ReplyRepository>,
    avatars: Arc<dyn AvatarStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<W> Clone for UserAccountService<W> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            unit_of_work: Arc::clone(&self.unit_of_work),
            stats: Arc::clone(&self.stats),
            content: Arc::clone(&self.content),
            replies: Arc::clone(&self.replies),
            avatars: Arc::clone(&self.avatars),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid account or password")
}

fn account_taken(passport: &Passport) -> Error {
    Error::conflict(format!("passport \"{passport}\" is already registered"))
        .with_field("passport", "account_taken")
}

fn nickname_taken(nickname: &Nickname) -> Error {
    Error::conflict(format!("nickname \"{nickname}\" is already in use"))
        .with_field("nickname", "nickname_taken")
}

fn wrong_old_password() -> Error {
    Error::invalid_request("old password is incorrect")
        .with_field("oldPassword", "wrong_old_password")
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserPersistenceError::PassportTaken => Error::conflict("passport is already registered")
            .with_field("passport", "account_taken"),
        UserPersistenceError::NicknameTaken => Error::conflict("nickname is already in use")
            .with_field("nickname", "nickname_taken"),
    }
}

fn map_forum_error(error: ForumPersistenceError) -> Error {
    match error {
        ForumPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("forum store unavailable: {message}"))
        }
        ForumPersistenceError::Query { message } => {
            Error::internal(format!("forum store error: {message}"))
        }
    }
}

fn map_avatar_error(error: AvatarError) -> Error {
    error!(%error, "avatar generation failed");
    Error::internal(format!("failed to create avatar: {error}"))
}

impl<W> UserAccountService<W>
where
    W: UserUnitOfWork,
{
    /// Build the service from its ports.
    pub fn new(ports: UserAccountPorts<W>) -> Self {
        let UserAccountPorts {
            users,
            unit_of_work,
            stats,
            content,
            replies,
            avatars,
            hasher,
        } = ports;
        Self {
            users,
            unit_of_work,
            stats,
            content,
            replies,
            avatars,
            hasher,
        }
    }

    /// Write `user` back into the session and the request cache.
    fn resync_session(ctx: &RequestContext<'_>, user: SessionUser) -> Result<(), Error> {
        ctx.session().set_user(&user)?;
        ctx.set_user(Some(user));
        Ok(())
    }

    async fn load_profile(
        &self,
        ctx: &RequestContext<'_>,
        user_id: UserId,
    ) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        let stats = self.stats_for(ctx, Some(user_id)).await?;
        Ok(UserProfile::from_user(user, stats))
    }

    /// Per-user counters apply only to a concrete id that is not an admin
    /// looking at their own page; everything else sees global totals.
    async fn stats_for(
        &self,
        ctx: &RequestContext<'_>,
        user_id: Option<UserId>,
    ) -> Result<UserStats, Error> {
        let scope = user_id.filter(|id| !ctx.is_admin_viewing_own_data(*id));
        let content = self
            .stats
            .group_count_content_by_kind(scope)
            .await
            .map_err(map_forum_error)?;
        let replies = self
            .stats
            .count_replies(scope)
            .await
            .map_err(map_forum_error)?;
        Ok(UserStats::from_counts(content, replies))
    }
}

#[async_trait(?Send)]
impl<W> UserAccounts for UserAccountService<W>
where
    W: UserUnitOfWork + 'static,
{
    async fn login(
        &self,
        ctx: &RequestContext<'_>,
        credentials: &LoginCredentials,
    ) -> Result<SessionUser, Error> {
        let digest = self
            .hasher
            .hash(credentials.passport(), credentials.password())?;
        let Some(user) = self
            .users
            .find_by_credentials(credentials.passport(), &digest)
            .await
            .map_err(map_user_error)?
        else {
            info!(passport = credentials.passport(), "login rejected");
            return Err(invalid_credentials());
        };
        if !user.is_enabled() {
            info!(user_id = %user.id, "login rejected for disabled account");
            return Err(invalid_credentials());
        }

        let snapshot = user.to_session_user();
        Self::resync_session(ctx, snapshot.clone())?;
        info!(user_id = %snapshot.id, "user logged in");
        Ok(snapshot)
    }

    async fn logout(&self, ctx: &RequestContext<'_>) -> Result<(), Error> {
        ctx.session().remove_user()?;
        ctx.set_user(None);
        Ok(())
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            passport,
            nickname,
            password,
        } = registration;

        // Render up front; the file itself is written only after commit.
        let avatar = self.avatars.render(&passport).map_err(map_avatar_error)?;
        let hasher = Arc::clone(&self.hasher);

        let user_id = self
            .unit_of_work
            .run(move |tx| {
                Box::pin(async move {
                    if tx
                        .count_by_passport(&passport)
                        .await
                        .map_err(map_user_error)?
                        > 0
                    {
                        return Err(account_taken(&passport));
                    }
                    if tx
                        .count_by_nickname(&nickname, None)
                        .await
                        .map_err(map_user_error)?
                        > 0
                    {
                        return Err(nickname_taken(&nickname));
                    }
                    let digest = hasher.hash(passport.as_str(), &password)?;
                    let record = NewUserRecord {
                        avatar: generated_avatar_url(&passport),
                        passport,
                        nickname,
                        password: digest,
                    };
                    tx.insert(&record).await.map_err(map_user_error)
                })
            })
            .await?;

        // The account is committed and usable; a missing file falls back to
        // a regenerated avatar on the next update.
        if let Err(err) = self.avatars.save(&avatar).await {
            warn!(user_id = %user_id, error = %err, "avatar write failed after registration");
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::internal(format!("registered user {user_id} vanished")))?;
        info!(user_id = %user.id, passport = %user.passport, "user registered");
        Ok(user)
    }

    async fn update_password(
        &self,
        ctx: &RequestContext<'_>,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let user = ctx.require_user()?;
        let user_id = user.id;
        let hasher = Arc::clone(&self.hasher);

        self.unit_of_work
            .run(move |tx| {
                Box::pin(async move {
                    let old = hasher.hash(user.passport.as_str(), &change.old_password)?;
                    if tx
                        .count_by_id_and_password(user.id, &old)
                        .await
                        .map_err(map_user_error)?
                        == 0
                    {
                        return Err(wrong_old_password());
                    }
                    let new = hasher.hash(user.passport.as_str(), &change.new_password)?;
                    tx.update_password(user.id, &new)
                        .await
                        .map_err(map_user_error)
                })
            })
            .await?;

        info!(%user_id, "password changed");
        Ok(())
    }

    async fn update_avatar(&self, ctx: &RequestContext<'_>, avatar: AvatarUrl) -> Result<(), Error> {
        let user = ctx.require_user()?;
        let user_id = user.id;
        let url = avatar.as_str().to_owned();

        self.unit_of_work
            .run(move |tx| {
                Box::pin(async move {
                    tx.update_avatar(user_id, &url)
                        .await
                        .map_err(map_user_error)
                })
            })
            .await?;

        if user.avatar != avatar.as_str() {
            let mut refreshed = user;
            refreshed.avatar = avatar.as_str().to_owned();
            Self::resync_session(ctx, refreshed)?;
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        ctx: &RequestContext<'_>,
        changes: ProfileChanges,
    ) -> Result<(), Error> {
        let user = ctx.require_user()?;
        if changes.is_empty() {
            return Ok(());
        }
        let user_id = user.id;
        let pending = changes.clone();

        self.unit_of_work
            .run(move |tx| {
                Box::pin(async move {
                    if let Some(nickname) = &pending.nickname
                        && tx
                            .count_by_nickname(nickname, Some(user_id))
                            .await
                            .map_err(map_user_error)?
                            > 0
                    {
                        return Err(nickname_taken(nickname));
                    }
                    tx.update_profile(user_id, &pending)
                        .await
                        .map_err(map_user_error)
                })
            })
            .await?;

        if let Some(nickname) = changes.nickname
            && nickname != user.nickname
        {
            let mut refreshed = user;
            refreshed.nickname = nickname;
            Self::resync_session(ctx, refreshed)?;
        }
        Ok(())
    }

    async fn disable(&self, ctx: &RequestContext<'_>, user_id: UserId) -> Result<(), Error> {
        let caller = ctx.require_user()?;
        if !caller.is_admin {
            warn!(caller = %caller.id, target = %user_id, "non-admin attempted to disable a user");
            return Err(Error::forbidden("admin privileges required"));
        }
        let updated = self
            .users
            .set_status(user_id, UserStatus::Disabled)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        info!(admin = %caller.id, target = %user_id, "user disabled");
        Ok(())
    }

    async fn get_profile(
        &self,
        ctx: &RequestContext<'_>,
        user_id: UserId,
    ) -> Result<UserProfile, Error> {
        self.load_profile(ctx, user_id).await
    }

    async fn get_stats(
        &self,
        ctx: &RequestContext<'_>,
        user_id: Option<UserId>,
    ) -> Result<UserStats, Error> {
        self.stats_for(ctx, user_id).await
    }

    async fn get_content_and_profile_list(
        &self,
        ctx: &RequestContext<'_>,
        user_id: UserId,
        mut filter: ContentFilter,
    ) -> Result<UserContentListing, Error> {
        filter.user_id = Some(user_id);
        let profile = self.load_profile(ctx, user_id).await?;
        let content = self.content.list(&filter).await.map_err(map_forum_error)?;
        let stats = profile.stats.clone();
        Ok(UserContentListing {
            content,
            profile,
            stats,
        })
    }

    async fn get_message_list(
        &self,
        ctx: &RequestContext<'_>,
        mut filter: ReplyFilter,
    ) -> Result<MessageListing, Error> {
        let viewer = ctx.require_user()?;
        // Members only ever see their own messages; admins may pick a user.
        if !ctx.is_admin_viewing_own_data(viewer.id) {
            filter.user_id = Some(viewer.id);
        }
        let messages = self.replies.list(&filter).await.map_err(map_forum_error)?;
        let stats = self.stats_for(ctx, Some(viewer.id)).await?;
        Ok(MessageListing { messages, stats })
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
