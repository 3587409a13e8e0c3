//! Process-local forum store.
//!
//! Used when no database is configured and by tests that want real port
//! behaviour without Postgres. Uniqueness on passport and nickname mirrors the
//! database constraints, and [`UserUnitOfWork::run`] commits by swapping in a
//! working copy of the state only when the closure succeeds.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    ContentQuery, ForumPersistenceError, ForumStatsRepository, NewUserRecord, ReplyRepository,
    TxFuture, UserPersistenceError, UserRepository, UserTransaction, UserUnitOfWork,
};
use crate::domain::{
    ContentFilter, ContentKind, ContentSort, ContentSummary, Error, Gender, NewReply, Nickname,
    Page, PageRequest, Passport, PasswordDigest, ProfileChanges, Reply, ReplyFilter, User, UserId,
    UserStatus,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: PasswordDigest,
}

#[derive(Debug, Clone, Default)]
struct ForumState {
    users: Vec<StoredUser>,
    contents: Vec<ContentSummary>,
    replies: Vec<Reply>,
    next_user_id: i64,
    next_content_id: i64,
    next_reply_id: i64,
}

impl ForumState {
    fn user_mut(&mut self, id: UserId) -> Result<&mut StoredUser, UserPersistenceError> {
        self.users
            .iter_mut()
            .find(|stored| stored.user.id == id)
            .ok_or_else(|| UserPersistenceError::query(format!("user {id} does not exist")))
    }

    fn target_mut(&mut self, kind: &str, id: i64) -> Option<&mut ContentSummary> {
        self.contents
            .iter_mut()
            .find(|content| content.id == id && content.kind.as_str() == kind)
    }

    fn insert_user(&mut self, record: &NewUserRecord) -> Result<UserId, UserPersistenceError> {
        if self
            .users
            .iter()
            .any(|stored| stored.user.passport == record.passport)
        {
            return Err(UserPersistenceError::PassportTaken);
        }
        if self
            .users
            .iter()
            .any(|stored| stored.user.nickname == record.nickname)
        {
            return Err(UserPersistenceError::NicknameTaken);
        }
        self.next_user_id += 1;
        let id = UserId::new(self.next_user_id)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let now = Utc::now();
        self.users.push(StoredUser {
            user: User {
                id,
                passport: record.passport.clone(),
                nickname: record.nickname.clone(),
                avatar: record.avatar.clone(),
                gender: Gender::Unknown,
                remark: String::new(),
                status: UserStatus::Enabled,
                is_admin: false,
                created_at: now,
                updated_at: now,
            },
            password: record.password.clone(),
        });
        Ok(id)
    }
}

/// Seed data for [`MemoryForumStore::seed_content`].
#[derive(Debug, Clone)]
pub struct ContentSeed {
    /// Content kind.
    pub kind: ContentKind,
    pub category_id: i64,
    pub user_id: UserId,
    /// Content title.
    pub title: String,
    pub view_count: i64,
}

/// In-memory implementation of every forum persistence port.
#[derive(Debug, Clone, Default)]
pub struct MemoryForumStore {
    state: Arc<Mutex<ForumState>>,
}

impl MemoryForumStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing registration rules.
    pub async fn seed_user(
        &self,
        record: NewUserRecord,
        is_admin: bool,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().await;
        let id = state.insert_user(&record)?;
        let stored = state.user_mut(id)?;
        stored.user.is_admin = is_admin;
        Ok(stored.user.clone())
    }

    /// Insert a content row with no replies.
    pub async fn seed_content(&self, seed: ContentSeed) -> ContentSummary {
        let mut state = self.state.lock().await;
        state.next_content_id += 1;
        let now = Utc::now();
        let summary = ContentSummary {
            id: state.next_content_id,
            kind: seed.kind,
            category_id: seed.category_id,
            user_id: seed.user_id,
            title: seed.title,
            reply_count: 0,
            view_count: seed.view_count,
            created_at: now,
            updated_at: now,
        };
        state.contents.push(summary.clone());
        summary
    }

    /// Number of stored accounts.
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }

    /// Stored digest for `id`.
    pub async fn password_of(&self, id: UserId) -> Option<PasswordDigest> {
        self.state
            .lock()
            .await
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.password.clone())
    }
}

fn paginate<T>(rows: Vec<T>, page: PageRequest) -> Page<T> {
    let total = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(offset).take(limit).collect();
    Page::new(items, total, page)
}

fn newest_first(a: &DateTime<Utc>, b: &DateTime<Utc>, a_id: i64, b_id: i64) -> std::cmp::Ordering {
    b.cmp(a).then(b_id.cmp(&a_id))
}

#[async_trait]
impl UserRepository for MemoryForumStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_credentials(
        &self,
        passport: &str,
        digest: &PasswordDigest,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.passport.as_str() == passport && &stored.password == digest)
            .map(|stored| stored.user.clone()))
    }

    async fn set_status(&self, id: UserId, status: UserStatus) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.lock().await;
        match state.users.iter_mut().find(|stored| stored.user.id == id) {
            Some(stored) => {
                stored.user.status = status;
                stored.user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Working copy handed to unit-of-work closures.
struct MemoryTransaction {
    state: ForumState,
}

#[async_trait]
impl UserTransaction for MemoryTransaction {
    async fn count_by_passport(&mut self, passport: &Passport) -> Result<i64, UserPersistenceError> {
        Ok(count(
            self.state
                .users
                .iter()
                .filter(|stored| &stored.user.passport == passport),
        ))
    }

    async fn count_by_nickname(
        &mut self,
        nickname: &Nickname,
        excluding: Option<UserId>,
    ) -> Result<i64, UserPersistenceError> {
        Ok(count(self.state.users.iter().filter(|stored| {
            &stored.user.nickname == nickname && Some(stored.user.id) != excluding
        })))
    }

    async fn count_by_id_and_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<i64, UserPersistenceError> {
        Ok(count(
            self.state
                .users
                .iter()
                .filter(|stored| stored.user.id == id && &stored.password == digest),
        ))
    }

    async fn insert(&mut self, user: &NewUserRecord) -> Result<UserId, UserPersistenceError> {
        self.state.insert_user(user)
    }

    async fn update_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let stored = self.state.user_mut(id)?;
        stored.password = digest.clone();
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_avatar(&mut self, id: UserId, avatar: &str) -> Result<(), UserPersistenceError> {
        let stored = self.state.user_mut(id)?;
        avatar.clone_into(&mut stored.user.avatar);
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(
        &mut self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<(), UserPersistenceError> {
        if let Some(nickname) = &changes.nickname
            && self
                .state
                .users
                .iter()
                .any(|stored| &stored.user.nickname == nickname && stored.user.id != id)
        {
            return Err(UserPersistenceError::NicknameTaken);
        }
        let stored = self.state.user_mut(id)?;
        if let Some(nickname) = &changes.nickname {
            stored.user.nickname = nickname.clone();
        }
        if let Some(gender) = changes.gender {
            stored.user.gender = gender;
        }
        if let Some(remark) = &changes.remark {
            remark.clone_into(&mut stored.user.remark);
        }
        stored.user.updated_at = Utc::now();
        Ok(())
    }
}

fn count<I: Iterator>(iter: I) -> i64 {
    i64::try_from(iter.count()).unwrap_or(i64::MAX)
}

impl UserUnitOfWork for MemoryForumStore {
    fn run<'a, T, F>(&'a self, work: F) -> impl Future<Output = Result<T, Error>> + Send + 'a
    where
        T: Send + 'a,
        F: for<'t> FnOnce(&'t mut dyn UserTransaction) -> TxFuture<'t, T> + Send + 'a,
    {
        async move {
            let mut guard = self.state.lock().await;
            let mut tx = MemoryTransaction {
                state: guard.clone(),
            };
            let value = work(&mut tx).await?;
            *guard = tx.state;
            Ok(value)
        }
    }
}

#[async_trait]
impl ForumStatsRepository for MemoryForumStore {
    async fn group_count_content_by_kind(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<(String, i64)>, ForumPersistenceError> {
        let state = self.state.lock().await;
        let counts = ContentKind::ALL
            .iter()
            .map(|kind| {
                let n = count(state.contents.iter().filter(|content| {
                    content.kind == *kind && user.is_none_or(|id| content.user_id == id)
                }));
                (kind.as_str().to_owned(), n)
            })
            .filter(|(_, n)| *n > 0)
            .collect();
        Ok(counts)
    }

    async fn count_replies(&self, user: Option<UserId>) -> Result<i64, ForumPersistenceError> {
        let state = self.state.lock().await;
        Ok(count(
            state
                .replies
                .iter()
                .filter(|reply| user.is_none_or(|id| reply.user_id == id)),
        ))
    }
}

#[async_trait]
impl ContentQuery for MemoryForumStore {
    async fn list(&self, filter: &ContentFilter) -> Result<Page<ContentSummary>, ForumPersistenceError> {
        let state = self.state.lock().await;
        let mut rows: Vec<ContentSummary> = state
            .contents
            .iter()
            .filter(|content| filter.kind.is_none_or(|kind| content.kind == kind))
            .filter(|content| filter.category_id.is_none_or(|id| content.category_id == id))
            .filter(|content| filter.user_id.is_none_or(|id| content.user_id == id))
            .cloned()
            .collect();
        match filter.sort {
            ContentSort::Latest => {
                rows.sort_by(|a, b| newest_first(&a.created_at, &b.created_at, a.id, b.id));
            }
            ContentSort::Active => {
                rows.sort_by(|a, b| newest_first(&a.updated_at, &b.updated_at, a.id, b.id));
            }
            ContentSort::Hot => {
                rows.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(b.id.cmp(&a.id)));
            }
        }
        Ok(paginate(rows, filter.page))
    }
}

#[async_trait]
impl ReplyRepository for MemoryForumStore {
    async fn list(&self, filter: &ReplyFilter) -> Result<Page<Reply>, ForumPersistenceError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Reply> = state
            .replies
            .iter()
            .filter(|reply| {
                filter
                    .target_type
                    .as_deref()
                    .is_none_or(|kind| reply.target_type == kind)
            })
            .filter(|reply| filter.target_id.is_none_or(|id| reply.target_id == id))
            .filter(|reply| filter.user_id.is_none_or(|id| reply.user_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| newest_first(&a.created_at, &b.created_at, a.id, b.id));
        Ok(paginate(rows, filter.page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reply>, ForumPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.replies.iter().find(|reply| reply.id == id).cloned())
    }

    async fn create(&self, reply: &NewReply) -> Result<Reply, ForumPersistenceError> {
        let mut state = self.state.lock().await;
        state.next_reply_id += 1;
        let stored = Reply {
            id: state.next_reply_id,
            parent_id: reply.parent_id,
            target_type: reply.target_type.clone(),
            target_id: reply.target_id,
            user_id: reply.user_id,
            title: reply.title.clone(),
            content: reply.content.clone(),
            created_at: Utc::now(),
        };
        state.replies.push(stored.clone());
        if let Some(content) = state.target_mut(&reply.target_type, reply.target_id) {
            content.reply_count += 1;
            content.updated_at = stored.created_at;
        }
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<bool, ForumPersistenceError> {
        let mut state = self.state.lock().await;
        let Some(index) = state.replies.iter().position(|reply| reply.id == id) else {
            return Ok(false);
        };
        let removed = state.replies.remove(index);
        if let Some(content) = state.target_mut(&removed.target_type, removed.target_id) {
            content.reply_count = (content.reply_count - 1).max(0);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests;
