//! PostgreSQL-backed read and reply ports: content listings, per-kind
//! statistics and reply storage.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ContentQuery, ForumPersistenceError, ForumStatsRepository, ReplyRepository,
};
use crate::domain::{
    ContentFilter, ContentSort, ContentSummary, NewReply, Page, Reply, ReplyFilter, UserId,
};

use super::diesel_error_mapping::{map_forum_diesel_error, map_forum_pool_error};
use super::models::{ContentRow, NewReplyRow, ReplyRow};
use super::pool::DbPool;
use super::schema::{contents, replies};

/// Diesel-backed implementation of [`ForumStatsRepository`], [`ContentQuery`]
/// and [`ReplyRepository`].
#[derive(Clone)]
pub struct DieselForumRepository {
    pool: DbPool,
}

impl DieselForumRepository {
    /// Build the repository over a pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered_contents(filter: &ContentFilter) -> contents::BoxedQuery<'static, Pg> {
    let mut query = contents::table.into_boxed();
    if let Some(kind) = filter.kind {
        query = query.filter(contents::kind.eq(kind.as_str()));
    }
    if let Some(category) = filter.category_id {
        query = query.filter(contents::category_id.eq(category));
    }
    if let Some(user) = filter.user_id {
        query = query.filter(contents::user_id.eq(user.get()));
    }
    query
}

fn filtered_replies(filter: &ReplyFilter) -> replies::BoxedQuery<'static, Pg> {
    let mut query = replies::table.into_boxed();
    if let Some(target_type) = filter.target_type.clone() {
        query = query.filter(replies::target_type.eq(target_type));
    }
    if let Some(target_id) = filter.target_id {
        query = query.filter(replies::target_id.eq(target_id));
    }
    if let Some(user) = filter.user_id {
        query = query.filter(replies::user_id.eq(user.get()));
    }
    query
}

fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, ForumPersistenceError>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(ForumPersistenceError::query))
        .collect()
}

#[async_trait]
impl ForumStatsRepository for DieselForumRepository {
    async fn group_count_content_by_kind(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<(String, i64)>, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let rows = match user {
            Some(id) => {
                contents::table
                    .filter(contents::user_id.eq(id.get()))
                    .group_by(contents::kind)
                    .select((contents::kind, count_star()))
                    .load::<(String, i64)>(&mut conn)
                    .await
            }
            None => {
                contents::table
                    .group_by(contents::kind)
                    .select((contents::kind, count_star()))
                    .load::<(String, i64)>(&mut conn)
                    .await
            }
        };
        rows.map_err(map_forum_diesel_error)
    }

    async fn count_replies(&self, user: Option<UserId>) -> Result<i64, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let mut query = replies::table.into_boxed();
        if let Some(id) = user {
            query = query.filter(replies::user_id.eq(id.get()));
        }
        query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_forum_diesel_error)
    }
}

#[async_trait]
impl ContentQuery for DieselForumRepository {
    async fn list(&self, filter: &ContentFilter) -> Result<Page<ContentSummary>, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let total: i64 = filtered_contents(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_forum_diesel_error)?;
        if total == 0 {
            return Ok(Page::empty(filter.page));
        }

        let query = filtered_contents(filter).select(ContentRow::as_select());
        let query = match filter.sort {
            ContentSort::Latest => query.order((contents::created_at.desc(), contents::id.desc())),
            ContentSort::Active => query.order((contents::updated_at.desc(), contents::id.desc())),
            ContentSort::Hot => query.order((contents::view_count.desc(), contents::id.desc())),
        };
        let rows: Vec<ContentRow> = query
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .load(&mut conn)
            .await
            .map_err(map_forum_diesel_error)?;
        Ok(Page::new(convert_rows(rows)?, total, filter.page))
    }
}

#[async_trait]
impl ReplyRepository for DieselForumRepository {
    async fn list(&self, filter: &ReplyFilter) -> Result<Page<Reply>, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let total: i64 = filtered_replies(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_forum_diesel_error)?;
        if total == 0 {
            return Ok(Page::empty(filter.page));
        }
        let rows: Vec<ReplyRow> = filtered_replies(filter)
            .select(ReplyRow::as_select())
            .order((replies::created_at.desc(), replies::id.desc()))
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .load(&mut conn)
            .await
            .map_err(map_forum_diesel_error)?;
        Ok(Page::new(convert_rows(rows)?, total, filter.page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reply>, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let row: Option<ReplyRow> = replies::table
            .find(id)
            .select(ReplyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_forum_diesel_error)?;
        row.map(|row| Reply::try_from(row).map_err(ForumPersistenceError::query))
            .transpose()
    }

    async fn create(&self, reply: &NewReply) -> Result<Reply, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        let new_row = NewReplyRow {
            parent_id: reply.parent_id,
            target_type: &reply.target_type,
            target_id: reply.target_id,
            user_id: reply.user_id.get(),
            title: &reply.title,
            content: &reply.content,
        };
        // Insert and bump the target's counter together.
        let row: ReplyRow = conn
            .transaction(|conn| {
                async move {
                    let row: ReplyRow = diesel::insert_into(replies::table)
                        .values(&new_row)
                        .returning(ReplyRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::update(
                        contents::table
                            .filter(contents::id.eq(row.target_id))
                            .filter(contents::kind.eq(&row.target_type)),
                    )
                    .set((
                        contents::reply_count.eq(contents::reply_count + 1),
                        contents::updated_at.eq(row.created_at),
                    ))
                    .execute(conn)
                    .await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_forum_diesel_error)?;
        Reply::try_from(row).map_err(ForumPersistenceError::query)
    }

    async fn delete(&self, id: i64) -> Result<bool, ForumPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_forum_pool_error)?;
        // Remove the reply and release its slot in the target's counter.
        conn.transaction(|conn| {
            async move {
                let target: Option<(String, i64)> = diesel::delete(replies::table.find(id))
                    .returning((replies::target_type, replies::target_id))
                    .get_result(conn)
                    .await
                    .optional()?;
                let Some((target_type, target_id)) = target else {
                    return Ok(false);
                };
                diesel::update(
                    contents::table
                        .filter(contents::id.eq(target_id))
                        .filter(contents::kind.eq(target_type))
                        .filter(contents::reply_count.gt(0)),
                )
                .set(contents::reply_count.eq(contents::reply_count - 1))
                .execute(conn)
                .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_forum_diesel_error)
    }
}
