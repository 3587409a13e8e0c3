//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! every column and report failures as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    ContentKind, ContentSummary, Gender, Nickname, Passport, Reply, User, UserId, UserStatus,
};

use super::schema::{contents, replies, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub passport: String,
    pub nickname: String,
    pub avatar: String,
    pub gender: i16,
    pub remark: String,
    pub status: i16,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |err: crate::domain::UserValidationError| {
            format!("user row {} is invalid: {err}", row.id)
        };
        Ok(Self {
            id: UserId::new(row.id).map_err(invalid)?,
            passport: Passport::new(&row.passport).map_err(invalid)?,
            nickname: Nickname::new(&row.nickname).map_err(invalid)?,
            gender: Gender::try_from(row.gender).map_err(invalid)?,
            status: UserStatus::try_from(row.status).map_err(invalid)?,
            avatar: row.avatar,
            remark: row.remark,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub passport: &'a str,
    pub password: &'a str,
    pub nickname: &'a str,
    pub avatar: &'a str,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileUpdate<'a> {
    pub nickname: Option<&'a str>,
    pub gender: Option<i16>,
    pub remark: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContentRow {
    pub id: i64,
    pub kind: String,
    pub category_id: i64,
    pub user_id: i64,
    pub title: String,
    pub reply_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentSummary {
    type Error = String;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let kind: ContentKind = row
            .kind
            .parse()
            .map_err(|err| format!("content row {} is invalid: {err}", row.id))?;
        let user_id = UserId::new(row.user_id)
            .map_err(|err| format!("content row {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            kind,
            category_id: row.category_id,
            user_id,
            title: row.title,
            reply_count: row.reply_count,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReplyRow {
    pub id: i64,
    pub parent_id: i64,
    pub target_type: String,
    pub target_id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReplyRow> for Reply {
    type Error = String;

    fn try_from(row: ReplyRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id)
            .map_err(|err| format!("reply row {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            parent_id: row.parent_id,
            target_type: row.target_type,
            target_id: row.target_id,
            user_id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = replies)]
pub(crate) struct NewReplyRow<'a> {
    pub parent_id: i64,
    pub target_type: &'a str,
    pub target_id: i64,
    pub user_id: i64,
    pub title: &'a str,
    pub content: &'a str,
}
