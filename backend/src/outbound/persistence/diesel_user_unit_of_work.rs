//! Diesel unit of work for multi-step account writes.
//!
//! Each [`UserUnitOfWork::run`] call checks out one pooled connection, opens a
//! transaction on it and hands the closure a [`UserTransaction`] bound to that
//! connection. Returning `Err` from the closure rolls the transaction back.

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    NewUserRecord, TxFuture, UserPersistenceError, UserTransaction, UserUnitOfWork,
};
use crate::domain::{Error, Nickname, Passport, PasswordDigest, ProfileChanges, UserId};

use super::diesel_error_mapping::map_user_diesel_error;
use super::models::{NewUserRow, ProfileUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Runs account writes inside a single Postgres transaction.
#[derive(Clone)]
pub struct DieselUserUnitOfWork {
    pool: DbPool,
}

impl DieselUserUnitOfWork {
    /// Build the unit of work over a pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a Diesel transaction: either the closure's own error or a
/// Diesel error raised while opening or committing.
enum TxError {
    Domain(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_tx_error(error: TxError) -> Error {
    match error {
        TxError::Domain(error) => error,
        TxError::Diesel(error) => match map_user_diesel_error(error) {
            UserPersistenceError::Connection { message } => Error::service_unavailable(message),
            other => Error::internal(other.to_string()),
        },
    }
}

struct DieselUserTransaction<'c> {
    conn: &'c mut AsyncPgConnection,
}

#[async_trait]
impl UserTransaction for DieselUserTransaction<'_> {
    async fn count_by_passport(&mut self, passport: &Passport) -> Result<i64, UserPersistenceError> {
        users::table
            .filter(users::passport.eq(passport.as_str()))
            .count()
            .get_result(self.conn)
            .await
            .map_err(map_user_diesel_error)
    }

    async fn count_by_nickname(
        &mut self,
        nickname: &Nickname,
        excluding: Option<UserId>,
    ) -> Result<i64, UserPersistenceError> {
        let mut query = users::table
            .filter(users::nickname.eq(nickname.as_str()))
            .into_boxed();
        if let Some(id) = excluding {
            query = query.filter(users::id.ne(id.get()));
        }
        query
            .count()
            .get_result(self.conn)
            .await
            .map_err(map_user_diesel_error)
    }

    async fn count_by_id_and_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<i64, UserPersistenceError> {
        users::table
            .filter(users::id.eq(id.get()))
            .filter(users::password.eq(digest.as_str()))
            .count()
            .get_result(self.conn)
            .await
            .map_err(map_user_diesel_error)
    }

    async fn insert(&mut self, user: &NewUserRecord) -> Result<UserId, UserPersistenceError> {
        let row = NewUserRow {
            passport: user.passport.as_str(),
            password: user.password.as_str(),
            nickname: user.nickname.as_str(),
            avatar: &user.avatar,
        };
        let id: i64 = diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result(self.conn)
            .await
            .map_err(map_user_diesel_error)?;
        UserId::new(id).map_err(|err| UserPersistenceError::query(err.to_string()))
    }

    async fn update_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        diesel::update(users::table.find(id.get()))
            .set((
                users::password.eq(digest.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(self.conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    async fn update_avatar(&mut self, id: UserId, avatar: &str) -> Result<(), UserPersistenceError> {
        diesel::update(users::table.find(id.get()))
            .set((users::avatar.eq(avatar), users::updated_at.eq(Utc::now())))
            .execute(self.conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    async fn update_profile(
        &mut self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<(), UserPersistenceError> {
        let update = ProfileUpdate {
            nickname: changes.nickname.as_ref().map(Nickname::as_str),
            gender: changes.gender.map(|gender| gender.code()),
            remark: changes.remark.as_deref(),
            updated_at: Utc::now(),
        };
        diesel::update(users::table.find(id.get()))
            .set(&update)
            .execute(self.conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(())
    }
}

impl UserUnitOfWork for DieselUserUnitOfWork {
    fn run<'a, T, F>(&'a self, work: F) -> impl Future<Output = Result<T, Error>> + Send + 'a
    where
        T: Send + 'a,
        F: for<'t> FnOnce(&'t mut dyn UserTransaction) -> TxFuture<'t, T> + Send + 'a,
    {
        async move {
            let mut pooled = self.pool.get().await.map_err(|err| match err {
                PoolError::Checkout { message } | PoolError::Build { message } => {
                    Error::service_unavailable(message)
                }
            })?;
            let conn: &mut AsyncPgConnection = &mut pooled;
            let result = conn
                .transaction(|conn| {
                    async move {
                        let mut tx = DieselUserTransaction { conn };
                        work(&mut tx).await.map_err(TxError::Domain)
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_tx_error);
            if result.is_err() {
                debug!("user unit of work rolled back");
            }
            result
        }
    }
}
