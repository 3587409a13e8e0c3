//! Unit of work over the user table.
//!
//! A unit of work hands the caller a [`UserTransaction`] and commits every
//! write made through it if the closure returns `Ok`, or discards all of them
//! if it returns `Err`. Closures must do all their writes through the handle
//! they are given.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::{Error, Nickname, Passport, PasswordDigest, ProfileChanges, UserId};

use super::UserPersistenceError;

/// Boxed future returned by unit-of-work closures.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 't>>;

/// Row to insert on registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub passport: Passport,
    pub nickname: Nickname,
    /// Digest from the credential hasher, never plain text.
    pub password: PasswordDigest,
    /// Served URL of the generated avatar.
    pub avatar: String,
}

/// Writes and consistency checks available inside a unit of work.
#[async_trait]
pub trait UserTransaction: Send {
    async fn count_by_passport(&mut self, passport: &Passport) -> Result<i64, UserPersistenceError>;

    /// Count users holding `nickname`, ignoring `excluding` when given.
    async fn count_by_nickname(
        &mut self,
        nickname: &Nickname,
        excluding: Option<UserId>,
    ) -> Result<i64, UserPersistenceError>;

    async fn count_by_id_and_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<i64, UserPersistenceError>;

    async fn insert(&mut self, user: &NewUserRecord) -> Result<UserId, UserPersistenceError>;

    async fn update_password(
        &mut self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError>;

    async fn update_avatar(&mut self, id: UserId, avatar: &str) -> Result<(), UserPersistenceError>;

    /// Apply the present fields of `changes`; absent fields stay untouched.
    async fn update_profile(
        &mut self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<(), UserPersistenceError>;
}

/// Runs closures atomically against the user store.
pub trait UserUnitOfWork: Send + Sync {
    fn run<'a, T, F>(&'a self, work: F) -> impl Future<Output = Result<T, Error>> + Send + 'a
    where
        T: Send + 'a,
        F: for<'t> FnOnce(&'t mut dyn UserTransaction) -> TxFuture<'t, T> + Send + 'a;
}
