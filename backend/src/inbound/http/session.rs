//! Actix session adapter.
//!
//! [`SessionContext`] extracts the request's cookie session and exposes it to
//! the domain as a [`SessionBackend`], so services never see Actix types.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

use crate::domain::{SessionBackend, SessionError};

/// Actix session wrapped as a [`SessionBackend`].
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

impl SessionBackend for SessionContext {
    fn get_value(&self, key: &str) -> Result<Option<Value>, SessionError> {
        self.0
            .get::<Value>(key)
            .map_err(|err| SessionError::corrupted(key, err.to_string()))
    }

    fn insert_value(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.0
            .insert(key, value)
            .map_err(|err| SessionError::backend(err.to_string()))
    }

    fn remove_value(&self, key: &str) -> Result<(), SessionError> {
        self.0.remove(key);
        Ok(())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
