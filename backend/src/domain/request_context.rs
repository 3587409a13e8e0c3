//! Per-request view of who is calling.

use std::cell::RefCell;

use tracing::warn;

use super::session::{SessionBackend, SessionStore};
use super::{Error, SessionUser, UserId};

/// Lazily resolved caller identity for one request.
///
/// The session is read at most once; [`RequestContext::set_user`] replaces
/// the cached value after login or logout so later calls in the same request
/// see the change.
pub struct RequestContext<'a> {
    session: SessionStore<'a>,
    user: RefCell<Option<Option<SessionUser>>>,
}

impl<'a> RequestContext<'a> {
    /// Start a context for one request. Nothing is read until asked.
    pub fn new(backend: &'a dyn SessionBackend) -> Self {
        Self {
            session: SessionStore::new(backend),
            user: RefCell::new(None),
        }
    }

    /// Typed view of the underlying session.
    pub fn session(&self) -> SessionStore<'a> {
        self.session
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Result<Option<SessionUser>, Error> {
        if let Some(cached) = self.user.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let loaded = self.session.get_user()?;
        *self.user.borrow_mut() = Some(loaded.clone());
        Ok(loaded)
    }

    /// The authenticated user, or `unauthorized`.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Replace the cached identity without touching the session.
    pub fn set_user(&self, user: Option<SessionUser>) {
        *self.user.borrow_mut() = Some(user);
    }

    /// True only when an admin is looking at their own id.
    ///
    /// An unreadable session counts as "not authenticated".
    ///
    /// # Examples
    /// ```
    /// use focus::domain::{InMemorySessionBackend, RequestContext, UserId};
    ///
    /// let backend = InMemorySessionBackend::default();
    /// let ctx = RequestContext::new(&backend);
    /// assert!(!ctx.is_admin_viewing_own_data(UserId::new(1).unwrap()));
    /// ```
    pub fn is_admin_viewing_own_data(&self, target: UserId) -> bool {
        match self.user() {
            Ok(Some(user)) => user.is_admin && user.id == target,
            Ok(None) => false,
            Err(error) => {
                warn!(%error, "treating unreadable session as anonymous");
                false
            }
        }
    }
}
