//! Typed view over a visitor's session.
//!
//! The hosting framework owns the actual key-value storage and cookie
//! plumbing; it is reached through the [`SessionBackend`] port, which moves
//! JSON values in and out under string keys. [`SessionStore`] layers the
//! three well-known entries on top: the cached user, the login referer and a
//! one-shot notice.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ports::define_port_error;
use super::{Error, Notice, SessionUser};

/// Session key holding the authenticated [`SessionUser`].
pub const SESSION_KEY_USER: &str = "user";
/// Session key holding the pre-login destination.
pub const SESSION_KEY_LOGIN_REFERER: &str = "login_referer";
/// Session key holding the pending [`Notice`].
pub const SESSION_KEY_NOTICE: &str = "notice";

define_port_error! {
    /// Failures surfaced by session backends.
    pub enum SessionError {
        /// The backend could not read or persist session state.
        Backend { message: String } => "session backend failed: {message}",
        /// A stored value could not be decoded.
        Corrupted { key: String, message: String } =>
            "session entry `{key}` is corrupted: {message}",
    }
}

impl From<SessionError> for Error {
    fn from(value: SessionError) -> Self {
        Error::internal(format!("failed to access session: {value}"))
    }
}

/// Key-value storage scoped to one visitor.
#[cfg_attr(test, mockall::automock)]
pub trait SessionBackend {
    fn get_value(&self, key: &str) -> Result<Option<Value>, SessionError>;
    fn insert_value(&self, key: &str, value: Value) -> Result<(), SessionError>;
    fn remove_value(&self, key: &str) -> Result<(), SessionError>;
}

/// Typed session entries for the current visitor.
///
/// # Examples
/// ```
/// use focus::domain::{InMemorySessionBackend, SessionStore};
///
/// let backend = InMemorySessionBackend::default();
/// let session = SessionStore::new(&backend);
/// session.set_login_referer("/user/profile").unwrap();
/// session.set_login_referer("/user/messages").unwrap();
/// assert_eq!(session.get_login_referer().unwrap(), "/user/profile");
/// ```
#[derive(Clone, Copy)]
pub struct SessionStore<'a> {
    backend: &'a dyn SessionBackend,
}

impl<'a> SessionStore<'a> {
    /// Wrap a raw key/value session.
    pub fn new(backend: &'a dyn SessionBackend) -> Self {
        Self { backend }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.backend.get_value(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| SessionError::corrupted(key, err.to_string())),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)
            .map_err(|err| SessionError::backend(format!("encode `{key}`: {err}")))?;
        self.backend.insert_value(key, value)
    }

    /// Cache the signed-in user.
    pub fn set_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        self.write(SESSION_KEY_USER, user)
    }

    /// Cached signed-in user, if any.
    pub fn get_user(&self) -> Result<Option<SessionUser>, SessionError> {
        self.read(SESSION_KEY_USER)
    }

    /// Forget the signed-in user.
    pub fn remove_user(&self) -> Result<(), SessionError> {
        self.backend.remove_value(SESSION_KEY_USER)
    }

    /// Record where to send the visitor after login.
    ///
    /// First write wins: an already stored referer is kept until
    /// [`SessionStore::remove_login_referer`] clears it.
    pub fn set_login_referer(&self, url: &str) -> Result<(), SessionError> {
        if !self.get_login_referer()?.is_empty() {
            return Ok(());
        }
        self.write(SESSION_KEY_LOGIN_REFERER, &url)
    }

    /// Stored referer, or an empty string when none is set.
    pub fn get_login_referer(&self) -> Result<String, SessionError> {
        Ok(self
            .read::<String>(SESSION_KEY_LOGIN_REFERER)?
            .unwrap_or_default())
    }

    /// Drop the stored referer.
    pub fn remove_login_referer(&self) -> Result<(), SessionError> {
        self.backend.remove_value(SESSION_KEY_LOGIN_REFERER)
    }

    /// Queue a notice for the next page, replacing any pending one.
    pub fn set_notice(&self, notice: &Notice) -> Result<(), SessionError> {
        self.write(SESSION_KEY_NOTICE, notice)
    }

    /// Pending notice without consuming it.
    pub fn get_notice(&self) -> Result<Option<Notice>, SessionError> {
        self.read(SESSION_KEY_NOTICE)
    }

    /// Discard the pending notice.
    pub fn remove_notice(&self) -> Result<(), SessionError> {
        self.backend.remove_value(SESSION_KEY_NOTICE)
    }

    /// Read the pending notice and clear it, so it is shown exactly once.
    pub fn take_notice(&self) -> Result<Option<Notice>, SessionError> {
        let notice = self.get_notice()?;
        if notice.is_some() {
            self.remove_notice()?;
        }
        Ok(notice)
    }
}

/// Process-local session backend for tests and tooling.
#[derive(Debug, Default)]
pub struct InMemorySessionBackend {
    entries: RefCell<HashMap<String, Value>>,
}

impl InMemorySessionBackend {
    /// Raw stored value, bypassing typed decoding.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }
}

impl SessionBackend for InMemorySessionBackend {
    fn get_value(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn insert_value(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.entries.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove_value(&self, key: &str) -> Result<(), SessionError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Nickname, NoticeKind, Passport, UserId};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn backend() -> InMemorySessionBackend {
        InMemorySessionBackend::default()
    }

    fn alice() -> SessionUser {
        SessionUser {
            id: UserId::new(1).expect("valid id"),
            passport: Passport::new("alice").expect("valid passport"),
            nickname: Nickname::new("Alice").expect("valid nickname"),
            avatar: "/upload/avatar/alice.jpg".to_owned(),
            is_admin: false,
        }
    }

    #[rstest]
    fn user_round_trips_and_clears(backend: InMemorySessionBackend) {
        let session = SessionStore::new(&backend);
        assert_eq!(session.get_user().expect("read"), None);

        session.set_user(&alice()).expect("write");
        assert_eq!(session.get_user().expect("read"), Some(alice()));

        session.remove_user().expect("remove");
        assert_eq!(session.get_user().expect("read"), None);
    }

    #[rstest]
    fn login_referer_keeps_first_value_until_removed(backend: InMemorySessionBackend) {
        let session = SessionStore::new(&backend);
        assert_eq!(session.get_login_referer().expect("read"), "");

        session.set_login_referer("/first").expect("write");
        session.set_login_referer("/second").expect("write");
        assert_eq!(session.get_login_referer().expect("read"), "/first");

        session.remove_login_referer().expect("remove");
        session.set_login_referer("/second").expect("write");
        assert_eq!(session.get_login_referer().expect("read"), "/second");
    }

    #[rstest]
    fn take_notice_reads_exactly_once(backend: InMemorySessionBackend) {
        let session = SessionStore::new(&backend);
        session
            .set_notice(&Notice::new(NoticeKind::Warning, "check your inbox"))
            .expect("write");

        let first = session.take_notice().expect("take");
        assert_eq!(first.map(|n| n.kind), Some(NoticeKind::Warning));
        assert_eq!(session.take_notice().expect("take"), None);
    }

    #[rstest]
    fn corrupted_entries_surface_as_errors(backend: InMemorySessionBackend) {
        backend
            .insert_value(SESSION_KEY_USER, json!({ "id": "nope" }))
            .expect("seed");
        let session = SessionStore::new(&backend);
        let err = session.get_user().expect_err("corrupted user");
        assert!(matches!(err, SessionError::Corrupted { ref key, .. } if key == SESSION_KEY_USER));
    }

    #[rstest]
    fn backend_failures_propagate() {
        let mut backend = MockSessionBackend::new();
        backend
            .expect_get_value()
            .returning(|_| Err(SessionError::backend("store unreachable")));
        let session = SessionStore::new(&backend);

        let err = session
            .set_login_referer("/x")
            .expect_err("read before write fails");
        assert_eq!(err, SessionError::backend("store unreachable"));
    }
}
