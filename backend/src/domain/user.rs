//! User data model.
//!
//! Account names ("passports") and nicknames are validated newtypes so that
//! services and adapters never see raw, unchecked strings. A passport also
//! names the user's avatar file, so it is restricted to a filesystem-safe
//! alphabet.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation failures for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a positive integer")]
    InvalidId,
    #[error("passport must not be empty")]
    EmptyPassport,
    #[error("passport must be at most {max} characters")]
    PassportTooLong { max: usize },
    #[error("passport may only contain letters, digits, '_', '-' or '.', and must not start with '.'")]
    PassportInvalidCharacters,
    #[error("nickname must not be empty")]
    EmptyNickname,
    #[error("nickname must be at most {max} characters")]
    NicknameTooLong { max: usize },
    #[error("nickname must not contain control characters")]
    NicknameInvalidCharacters,
    #[error("unknown gender code {0}")]
    UnknownGender(i16),
    #[error("unknown status code {0}")]
    UnknownStatus(i16),
}

impl UserValidationError {
    /// Field name reported to clients for this failure.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyPassport | Self::PassportTooLong { .. } | Self::PassportInvalidCharacters => {
                "passport"
            }
            Self::EmptyNickname
            | Self::NicknameTooLong { .. }
            | Self::NicknameInvalidCharacters => "nickname",
            Self::UnknownGender(_) => "gender",
            Self::UnknownStatus(_) => "status",
        }
    }
}

/// Numeric user identifier.
///
/// ## Invariants
/// - Always strictly positive; zero is reserved for "no user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use focus::domain::UserId;
    ///
    /// assert!(UserId::new(7).is_ok());
    /// assert!(UserId::new(0).is_err());
    /// ```
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(UserValidationError::InvalidId)
        }
    }

    /// Raw database id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum passport length.
pub const PASSPORT_MAX: usize = 32;
/// Maximum nickname length, counted in characters.
pub const NICKNAME_MAX: usize = 32;

static PASSPORT_RE: OnceLock<Regex> = OnceLock::new();

fn passport_regex() -> &'static Regex {
    PASSPORT_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_-][A-Za-z0-9_.-]*$")
            .unwrap_or_else(|error| panic!("passport regex failed to compile: {error}"))
    })
}

/// Unique login account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Passport(String);

impl Passport {
    /// Validate an account name. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyPassport);
        }
        if trimmed.len() > PASSPORT_MAX {
            return Err(UserValidationError::PassportTooLong { max: PASSPORT_MAX });
        }
        if !passport_regex().is_match(trimmed) {
            return Err(UserValidationError::PassportInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated passport.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Passport {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Passport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Passport> for String {
    fn from(value: Passport) -> Self {
        value.0
    }
}

impl TryFrom<String> for Passport {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique public display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Validate a nickname. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyNickname);
        }
        if trimmed.chars().count() > NICKNAME_MAX {
            return Err(UserValidationError::NicknameTooLong { max: NICKNAME_MAX });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(UserValidationError::NicknameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated nickname.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Self-declared gender; stored as a small integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Column value stored in `users.gender`.
    pub fn code(self) -> i16 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }
}

impl TryFrom<i16> for Gender {
    type Error = UserValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            other => Err(UserValidationError::UnknownGender(other)),
        }
    }
}

/// Account status.
///
/// The only transition is `Enabled -> Disabled`, performed by an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
}

impl UserStatus {
    /// Column value stored in `users.status`.
    pub fn code(self) -> i16 {
        match self {
            Self::Enabled => 0,
            Self::Disabled => 1,
        }
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = UserValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Enabled),
            1 => Ok(Self::Disabled),
            other => Err(UserValidationError::UnknownStatus(other)),
        }
    }
}

/// Persisted user record, minus the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub passport: Passport,
    pub nickname: Nickname,
    /// Served avatar URL.
    pub avatar: String,
    pub gender: Gender,
    /// Free-form self description.
    pub remark: String,
    /// Disabled accounts cannot sign in.
    pub status: UserStatus,
    /// Grants moderation rights.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may sign in.
    pub fn is_enabled(&self) -> bool {
        self.status == UserStatus::Enabled
    }

    /// Snapshot suitable for caching in the visitor's session.
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            passport: self.passport.clone(),
            nickname: self.nickname.clone(),
            avatar: self.avatar.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Authenticated user snapshot cached in the session.
///
/// ## Invariants
/// - Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    #[schema(value_type = String, example = "alice")]
    pub passport: Passport,
    #[schema(value_type = String, example = "Alice")]
    pub nickname: Nickname,
    #[schema(example = "/upload/avatar/alice.jpg")]
    pub avatar: String,
    pub is_admin: bool,
}
