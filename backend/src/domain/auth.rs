//! Authentication inputs: login credentials, registration and password
//! changes.
//!
//! Handlers hand raw strings to these constructors, which validate them
//! before any service or port sees them. Plaintext passwords live in
//! [`Zeroizing`] buffers and are never serialised.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Nickname, Passport, UserValidationError};

/// Validation failures for authentication payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Account name was missing or blank once trimmed.
    #[error("passport must not be empty")]
    EmptyPassport,
    /// A password field was empty.
    #[error("{field} must not be empty")]
    EmptyPassword { field: &'static str },
    #[error(transparent)]
    User(#[from] UserValidationError),
}

impl AuthValidationError {
    /// Field name reported to clients for this failure.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyPassport => "passport",
            Self::EmptyPassword { field } => *field,
            Self::User(inner) => inner.field(),
        }
    }

    /// Stable snake_case reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyPassport | Self::EmptyPassword { .. } => "empty",
            Self::User(UserValidationError::PassportTooLong { .. })
            | Self::User(UserValidationError::NicknameTooLong { .. }) => "too_long",
            Self::User(UserValidationError::EmptyPassport)
            | Self::User(UserValidationError::EmptyNickname) => "empty",
            Self::User(_) => "invalid",
        }
    }
}

/// Plaintext password held in zeroising memory.
///
/// ## Invariants
/// - Non-empty. Whitespace is preserved exactly as typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    fn parse(raw: &str, field: &'static str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword { field });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Validate a password supplied under the conventional `password` field.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        Self::parse(raw, "password")
    }

    /// Plain-text password, for hashing only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Validated login credentials.
///
/// The account is only trimmed, not validated as a [`Passport`]: a malformed
/// account simply fails to match, which keeps unknown accounts
/// indistinguishable from wrong passwords.
///
/// # Examples
/// ```
/// use focus::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw123").unwrap();
/// assert_eq!(creds.passport(), "alice");
/// assert_eq!(creds.password().expose(), "pw123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    passport: String,
    password: Password,
}

impl LoginCredentials {
    /// Validate a login form. The passport is trimmed but not otherwise
    /// checked; lookups compare it verbatim.
    pub fn try_from_parts(passport: &str, password: &str) -> Result<Self, AuthValidationError> {
        let passport = passport.trim();
        if passport.is_empty() {
            return Err(AuthValidationError::EmptyPassport);
        }
        Ok(Self {
            passport: passport.to_owned(),
            password: Password::new(password)?,
        })
    }

    /// Trimmed account name as typed.
    pub fn passport(&self) -> &str {
        &self.passport
    }

    /// Submitted password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub passport: Passport,
    pub nickname: Nickname,
    pub password: Password,
}

impl Registration {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        passport: &str,
        password: &str,
        nickname: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            passport: Passport::new(passport)?,
            nickname: Nickname::new(nickname)?,
            password: Password::new(password)?,
        })
    }
}

/// Validated password change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    /// Current password, verified before the change.
    pub old_password: Password,
    /// Replacement password.
    pub new_password: Password,
}

impl PasswordChange {
    /// Validate both passwords, naming the offending field on failure.
    pub fn try_from_parts(old: &str, new: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            old_password: Password::parse(old, "oldPassword")?,
            new_password: Password::parse(new, "newPassword")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", AuthValidationError::EmptyPassport)]
    #[case("   ", "pw", AuthValidationError::EmptyPassport)]
    #[case("alice", "", AuthValidationError::EmptyPassword { field: "password" })]
    fn login_rejects_blank_fields(
        #[case] passport: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(passport, password)
            .expect_err("blank input must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("alice", " pw ").expect("valid");
        assert_eq!(creds.password().expose(), " pw ");
    }

    #[rstest]
    fn registration_validates_each_field() {
        let err = Registration::try_from_parts("../x", "pw123", "Alice").expect_err("bad passport");
        assert_eq!(err.field(), "passport");
        assert_eq!(err.code(), "invalid");

        let err = Registration::try_from_parts("alice", "pw123", " ").expect_err("blank nickname");
        assert_eq!(err.field(), "nickname");
        assert_eq!(err.code(), "empty");

        let ok = Registration::try_from_parts("alice", "pw123", "Alice").expect("valid");
        assert_eq!(ok.passport.as_str(), "alice");
    }

    #[rstest]
    #[case("", "new", "oldPassword")]
    #[case("old", "", "newPassword")]
    fn password_change_names_the_empty_field(
        #[case] old: &str,
        #[case] new: &str,
        #[case] field: &str,
    ) {
        let err = PasswordChange::try_from_parts(old, new).expect_err("empty field");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter2").expect("valid");
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
