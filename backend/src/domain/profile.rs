//! Profile views and profile edits.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Gender, Nickname, Passport, User, UserId, UserStats, UserStatus};

/// URL prefix under which generated avatars are served.
pub const AVATAR_URL_PREFIX: &str = "/upload/avatar";
/// Maximum avatar URL length in characters.
pub const AVATAR_URL_MAX: usize = 255;
/// Maximum remark length in characters.
pub const REMARK_MAX: usize = 500;

/// Served URL of the generated avatar for `passport`.
///
/// # Examples
/// ```
/// use focus::domain::{Passport, generated_avatar_url};
///
/// let passport = Passport::new("alice").unwrap();
/// assert_eq!(generated_avatar_url(&passport), "/upload/avatar/alice.jpg");
/// ```
pub fn generated_avatar_url(passport: &Passport) -> String {
    format!("{AVATAR_URL_PREFIX}/{passport}.jpg")
}

/// Validation failures for profile edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("avatar must be an /upload/ path or an http(s) URL")]
    InvalidAvatar,
    #[error("avatar must be at most {max} characters")]
    AvatarTooLong { max: usize },
    #[error("remark must be at most {max} characters")]
    RemarkTooLong { max: usize },
}

impl ProfileValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidAvatar | Self::AvatarTooLong { .. } => "avatar",
            Self::RemarkTooLong { .. } => "remark",
        }
    }
}

/// Avatar location accepted from clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl(String);

impl AvatarUrl {
    /// Accept an `/upload/` path or an http(s) URL without whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let raw = raw.as_ref().trim();
        if raw.chars().count() > AVATAR_URL_MAX {
            return Err(ProfileValidationError::AvatarTooLong {
                max: AVATAR_URL_MAX,
            });
        }
        let local = raw.starts_with("/upload/") && !raw.contains("..");
        let remote = raw.starts_with("https://") || raw.starts_with("http://");
        if (local || remote) && !raw.chars().any(char::is_whitespace) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(ProfileValidationError::InvalidAvatar)
        }
    }

    /// Borrow the validated URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Partial profile update. `None` fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New nickname, checked for uniqueness.
    pub nickname: Option<Nickname>,
    pub gender: Option<Gender>,
    /// New remark, already trimmed.
    pub remark: Option<String>,
}

impl ProfileChanges {
    /// Validate a partial edit. The remark is trimmed and length-checked.
    pub fn try_new(
        nickname: Option<Nickname>,
        gender: Option<Gender>,
        remark: Option<String>,
    ) -> Result<Self, ProfileValidationError> {
        let remark = remark.map(|r| r.trim().to_owned());
        if remark
            .as_deref()
            .is_some_and(|r| r.chars().count() > REMARK_MAX)
        {
            return Err(ProfileValidationError::RemarkTooLong { max: REMARK_MAX });
        }
        Ok(Self {
            nickname,
            gender,
            remark,
        })
    }

    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.gender.is_none() && self.remark.is_none()
    }
}

/// Public profile plus activity counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(value_type = i64)]
    pub id: UserId,
    #[schema(value_type = String)]
    pub passport: Passport,
    #[schema(value_type = String)]
    pub nickname: Nickname,
    pub avatar: String,
    pub gender: Gender,
    pub remark: String,
    pub status: UserStatus,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    /// Activity counters for this user.
    pub stats: UserStats,
}

impl UserProfile {
    /// Combine a stored user with their counters.
    pub fn from_user(user: User, stats: UserStats) -> Self {
        Self {
            id: user.id,
            passport: user.passport,
            nickname: user.nickname,
            avatar: user.avatar,
            gender: user.gender,
            remark: user.remark,
            status: user.status,
            is_admin: user.is_admin,
            created_at: user.created_at,
            stats,
        }
    }
}
