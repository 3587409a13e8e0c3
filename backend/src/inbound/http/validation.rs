//! Conversions from request validation failures to client errors.
//!
//! Every failure becomes `invalid_request` with `{field, code}` details so
//! clients can highlight the offending input.

use crate::domain::{
    AuthValidationError, Error, Gender, ProfileValidationError, UserId, UserValidationError,
};

pub(crate) fn auth_error(err: AuthValidationError) -> Error {
    let (field, code) = (err.field(), err.code());
    Error::invalid_request(err.to_string()).with_field(field, code)
}

pub(crate) fn user_error(err: UserValidationError) -> Error {
    auth_error(AuthValidationError::from(err))
}

pub(crate) fn profile_error(err: ProfileValidationError) -> Error {
    let code = match err {
        ProfileValidationError::InvalidAvatar => "invalid",
        ProfileValidationError::AvatarTooLong { .. }
        | ProfileValidationError::RemarkTooLong { .. } => "too_long",
    };
    Error::invalid_request(err.to_string()).with_field(err.field(), code)
}

/// Path ids must be positive; anything else is reported as not found.
pub(crate) fn parse_user_id(raw: i64) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found(format!("user {raw} not found")))
}

/// Query-string user filters must be positive when present.
pub(crate) fn parse_user_filter(raw: Option<i64>) -> Result<Option<UserId>, Error> {
    raw.map(|raw| {
        UserId::new(raw).map_err(|err| {
            Error::invalid_request(err.to_string()).with_field("userId", "invalid")
        })
    })
    .transpose()
}

pub(crate) fn parse_gender(raw: Option<i16>) -> Result<Option<Gender>, Error> {
    raw.map(Gender::try_from).transpose().map_err(user_error)
}
