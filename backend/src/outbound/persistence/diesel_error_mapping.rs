//! Shared Diesel error mapping for the forum repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{ForumPersistenceError, UserPersistenceError};

use super::pool::PoolError;

pub(super) const PASSPORT_CONSTRAINT: &str = "users_passport_key";
pub(super) const NICKNAME_CONSTRAINT: &str = "users_nickname_key";

fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel error variants into query/connection constructors.
fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

pub(super) fn map_user_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_message(error))
}

/// Map a Diesel failure on the users table, recognising the unique
/// constraints on passport and nickname.
pub(super) fn map_user_diesel_error(error: DieselError) -> UserPersistenceError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        match info.constraint_name() {
            Some(PASSPORT_CONSTRAINT) => return UserPersistenceError::PassportTaken,
            Some(NICKNAME_CONSTRAINT) => return UserPersistenceError::NicknameTaken,
            _ => {}
        }
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

pub(super) fn map_forum_pool_error(error: PoolError) -> ForumPersistenceError {
    ForumPersistenceError::connection(pool_message(error))
}

pub(super) fn map_forum_diesel_error(error: DieselError) -> ForumPersistenceError {
    map_basic_diesel_error(
        error,
        ForumPersistenceError::query,
        ForumPersistenceError::connection,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Info(Option<&'static str>);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Info(constraint)))
    }

    #[rstest]
    #[case(Some(PASSPORT_CONSTRAINT), UserPersistenceError::PassportTaken)]
    #[case(Some(NICKNAME_CONSTRAINT), UserPersistenceError::NicknameTaken)]
    #[case(None, UserPersistenceError::query("database error"))]
    fn unique_violations_map_by_constraint(
        #[case] constraint: Option<&'static str>,
        #[case] expected: UserPersistenceError,
    ) {
        assert_eq!(map_user_diesel_error(unique_violation(constraint)), expected);
    }

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(Info(None)),
        );
        assert_eq!(
            map_forum_diesel_error(error),
            ForumPersistenceError::connection("database connection error")
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            map_user_pool_error(PoolError::checkout("timed out")),
            UserPersistenceError::connection("timed out")
        );
    }
}
