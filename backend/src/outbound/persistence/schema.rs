//! Diesel table definitions for the forum schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// `passport` and `nickname` carry the `users_passport_key` and
    /// `users_nickname_key` unique constraints.
    users (id) {
        id -> Int8,
        passport -> Varchar,
        /// Hex digest produced by the credential hasher.
        password -> Varchar,
        nickname -> Varchar,
        avatar -> Varchar,
        /// 0 unknown, 1 male, 2 female.
        gender -> Int2,
        remark -> Text,
        /// 0 enabled, 1 disabled.
        status -> Int2,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Authored articles, topics and questions.
    contents (id) {
        id -> Int8,
        /// One of `article`, `topic`, `ask`.
        kind -> Varchar,
        category_id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        content -> Text,
        reply_count -> Int8,
        view_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    replies (id) {
        id -> Int8,
        parent_id -> Int8,
        target_type -> Varchar,
        target_id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(contents -> users (user_id));
diesel::joinable!(replies -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(contents, replies, users);
