use thiserror::Error;

/// Failure reported by a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid json: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("quota exceeded for `{key}` ({size} > {limit} bytes)")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
}

/// Failure while shaping data in or out of the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid json under `{key}`: {source}")]
    Json {
        key: String,
        source: serde_json::Error,
    },

    #[error("invalid chunk count `{0}`")]
    ChunkCount(String),
}

/// User-facing rejection of a sign-up form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be at least 2 characters")]
    NameTooShort,

    #[error("enter a valid email address")]
    InvalidEmail,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("select a profile image")]
    MissingProfileImage,

    #[error("this email address is already registered")]
    DuplicateEmail,

    #[error("account could not be saved")]
    NotSaved,
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("this email address is already registered")]
    DuplicateEmail,

    #[error("no user with id `{0}`")]
    NotFound(String),
}
