//! Relational backend (SQLite).
//!
//! Only partially wired in: the key-value store stays the source of truth
//! for the app and the two are never reconciled.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::{
    error::DatabaseError,
    user::{User, DEFAULT_PROFILE_IMAGE},
    utils::time_id,
};

pub const TEMPLATE_DATABASE_UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    profile_image TEXT
);
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    user_id TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (post_id) REFERENCES posts(id)
);
CREATE TABLE IF NOT EXISTS likes (
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (post_id) REFERENCES posts(id)
);
"#;

const LIST_LIMIT: u32 = 20;

/// Open the database at `path`, creating it and its tables when missing.
pub fn create_connection(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = if path.exists() {
        info!("Connecting to database: {}", path.display());
        Connection::open(path)?
    } else {
        info!("Creating database: {}", path.display());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Connection::open(path)?
    };

    initialize(&conn)?;
    Ok(conn)
}

pub fn initialize(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(TEMPLATE_DATABASE_UP_SQL)?;
    Ok(())
}

/// Insert the test account unless it already exists.
pub fn seed(conn: &Connection) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?",
        ["test@example.com"],
        |row| row.get(0),
    )?;
    if count > 0 {
        info!("Seed data already present");
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO users (id, name, email, password, profile_image) VALUES (?, ?, ?, ?, ?)",
        params![
            "1",
            "テストユーザー",
            "test@example.com",
            "test1234",
            DEFAULT_PROFILE_IMAGE
        ],
    )?;
    info!("Seeded test account");
    Ok(true)
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        profile_image: row
            .get::<_, Option<String>>("profile_image")?
            .unwrap_or_default(),
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Register a new user with the default avatar.
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, DatabaseError> {
    if get_user(conn, email)?.is_some() {
        return Err(DatabaseError::DuplicateEmail);
    }

    let user = User {
        id: time_id(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
    };
    conn.execute(
        "INSERT INTO users (id, name, email, password, profile_image) VALUES (?, ?, ?, ?, ?)",
        params![user.id, user.name, user.email, user.password, user.profile_image],
    )
    .map_err(|err| {
        if is_unique_violation(&err) {
            DatabaseError::DuplicateEmail
        } else {
            err.into()
        }
    })?;

    Ok(user)
}

pub fn get_user(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT id, name, email, password, profile_image FROM users WHERE email = ?",
            [email],
            user_from_row,
        )
        .optional()?)
}

/// Write back the editable profile fields (name and image).
pub fn update_user(conn: &Connection, user: &User) -> Result<User, DatabaseError> {
    conn.query_row(
        "UPDATE users SET name = ?, profile_image = ? WHERE id = ? RETURNING id, name, email, password, profile_image",
        params![user.name, user.profile_image, user.id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound(user.id.clone()))
}

pub fn insert_post(
    conn: &Connection,
    user_id: &str,
    content: &str,
) -> Result<String, DatabaseError> {
    let id = time_id();
    conn.execute(
        "INSERT INTO posts (id, content, user_id, created_at) VALUES (?, ?, ?, ?)",
        params![id, content, user_id, Utc::now()],
    )?;
    Ok(id)
}

pub fn insert_comment(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
    content: &str,
) -> Result<String, DatabaseError> {
    let id = time_id();
    conn.execute(
        "INSERT INTO comments (id, content, user_id, post_id, created_at) VALUES (?, ?, ?, ?, ?)",
        params![id, content, user_id, post_id, Utc::now()],
    )?;
    Ok(id)
}

/// Like or unlike; returns whether the post is liked afterwards.
pub fn toggle_like(
    conn: &Connection,
    user_id: &str,
    post_id: &str,
) -> Result<bool, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
        [user_id, post_id],
    )?;
    if removed > 0 {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
        params![user_id, post_id, Utc::now()],
    )?;
    Ok(true)
}

/// A post row joined with its author and aggregate counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRow {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_profile_image: Option<String>,
    pub likes_count: u32,
    pub comments_count: u32,
}

/// Newest posts first, at most 20.
pub fn list_posts(conn: &Connection) -> Result<Vec<PostRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT
            p.id, p.content, p.user_id, p.created_at,
            u.name AS user_name,
            u.profile_image AS user_profile_image,
            COUNT(DISTINCT l.user_id) AS likes_count,
            COUNT(DISTINCT c.id) AS comments_count
        FROM posts p
        JOIN users u ON p.user_id = u.id
        LEFT JOIN likes l ON p.id = l.post_id
        LEFT JOIN comments c ON p.id = c.post_id
        GROUP BY p.id
        ORDER BY p.created_at DESC
        LIMIT ?",
    )?;

    let rows = stmt.query_map([LIST_LIMIT], |row| {
        Ok(PostRow {
            id: row.get("id")?,
            content: row.get("content")?,
            user_id: row.get("user_id")?,
            created_at: row.get("created_at")?,
            user_name: row.get("user_name")?,
            user_profile_image: row.get("user_profile_image")?,
            likes_count: row.get("likes_count")?,
            comments_count: row.get("comments_count")?,
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = test_connection();
        initialize(&conn).unwrap();
    }

    #[test]
    fn creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("kudos.db");
        let conn = create_connection(&path).unwrap();
        assert!(seed(&conn).unwrap());
        drop(conn);

        let conn = create_connection(&path).unwrap();
        assert!(!seed(&conn).unwrap());
    }

    #[test]
    fn user_lifecycle() {
        let conn = test_connection();
        seed(&conn).unwrap();

        assert!(matches!(
            create_user(&conn, "Dup", "test@example.com", "password"),
            Err(DatabaseError::DuplicateEmail)
        ));

        let mut user = create_user(&conn, "Alice", "a@x.com", "password1").unwrap();
        assert_eq!(get_user(&conn, "a@x.com").unwrap(), Some(user.clone()));
        assert_eq!(get_user(&conn, "nobody@x.com").unwrap(), None);

        user.name = "Alicia".to_string();
        user.email = "ignored@x.com".to_string();
        let updated = update_user(&conn, &user).unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "a@x.com");

        user.id = "missing".to_string();
        assert!(matches!(
            update_user(&conn, &user),
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn posts_with_counts() {
        let conn = test_connection();
        seed(&conn).unwrap();
        let other = create_user(&conn, "Bob", "b@x.com", "password1").unwrap();

        let older = insert_post(&conn, "1", "first").unwrap();
        let newer = insert_post(&conn, &other.id, "second").unwrap();
        insert_comment(&conn, &older, &other.id, "nice").unwrap();
        insert_comment(&conn, &older, "1", "thanks").unwrap();
        assert!(toggle_like(&conn, &other.id, &older).unwrap());
        assert!(toggle_like(&conn, "1", &older).unwrap());
        assert!(toggle_like(&conn, "1", &newer).unwrap());
        assert!(!toggle_like(&conn, "1", &newer).unwrap());

        let posts = list_posts(&conn).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, newer);
        assert_eq!(posts[0].user_name, "Bob");
        assert_eq!((posts[0].likes_count, posts[0].comments_count), (0, 0));
        assert_eq!(posts[1].id, older);
        assert_eq!((posts[1].likes_count, posts[1].comments_count), (2, 2));
    }

    #[test]
    fn unknown_author_is_rejected() {
        let conn = test_connection();
        assert!(insert_post(&conn, "ghost", "boo").is_err());
    }
}
