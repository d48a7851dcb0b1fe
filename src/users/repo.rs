use sqlx::SqlitePool;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info};

use crate::users::{dto::UserInput, repo_types::User};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("user not found")]
    NotFound,
    #[error("email already exists")]
    DuplicateEmail(#[source] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        let unique = matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
        if unique {
            RepoError::DuplicateEmail(e)
        } else {
            RepoError::Storage(e)
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Fixed-width UTC text, so `ORDER BY created_at` sorts chronologically.
fn db_timestamp(ts: OffsetDateTime) -> String {
    let ts = ts.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}Z",
        ts.year(),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.nanosecond()
    )
}

/// Create the users table if it is not there yet.
pub async fn init_schema(db: &SqlitePool) -> RepoResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            age INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;
    info!("users table ready");
    Ok(())
}

/// Insert a new user; both timestamps are set to the same instant.
pub async fn create(db: &SqlitePool, input: &UserInput) -> RepoResult<User> {
    let now = OffsetDateTime::now_utc();
    let stamp = db_timestamp(now);
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, age, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(input.age)
    .bind(&stamp)
    .bind(&stamp)
    .execute(db)
    .await?;

    let id = result.last_insert_rowid();
    debug!(user_id = id, "user inserted");
    Ok(User {
        id,
        name: input.name.clone(),
        email: input.email.clone(),
        age: input.age,
        created_at: now,
        updated_at: now,
    })
}

pub async fn get_by_id(db: &SqlitePool, id: i64) -> RepoResult<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(RepoError::NotFound)
}

/// All users, most recently created first.
pub async fn list_all(db: &SqlitePool) -> RepoResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, created_at, updated_at
        FROM users
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Overwrite name/email/age and bump `updated_at`, returning the stored row.
///
/// The write and the re-read share one transaction, so a delete racing with
/// the update can't turn a committed update into `NotFound`.
pub async fn update(db: &SqlitePool, id: i64, input: &UserInput) -> RepoResult<User> {
    let stamp = db_timestamp(OffsetDateTime::now_utc());
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE users SET name = ?, email = ?, age = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(input.age)
    .bind(&stamp)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    debug!(user_id = id, "user updated");
    Ok(user)
}

pub async fn delete(db: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    debug!(user_id = id, "user deleted");
    Ok(())
}
