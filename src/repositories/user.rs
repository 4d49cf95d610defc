use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::user::User,
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        username: row.try_get("username").map_err(|_| AppError::MissingData("username".to_string()))?,
        password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Maps a unique-constraint violation to the `Conflict` naming the colliding
/// field. The constraints are the final authority on uniqueness; the
/// registration pre-check only exists for the friendlier common path.
fn map_unique_violation(e: tokio_postgres::Error) -> AppError {
    if let Some(db_err) = e.as_db_error() {
        if db_err.code() == &SqlState::UNIQUE_VIOLATION {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::Conflict("Email"),
                Some("users_username_key") => AppError::Conflict("Username"),
                _ => AppError::Conflict("User"),
            };
        }
    }
    AppError::Database(e)
}

/// Creates a new user in the database.
pub async fn create_user(
    pool: &Pool,
    id: Uuid,
    name: String,
    email: String,
    username: String,
    password_hash: String,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, name, email, username, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, username, password, created_at, updated_at
            "#,
            &[&id, &name, &email, &username, &password_hash],
        )
        .await
        .map_err(map_unique_violation)?;
    row_to_user(&row)
}

/// Finds a user matching either the email or the username.
///
/// Used by the registration pre-check; the caller inspects which field
/// collided to name it in the error.
pub async fn find_by_email_or_username(
    pool: &Pool,
    email: &str,
    username: &str,
) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, email, username, password, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $2
            "#,
            &[&email, &username],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, email, username, password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their username.
pub async fn find_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, email, username, password, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
            &[&username],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}
