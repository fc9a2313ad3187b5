//! Settings database operations.
//!
//! Plain string key/value pairs, mirroring the persistent browser storage
//! the admin pages were written against.

use sqlx::PgPool;

use super::RepositoryError;

/// Load every stored setting.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(String, String)>, RepositoryError> {
    let rows = sqlx::query_as::<_, (String, String)>(
        r"
        SELECT key, value FROM lifex.settings
        ORDER BY key
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get a single setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<String>, RepositoryError> {
    let value = sqlx::query_scalar::<_, String>(
        r"
        SELECT value FROM lifex.settings
        WHERE key = $1
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

/// Insert or replace a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(pool: &PgPool, key: &str, value: &str) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO lifex.settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a setting. Deleting a missing key is not an error.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn delete_setting(pool: &PgPool, key: &str) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        DELETE FROM lifex.settings
        WHERE key = $1
        ",
    )
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}
