//! Users

use crate::error::{Result, StorageError};
use aria_core::{User, UserId};
use sqlx::{Row, SqliteConnection};

fn from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
    }
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, name FROM user WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn get_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, name FROM user WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn create(conn: &mut SqliteConnection, name: &str) -> Result<User> {
    let result = sqlx::query("INSERT INTO user (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_rowid();
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| StorageError::not_found("User", id))
}

pub async fn remove(conn: &mut SqliteConnection, id: UserId) -> Result<()> {
    sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
