pub mod manager;
pub mod models;

pub use manager::{DatabaseError, DatabaseManager};

/// Postgres `unique_violation`
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlx_code(err).as_deref() == Some("23505")
}

/// Postgres `foreign_key_violation`
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlx_code(err).as_deref() == Some("23503")
}

fn sqlx_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}
