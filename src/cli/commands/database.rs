use serde_json::json;

use crate::auth::hash_password;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;
use crate::services::{NewUser, UserService};
use crate::types::Role;
use crate::validation::{Validator, MAX_NAME_LEN};

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let url = DatabaseManager::database_url()?;
    let pool = DatabaseManager::connect_lazy(config::config(), url.as_str())?;

    DatabaseManager::migrate(&pool).await?;
    DatabaseManager::close(&pool).await;

    output_success(
        output_format,
        "Migrations applied",
        Some(json!({ "database": DatabaseManager::redacted(&url) })),
    )
}

pub async fn create_admin(name: &str, email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    Validator::new()
        .required_text("name", name, MAX_NAME_LEN)
        .email("email", email)
        .password("password", password)
        .finish()
        .map_err(|e| anyhow::anyhow!("{}", e.to_json()["field_errors"]))?;

    let pool = DatabaseManager::connect(config::config()).await?;
    let users = UserService::new(pool.clone());

    let password_hash = hash_password(password)?;
    let user = users
        .create_approved(
            NewUser {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password_hash,
            },
            Role::Admin,
        )
        .await?;
    DatabaseManager::close(&pool).await;

    output_success(
        output_format,
        &format!("Administrator {} created", user.email),
        Some(json!({ "id": user.id, "email": user.email })),
    )
}
