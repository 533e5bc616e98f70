//! User Service - API accounts and their model-level permissions

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use super::now;
use crate::auth::{hash_password, verify_password, IP_ADD, IP_CHANGE, IP_DELETE, IP_VIEW, ROLE_ADMIN};
use crate::domain::validation::required;
use crate::domain::{DomainError, DomainResult};
use crate::models::user::{self, Entity as User};

const KNOWN_PERMISSIONS: [&str; 4] = [IP_VIEW, IP_ADD, IP_CHANGE, IP_DELETE];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_role() -> String {
    "user".to_string()
}

pub async fn create_user(db: &DatabaseConnection, input: NewUser) -> DomainResult<user::Model> {
    let username = required("username", &input.username)?;
    let role = required("role", &input.role)?;
    if input.password.len() < 8 {
        return Err(DomainError::validation("password must be at least 8 characters"));
    }
    if let Some(unknown) = input
        .permissions
        .iter()
        .find(|p| !KNOWN_PERMISSIONS.contains(&p.as_str()))
    {
        return Err(DomainError::validation(format!("unknown permission '{}'", unknown)));
    }

    let taken = User::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "users.username",
            format!("user '{}' already exists", username),
        ));
    }

    let password_hash = hash_password(&input.password).map_err(DomainError::Database)?;
    let permissions =
        serde_json::to_string(&input.permissions).map_err(|e| DomainError::Database(e.to_string()))?;
    let now = now();

    let model = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(role),
        permissions: Set(permissions),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created {} account '{}'", model.role, model.username);
    Ok(model)
}

/// Check credentials; `None` when the user is unknown or the password wrong.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> DomainResult<Option<user::Model>> {
    let Some(found) = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        tracing::warn!("User not found: {}", username);
        return Ok(None);
    };

    match verify_password(password, &found.password_hash) {
        Ok(true) => Ok(Some(found)),
        _ => {
            tracing::warn!("Password verification failed for user: {}", username);
            Ok(None)
        }
    }
}

/// Decoded permission list of an account. Admin accounts need none.
pub fn permissions_of(model: &user::Model) -> Vec<String> {
    if model.role == ROLE_ADMIN {
        return Vec::new();
    }
    serde_json::from_str(&model.permissions).unwrap_or_default()
}
