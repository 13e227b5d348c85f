use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub role: Role,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl User {
    pub fn new(username: String, email: String, hashed_password: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email: email.trim().to_lowercase(),
            hashed_password,
            is_active: true,
            role,
            created_at: Utc::now().to_rfc3339(),
            last_login: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub role: Role,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}
