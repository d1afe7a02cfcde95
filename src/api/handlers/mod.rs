pub mod admin_users;
pub mod auth;
pub mod health;
pub mod pages;
pub mod user;

use crate::store::{Role, UserRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of an account. Never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "perfil")]
    pub role: Role,
    #[serde(rename = "ativo")]
    pub active: bool,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
        }
    }
}
