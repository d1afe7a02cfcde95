//! Authenticated request identity.

use crate::store::{Role, UserRecord};
use serde::Serialize;
use utoipa::ToSchema;

/// Minimal identity the authentication gate attaches to a request. Distinct
/// from [`UserRecord`] so handlers and the route policy never see credential
/// material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    #[serde(rename = "perfil")]
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

impl From<&UserRecord> for Principal {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            role: record.role,
        }
    }
}
