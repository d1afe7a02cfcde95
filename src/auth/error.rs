use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email já cadastrado: {0}")]
    DuplicateEmail(String),
    /// Covers unknown email, inactive account and wrong password alike.
    #[error("Credenciais inválidas")]
    InvalidCredentials,
    /// Covers malformed, foreign-signed, wrong-subject and expired tokens.
    #[error("Token inválido")]
    InvalidToken,
    #[error("{0}")]
    Validation(String),
    #[error("Usuário não encontrado")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(email) => Self::DuplicateEmail(email),
            StoreError::Database(err) => Self::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Credenciais inválidas"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Token inválido");
        assert_eq!(
            AuthError::DuplicateEmail("ana@x.com".to_string()).to_string(),
            "Email já cadastrado: ana@x.com"
        );
    }

    #[test]
    fn store_duplicate_maps_to_duplicate_email() {
        let err = AuthError::from(StoreError::Duplicate("ana@x.com".to_string()));
        assert!(matches!(err, AuthError::DuplicateEmail(email) if email == "ana@x.com"));
    }
}
