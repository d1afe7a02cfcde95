//! Input checks applied before anything touches the store.

use regex::Regex;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Lightweight email sanity check.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub fn check_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Nome é obrigatório".to_string());
    }
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "Nome deve ter entre {NAME_MIN_LEN} e {NAME_MAX_LEN} caracteres"
        ));
    }
    Ok(())
}

pub fn check_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email é obrigatório".to_string());
    }
    if email.chars().count() > NAME_MAX_LEN || !valid_email(email) {
        return Err("Email deve ser válido".to_string());
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), String> {
    if password.trim().is_empty() {
        return Err("Senha é obrigatória".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Senha deve ter pelo menos {PASSWORD_MIN_LEN} caracteres"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("ana@x.com"));
        assert!(valid_email("ana.maria+mottu@mottu.com.br"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("ana@x"));
        assert!(!valid_email("ana @x.com"));
    }

    #[test]
    fn name_length_bounds() {
        assert!(check_name("Ana").is_ok());
        assert!(check_name("Al").is_ok());
        assert!(check_name("A").is_err());
        assert!(check_name("   ").is_err());
        assert!(check_name(&"a".repeat(100)).is_ok());
        assert!(check_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(check_name("Zé").is_ok());
        assert!(check_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn password_minimum_length() {
        assert!(check_password("senha1").is_ok());
        assert!(check_password("senha").is_err());
        assert_eq!(
            check_password(""),
            Err("Senha é obrigatória".to_string())
        );
    }

    #[test]
    fn email_required_and_shaped() {
        assert_eq!(check_email(""), Err("Email é obrigatório".to_string()));
        assert_eq!(
            check_email("ana"),
            Err("Email deve ser válido".to_string())
        );
        assert!(check_email("ana@x.com").is_ok());
    }
}
