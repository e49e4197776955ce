//! Client-side checks run before any admin request is sent.

use super::error::{AdminError, AdminResult};
use super::model::Role;

const MIN_PASSWORD_LEN: usize = 8;
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> AdminResult<()> {
    let invalid = || AdminError::Validation(format!("Invalid email address: '{email}'"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() || host.starts_with('.') || host.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// At least eight characters with upper case, lower case, digit and symbol.
pub fn validate_password(password: &str) -> AdminResult<()> {
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {MIN_PASSWORD_LEN} characters"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        missing.push("a special character".to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(format!(
            "Password must contain {}",
            missing.join(", ")
        )))
    }
}

pub fn validate_username(username: &str) -> AdminResult<()> {
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(AdminError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AdminError::Validation(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// Role names are unique ignoring case and surrounding whitespace. `editing`
/// excludes the role being renamed.
pub fn validate_role_name(name: &str, roles: &[Role], editing: Option<i64>) -> AdminResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Validation("Role name cannot be empty".to_string()));
    }
    let folded = trimmed.to_lowercase();
    let clash = roles
        .iter()
        .filter(|r| Some(r.id) != editing)
        .any(|r| r.name.trim().to_lowercase() == folded);
    if clash {
        return Err(AdminError::DuplicateRole(trimmed.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, name: &str) -> Role {
        Role {
            id,
            name: name.to_string(),
            description: None,
            permissions: vec![],
            is_system_role: false,
        }
    }

    #[test]
    fn test_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        for bad in ["", "ada", "@example.com", "ada@", "ada@example", "ada@.com", "a b@x.io", "a@b@c.io"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_password_complexity() {
        assert!(validate_password("Str0ng!pw").is_ok());

        let err = validate_password("weak").unwrap_err().to_string();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("an uppercase letter"));
        assert!(err.contains("a digit"));
        assert!(err.contains("a special character"));

        assert!(validate_password("NoDigits!!").is_err());
        assert!(validate_password("nouppercase1!").is_err());
    }

    #[test]
    fn test_username() {
        assert!(validate_username("data_ops-1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_role_name_unique_ignoring_case() {
        let roles = vec![role(1, "Admin"), role(2, "Analyst")];
        assert!(matches!(
            validate_role_name("admin", &roles, None),
            Err(AdminError::DuplicateRole(_))
        ));
        assert!(validate_role_name("Viewer", &roles, None).is_ok());
        // Renaming a role to a different casing of its own name is fine.
        assert!(validate_role_name("ANALYST", &roles, Some(2)).is_ok());
        assert!(validate_role_name("   ", &roles, None).is_err());
    }

    #[test]
    fn test_role_name_clash_beyond_ascii() {
        let roles = vec![role(1, "Überprüfer"), role(2, "Ärzte")];
        assert!(matches!(
            validate_role_name("  überprüfer ", &roles, None),
            Err(AdminError::DuplicateRole(name)) if name == "überprüfer"
        ));
        assert!(validate_role_name("ÄRZTE", &roles, None).is_err());
        assert!(validate_role_name("Prüfer", &roles, None).is_ok());
    }
}
