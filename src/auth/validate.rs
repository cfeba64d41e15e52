//! Field-level checks shared by the content drafts and the auth forms.
//! Each returns the user-facing message of the violated rule, or `None`.

/// Required text with a maximum length counted in characters.
pub fn validate_required(value: &str, field_name: &str, max_chars: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_chars {
        return Some(format!("{field_name} must be at most {max_chars} characters"));
    }
    None
}

/// Optional text; blank is fine.
pub fn validate_optional(value: &str, field_name: &str, max_chars: usize) -> Option<String> {
    if value.trim().chars().count() > max_chars {
        return Some(format!("{field_name} must be at most {max_chars} characters"));
    }
    None
}

pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Email must be a valid address".to_string()),
    }
}

pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// First message out of an ordered list of checks.
pub fn first_error<I>(checks: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    checks.into_iter().flatten().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_counts_characters_not_bytes() {
        let title = "é".repeat(200);
        assert_eq!(validate_required(&title, "Title", 200), None);
        assert_eq!(
            validate_required(&format!("{title}x"), "Title", 200),
            Some("Title must be at most 200 characters".to_string())
        );
        assert_eq!(validate_required("  ", "Title", 200), Some("Title is required".to_string()));
    }

    #[test]
    fn first_error_keeps_check_order() {
        let err = first_error([None, Some("second".to_string()), Some("third".to_string())]);
        assert_eq!(err.as_deref(), Some("second"));
    }

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("a@b.org").is_none());
        assert!(validate_email("@b.org").is_some());
        assert!(validate_email("a@localhost").is_some());
    }
}
