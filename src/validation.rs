use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Trimmed value of a mandatory string field.
pub fn required(field: &str, value: Option<String>) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::bad_request(format!("{field} is required"))),
    }
}

pub fn non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} must not be empty")));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn ensure_email(field: &str, email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::bad_request(format!(
            "{field} is not a valid email address"
        )));
    }
    Ok(())
}

/// A color classification must be a non-empty list of non-empty strings.
pub fn ensure_color_list(field: &str, colors: &[String]) -> AppResult<()> {
    if colors.is_empty() || colors.iter().any(|c| c.trim().is_empty()) {
        return Err(AppError::bad_request(format!(
            "{field} must be a non-empty array of strings"
        )));
    }
    Ok(())
}

/// Read a color field from an untyped body, rejecting scalars and arrays
/// that mix strings with other JSON types.
pub fn color_array(field: &str, value: Option<&Value>) -> AppResult<Vec<String>> {
    let Some(Value::Array(items)) = value else {
        return Err(AppError::bad_request(format!(
            "{field} must be an array of strings"
        )));
    };

    let colors = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(AppError::bad_request(format!(
                "{field} must be an array of strings"
            ))),
        })
        .collect::<AppResult<Vec<_>>>()?;

    ensure_color_list(field, &colors)?;
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn required_rejects_blank_values() {
        assert!(required("email", None).is_err());
        assert!(required("email", Some("   ".into())).is_err());
        assert_eq!(required("email", Some(" a@b.com ".into())).unwrap(), "a@b.com");
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@shop.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn color_array_accepts_strings_only() {
        assert_eq!(
            color_array("lacesColor", Some(&json!(["red", "blue"]))).unwrap(),
            vec!["red", "blue"]
        );
        assert!(color_array("lacesColor", Some(&json!("red"))).is_err());
        assert!(color_array("lacesColor", Some(&json!(["red", 3]))).is_err());
        assert!(color_array("lacesColor", Some(&json!([]))).is_err());
        assert!(color_array("lacesColor", None).is_err());
    }
}
