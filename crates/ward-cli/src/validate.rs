//! Input validation for CLI arguments, before anything hits the store.

use crate::output::CliError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_REASON_LEN: usize = 500;
pub const MAX_AGENT_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    #[must_use]
    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code,
        )
    }
}

/// Titles and reasons share the same shape rules.
fn validate_text(
    field: &'static str,
    s: &str,
    max_len: usize,
    code: &'static str,
) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            field,
            s,
            "must not be empty",
            format!("provide a non-empty {field}"),
            code,
        ));
    }
    if s.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            s,
            format!("must be <= {max_len} characters"),
            format!("shorten the {field}"),
            code,
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError::new(
            field,
            s,
            "must not contain control characters",
            format!("remove control characters from the {field}"),
            code,
        ));
    }
    Ok(())
}

/// Validate a report/issue title.
///
/// # Errors
/// Returns a [`ValidationError`] describing the violation.
pub fn validate_title(s: &str) -> Result<(), ValidationError> {
    validate_text("title", s, MAX_TITLE_LEN, "invalid_title")
}

/// Validate an escalation reason.
///
/// # Errors
/// Returns a [`ValidationError`] describing the violation.
pub fn validate_reason(s: &str) -> Result<(), ValidationError> {
    validate_text("reason", s, MAX_REASON_LEN, "invalid_reason")
}

/// Validate an issue id of the form `wss-2026-k3f9`.
///
/// # Errors
/// Returns a [`ValidationError`] describing the violation.
pub fn validate_issue_id(s: &str) -> Result<(), ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::new(
            "issue_id",
            s,
            "must not be empty",
            "use an ID like wss-2026-k3f9 (see 'wd list')",
            "invalid_issue_id",
        ));
    }
    let well_formed = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !well_formed || value.len() > 64 {
        return Err(ValidationError::new(
            "issue_id",
            s,
            "must be lowercase letters, digits, and dashes",
            "copy the ID from 'wd list' or 'wd report' output",
            "invalid_issue_id",
        ));
    }
    Ok(())
}

/// Validate a worker or actor identifier.
///
/// # Errors
/// Returns a [`ValidationError`] describing the violation.
pub fn validate_agent(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            "agent",
            s,
            "must not be empty",
            "provide a non-empty identity",
            "invalid_agent",
        ));
    }
    if s.chars().count() > MAX_AGENT_LEN {
        return Err(ValidationError::new(
            "agent",
            s,
            format!("must be <= {MAX_AGENT_LEN} characters"),
            "shorten the identity",
            "invalid_agent",
        ));
    }
    if s.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            "agent",
            s,
            "must not contain whitespace",
            "use a handle like 'mike.johnson'",
            "invalid_agent",
        ));
    }
    Ok(())
}

/// Validate a citizen rating average (the feed uses a 5-star scale).
///
/// # Errors
/// Returns a [`ValidationError`] describing the violation.
pub fn validate_rating(value: f64) -> Result<(), ValidationError> {
    if !(1.0..=5.0).contains(&value) || !value.is_finite() {
        return Err(ValidationError::new(
            "rating",
            value.to_string(),
            "must be between 1.0 and 5.0",
            "pass a value on the 5-star scale, e.g. --work 4.5",
            "invalid_rating",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        validate_agent, validate_issue_id, validate_rating, validate_reason, validate_title,
    };

    #[test]
    fn titles_reject_empty_and_control_chars() {
        assert!(validate_title("Water main break").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("bad\u{7}bell").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn issue_ids_accept_the_generated_shape() {
        assert!(validate_issue_id("wss-2026-k3f9").is_ok());
        assert!(validate_issue_id("pwd-2026-0001").is_ok());
        assert!(validate_issue_id("").is_err());
        assert!(validate_issue_id("WSS-2026-K3F9").is_err());
        assert!(validate_issue_id("wss 2026").is_err());
    }

    #[test]
    fn agents_reject_whitespace() {
        assert!(validate_agent("mike.johnson").is_ok());
        assert!(validate_agent("mike johnson").is_err());
        assert!(validate_agent("").is_err());
    }

    #[test]
    fn ratings_stay_on_the_star_scale() {
        assert!(validate_rating(1.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(0.5).is_err());
        assert!(validate_rating(5.1).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }

    #[test]
    fn reasons_share_text_rules() {
        assert!(validate_reason("Exceeds department budget limit").is_ok());
        assert!(validate_reason("").is_err());
    }
}
