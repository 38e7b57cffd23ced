//! Explicit input validation for client-writable data.
//!
//! Validators collect every problem instead of stopping at the first one, so a
//! client gets all field errors from a single request.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::PostFields;

pub const POST_TITLE_MAX_CHARS: usize = 50;
pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Wire format of `created_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_DATE_FORMAT: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";

/// Messages keyed by the name of the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Unvalidated post input. `None` means the field was absent from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostInput<'a> {
    pub post_title: Option<&'a str>,
    pub post_content: Option<&'a str>,
    pub created_date: Option<&'a str>,
}

/// Validate a create or full-update request.
pub fn validate_post(input: &PostInput<'_>) -> Result<PostFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let post_title = title(&mut errors, input.post_title);
    let post_content = required_text(&mut errors, "post_content", input.post_content);
    let created_date = date(&mut errors, input.created_date);

    assemble(errors, post_title, post_content, created_date)
}

/// Validate a partial update. Only the fields present in `input` are
/// checked; absent ones keep their `current` value.
pub fn validate_post_patch(
    input: &PostInput<'_>,
    current: &PostFields,
) -> Result<PostFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let post_title = match input.post_title {
        None => Some(current.post_title.as_str()),
        present => title(&mut errors, present),
    };
    let post_content = match input.post_content {
        None => Some(current.post_content.as_str()),
        present => required_text(&mut errors, "post_content", present),
    };
    let created_date = match input.created_date {
        None => Some(current.created_date),
        present => date(&mut errors, present),
    };

    assemble(errors, post_title, post_content, created_date)
}

fn assemble(
    errors: FieldErrors,
    post_title: Option<&str>,
    post_content: Option<&str>,
    created_date: Option<NaiveDate>,
) -> Result<PostFields, FieldErrors> {
    match (post_title, post_content, created_date) {
        (Some(post_title), Some(post_content), Some(created_date)) => errors.into_result(PostFields {
            post_title: post_title.to_string(),
            post_content: post_content.to_string(),
            created_date,
        }),
        _ => Err(errors),
    }
}

/// Validate registration credentials.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = username.trim();
    if username.is_empty() {
        errors.add("username", MSG_BLANK);
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        errors.add("username", max_length_message(USERNAME_MAX_CHARS));
    }

    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("Ensure this field has at least {PASSWORD_MIN_CHARS} characters."),
        );
    }

    errors.into_result(())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

fn title<'a>(errors: &mut FieldErrors, value: Option<&'a str>) -> Option<&'a str> {
    let title = required_text(errors, "post_title", value)?;
    if title.chars().count() > POST_TITLE_MAX_CHARS {
        errors.add("post_title", max_length_message(POST_TITLE_MAX_CHARS));
    }
    Some(title)
}

fn date(errors: &mut FieldErrors, value: Option<&str>) -> Option<NaiveDate> {
    let Some(raw) = value.map(str::trim) else {
        errors.add("created_date", MSG_REQUIRED);
        return None;
    };
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.add("created_date", MSG_DATE_FORMAT);
    }
    parsed
}

fn required_text<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        None => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Some("") => {
            errors.add(field, MSG_BLANK);
            None
        }
        Some(text) => Some(text),
    }
}

fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(title: Option<&'a str>, content: Option<&'a str>, date: Option<&'a str>) -> PostInput<'a> {
        PostInput {
            post_title: title,
            post_content: content,
            created_date: date,
        }
    }

    #[test]
    fn test_valid_post() {
        let fields =
            validate_post(&input(Some("scoobert"), Some("doobert"), Some("2000-01-01"))).unwrap();

        assert_eq!(fields.post_title, "scoobert");
        assert_eq!(fields.post_content, "doobert");
        assert_eq!(
            fields.created_date,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_title_is_trimmed() {
        let fields =
            validate_post(&input(Some("  padded  "), Some("body"), Some("2000-01-01"))).unwrap();
        assert_eq!(fields.post_title, "padded");
    }

    #[test]
    fn test_empty_title_rejected() {
        let errors = validate_post(&input(Some(""), Some("doobert"), Some("2000-01-01"))).unwrap_err();

        assert_eq!(errors.get("post_title"), Some(&[MSG_BLANK.to_string()][..]));
        assert!(!errors.contains("post_content"));
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let errors = validate_post(&input(Some("   "), Some("doobert"), Some("2000-01-01"))).unwrap_err();
        assert!(errors.contains("post_title"));
    }

    #[test]
    fn test_missing_title_rejected() {
        let errors = validate_post(&input(None, Some("howdy"), Some("2000-01-01"))).unwrap_err();
        assert_eq!(errors.get("post_title"), Some(&[MSG_REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_title_length_boundary() {
        let fifty = "a".repeat(50);
        assert!(validate_post(&input(Some(&fifty), Some("x"), Some("2000-01-01"))).is_ok());

        let fifty_one = "a".repeat(51);
        let errors =
            validate_post(&input(Some(&fifty_one), Some("x"), Some("2000-01-01"))).unwrap_err();
        assert!(errors.contains("post_title"));
    }

    #[test]
    fn test_title_length_counts_characters() {
        let title = "é".repeat(50);
        assert!(validate_post(&input(Some(&title), Some("x"), Some("2000-01-01"))).is_ok());
    }

    #[test]
    fn test_bad_date_rejected() {
        let errors = validate_post(&input(Some("t"), Some("c"), Some("01/01/2000"))).unwrap_err();
        assert_eq!(errors.get("created_date"), Some(&[MSG_DATE_FORMAT.to_string()][..]));

        let errors = validate_post(&input(Some("t"), Some("c"), Some("2000-02-30"))).unwrap_err();
        assert!(errors.contains("created_date"));
    }

    #[test]
    fn test_all_errors_collected() {
        let errors = validate_post(&PostInput::default()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["created_date", "post_content", "post_title"]);
    }

    fn current() -> PostFields {
        PostFields {
            post_title: "test post".to_string(),
            post_content: "howdy howdy howdy".to_string(),
            created_date: NaiveDate::from_ymd_opt(2004, 8, 24).unwrap(),
        }
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let fields = validate_post_patch(&input(Some(" skibby "), None, None), &current()).unwrap();

        assert_eq!(fields.post_title, "skibby");
        assert_eq!(fields.post_content, "howdy howdy howdy");
        assert_eq!(fields.created_date, current().created_date);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        assert_eq!(
            validate_post_patch(&PostInput::default(), &current()).unwrap(),
            current()
        );
    }

    #[test]
    fn test_patch_checks_present_fields_only() {
        let long = "x".repeat(51);
        let errors =
            validate_post_patch(&input(Some(&long), None, Some("someday")), &current()).unwrap_err();

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["created_date", "post_title"]);

        let errors = validate_post_patch(&input(None, Some(""), None), &current()).unwrap_err();
        assert_eq!(errors.get("post_content"), Some(&[MSG_BLANK.to_string()][..]));
    }

    #[test]
    fn test_credentials() {
        assert!(validate_credentials("testuser", "testpass").is_ok());

        let errors = validate_credentials(" ", "short").unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_display_lists_every_message() {
        let mut errors = FieldErrors::single("post_title", MSG_BLANK);
        errors.add("created_date", MSG_REQUIRED);

        assert_eq!(
            errors.to_string(),
            "created_date: This field is required.; post_title: This field may not be blank."
        );
    }
}
