/// Form validation error accumulation
///
/// Validation is declarative on the form structs (`validator` derive) plus
/// database-backed uniqueness checks in the handlers. All failures for a
/// submission are accumulated, not just the first, so the rendered summary
/// heading ("N errors prohibited this task from being saved:") counts
/// correctly.
///
/// Messages follow the field-label convention the pages use as their
/// contract: "Title can't be blank", "Email has already been taken".
use validator::ValidationErrors;

/// Message for a required field left empty
pub const BLANK: &str = "can't be blank";

/// Message for a uniqueness conflict
pub const TAKEN: &str = "has already been taken";

/// Message for a password confirmation mismatch
pub const CONFIRMATION_MISMATCH: &str = "doesn't match Password";

/// Maps a form field name to its user-facing label
///
/// Labels are exact and case-sensitive; they double as the contract for
/// the rendered forms.
pub fn field_label(field: &str) -> &'static str {
    match field {
        "title" => "Title",
        "content" => "Content",
        "status" => "Status",
        "deadline" => "Deadline",
        "email" => "Email",
        "password" => "Password",
        "password_confirmation" => "Password confirmation",
        _ => "Field",
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, e.g. `title`
    pub field: String,

    /// Message fragment, e.g. `can't be blank`
    pub message: String,
}

impl FieldError {
    /// Full user-facing message, e.g. `Title can't be blank`
    pub fn full_message(&self) -> String {
        format!("{} {}", field_label(&self.field), self.message)
    }
}

/// Accumulated validation failures for one submission of one resource
#[derive(Debug, Clone, Default)]
pub struct ErrorSummary {
    /// Resource name as it appears in the heading, e.g. `task`
    pub resource: String,

    /// Field-level failures in field-declaration order
    pub errors: Vec<FieldError>,
}

impl ErrorSummary {
    /// Creates an empty summary for a resource
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            errors: Vec::new(),
        }
    }

    /// Records a failure for a field
    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Folds `validator` derive output into the summary
    ///
    /// `field_order` fixes the rendering order, since `ValidationErrors`
    /// is backed by a map with no stable iteration order.
    pub fn extend_from(&mut self, errors: &ValidationErrors, field_order: &[&str]) {
        let by_field = errors.field_errors();
        for field in field_order {
            if let Some(field_errors) = by_field.get(field) {
                for error in field_errors.iter() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "is invalid".to_string());
                    self.add(field, &message);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Summary heading, e.g. `1 error prohibited this task from being saved:`
    pub fn heading(&self) -> String {
        let noun = if self.count() == 1 { "error" } else { "errors" };
        format!(
            "{} {} prohibited this {} from being saved:",
            self.count(),
            noun,
            self.resource
        )
    }

    /// Full messages in order, e.g. `["Title can't be blank"]`
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.full_message()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct SampleForm {
        #[validate(length(min = 1, message = "can't be blank"))]
        title: String,

        #[validate(length(min = 1, message = "can't be blank"))]
        status: String,
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(field_label("title"), "Title");
        assert_eq!(field_label("password_confirmation"), "Password confirmation");
        assert_eq!(field_label("unknown"), "Field");
    }

    #[test]
    fn test_full_message() {
        let error = FieldError {
            field: "title".to_string(),
            message: BLANK.to_string(),
        };
        assert_eq!(error.full_message(), "Title can't be blank");
    }

    #[test]
    fn test_heading_singular_and_plural() {
        let mut summary = ErrorSummary::new("task");
        summary.add("title", BLANK);
        assert_eq!(
            summary.heading(),
            "1 error prohibited this task from being saved:"
        );

        summary.add("status", BLANK);
        assert_eq!(
            summary.heading(),
            "2 errors prohibited this task from being saved:"
        );
    }

    #[test]
    fn test_extend_from_preserves_field_order() {
        let form = SampleForm {
            title: String::new(),
            status: String::new(),
        };
        let errors = form.validate().unwrap_err();

        let mut summary = ErrorSummary::new("task");
        summary.extend_from(&errors, &["title", "status"]);

        assert_eq!(
            summary.full_messages(),
            vec!["Title can't be blank", "Status can't be blank"]
        );
    }

    #[test]
    fn test_taken_message() {
        let mut summary = ErrorSummary::new("user");
        summary.add("email", TAKEN);
        assert_eq!(summary.full_messages(), vec!["Email has already been taken"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ErrorSummary::new("task");
        assert!(summary.is_empty());
        assert_eq!(summary.count(), 0);
    }
}
