//! Field-level checks for client payloads.

use crate::error::DomainError;

/// Collects problems across a whole payload so one error can report all of them.
///
/// Values are trimmed; blank counts as absent. Missing required fields are
/// reported ahead of anything else.
#[derive(Debug, Default)]
pub struct Fields {
    missing: Vec<&'static str>,
    invalid: Vec<String>,
}

impl Fields {
    pub fn required(&mut self, field: &'static str, value: Option<String>, max: usize) -> Option<String> {
        let value = self.optional(field, value, max);
        if value.is_none() {
            self.missing.push(field);
        }
        value
    }

    pub fn optional(&mut self, field: &'static str, value: Option<String>, max: usize) -> Option<String> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        if value.chars().count() > max {
            self.invalid.push(format!("{field} must be at most {max} characters"));
        }
        Some(value)
    }

    pub fn mark_missing(&mut self, field: &'static str) {
        self.missing.push(field);
    }

    pub fn invalid(&mut self, message: impl Into<String>) {
        self.invalid.push(message.into());
    }

    pub fn finish(&self) -> Result<(), DomainError> {
        if !self.missing.is_empty() {
            return Err(DomainError::missing_fields(self.missing.iter().copied()));
        }
        if !self.invalid.is_empty() {
            return Err(DomainError::validation(self.invalid.join("; ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_is_missing() {
        let mut fields = Fields::default();
        assert_eq!(fields.required("title", Some("  ".to_string()), 10), None);
        assert_eq!(fields.required("body", None, 10), None);
        assert_eq!(
            fields.finish(),
            Err(DomainError::MissingFields(vec!["title".to_string(), "body".to_string()]))
        );
    }

    #[test]
    fn values_are_trimmed_and_length_checked() {
        let mut fields = Fields::default();
        assert_eq!(fields.optional("city", Some(" Ikeja ".to_string()), 50).as_deref(), Some("Ikeja"));
        assert!(fields.finish().is_ok());

        fields.optional("state", Some("x".repeat(51)), 50);
        let err = fields.finish().unwrap_err();
        assert_eq!(err, DomainError::validation("state must be at most 50 characters"));
    }

    #[test]
    fn missing_wins_over_invalid() {
        let mut fields = Fields::default();
        fields.invalid("shares must be at most 1000000000");
        fields.mark_missing("name");
        assert!(matches!(fields.finish(), Err(DomainError::MissingFields(_))));
    }
}
