use thiserror::Error;

use crate::employee::{EmployeeDraft, parse_date};

pub const NAME_MAX_LEN: usize = 50;
pub const DATE_MAX_LEN: usize = 20;
pub const JOB_TITLE_MAX_LEN: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} is not a valid date")]
    InvalidDate { field: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Required { field }
            | FieldError::TooLong { field, .. }
            | FieldError::InvalidDate { field } => field,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid employee form: {}", summarize(.0))]
pub struct FormErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw input of the "new employee" form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub job_title: String,
}

impl EmployeeForm {
    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<EmployeeDraft, FormErrors> {
        let mut errors = Vec::new();

        let first_name = required_text(&mut errors, "firstName", &self.first_name, NAME_MAX_LEN);
        let last_name = required_text(&mut errors, "lastName", &self.last_name, NAME_MAX_LEN);
        let date_of_birth =
            required_text(&mut errors, "dateOfBirth", &self.date_of_birth, DATE_MAX_LEN).and_then(
                |raw| {
                    let parsed = parse_date(raw);
                    if parsed.is_none() {
                        errors.push(FieldError::InvalidDate {
                            field: "dateOfBirth",
                        });
                    }
                    parsed
                },
            );
        let job_title = required_text(&mut errors, "jobTitle", &self.job_title, JOB_TITLE_MAX_LEN);

        match (first_name, last_name, date_of_birth, job_title) {
            (Some(first_name), Some(last_name), Some(date_of_birth), Some(job_title))
                if errors.is_empty() =>
            {
                Ok(EmployeeDraft {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    date_of_birth,
                    job_title: job_title.to_string(),
                })
            }
            _ => Err(FormErrors(errors)),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn required_text<'a>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &'a str,
    max: usize,
) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::Required { field });
        return None;
    }
    // Length is measured on the input as typed; the stored value is trimmed.
    if value.chars().count() > max {
        errors.push(FieldError::TooLong { field, max });
        return None;
    }
    Some(trimmed)
}
