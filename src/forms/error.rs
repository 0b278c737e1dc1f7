use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidationErrors;

/// Key for errors that belong to the whole form rather than one field.
pub const ALL_FIELDS_KEY: &str = "_all";

#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_form_error<M: Into<String>>(&mut self, message: M) {
        self.add(ALL_FIELDS_KEY, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = FormErrors::new();
        for (field, field_errors) in value.field_errors() {
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", err.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

/// Errors of a formset: one map per submitted row plus errors about the set
/// as a whole (row count, duplicates).
#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct FormSetErrors {
    pub forms: Vec<FormErrors>,
    pub non_form_errors: Vec<String>,
}

impl FormSetErrors {
    pub fn is_empty(&self) -> bool {
        self.non_form_errors.is_empty() && self.forms.iter().all(FormErrors::is_empty)
    }
}
