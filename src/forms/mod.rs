//! Authoring forms.
//!
//! A form is a plain serde struct validated with `validator`; the outcome is
//! a [`FormErrors`] map that the views send back next to the submitted data.

mod error;
pub use error::{ALL_FIELDS_KEY, FormErrors, FormSetErrors};

mod quiz;
pub use quiz::QuizForm;

mod question;
pub use question::{MultipleChoiceQuestionForm, QuestionForm, QuestionFormSpec, TrueFalseQuestionForm, question_form_spec};

mod answer;
pub use answer::{AnswerForm, AnswerFormSet, AnswerFormSetPlan, EXTRA_FORMS, MAX_FORMS, MIN_FORMS};

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::ValidationError;

/// Deserializes submitted JSON into a form. Type mismatches become a
/// form-level error so the data can be redisplayed.
pub fn bind<T: DeserializeOwned>(data: Value) -> Result<T, FormErrors> {
    serde_json::from_value(data).map_err(|e| {
        let mut errors = FormErrors::new();
        errors.add_form_error(format!("Malformed form data: {e}"));
        errors
    })
}

/// Rejects empty and whitespace-only input.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        return Err(err);
    }
    Ok(())
}
