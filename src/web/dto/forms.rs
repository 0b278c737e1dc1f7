//! Bodies exchanged by the authoring endpoints.
//!
//! GET returns a [`FormPayload`] with the initial data and no errors. A
//! rejected POST returns the same shape with status 422, carrying the data
//! exactly as submitted.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::{FormErrors, FormSetErrors};
use crate::model::entity::QuestionKind;

#[derive(Debug, Clone, Serialize)]
pub struct FormPayload<D, E> {
    pub data: D,
    pub errors: E,
}

impl<D: Serialize, E: Serialize + Default> FormPayload<D, E> {
    pub fn unbound(data: D) -> Self {
        Self {
            data,
            errors: E::default(),
        }
    }
}

impl<D: Serialize, E: Serialize> FormPayload<D, E> {
    pub fn invalid(data: D, errors: E) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(Self { data, errors })).into_response()
    }
}

/// Body of an authoring POST. Extracting it never fails, so the author
/// check runs before the body is looked at.
pub type SubmittedBody = Result<Json<Value>, JsonRejection>;

/// The submitted JSON document, or the message reported as a form-level
/// error when the body is missing or is not JSON.
pub fn submitted_data(body: SubmittedBody) -> Result<Value, String> {
    match body {
        Ok(Json(data)) => Ok(data),
        Err(rejection) => {
            tracing::debug!("unreadable form body: {}", rejection.body_text());
            Err(format!("Submitted data is not a JSON document ({}).", rejection.status().as_u16()))
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Question plus its answer rows, submitted together.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionSubmission {
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub question: Value,
    /// `{ "forms": [AnswerForm, ...] }`
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub answers: Value,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuestionFormData {
    pub kind: QuestionKind,
    /// Fields the question form of this kind accepts
    pub fields: Vec<String>,
    #[schema(value_type = Object)]
    pub question: Value,
    #[schema(value_type = Object)]
    pub answers: Value,
}

#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
pub struct QuestionFormErrors {
    pub question: FormErrors,
    pub answers: FormSetErrors,
}

impl QuestionFormErrors {
    /// Errors for a submission that could not be read at all.
    pub fn unreadable(message: String) -> Self {
        let mut question = FormErrors::new();
        question.add_form_error(message);
        Self {
            question,
            answers: FormSetErrors::default(),
        }
    }
}
