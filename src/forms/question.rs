use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::forms::{FormErrors, not_blank};
use crate::model::entity::{Question, QuestionCreate, QuestionKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct MultipleChoiceQuestionForm {
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
    #[serde(default)]
    pub shuffle_answers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct TrueFalseQuestionForm {
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum QuestionForm {
    MultipleChoice(MultipleChoiceQuestionForm),
    TrueFalse(TrueFalseQuestionForm),
}

/// Everything the views need to know about one question kind.
pub struct QuestionFormSpec {
    pub kind: QuestionKind,
    pub fields: &'static [&'static str],
    empty: fn() -> QuestionForm,
    bind: fn(Value) -> serde_json::Result<QuestionForm>,
    initial: fn(&Question) -> QuestionForm,
}

static QUESTION_FORMS: [QuestionFormSpec; 2] = [
    QuestionFormSpec {
        kind: QuestionKind::MultipleChoice,
        fields: &["order", "prompt", "shuffle_answers"],
        empty: || QuestionForm::MultipleChoice(MultipleChoiceQuestionForm::default()),
        bind: |v| serde_json::from_value(v).map(QuestionForm::MultipleChoice),
        initial: |q| {
            QuestionForm::MultipleChoice(MultipleChoiceQuestionForm {
                order: q.order(),
                prompt: q.prompt().to_string(),
                shuffle_answers: q.shuffle_answers(),
            })
        },
    },
    QuestionFormSpec {
        kind: QuestionKind::TrueFalse,
        fields: &["order", "prompt"],
        empty: || QuestionForm::TrueFalse(TrueFalseQuestionForm::default()),
        bind: |v| serde_json::from_value(v).map(QuestionForm::TrueFalse),
        initial: |q| {
            QuestionForm::TrueFalse(TrueFalseQuestionForm {
                order: q.order(),
                prompt: q.prompt().to_string(),
            })
        },
    },
];

/// Looks up the form of a question kind.
pub fn question_form_spec(kind: QuestionKind) -> &'static QuestionFormSpec {
    QUESTION_FORMS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or(&QUESTION_FORMS[0])
}

impl QuestionFormSpec {
    pub fn empty(&self) -> QuestionForm {
        (self.empty)()
    }

    pub fn initial(&self, question: &Question) -> QuestionForm {
        (self.initial)(question)
    }

    /// Binds submitted JSON. Type mismatches are reported as a form error
    /// instead of a failed request, so the data can be redisplayed.
    pub fn bind(&self, data: Value) -> Result<QuestionForm, FormErrors> {
        (self.bind)(data).map_err(|e| {
            let mut errors = FormErrors::new();
            errors.add_form_error(format!("Malformed question data: {e}"));
            errors
        })
    }
}

impl QuestionForm {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::MultipleChoice(_) => QuestionKind::MultipleChoice,
            Self::TrueFalse(_) => QuestionKind::TrueFalse,
        }
    }

    pub fn clean(&self) -> Result<(), FormErrors> {
        let result = match self {
            Self::MultipleChoice(f) => f.validate(),
            Self::TrueFalse(f) => f.validate(),
        };
        result.map_err(FormErrors::from)
    }

    pub fn into_create(self, quiz_id: Uuid) -> QuestionCreate {
        match self {
            Self::MultipleChoice(f) => QuestionCreate {
                quiz_id,
                kind: QuestionKind::MultipleChoice,
                order: Some(f.order),
                prompt: f.prompt,
                shuffle_answers: f.shuffle_answers,
            },
            Self::TrueFalse(f) => QuestionCreate {
                quiz_id,
                kind: QuestionKind::TrueFalse,
                order: Some(f.order),
                prompt: f.prompt,
                shuffle_answers: false,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn table_covers_every_kind() {
        for kind in [QuestionKind::MultipleChoice, QuestionKind::TrueFalse] {
            assert_eq!(question_form_spec(kind).kind, kind);
            assert_eq!(question_form_spec(kind).empty().kind(), kind);
        }
    }

    #[test]
    fn unknown_path_code_resolves_to_multiple_choice_form() {
        let spec = question_form_spec(QuestionKind::from("zz"));
        assert_eq!(spec.kind, QuestionKind::MultipleChoice);
        assert!(spec.fields.contains(&"shuffle_answers"));
    }

    #[test]
    fn true_false_form_has_no_shuffle_field() {
        let spec = question_form_spec(QuestionKind::TrueFalse);
        assert_eq!(spec.fields, &["order", "prompt"]);

        let form = spec
            .bind(json!({ "order": 2, "prompt": "Rust has a GC", "shuffle_answers": true }))
            .unwrap();
        assert!(form.clean().is_ok());
        let create = form.into_create(Uuid::new_v4());
        assert_eq!(create.kind, QuestionKind::TrueFalse);
        assert!(!create.shuffle_answers);
        assert_eq!(create.order, Some(2));
    }

    #[test]
    fn multiple_choice_keeps_shuffle_flag() {
        let form = question_form_spec(QuestionKind::MultipleChoice)
            .bind(json!({ "prompt": "Pick one", "shuffle_answers": true }))
            .unwrap();
        let create = form.into_create(Uuid::new_v4());
        assert!(create.shuffle_answers);
        assert_eq!(create.order, Some(0));
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let form = question_form_spec(QuestionKind::TrueFalse)
            .bind(json!({ "prompt": "" }))
            .unwrap();
        assert!(form.clean().unwrap_err().has("prompt"));
    }

    #[test]
    fn malformed_data_becomes_form_error() {
        let errors = question_form_spec(QuestionKind::MultipleChoice)
            .bind(json!({ "order": "first" }))
            .unwrap_err();
        assert!(errors.has(crate::forms::ALL_FIELDS_KEY));
    }
}
