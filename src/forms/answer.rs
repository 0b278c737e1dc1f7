//! Answer formset: a variable number of answer rows edited together with
//! their question.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::forms::{FormErrors, FormSetErrors};
use crate::model::entity::{Answer, AnswerCreate};

/// Blank rows offered on display next to the existing ones.
pub const EXTRA_FORMS: usize = 2;
/// Kept rows a submission needs.
pub const MIN_FORMS: usize = 1;
pub const MAX_FORMS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnswerForm {
    /// Existing answer this row edits; `None` for a new row.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    /// Marks an existing row for removal.
    #[serde(default)]
    pub delete: bool,
}

impl From<&Answer> for AnswerForm {
    fn from(answer: &Answer) -> Self {
        Self {
            id: Some(answer.id()),
            order: answer.order(),
            text: answer.text().to_string(),
            correct: answer.correct(),
            delete: false,
        }
    }
}

impl AnswerForm {
    /// An untouched extra row: nothing was typed into it.
    pub fn is_blank(&self) -> bool {
        self.id.is_none() && self.text.trim().is_empty() && self.order == 0 && !self.correct
    }

    fn clean(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.text.trim().is_empty() {
            errors.add("text", "This field is required.");
        }
        errors
    }

    pub fn into_create(self, question_id: Uuid) -> AnswerCreate {
        AnswerCreate {
            question_id,
            order: Some(self.order),
            text: self.text,
            correct: Some(self.correct),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnswerFormSet {
    #[serde(default)]
    pub forms: Vec<AnswerForm>,
}

/// What a valid formset asks the database to do, in the order it has to
/// happen once the parent question has an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerFormSetPlan {
    pub create: Vec<AnswerForm>,
    pub update: Vec<(Uuid, AnswerForm)>,
    pub delete: Vec<Uuid>,
}

impl AnswerFormSetPlan {
    pub fn kept(&self) -> usize {
        self.create.len() + self.update.len()
    }
}

impl AnswerFormSet {
    /// Display form for `answers`, followed by [`EXTRA_FORMS`] blank rows.
    pub fn initial(answers: &[Answer]) -> Self {
        let forms = answers
            .iter()
            .map(AnswerForm::from)
            .chain(std::iter::repeat_with(AnswerForm::default).take(EXTRA_FORMS))
            .collect();
        Self { forms }
    }

    pub fn empty() -> Self {
        Self::initial(&[])
    }

    /// Binds submitted rows; a malformed payload is a set-level error.
    pub fn bind(data: Value) -> Result<Self, FormSetErrors> {
        serde_json::from_value(data).map_err(|e| FormSetErrors {
            forms: vec![],
            non_form_errors: vec![format!("Malformed answer data: {e}")],
        })
    }

    /// Validates every row against the answers currently stored for the
    /// question. Nothing in the plan is safe to apply unless the whole set
    /// is valid.
    pub fn clean(&self, existing: &[Uuid]) -> Result<AnswerFormSetPlan, FormSetErrors> {
        let existing: HashSet<Uuid> = existing.iter().copied().collect();
        let mut errors = FormSetErrors {
            forms: vec![FormErrors::new(); self.forms.len()],
            non_form_errors: vec![],
        };
        let mut plan = AnswerFormSetPlan::default();
        let mut seen = HashSet::new();

        if self.forms.len() > MAX_FORMS {
            errors
                .non_form_errors
                .push(format!("Please submit at most {MAX_FORMS} forms."));
        }

        for (row, form) in self.forms.iter().enumerate() {
            if let Some(id) = form.id {
                if !existing.contains(&id) {
                    errors.forms[row].add("id", "Select a valid choice. That choice is not one of the available choices.");
                    continue;
                }
                if !seen.insert(id) {
                    errors.forms[row].add("id", "Please correct the duplicate data for id.");
                    continue;
                }
            }

            match (form.id, form.delete) {
                (Some(id), true) => plan.delete.push(id),
                // a new row ticked for deletion never existed
                (None, true) => {}
                (_, false) if form.is_blank() => {}
                (id, false) => {
                    let row_errors = form.clean();
                    if !row_errors.is_empty() {
                        errors.forms[row] = row_errors;
                        continue;
                    }
                    match id {
                        Some(id) => plan.update.push((id, form.clone())),
                        None => plan.create.push(form.clone()),
                    }
                }
            }
        }

        if plan.kept() < MIN_FORMS {
            errors
                .non_form_errors
                .push(format!("Please submit at least {MIN_FORMS} form."));
        }

        if errors.is_empty() { Ok(plan) } else { Err(errors) }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn row(text: &str, correct: bool) -> AnswerForm {
        AnswerForm {
            text: text.to_string(),
            correct,
            ..AnswerForm::default()
        }
    }

    #[test]
    fn two_rows_one_correct() {
        let set = AnswerFormSet {
            forms: vec![row("4", true), row("5", false)],
        };
        let plan = set.clean(&[]).unwrap();
        assert_eq!(plan.create.len(), 2);
        assert_eq!(plan.create.iter().filter(|f| f.correct).count(), 1);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn no_correct_row_is_still_valid() {
        let set = AnswerFormSet {
            forms: vec![row("maybe", false)],
        };
        assert!(set.clean(&[]).is_ok());
    }

    #[test]
    fn zero_rows_fail() {
        let errors = AnswerFormSet::default().clean(&[]).unwrap_err();
        assert_eq!(errors.non_form_errors, vec!["Please submit at least 1 form.".to_string()]);
    }

    #[test]
    fn only_blank_extra_rows_fail() {
        let errors = AnswerFormSet::empty().clean(&[]).unwrap_err();
        assert_eq!(errors.forms.len(), EXTRA_FORMS);
        assert!(errors.forms.iter().all(FormErrors::is_empty));
        assert_eq!(errors.non_form_errors.len(), 1);
    }

    #[test]
    fn blank_rows_are_skipped_next_to_filled_ones() {
        let mut set = AnswerFormSet::empty();
        set.forms.insert(0, row("yes", true));
        let plan = set.clean(&[]).unwrap();
        assert_eq!(plan.kept(), 1);
    }

    #[test]
    fn row_without_text_is_invalid_and_blocks_the_set() {
        let set = AnswerFormSet {
            forms: vec![row("good", false), row("", true)],
        };
        let errors = set.clean(&[]).unwrap_err();
        assert!(errors.forms[0].is_empty());
        assert!(errors.forms[1].has("text"));
    }

    #[test]
    fn existing_rows_update_or_delete() {
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        let set = AnswerFormSet {
            forms: vec![
                AnswerForm {
                    id: Some(keep),
                    ..row("kept", true)
                },
                AnswerForm {
                    id: Some(drop),
                    delete: true,
                    ..row("", false)
                },
            ],
        };
        let plan = set.clean(&[keep, drop]).unwrap();
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].0, keep);
        assert_eq!(plan.delete, vec![drop]);
    }

    #[test]
    fn deleting_every_row_fails_minimum() {
        let only = Uuid::new_v4();
        let set = AnswerFormSet {
            forms: vec![AnswerForm {
                id: Some(only),
                delete: true,
                ..row("x", false)
            }],
        };
        let errors = set.clean(&[only]).unwrap_err();
        assert_eq!(errors.non_form_errors.len(), 1);
    }

    #[test]
    fn foreign_answer_id_is_rejected() {
        let set = AnswerFormSet {
            forms: vec![AnswerForm {
                id: Some(Uuid::new_v4()),
                ..row("sneaky", false)
            }],
        };
        let errors = set.clean(&[Uuid::new_v4()]).unwrap_err();
        assert!(errors.forms[0].has("id"));
    }

    #[test]
    fn duplicated_id_is_rejected() {
        let id = Uuid::new_v4();
        let set = AnswerFormSet {
            forms: vec![
                AnswerForm {
                    id: Some(id),
                    ..row("a", false)
                },
                AnswerForm {
                    id: Some(id),
                    ..row("b", false)
                },
            ],
        };
        let errors = set.clean(&[id]).unwrap_err();
        assert!(errors.forms[0].is_empty());
        assert!(errors.forms[1].has("id"));
    }

    #[test]
    fn bind_rejects_non_list_rows() {
        let errors = AnswerFormSet::bind(json!({ "forms": "nope" })).unwrap_err();
        assert_eq!(errors.non_form_errors.len(), 1);
        assert!(AnswerFormSet::bind(json!({})).unwrap().forms.is_empty());
    }

    #[test]
    fn initial_appends_extra_rows() {
        let set = AnswerFormSet::empty();
        assert_eq!(set.forms.len(), EXTRA_FORMS);
        assert!(set.forms.iter().all(AnswerForm::is_blank));
    }

    #[test]
    fn deserializes_with_defaults() {
        let set: AnswerFormSet = serde_json::from_value(json!({
            "forms": [{ "text": "True", "correct": true }, {}]
        }))
        .unwrap();
        assert!(set.forms[1].is_blank());
        assert!(!set.forms[0].delete);
    }
}
