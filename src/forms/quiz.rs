use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::forms::{FormErrors, not_blank};
use crate::model::entity::{DEFAULT_TOTAL_QUESTIONS, Quiz, QuizCreate};

fn default_total_questions() -> i32 {
    DEFAULT_TOTAL_QUESTIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct QuizForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_total_questions")]
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub total_questions: i32,
}

impl Default for QuizForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            order: 0,
            total_questions: DEFAULT_TOTAL_QUESTIONS,
        }
    }
}

impl From<&Quiz> for QuizForm {
    fn from(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title().to_string(),
            description: quiz.description().to_string(),
            order: quiz.order(),
            total_questions: quiz.total_questions(),
        }
    }
}

impl QuizForm {
    pub fn clean(&self) -> Result<(), FormErrors> {
        self.validate().map_err(FormErrors::from)
    }

    pub fn into_create(self, course_id: Uuid) -> QuizCreate {
        QuizCreate {
            course_id,
            title: self.title,
            description: self.description,
            order: Some(self.order),
            total_questions: Some(self.total_questions),
        }
    }
}
