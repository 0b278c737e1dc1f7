use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Answer, Course, Question, Quiz, Step, StepKind, Text};
use crate::utils::text::{markdown_to_html, time_estimate};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StepSummary {
    pub kind: StepKind,
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    /// Detail path of the step
    pub path: String,
    /// Minutes
    pub time_estimate: i64,
}

impl From<&Step> for StepSummary {
    fn from(step: &Step) -> Self {
        Self {
            kind: step.kind(),
            id: step.id(),
            title: step.title().to_string(),
            description: step.description().to_string(),
            order: step.order(),
            path: step.detail_path(),
            time_estimate: step.time_estimate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub steps: Vec<StepSummary>,
    /// Minutes for the whole course
    pub time_estimate: i64,
}

impl CourseDetailResponse {
    pub fn new(course: Course, steps: &[Step]) -> Self {
        let words = steps.iter().map(Step::word_count).sum();
        Self {
            course,
            steps: steps.iter().map(StepSummary::from).collect(),
            time_estimate: time_estimate(words),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TextDetailResponse {
    pub text: Text,
    /// `text.content` rendered from Markdown
    pub content_html: String,
    pub time_estimate: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub time_estimate: i64,
    pub questions: Vec<QuestionWithAnswers>,
}

impl QuizDetailResponse {
    /// `answers` may belong to any question of the quiz; each keeps the
    /// order it came in.
    pub fn new(quiz: Quiz, questions: Vec<Question>, answers: Vec<Answer>) -> Self {
        let mut by_question: HashMap<Uuid, Vec<Answer>> = HashMap::new();
        for answer in answers {
            by_question.entry(answer.question_id()).or_default().push(answer);
        }

        let questions = questions
            .into_iter()
            .map(|question| QuestionWithAnswers {
                answers: by_question.remove(&question.id()).unwrap_or_default(),
                question,
            })
            .collect();

        Self {
            time_estimate: Step::Quiz(quiz.clone()).time_estimate(),
            quiz,
            questions,
        }
    }
}

/// Body of a step detail, shaped by the step kind.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum StepDetailResponse {
    Text(TextDetailResponse),
    Quiz(QuizDetailResponse),
}

impl From<Text> for TextDetailResponse {
    fn from(text: Text) -> Self {
        Self {
            time_estimate: Step::Text(text.clone()).time_estimate(),
            content_html: markdown_to_html(text.content()),
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizTakenResponse {
    pub quiz_id: Uuid,
    pub times_taken: i32,
}
