//! Course steps.
//!
//! A step is either a [`Text`] or a [`Quiz`]. Both live in their own table
//! and share the ordering columns, so a course's step list is the merge of
//! the two tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Quiz, Text};
use crate::model::{DatabaseResult, ModelManager, ResourceType};
use crate::utils::text::{time_estimate, word_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Text,
    Quiz,
}

impl StepKind {
    /// Single-letter prefix used in step paths, e.g. `/courses/{id}/q{id}`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Text => "t",
            Self::Quiz => "q",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "t" => Some(Self::Text),
            "q" => Some(Self::Quiz),
            _ => None,
        }
    }

    /// Splits a path segment such as `q<uuid>` into kind and id.
    pub fn parse_ref(segment: &str) -> Option<(Self, Uuid)> {
        let (code, id) = segment.split_at_checked(1)?;
        let kind = Self::from_code(code)?;
        let id = id.parse().ok()?;
        Some((kind, id))
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Text => ResourceType::Text,
            Self::Quiz => ResourceType::Quiz,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    Text(Text),
    Quiz(Quiz),
}

impl From<Text> for Step {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl From<Quiz> for Step {
    fn from(value: Quiz) -> Self {
        Self::Quiz(value)
    }
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Text(_) => StepKind::Text,
            Self::Quiz(_) => StepKind::Quiz,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Text(t) => t.id(),
            Self::Quiz(q) => q.id(),
        }
    }

    pub fn course_id(&self) -> Uuid {
        match self {
            Self::Text(t) => t.course_id(),
            Self::Quiz(q) => q.course_id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Text(t) => t.title(),
            Self::Quiz(q) => q.title(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Text(t) => t.description(),
            Self::Quiz(q) => q.description(),
        }
    }

    pub fn order(&self) -> i32 {
        match self {
            Self::Text(t) => t.order(),
            Self::Quiz(q) => q.order(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Text(t) => t.created_at(),
            Self::Quiz(q) => q.created_at(),
        }
    }

    /// Canonical detail path of the step.
    pub fn detail_path(&self) -> String {
        step_detail_path(self.course_id(), self.kind(), self.id())
    }

    pub fn word_count(&self) -> usize {
        match self {
            Self::Text(t) => word_count(t.description()) + word_count(t.content()),
            Self::Quiz(q) => word_count(q.description()),
        }
    }

    /// Estimated minutes needed to go through the step.
    pub fn time_estimate(&self) -> i64 {
        time_estimate(self.word_count())
    }

    /// All steps of a course, ordered by `order` with ties kept in
    /// creation order.
    pub async fn all_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let (texts, quizzes) = tokio::try_join!(
            Text::all_by_course(mm, course_id),
            Quiz::all_by_course(mm, course_id),
        )?;
        Ok(merge_steps(texts, quizzes))
    }

    pub async fn find_in_course(
        mm: &ModelManager,
        course_id: Uuid,
        kind: StepKind,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let step = match kind {
            StepKind::Text => Text::find_in_course(mm, course_id, id).await?.map(Step::from),
            StepKind::Quiz => Quiz::find_in_course(mm, course_id, id).await?.map(Step::from),
        };
        Ok(step)
    }
}

pub fn step_detail_path(course_id: Uuid, kind: StepKind, step_id: Uuid) -> String {
    format!("/api/v1/courses/{}/{}{}", course_id, kind.code(), step_id)
}

/// Interleaves texts and quizzes into one ordered sequence.
pub fn merge_steps(texts: Vec<Text>, quizzes: Vec<Quiz>) -> Vec<Step> {
    let mut steps: Vec<Step> = texts
        .into_iter()
        .map(Step::from)
        .chain(quizzes.into_iter().map(Step::from))
        .collect();

    // stable: equal keys keep their relative position
    steps.sort_by_key(|s| (s.order(), s.created_at()));
    steps
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn text(course: Uuid, order: i32, at: DateTime<Utc>, title: &str) -> Text {
        Text::new(
            Uuid::new_v4(),
            course,
            at,
            title.to_string(),
            String::new(),
            order,
            String::new(),
        )
    }

    fn quiz(course: Uuid, order: i32, at: DateTime<Utc>, title: &str) -> Quiz {
        Quiz::new(
            Uuid::new_v4(),
            course,
            at,
            title.to_string(),
            String::new(),
            order,
            4,
            0,
        )
    }

    #[test]
    fn merge_orders_by_order_then_creation() {
        let course = Uuid::new_v4();
        let t0 = Utc::now();
        let texts = vec![
            text(course, 2, t0, "text-2"),
            text(course, 0, t0 + Duration::seconds(3), "text-0-late"),
        ];
        let quizzes = vec![
            quiz(course, 0, t0 + Duration::seconds(1), "quiz-0-early"),
            quiz(course, 1, t0, "quiz-1"),
        ];

        let titles: Vec<_> = merge_steps(texts, quizzes)
            .iter()
            .map(|s| s.title().to_string())
            .collect();

        assert_eq!(titles, vec!["quiz-0-early", "text-0-late", "quiz-1", "text-2"]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_steps(vec![], vec![]).is_empty());
    }

    #[test]
    fn kind_codes_round_trip() {
        assert_eq!(StepKind::from_code("t"), Some(StepKind::Text));
        assert_eq!(StepKind::from_code("q"), Some(StepKind::Quiz));
        assert_eq!(StepKind::from_code("x"), None);
        assert_eq!(StepKind::Quiz.code(), "q");
    }

    #[test]
    fn step_refs_parse_from_path_segments() {
        let id = Uuid::new_v4();
        assert_eq!(StepKind::parse_ref(&format!("t{id}")), Some((StepKind::Text, id)));
        assert_eq!(StepKind::parse_ref(&format!("q{id}")), Some((StepKind::Quiz, id)));
        assert_eq!(StepKind::parse_ref(&format!("x{id}")), None);
        assert_eq!(StepKind::parse_ref("q-not-a-uuid"), None);
        assert_eq!(StepKind::parse_ref(""), None);
        assert_eq!(StepKind::parse_ref("é"), None);
    }

    #[test]
    fn detail_path_uses_kind_prefix() {
        let course = Uuid::new_v4();
        let step = Step::from(quiz(course, 0, Utc::now(), "q"));
        assert_eq!(
            step.detail_path(),
            format!("/api/v1/courses/{}/q{}", course, step.id())
        );
    }

    #[test]
    fn serialized_step_carries_kind_tag() {
        let step = Step::from(text(Uuid::new_v4(), 0, Utc::now(), "intro"));
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["title"], "intro");
    }
}
