use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

/// Stored discriminator of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum QuestionKind {
    #[serde(rename = "mc")]
    MultipleChoice,
    #[serde(rename = "tf")]
    TrueFalse,
}

impl QuestionKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "mc",
            Self::TrueFalse => "tf",
        }
    }
}

/// Unknown codes fall back to multiple choice.
impl From<&str> for QuestionKind {
    fn from(value: &str) -> Self {
        match value {
            "tf" => Self::TrueFalse,
            _ => Self::MultipleChoice,
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    quiz_id: Uuid,
    created_at: DateTime<Utc>,
    kind: String,
    order: i32,
    prompt: String,
    shuffle_answers: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub quiz_id: Uuid,
    pub kind: QuestionKind,
    pub order: Option<i32>,
    pub prompt: String,
    #[serde(default)]
    pub shuffle_answers: bool,
}

impl QuestionCreate {
    /// True/false questions never shuffle.
    fn effective_shuffle(&self) -> bool {
        self.kind == QuestionKind::MultipleChoice && self.shuffle_answers
    }
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> QuestionKind {
        QuestionKind::from(self.kind.as_str())
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn shuffle_answers(&self) -> bool {
        self.shuffle_answers
    }
}

#[async_trait]
impl CrudRepository<Question, QuestionCreate, Uuid> for Question {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let shuffle = data.effective_shuffle();
        let kind = data.kind.to_string();
        let result = sqlx::query(
            r#"INSERT INTO questions (id, quiz_id, kind, "order", prompt, shuffle_answers) VALUES ($1,$2,$3,$4,$5,$6) RETURNING id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.quiz_id)
        .bind(&kind)
        .bind(order)
        .bind(&data.prompt)
        .bind(shuffle)
        .fetch_one(mm.executor())
        .await?;

        Ok(Question {
            id: result.try_get("id")?,
            quiz_id: data.quiz_id,
            created_at: result.try_get("created_at")?,
            kind,
            order,
            prompt: data.prompt,
            shuffle_answers: shuffle,
        })
    }

    /// The stored kind is kept; `data.kind` is ignored on update.
    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let shuffle = self.kind() == QuestionKind::MultipleChoice && data.shuffle_answers;
        sqlx::query(
            r#"UPDATE questions SET quiz_id = $1, "order" = $2, prompt = $3, shuffle_answers = $4 WHERE id = $5"#,
        )
        .bind(data.quiz_id)
        .bind(order)
        .bind(&data.prompt)
        .bind(shuffle)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.quiz_id = data.quiz_id;
        self.order = order;
        self.prompt = data.prompt;
        self.shuffle_answers = shuffle;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

impl Question {
    pub async fn all_by_quiz(mm: &ModelManager, quiz_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"SELECT * FROM questions WHERE quiz_id = $1 ORDER BY "order", created_at"#,
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn find_in_quiz(
        mm: &ModelManager,
        quiz_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as("SELECT * FROM questions WHERE id = $1 AND quiz_id = $2")
            .bind(id)
            .bind(quiz_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_kind_falls_back_to_multiple_choice() {
        assert_eq!(QuestionKind::from("tf"), QuestionKind::TrueFalse);
        assert_eq!(QuestionKind::from("mc"), QuestionKind::MultipleChoice);
        assert_eq!(QuestionKind::from("essay"), QuestionKind::MultipleChoice);
        assert_eq!(QuestionKind::from(""), QuestionKind::MultipleChoice);
    }

    #[test]
    fn kind_serializes_as_path_code() {
        assert_eq!(serde_json::to_value(QuestionKind::TrueFalse).unwrap(), "tf");
        let kind: QuestionKind = serde_json::from_value(serde_json::json!("mc")).unwrap();
        assert_eq!(kind, QuestionKind::MultipleChoice);
    }

    #[test]
    fn true_false_never_shuffles() {
        let data = QuestionCreate {
            quiz_id: Uuid::new_v4(),
            kind: QuestionKind::TrueFalse,
            order: None,
            prompt: "The sky is blue".to_string(),
            shuffle_answers: true,
        };
        assert!(!data.effective_shuffle());

        let data = QuestionCreate {
            kind: QuestionKind::MultipleChoice,
            ..data
        };
        assert!(data.effective_shuffle());
    }
}
