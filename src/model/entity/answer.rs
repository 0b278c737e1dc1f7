use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Answer {
    id: Uuid,
    question_id: Uuid,
    created_at: DateTime<Utc>,
    order: i32,
    text: String,
    correct: bool,
}

impl ResourceTyped for Answer {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Answer
    }
}

impl Answer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correct(&self) -> bool {
        self.correct
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerCreate {
    pub question_id: Uuid,
    pub order: Option<i32>,
    pub text: String,
    pub correct: Option<bool>,
}

#[async_trait]
impl CrudRepository<Answer, AnswerCreate, Uuid> for Answer {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AnswerCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let correct = data.correct.unwrap_or(false);
        let result = sqlx::query(
            r#"INSERT INTO answers (id, question_id, "order", text, correct) VALUES ($1,$2,$3,$4,$5) RETURNING id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.question_id)
        .bind(order)
        .bind(&data.text)
        .bind(correct)
        .fetch_one(mm.executor())
        .await?;

        Ok(Answer {
            id: result.try_get("id")?,
            question_id: data.question_id,
            created_at: result.try_get("created_at")?,
            order,
            text: data.text,
            correct,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AnswerCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let correct = data.correct.unwrap_or(false);
        sqlx::query(
            r#"UPDATE answers SET question_id = $1, "order" = $2, text = $3, correct = $4 WHERE id = $5"#,
        )
        .bind(data.question_id)
        .bind(order)
        .bind(&data.text)
        .bind(correct)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.question_id = data.question_id;
        self.order = order;
        self.text = data.text;
        self.correct = correct;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM answers WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM answers WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

impl Answer {
    pub async fn all_by_question(
        mm: &ModelManager,
        question_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"SELECT * FROM answers WHERE question_id = $1 ORDER BY "order", created_at"#,
        )
        .bind(question_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    /// Answers of every question of a quiz in one round trip, ordered per
    /// question.
    pub async fn all_by_quiz(mm: &ModelManager, quiz_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT a.*
            FROM answers a
            JOIN questions qn ON qn.id = a.question_id
            WHERE qn.quiz_id = $1
            ORDER BY a.question_id, a."order", a.created_at
            "#,
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
