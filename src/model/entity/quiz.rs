use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

/// Target question count used when a quiz form leaves it out.
pub const DEFAULT_TOTAL_QUESTIONS: i32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    course_id: Uuid,
    created_at: DateTime<Utc>,
    title: String,
    description: String,
    order: i32,
    total_questions: i32,
    times_taken: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order: Option<i32>,
    pub total_questions: Option<i32>,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        course_id: Uuid,
        created_at: DateTime<Utc>,
        title: String,
        description: String,
        order: i32,
        total_questions: i32,
        times_taken: i32,
    ) -> Self {
        Self {
            id,
            course_id,
            created_at,
            title,
            description,
            order,
            total_questions,
            times_taken,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn total_questions(&self) -> i32 {
        self.total_questions
    }

    pub fn times_taken(&self) -> i32 {
        self.times_taken
    }
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreate, Uuid> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let total_questions = data.total_questions.unwrap_or(DEFAULT_TOTAL_QUESTIONS);
        let result = sqlx::query(
            r#"INSERT INTO quizzes (id, course_id, title, description, "order", total_questions, times_taken) VALUES ($1,$2,$3,$4,$5,$6,0) RETURNING id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(order)
        .bind(total_questions)
        .fetch_one(mm.executor())
        .await?;

        Ok(Quiz {
            id: result.try_get("id")?,
            course_id: data.course_id,
            created_at: result.try_get("created_at")?,
            title: data.title,
            description: data.description,
            order,
            total_questions,
            times_taken: 0,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let order = data.order.unwrap_or(0);
        let total_questions = data.total_questions.unwrap_or(DEFAULT_TOTAL_QUESTIONS);
        sqlx::query(
            r#"UPDATE quizzes SET course_id = $1, title = $2, description = $3, "order" = $4, total_questions = $5 WHERE id = $6"#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(order)
        .bind(total_questions)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.course_id = data.course_id;
        self.title = data.title;
        self.description = data.description;
        self.order = order;
        self.total_questions = total_questions;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

impl Quiz {
    pub async fn all_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"SELECT * FROM quizzes WHERE course_id = $1 ORDER BY "order", created_at"#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn find_in_course(
        mm: &ModelManager,
        course_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }

    /// Bumps the usage counter atomically in the database and returns the
    /// new value.
    pub async fn record_taken(&mut self, mm: &ModelManager) -> DatabaseResult<i32> {
        let taken: i32 = sqlx::query_scalar(
            "UPDATE quizzes SET times_taken = times_taken + 1 WHERE id = $1 RETURNING times_taken",
        )
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.times_taken = taken;
        Ok(taken)
    }
}
