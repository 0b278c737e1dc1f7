use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

/// A reading step: a titled block of Markdown content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Text {
    id: Uuid,
    course_id: Uuid,
    created_at: DateTime<Utc>,
    title: String,
    description: String,
    order: i32,
    content: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TextCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order: Option<i32>,
    #[serde(default)]
    pub content: String,
}

impl ResourceTyped for Text {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Text
    }
}

impl Text {
    pub fn new(
        id: Uuid,
        course_id: Uuid,
        created_at: DateTime<Utc>,
        title: String,
        description: String,
        order: i32,
        content: String,
    ) -> Self {
        Self {
            id,
            course_id,
            created_at,
            title,
            description,
            order,
            content,
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

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[async_trait]
impl CrudRepository<Text, TextCreate, Uuid> for Text {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: TextCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query(
            r#"INSERT INTO texts (id, course_id, title, description, "order", content) VALUES ($1,$2,$3,$4,$5,$6) RETURNING id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order.unwrap_or(0))
        .bind(&data.content)
        .fetch_one(mm.executor())
        .await?;

        Ok(Text {
            id: result.try_get("id")?,
            course_id: data.course_id,
            created_at: result.try_get("created_at")?,
            title: data.title,
            description: data.description,
            order: data.order.unwrap_or(0),
            content: data.content,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: TextCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"UPDATE texts SET course_id = $1, title = $2, description = $3, "order" = $4, content = $5 WHERE id = $6"#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order.unwrap_or(0))
        .bind(&data.content)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.course_id = data.course_id;
        self.title = data.title;
        self.description = data.description;
        self.order = data.order.unwrap_or(0);
        self.content = data.content;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM texts WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM texts WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

impl Text {
    pub async fn all_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"SELECT * FROM texts WHERE course_id = $1 ORDER BY "order", created_at"#,
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
        let row = sqlx::query_as("SELECT * FROM texts WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }
}
