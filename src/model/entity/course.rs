use crate::model::access::{HasOwner, is_visible};
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::{AuthenticatedUser, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

/// How many courses the navigation list shows.
pub const NAV_COURSES_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    created_at: DateTime<Utc>,
    title: String,
    description: String,
    owner_id: Option<Uuid>,
    subject: String,
    published: bool,
    status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Workflow state of a course. `Published` is the only state in which
/// anonymous readers see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    InProgress,
    InReview,
    Published,
}

impl From<&str> for CourseStatus {
    fn from(value: &str) -> Self {
        match value {
            "in_review" => Self::InReview,
            "published" => Self::Published,
            _ => Self::InProgress,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::InReview => write!(f, "in_review"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
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

    pub fn owner_id(&self) -> Option<Uuid> {
        self.owner_id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn published(&self) -> bool {
        self.published
    }

    pub fn status(&self) -> CourseStatus {
        CourseStatus::from(self.status.as_str())
    }

    pub fn is_visible_to(&self, reader: Option<&AuthenticatedUser>) -> bool {
        is_visible(self.published, self.owner_id, reader)
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let subject = data.subject.unwrap_or_default();
        let status = CourseStatus::InProgress.to_string();
        let result = sqlx::query(
            "INSERT INTO courses (id, title, description, owner_id, subject, published, status) VALUES ($1,$2,$3,$4,$5,FALSE,$6) RETURNING id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.owner_id)
        .bind(&subject)
        .bind(&status)
        .fetch_one(mm.executor())
        .await?;

        Ok(Course {
            id: result.try_get("id")?,
            created_at: result.try_get("created_at")?,
            title: data.title,
            description: data.description,
            owner_id: data.owner_id,
            subject,
            published: false,
            status,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let subject = data.subject.unwrap_or_else(|| self.subject.clone());
        sqlx::query(
            "UPDATE courses SET title = $1, description = $2, owner_id = $3, subject = $4 WHERE id = $5",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.owner_id)
        .bind(&subject)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.owner_id = data.owner_id;
        self.subject = subject;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Course {
    type OwnerId = Option<Uuid>;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.owner_id)
    }
}

// Reader-facing lookups. `None` reader means anonymous.

impl Course {
    pub async fn all_visible(
        mm: &ModelManager,
        reader: Option<&AuthenticatedUser>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = match reader {
            Some(user) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM courses
                    WHERE published OR owner_id = $1 OR $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user.user_id())
                .bind(user.user_role() == UserRole::Admin)
                .fetch_all(mm.executor())
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM courses WHERE published ORDER BY created_at DESC")
                    .fetch_all(mm.executor())
                    .await?
            }
        };
        Ok(rows)
    }

    /// Fetches a course only when `reader` may see it; a hidden course is
    /// reported exactly like a missing one.
    pub async fn find_visible(
        mm: &ModelManager,
        reader: Option<&AuthenticatedUser>,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let found: Option<Self> = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(found.filter(|c| c.is_visible_to(reader)))
    }

    pub async fn newest_published(mm: &ModelManager) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE published ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn recent_published(mm: &ModelManager, limit: i64) -> DatabaseResult<Vec<CourseNavRow>> {
        let rows = sqlx::query_as(
            "SELECT id, title FROM courses WHERE published ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    /// Case-insensitive substring search over title and description of
    /// published courses.
    pub async fn search(mm: &ModelManager, term: &str) -> DatabaseResult<Vec<Self>> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let rows = sqlx::query_as(
            r#"
            SELECT * FROM courses
            WHERE published
            AND (title ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\')
            ORDER BY created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    /// Courses of one teacher. Drafts are included only when the reader is
    /// that teacher or an admin.
    pub async fn all_by_owner(
        mm: &ModelManager,
        reader: Option<&AuthenticatedUser>,
        owner_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let include_drafts = reader
            .map(|u| u.user_role() == UserRole::Admin || u.user_id() == owner_id)
            .unwrap_or(false);

        let rows = sqlx::query_as(
            r#"
            SELECT * FROM courses
            WHERE owner_id = $1 AND (published OR $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(include_drafts)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    /// Moves the course through its workflow. Only `Published` sets the
    /// published flag; the other states clear it.
    pub async fn set_status(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        status: CourseStatus,
    ) -> DatabaseResult<Self> {
        let published = status == CourseStatus::Published;
        sqlx::query("UPDATE courses SET status = $1, published = $2 WHERE id = $3")
            .bind(status.to_string())
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.status = status.to_string();
        self.published = published;
        Ok(self)
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Utils

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct CourseNavRow {
    pub id: Uuid,
    pub title: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_parses_and_falls_back() {
        assert_eq!(CourseStatus::from("published"), CourseStatus::Published);
        assert_eq!(CourseStatus::from("in_review"), CourseStatus::InReview);
        assert_eq!(CourseStatus::from("in_progress"), CourseStatus::InProgress);
        assert_eq!(CourseStatus::from("bogus"), CourseStatus::InProgress);
    }

    #[test]
    fn status_display_matches_stored_values() {
        for status in [CourseStatus::InProgress, CourseStatus::InReview, CourseStatus::Published] {
            assert_eq!(CourseStatus::from(status.to_string().as_str()), status);
        }
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("python"), "python");
    }
}
