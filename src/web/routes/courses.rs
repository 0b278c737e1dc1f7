use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        ResourceType, ResourceTyped,
        entity::{Answer, Course, CourseNavRow, NAV_COURSES_LIMIT, Question, Step, StepKind},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::courses::{CourseDetailResponse, QuizDetailResponse, StepDetailResponse, TextDetailResponse},
        error::ErrorResponse,
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Term looked up in title and description
    #[serde(default)]
    q: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler))
        .route("/newest", get(courses_newest_handler))
        .route("/nav", get(courses_nav_handler))
        .route("/search", get(courses_search_handler))
        .route("/by/{owner_id}", get(courses_by_owner_handler))
        .route("/{course_id}", get(course_detail_handler))
        .route("/{course_id}/{step}", get(step_detail_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/",
    description = "List courses visible to the caller, newest first",
    responses(
        (status = 200, description = "Courses collected", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let courses = Course::all_visible(state.pool(), ctx.maybe_user())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/newest",
    description = "Most recently created published course",
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Nothing is published yet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_newest_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let course = Course::newest_published(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/nav",
    description = "Newest published courses for navigation",
    responses(
        (status = 200, description = "Navigation entries", body = Vec<CourseNavRow>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_nav_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let rows = Course::recent_published(state.pool(), NAV_COURSES_LIMIT)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/search",
    description = "Case-insensitive search over published courses",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching courses", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> WebResult<impl IntoResponse> {
    let courses = Course::search(state.pool(), &query.q)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/by/{owner_id}",
    description = "Courses of one teacher. Drafts are listed for the teacher and admins only",
    params(
        ("owner_id" = Uuid, Path, description = "ID of the teacher")
    ),
    responses(
        (status = 200, description = "Courses collected", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_by_owner_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let courses = Course::all_by_owner(state.pool(), ctx.maybe_user(), owner_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    description = "Course with its ordered steps",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetailResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn course_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = Course::find_visible(state.pool(), ctx.maybe_user(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let steps = Step::all_by_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseDetailResponse::new(course, &steps))))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/{step}",
    description = "Step detail. `step` is the step id prefixed with `t` for texts or `q` for quizzes; \
                   quizzes come with their questions and answers",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course"),
        ("step" = String, Path, description = "Step reference, e.g. `q0b6f...`")
    ),
    responses(
        (status = 200, description = "Step found", body = StepDetailResponse),
        (status = 404, description = "Course or step not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn step_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, step)): Path<(Uuid, String)>,
) -> WebResult<impl IntoResponse> {
    let (kind, step_id) =
        StepKind::parse_ref(&step).ok_or(WebError::resource_not_found(ResourceType::Step))?;

    let course = Course::find_visible(state.pool(), ctx.maybe_user(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let step = Step::find_in_course(state.pool(), course.id(), kind, step_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(kind.resource_type(), e))?
        .ok_or(WebError::resource_not_found(kind.resource_type()))?;

    let response = match step {
        Step::Text(text) => StepDetailResponse::Text(TextDetailResponse::from(text)),
        Step::Quiz(quiz) => {
            let (questions, answers) = tokio::try_join!(
                Question::all_by_quiz(state.pool(), quiz.id()),
                Answer::all_by_quiz(state.pool(), quiz.id()),
            )
            .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

            StepDetailResponse::Quiz(QuizDetailResponse::new(quiz, questions, answers))
        }
    };

    Ok((StatusCode::OK, Json(response)))
}
