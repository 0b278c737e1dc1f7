use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    forms::{self, FormErrors, QuizForm},
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, Quiz, StepKind, step_detail_path},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            courses::QuizTakenResponse,
            forms::{FormPayload, SubmittedBody, submitted_data},
        },
        error::ErrorResponse,
        middlewares,
        routes::authored_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/create/{course_id}",
            get(quiz_create_form_handler).post(quiz_create_handler),
        )
        .route(
            "/edit/{course_id}/{quiz_id}",
            get(quiz_edit_form_handler).post(quiz_edit_handler),
        )
        .route("/{quiz_id}/taken", post(quiz_taken_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn quiz_location(quiz: &Quiz) -> String {
    step_detail_path(quiz.course_id(), StepKind::Quiz, quiz.id())
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/create/{course_id}",
    description = "Empty quiz form: `{ data: QuizForm, errors: {} }`",
    params(
        ("course_id" = Uuid, Path, description = "Course the quiz is added to")
    ),
    responses(
        (status = 200, description = "Form payload"),
        (status = 303, description = "Not signed in, redirected to the sign-in page"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quiz_create_form_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author(uri.path())?;
    authored_course(state.pool(), user, course_id).await?;

    let payload: FormPayload<QuizForm, FormErrors> = FormPayload::unbound(QuizForm::default());
    Ok((StatusCode::OK, Json(payload)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/create/{course_id}",
    description = "Creates a quiz. Redirects to the quiz on success; \
                   answers 422 with `{ data, errors }` otherwise",
    request_body = QuizForm,
    params(
        ("course_id" = Uuid, Path, description = "Course the quiz is added to")
    ),
    responses(
        (status = 303, description = "Quiz created, `Location` points at it"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 422, description = "Form payload with errors"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
#[tracing::instrument(skip(ctx, state, body))]
async fn quiz_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(course_id): Path<Uuid>,
    body: SubmittedBody,
) -> WebResult<Response> {
    let user = ctx.author(uri.path())?;
    let course = authored_course(state.pool(), user, course_id).await?;

    let data = match submitted_data(body) {
        Ok(data) => data,
        Err(message) => return Ok(unreadable(message)),
    };
    let form = match bind_quiz(&data) {
        Ok(form) => form,
        Err(errors) => return Ok(FormPayload::invalid(data, errors)),
    };

    let quiz = Quiz::create(state.pool(), user, form.into_create(course.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    tracing::info!("quiz {} created in course {}", quiz.id(), course.id());
    Ok(Redirect::to(&quiz_location(&quiz)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/edit/{course_id}/{quiz_id}",
    description = "Quiz form filled with the stored values",
    params(
        ("course_id" = Uuid, Path, description = "Course of the quiz"),
        ("quiz_id" = Uuid, Path, description = "Quiz to edit")
    ),
    responses(
        (status = 200, description = "Form payload"),
        (status = 303, description = "Not signed in, redirected to the sign-in page"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Course or quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quiz_edit_form_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((course_id, quiz_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author(uri.path())?;
    let course = authored_course(state.pool(), user, course_id).await?;
    let quiz = quiz_in_course(&state, &course, quiz_id).await?;

    let payload: FormPayload<QuizForm, FormErrors> = FormPayload::unbound(QuizForm::from(&quiz));
    Ok((StatusCode::OK, Json(payload)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/edit/{course_id}/{quiz_id}",
    description = "Updates a quiz. Redirects to the quiz on success; \
                   answers 422 with `{ data, errors }` otherwise",
    request_body = QuizForm,
    params(
        ("course_id" = Uuid, Path, description = "Course of the quiz"),
        ("quiz_id" = Uuid, Path, description = "Quiz to edit")
    ),
    responses(
        (status = 303, description = "Quiz updated, `Location` points at it"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Course or quiz not found", body = ErrorResponse),
        (status = 422, description = "Form payload with errors"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
#[tracing::instrument(skip(ctx, state, body))]
async fn quiz_edit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((course_id, quiz_id)): Path<(Uuid, Uuid)>,
    body: SubmittedBody,
) -> WebResult<Response> {
    let user = ctx.author(uri.path())?;
    let course = authored_course(state.pool(), user, course_id).await?;
    let quiz = quiz_in_course(&state, &course, quiz_id).await?;

    let data = match submitted_data(body) {
        Ok(data) => data,
        Err(message) => return Ok(unreadable(message)),
    };
    let form = match bind_quiz(&data) {
        Ok(form) => form,
        Err(errors) => return Ok(FormPayload::invalid(data, errors)),
    };

    let quiz = quiz
        .update(state.pool(), user, form.into_create(course.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok(Redirect::to(&quiz_location(&quiz)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/taken",
    description = "Counts one more attempt at the quiz",
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz that was taken")
    ),
    responses(
        (status = 200, description = "Counter bumped", body = QuizTakenResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes"
)]
async fn quiz_taken_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let mut quiz = Quiz::find_by_id(state.pool(), &AuthenticatedUser::admin(), quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Quiz::get_resource_type()))?;

    // the quiz is as visible as its course
    Course::find_visible(state.pool(), ctx.maybe_user(), quiz.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Quiz::get_resource_type()))?;

    let times_taken = quiz
        .record_taken(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(QuizTakenResponse {
            quiz_id: quiz.id(),
            times_taken,
        }),
    ))
}

fn unreadable(message: String) -> Response {
    let mut errors = FormErrors::new();
    errors.add_form_error(message);
    FormPayload::invalid(Value::Null, errors)
}

fn bind_quiz(data: &Value) -> Result<QuizForm, FormErrors> {
    let form: QuizForm = forms::bind(data.clone())?;
    form.clean()?;
    Ok(form)
}

async fn quiz_in_course(state: &AppState, course: &Course, quiz_id: Uuid) -> WebResult<Quiz> {
    Quiz::find_in_course(state.pool(), course.id(), quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Quiz::get_resource_type()))
}
