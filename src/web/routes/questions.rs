use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    forms::{AnswerFormSet, AnswerFormSetPlan, QuestionForm, QuestionFormSpec, question_form_spec},
    model::{
        CrudRepository, ResourceTyped,
        entity::{Answer, Question, QuestionKind, Quiz, StepKind, step_detail_path},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::forms::{
            FormPayload, QuestionFormData, QuestionFormErrors, QuestionSubmission, SubmittedBody,
            submitted_data,
        },
        error::ErrorResponse,
        middlewares,
        routes::{
            answers::{answers_of, apply_answer_plan},
            authored_quiz,
        },
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/create/{quiz_id}/{kind}",
            get(question_create_form_handler).post(question_create_handler),
        )
        .route(
            "/edit/{quiz_id}/{question_id}",
            get(question_edit_form_handler).post(question_edit_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn quiz_location(quiz: &Quiz) -> String {
    step_detail_path(quiz.course_id(), StepKind::Quiz, quiz.id())
}

fn form_data(spec: &QuestionFormSpec, question: &QuestionForm, answers: &AnswerFormSet) -> QuestionFormData {
    QuestionFormData {
        kind: spec.kind,
        fields: spec.fields.iter().map(|f| f.to_string()).collect(),
        question: json!(question),
        answers: json!(answers),
    }
}

/// Binds and validates question and answers together. Nothing is valid
/// unless both parts are.
fn clean_submission(
    spec: &QuestionFormSpec,
    submission: &QuestionSubmission,
    existing: &[Uuid],
) -> Result<(QuestionForm, AnswerFormSetPlan), QuestionFormErrors> {
    let question = spec
        .bind(submission.question.clone())
        .and_then(|form| form.clean().map(|_| form));
    let plan = AnswerFormSet::bind(submission.answers.clone()).and_then(|set| set.clean(existing));

    match (question, plan) {
        (Ok(question), Ok(plan)) => Ok((question, plan)),
        (question, plan) => Err(QuestionFormErrors {
            question: question.err().unwrap_or_default(),
            answers: plan.err().unwrap_or_default(),
        }),
    }
}

fn rejected(spec: &QuestionFormSpec, submission: QuestionSubmission, errors: QuestionFormErrors) -> Response {
    let data = QuestionFormData {
        kind: spec.kind,
        fields: spec.fields.iter().map(|f| f.to_string()).collect(),
        question: submission.question,
        answers: submission.answers,
    };
    FormPayload::invalid(data, errors)
}

/// Splits the body into its question and answers parts. A body that is not
/// a JSON object is rejected with a form-level error.
fn read_submission(spec: &QuestionFormSpec, body: SubmittedBody) -> Result<QuestionSubmission, Response> {
    let data = submitted_data(body)
        .map_err(|message| unreadable(spec, Value::Null, message))?;

    serde_json::from_value(data.clone()).map_err(|e| {
        unreadable(spec, data, format!("Submitted data is not a question submission ({e})."))
    })
}

fn unreadable(spec: &QuestionFormSpec, data: Value, message: String) -> Response {
    let data = QuestionFormData {
        kind: spec.kind,
        fields: spec.fields.iter().map(|f| f.to_string()).collect(),
        question: data,
        answers: Value::Null,
    };
    FormPayload::invalid(data, QuestionFormErrors::unreadable(message))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/create/{quiz_id}/{kind}",
    description = "Empty question form of the given kind with two blank answer rows. \
                   Unknown kinds fall back to multiple choice",
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz the question is added to"),
        ("kind" = String, Path, description = "`mc` or `tf`")
    ),
    responses(
        (status = 200, description = "`{ data: QuestionFormData, errors: QuestionFormErrors }`"),
        (status = 303, description = "Not signed in, redirected to the sign-in page"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "questions"
)]
async fn question_create_form_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((quiz_id, kind)): Path<(Uuid, String)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author(uri.path())?;
    authored_quiz(state.pool(), user, quiz_id).await?;

    let spec = question_form_spec(QuestionKind::from(kind.as_str()));
    let data = form_data(spec, &spec.empty(), &AnswerFormSet::empty());
    let payload: FormPayload<QuestionFormData, QuestionFormErrors> = FormPayload::unbound(data);
    Ok((StatusCode::OK, Json(payload)))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/create/{quiz_id}/{kind}",
    description = "Creates a question and its answers in one submission. \
                   Redirects to the quiz on success; answers 422 otherwise",
    request_body = QuestionSubmission,
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz the question is added to"),
        ("kind" = String, Path, description = "`mc` or `tf`")
    ),
    responses(
        (status = 303, description = "Question created, `Location` points at the quiz"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 422, description = "Form payload with errors"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "questions"
)]
#[tracing::instrument(skip(ctx, state, body))]
async fn question_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((quiz_id, kind)): Path<(Uuid, String)>,
    body: SubmittedBody,
) -> WebResult<Response> {
    let user = ctx.author(uri.path())?;
    let (_, quiz) = authored_quiz(state.pool(), user, quiz_id).await?;
    let spec = question_form_spec(QuestionKind::from(kind.as_str()));

    let submission = match read_submission(spec, body) {
        Ok(submission) => submission,
        Err(response) => return Ok(response),
    };
    let (form, plan) = match clean_submission(spec, &submission, &[]) {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(rejected(spec, submission, errors)),
    };

    let question = Question::create(state.pool(), user, form.into_create(quiz.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    apply_answer_plan(state.pool(), user, question.id(), plan, vec![]).await?;

    tracing::info!("{} question {} added to quiz {}", question.kind(), question.id(), quiz.id());
    Ok(Redirect::to(&quiz_location(&quiz)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/edit/{quiz_id}/{question_id}",
    description = "Question form picked by the stored kind, with the stored answers \
                   and two blank rows",
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz of the question"),
        ("question_id" = Uuid, Path, description = "Question to edit")
    ),
    responses(
        (status = 200, description = "`{ data: QuestionFormData, errors: QuestionFormErrors }`"),
        (status = 303, description = "Not signed in, redirected to the sign-in page"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "questions"
)]
async fn question_edit_form_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author(uri.path())?;
    let (_, quiz) = authored_quiz(state.pool(), user, quiz_id).await?;
    let question = question_in_quiz(&state, &quiz, question_id).await?;
    let answers = answers_of(state.pool(), &question).await?;

    let spec = question_form_spec(question.kind());
    let data = form_data(spec, &spec.initial(&question), &AnswerFormSet::initial(&answers));
    let payload: FormPayload<QuestionFormData, QuestionFormErrors> = FormPayload::unbound(data);
    Ok((StatusCode::OK, Json(payload)))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/edit/{quiz_id}/{question_id}",
    description = "Updates a question and its answers in one submission. The stored kind \
                   decides which fields are accepted",
    request_body = QuestionSubmission,
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz of the question"),
        ("question_id" = Uuid, Path, description = "Question to edit")
    ),
    responses(
        (status = 303, description = "Question updated, `Location` points at the quiz"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse),
        (status = 422, description = "Form payload with errors"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "questions"
)]
#[tracing::instrument(skip(ctx, state, body))]
async fn question_edit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
    body: SubmittedBody,
) -> WebResult<Response> {
    let user = ctx.author(uri.path())?;
    let (_, quiz) = authored_quiz(state.pool(), user, quiz_id).await?;
    let question = question_in_quiz(&state, &quiz, question_id).await?;
    let answers = answers_of(state.pool(), &question).await?;
    let existing: Vec<Uuid> = answers.iter().map(Answer::id).collect();

    let spec = question_form_spec(question.kind());
    let submission = match read_submission(spec, body) {
        Ok(submission) => submission,
        Err(response) => return Ok(response),
    };
    let (form, plan) = match clean_submission(spec, &submission, &existing) {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(rejected(spec, submission, errors)),
    };

    let question = question
        .update(state.pool(), user, form.into_create(quiz.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    apply_answer_plan(state.pool(), user, question.id(), plan, answers).await?;

    Ok(Redirect::to(&quiz_location(&quiz)).into_response())
}

async fn question_in_quiz(state: &AppState, quiz: &Quiz, question_id: Uuid) -> WebResult<Question> {
    Question::find_in_quiz(state.pool(), quiz.id(), question_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))
}
