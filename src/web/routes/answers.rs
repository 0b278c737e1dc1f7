use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    forms::{AnswerFormSet, AnswerFormSetPlan, FormSetErrors},
    model::{
        CrudRepository, DatabaseError, ModelManager, ResourceTyped,
        entity::{Answer, Question, Quiz, StepKind, step_detail_path},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::forms::{FormPayload, SubmittedBody, submitted_data},
        error::ErrorResponse,
        middlewares,
        routes::authored_quiz,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{question_id}",
            get(answers_form_handler).post(answers_update_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/answers/{question_id}",
    description = "Answer rows of a question followed by two blank rows: \
                   `{ data: AnswerFormSet, errors: FormSetErrors }`",
    params(
        ("question_id" = Uuid, Path, description = "Question whose answers are edited")
    ),
    responses(
        (status = 200, description = "Formset payload"),
        (status = 303, description = "Not signed in, redirected to the sign-in page"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "answers"
)]
async fn answers_form_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(question_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author(uri.path())?;
    let (_, question) = authored_question(state.pool(), user, question_id).await?;
    let answers = answers_of(state.pool(), &question).await?;

    let payload: FormPayload<AnswerFormSet, FormSetErrors> =
        FormPayload::unbound(AnswerFormSet::initial(&answers));
    Ok((StatusCode::OK, Json(payload)))
}

#[utoipa::path(
    post,
    path = "/api/v1/answers/{question_id}",
    description = "Replaces the answer set of a question. Rows with an `id` edit that answer, \
                   rows without one are added, `delete` removes. Redirects to the quiz on \
                   success; answers 422 with `{ data, errors }` otherwise",
    request_body = AnswerFormSet,
    params(
        ("question_id" = Uuid, Path, description = "Question whose answers are edited")
    ),
    responses(
        (status = 303, description = "Answers saved, `Location` points at the quiz"),
        (status = 403, description = "Course belongs to somebody else", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 422, description = "Formset payload with errors"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "answers"
)]
#[tracing::instrument(skip(ctx, state, body))]
async fn answers_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(question_id): Path<Uuid>,
    body: SubmittedBody,
) -> WebResult<Response> {
    let user = ctx.author(uri.path())?;
    let (quiz, question) = authored_question(state.pool(), user, question_id).await?;
    let answers = answers_of(state.pool(), &question).await?;
    let existing: Vec<Uuid> = answers.iter().map(Answer::id).collect();

    let data = match submitted_data(body) {
        Ok(data) => data,
        Err(message) => {
            let errors = FormSetErrors {
                forms: vec![],
                non_form_errors: vec![message],
            };
            return Ok(FormPayload::invalid(Value::Null, errors));
        }
    };
    let plan = match AnswerFormSet::bind(data.clone()).and_then(|set| set.clean(&existing)) {
        Ok(plan) => plan,
        Err(errors) => return Ok(FormPayload::invalid(data, errors)),
    };

    apply_answer_plan(state.pool(), user, question.id(), plan, answers).await?;

    Ok(Redirect::to(&step_detail_path(quiz.course_id(), StepKind::Quiz, quiz.id())).into_response())
}

/// Question `user` may edit; its course decides visibility and ownership.
async fn authored_question(
    mm: &ModelManager,
    user: &AuthenticatedUser,
    question_id: Uuid,
) -> WebResult<(Quiz, Question)> {
    let question = Question::find_by_id(mm, user, question_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;

    let (_, quiz) = authored_quiz(mm, user, question.quiz_id()).await?;
    Ok((quiz, question))
}

pub(crate) async fn answers_of(mm: &ModelManager, question: &Question) -> WebResult<Vec<Answer>> {
    Answer::all_by_question(mm, question.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Answer::get_resource_type(), e))
}

/// Writes a validated formset. `existing` are the answers the plan was
/// validated against.
pub(crate) async fn apply_answer_plan(
    mm: &ModelManager,
    user: &AuthenticatedUser,
    question_id: Uuid,
    plan: AnswerFormSetPlan,
    existing: Vec<Answer>,
) -> WebResult<()> {
    let mut existing: HashMap<Uuid, Answer> = existing.into_iter().map(|a| (a.id(), a)).collect();
    let into_error = |e: DatabaseError| WebError::resource_fetch_error(Answer::get_resource_type(), e);

    for (id, form) in plan.update {
        if let Some(answer) = existing.remove(&id) {
            answer
                .update(mm, user, form.into_create(question_id))
                .await
                .map_err(into_error)?;
        }
    }

    for id in plan.delete {
        if let Some(answer) = existing.remove(&id) {
            answer.delete(mm, user).await.map_err(into_error)?;
        }
    }

    for form in plan.create {
        Answer::create(mm, user, form.into_create(question_id))
            .await
            .map_err(into_error)?;
    }

    Ok(())
}
