use crate::{
    Config,
    model::{
        CrudRepository, ModelManager, ResourceTyped, check_access,
        entity::{Course, Quiz},
    },
    web::{AppState, AuthenticatedUser, WebError, WebResult, doc::ApiDoc},
};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub mod answers;
pub mod courses;
pub mod questions;
pub mod quizzes;
pub mod user;

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account/", user::routes(state.clone()))
        .nest("/api/v1/courses/", courses::routes(state.clone()))
        .nest("/api/v1/quizzes/", quizzes::routes(state.clone()))
        .nest("/api/v1/questions/", questions::routes(state.clone()))
        .nest("/api/v1/answers/", answers::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

/// Course `user` is about to author in. A course the user cannot see is
/// reported as missing; a visible course of somebody else as forbidden.
pub(crate) async fn authored_course(
    mm: &ModelManager,
    user: &AuthenticatedUser,
    course_id: Uuid,
) -> WebResult<Course> {
    let course = Course::find_visible(mm, Some(user), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    check_access(mm, user, &course, Some(user.user_id()))
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok(course)
}

/// Quiz `user` is about to author in, together with its course.
pub(crate) async fn authored_quiz(
    mm: &ModelManager,
    user: &AuthenticatedUser,
    quiz_id: Uuid,
) -> WebResult<(Course, Quiz)> {
    let quiz = Quiz::find_by_id(mm, user, quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Quiz::get_resource_type()))?;

    let course = authored_course(mm, user, quiz.course_id()).await?;
    Ok((course, quiz))
}
