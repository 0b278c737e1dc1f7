use utoipa::{Modify, OpenApi};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};


pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme("cookie", SecurityScheme::ApiKey(
                    ApiKey::Cookie(ApiKeyValue::with_description("SID", "JWT token for current user"))
            ));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "learnsite", description = "Courses, reading steps and quizzes"),
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_newest_handler,
        crate::web::routes::courses::courses_nav_handler,
        crate::web::routes::courses::courses_search_handler,
        crate::web::routes::courses::courses_by_owner_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::courses::step_detail_handler,
        crate::web::routes::quizzes::quiz_create_form_handler,
        crate::web::routes::quizzes::quiz_create_handler,
        crate::web::routes::quizzes::quiz_edit_form_handler,
        crate::web::routes::quizzes::quiz_edit_handler,
        crate::web::routes::quizzes::quiz_taken_handler,
        crate::web::routes::questions::question_create_form_handler,
        crate::web::routes::questions::question_create_handler,
        crate::web::routes::questions::question_edit_form_handler,
        crate::web::routes::questions::question_edit_handler,
        crate::web::routes::answers::answers_form_handler,
        crate::web::routes::answers::answers_update_handler,
    ),
    components(schemas(
        crate::model::entity::QuestionKind,
        crate::forms::QuizForm,
        crate::forms::AnswerForm,
    )),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
