mod common;
use axum::http::StatusCode;
use learnsite::model::entity::UserEntity;
use learnsite::web::middlewares::AUTH_TOKEN;
use tower_cookies::cookie::SameSite;

use crate::common::{Action, Flow, setup_server, setup_test_db, signin_action, signup_action};

fn assert_session_cookie(cookie: &tower_cookies::Cookie) {
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
}

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("ada", "analytical engine")
                .assert_cookie(AUTH_TOKEN, assert_session_cookie)
                .assert_body(|body| {
                    let user: UserEntity = serde_json::from_str(body).unwrap();
                    assert_eq!(user.username(), "ada");
                    // the hash never leaves the server
                    assert!(!body.contains("password"));
                }),
        )
        .step(
            signup_action("ada", "another one")
                .with_clear_cookies(true)
                .with_expect(StatusCode::CONFLICT),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    pool.seed_user("grace", "cobol", "user").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signin_action("grace", "cobol")
                .with_save_cookies(false)
                .assert_cookie(AUTH_TOKEN, assert_session_cookie)
                .assert_body(|body| assert!(body.contains("\"username\":\"grace\""))),
        )
        .step(
            signin_action("grace", "fortran")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .step(signin_action("nobody", "cobol").with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_returns_to_form_test() {
    let pool = setup_test_db().await;
    let teacher = pool.seed_user("teacher", "teacher", "user").await;
    let course = pool.seed_course(Some(teacher.id()), "Draft course", false).await;
    let create_path = format!("/api/v1/quizzes/create/{}", course.id());
    let signin_path = format!(
        "/api/v1/account/signin?next=%2Fapi%2Fv1%2Fquizzes%2Fcreate%2F{}",
        course.id()
    );
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("create_form_anonymous", "GET", create_path.clone())
                .assert_redirect(signin_path),
        )
        .step(
            signin_action("teacher", "teacher")
                .with_param("next", &create_path)
                .assert_cookie(AUTH_TOKEN, assert_session_cookie)
                .assert_redirect(create_path.clone()),
        )
        .step(
            Action::new("create_form", "GET", create_path.clone())
                .assert_body(|body| assert!(body.contains("\"total_questions\":4"))),
        )
        // only paths on this site are followed
        .step(
            signin_action("teacher", "teacher")
                .with_param("next", "https://example.com/phish")
                .assert_body(|body| assert!(body.contains("\"username\":\"teacher\""))),
        )
        .run(&mut server, pool)
        .await;
}
