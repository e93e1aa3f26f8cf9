use actix_web::http::StatusCode;
use actix_web::test;
use claim::{assert_none, assert_some};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};

use crate::helpers::{spawn_app, DEMO_PASSWORD};

fn student_registration(login: &str) -> Value {
    json!({
        "role": "Student",
        "login": login,
        "password": "secret-pass",
        "name": FirstName().fake::<String>(),
        "second_name": LastName().fake::<String>(),
        "email": SafeEmail().fake::<String>(),
        "group_id": 1
    })
}

#[actix_web::test]
async fn login_returns_token_cookie_and_dashboard() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Login")
            .set_json(json!({ "login": "teacher1", "password": DEMO_PASSWORD }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "portal_session")
        .map(|cookie| cookie.into_owned());
    let cookie = assert_some!(cookie);
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["role"], "Teacher");
    assert_eq!(body["data"]["redirect"], "/Home/TeacherDashboard");
    assert_eq!(body["data"]["token"], cookie.value());

    let session: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Account/Session")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(session["data"]["is_authenticated"], true);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    let service = init_app!(app);

    for (login, password) in [("teacher1", "wrong-password"), ("nobody", DEMO_PASSWORD)] {
        let response = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/Account/Login")
                .set_json(json!({ "login": login, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Invalid login or password");
    }
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("student1").await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Logout")
            .insert_header(("Authorization", bearer.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/Account/Profile")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["redirect"], "/Account/AccessDenied");
}

#[actix_web::test]
async fn anonymous_visitor_can_register_as_student_once() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let login: String = Username().fake();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Register")
            .set_json(student_registration(&login))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = assert_some!(app.store.find_user_by_login(&login).await.unwrap());
    assert!(user.has_consistent_links());
    assert_some!(app.store.get_profile(user.id).await.unwrap());

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Register")
            .set_json(student_registration(&login))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "This login is already taken");
}

#[actix_web::test]
async fn only_admin_registers_teachers() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let teacher = json!({
        "role": "Teacher",
        "login": Username().fake::<String>(),
        "password": "secret-pass",
        "name": "Nina",
        "second_name": "Belova",
        "department_id": 1
    });

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Register")
            .set_json(teacher.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Register")
            .insert_header(("Authorization", app.bearer("admin").await))
            .set_json(teacher)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn registration_with_short_password_is_rejected() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let mut registration = student_registration(&Username().fake::<String>());
    registration["password"] = json!("123");

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Account/Register")
            .set_json(registration)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_is_created_then_updated() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("student2").await;

    for address in ["Kazan", "Samara"] {
        let response = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/Account/Profile")
                .insert_header(("Authorization", bearer.clone()))
                .set_json(json!({ "address": address, "about": "Second year" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Account/Profile")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["profile"]["address"], "Samara");
    assert_eq!(body["data"]["user"]["login"], "student2");
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[actix_web::test]
async fn admin_deletes_accounts_but_not_administrators() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;
    let student = app.store.find_user_by_login("student4").await.unwrap().unwrap();
    let admin = app.store.find_user_by_login("admin").await.unwrap().unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Account/Delete/{}", student.id))
            .insert_header(("Authorization", bearer.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_none!(app.store.get_user(student.id).await.unwrap());
    assert_none!(app
        .store
        .get_student(student.student_id.unwrap())
        .await
        .unwrap());

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Account/Delete/{}", admin.id))
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
