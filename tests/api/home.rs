use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::helpers::spawn_app;

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(&service, test::TestRequest::get().uri("/health_check").to_request()).await;
    assert!(response.status().is_success());
}

#[actix_web::test]
async fn index_is_public_and_shows_latest_items() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let body: Value =
        test::call_and_read_body_json(&service, test::TestRequest::get().uri("/Home/Index").to_request()).await;

    assert_eq!(body["data"]["counts"]["students"], 21);
    assert_eq!(body["data"]["counts"]["teachers"], 5);
    let news = body["data"]["latest_news"].as_array().unwrap();
    assert_eq!(news.len(), 3);
    assert!(news.iter().all(|item| item["is_published"] == true));
    assert_eq!(news[0]["title"], "Programming contest");
    assert_eq!(body["data"]["active_promotions"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn search_skips_drafts_and_expired_promotions() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get().uri("/Home/Search?searchString=schedule").to_request(),
    )
    .await;
    assert!(body["data"]["news"].as_array().unwrap().is_empty());

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get().uri("/Home/Search?searchString=DISCOUNT").to_request(),
    )
    .await;
    let promotions = body["data"]["promotions"].as_array().unwrap();
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0]["title"], "Dormitory discount");

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get().uri("/Home/Search?searchString=%20%20").to_request(),
    )
    .await;
    assert_eq!(body["data"]["search_string"], "");
    assert!(body["data"]["news"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn draft_news_details_are_hidden() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let draft = app
        .store
        .list_news()
        .await
        .unwrap()
        .into_iter()
        .find(|news| !news.is_published)
        .unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/Home/NewsDetails/{}", draft.id))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn dashboards_follow_the_role() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Home/StudentDashboard")
            .insert_header(("Authorization", app.bearer("student1").await))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["material_count"], 2);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Home/AdminDashboard")
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["pending_requests"], 1);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/Home/AdminDashboard")
            .insert_header(("Authorization", app.bearer("teacher2").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn initialize_database_restores_demo_data() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;

    let student = app.store.find_user_by_login("student3").await.unwrap().unwrap();
    app.store.delete_account(student.id).await.unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Home/InitializeDatabase")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.find_user_by_login("student3").await.unwrap().is_some());
    assert_eq!(app.store.portal_counts().await.unwrap().students, 21);
}
