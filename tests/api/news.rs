use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::helpers::spawn_app;

#[actix_web::test]
async fn created_news_is_published_and_signed() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/News/Create")
            .insert_header(("Authorization", app.bearer("admin").await))
            .set_json(json!({ "title": "Open day", "content": "Visit the campus on Saturday." }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["is_published"], true);
    assert_eq!(body["data"]["author"], "Administrator");

    let public: Value =
        test::call_and_read_body_json(&service, test::TestRequest::get().uri("/Home/News").to_request()).await;
    assert_eq!(public["data"][0]["title"], "Open day");
}

#[actix_web::test]
async fn news_administration_requires_admin() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/News/Create")
            .insert_header(("Authorization", app.bearer("teacher1").await))
            .set_json(json!({ "title": "Open day", "content": "Saturday" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/News/Admin")
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn toggling_publication_changes_public_visibility() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;
    let draft = app
        .store
        .list_news()
        .await
        .unwrap()
        .into_iter()
        .find(|news| !news.is_published)
        .unwrap();

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&format!("/News/TogglePublish/{}", draft.id))
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["is_published"], true);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/Home/NewsDetails/{}", draft.id))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn editing_news_keeps_the_author() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;
    let news = app.store.list_news().await.unwrap().remove(0);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&format!("/News/Edit/{}", news.id))
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "title": "Exam schedule", "content": "Published at last.", "is_published": false }))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["title"], "Exam schedule");
    assert_eq!(body["data"]["is_published"], false);
    assert_eq!(body["data"]["author"], news.author.unwrap());

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/News/Edit/9999")
            .insert_header(("Authorization", bearer))
            .set_json(json!({ "title": "Ghost", "content": "Nothing" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_missing_news_still_succeeds() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/News/Delete/9999")
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn promotion_dates_are_validated_and_defaulted() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Promotions/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "title": "Backwards",
                "description": "Ends before it starts",
                "start_date": "2026-05-10T00:00:00",
                "end_date": "2026-05-01T00:00:00"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/Promotions/Create")
            .insert_header(("Authorization", bearer))
            .set_json(json!({ "title": "Book fair", "description": "Textbooks at half price", "discount": "50%" }))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["is_active"], true);

    let public: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get().uri("/Home/Promotions").to_request(),
    )
    .await;
    assert!(public["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|promotion| promotion["title"] == "Book fair"));
}

#[actix_web::test]
async fn deactivated_promotion_disappears_from_public_pages() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let now = chrono::Utc::now().naive_utc();
    let visible = app
        .store
        .list_visible_promotions(now, None)
        .await
        .unwrap()
        .remove(0);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Promotions/ToggleActive/{}", visible.id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["is_active"], false);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/Home/PromotionDetails/{}", visible.id))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
