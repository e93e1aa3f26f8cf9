use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::helpers::spawn_app;

fn request_payload() -> Value {
    json!({
        "title": "Exam tickets",
        "description": "Tickets for the algorithms exam",
        "material_type": "Document"
    })
}

#[actix_web::test]
async fn submitted_request_is_pending_and_listed_first() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("student1").await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/MaterialRequests/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(request_payload())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["status"], "Pending");
    assert!(body["data"]["processed_date"].is_null());

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/MaterialRequests/MyRequests")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    let requests = body["data"].as_array().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["title"], "Exam tickets");
}

#[actix_web::test]
async fn request_payload_is_validated() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/MaterialRequests/Create")
            .insert_header(("Authorization", app.bearer("teacher4").await))
            .set_json(json!({ "title": "", "description": "Anything" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn requests_are_private_to_owner_and_admin() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let owner = app.store.find_user_by_login("student1").await.unwrap().unwrap();
    let request = app.store.list_user_requests(owner.id).await.unwrap().remove(0);
    let uri = format!("/MaterialRequests/Details/{}", request.id);

    for (login, status) in [
        ("student1", StatusCode::OK),
        ("admin", StatusCode::OK),
        ("student2", StatusCode::FORBIDDEN),
        ("teacher1", StatusCode::FORBIDDEN),
    ] {
        let response = test::call_service(
            &service,
            test::TestRequest::get()
                .uri(&uri)
                .insert_header(("Authorization", app.bearer(login).await))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), status, "{}", login);
    }

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/MaterialRequests/Details/9999")
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_list_carries_owner_login() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/MaterialRequests/Admin")
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    let requests = body["data"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|request| request["user_login"] == "student1"));

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/MaterialRequests/Admin")
            .insert_header(("Authorization", app.bearer("student1").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn status_moves_forward_until_completed() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let admin = app.bearer("admin").await;
    let student = app.bearer("student7").await;

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/MaterialRequests/Create")
            .insert_header(("Authorization", student))
            .set_json(request_payload())
            .to_request(),
    )
    .await;
    let uri = format!("/MaterialRequests/UpdateStatus/{}", body["data"]["id"]);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "status": "Finished" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(response).await;
    assert_eq!(error["message"], "Invalid status");

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "status": "Approved", "comment": "Uploading soon" }))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["status"], "Approved");
    assert!(!body["data"]["processed_date"].is_null());
    assert_eq!(body["data"]["admin_comment"], "Uploading soon");

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "status": "Completed" }))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["status"], "Completed");
    assert!(!body["data"]["completed_date"].is_null());

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", admin))
            .set_json(json!({ "status": "Rejected" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
