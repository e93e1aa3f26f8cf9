use actix_web::http::StatusCode;
use actix_web::test;
use claim::assert_none;
use serde_json::{json, Value};

use crate::helpers::spawn_app;

#[actix_web::test]
async fn student_list_is_admin_only() {
    let app = spawn_app().await;
    let service = init_app!(app);

    for login in ["teacher1", "student1"] {
        let response = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/Students/Index")
                .insert_header(("Authorization", app.bearer(login).await))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = test::call_service(&service, test::TestRequest::get().uri("/Students/Index").to_request()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn students_filter_by_group_and_name() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Students/Index?groupId=1")
            .insert_header(("Authorization", bearer.clone()))
            .to_request(),
    )
    .await;
    let students = body["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 3);
    assert!(students.iter().all(|student| student["group_id"] == 1));
    assert_eq!(body["data"]["groups"].as_array().unwrap().len(), 7);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Students/Index?searchString=ivan")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    let students = body["data"]["students"].as_array().unwrap();
    assert!(!students.is_empty());
    assert!(students.iter().all(|student| {
        let full = format!(
            "{} {} {}",
            student["second_name"].as_str().unwrap_or_default(),
            student["name"].as_str().unwrap_or_default(),
            student["patronymic"].as_str().unwrap_or_default()
        );
        full.to_lowercase().contains("ivan")
    }));
}

#[actix_web::test]
async fn deleting_a_student_removes_the_account() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let user = app.store.find_user_by_login("student5").await.unwrap().unwrap();
    let student_id = user.student_id.unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Students/Delete/{}", student_id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_none!(app.store.find_user_by_login("student5").await.unwrap());

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/Students/Details/{}", student_id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn teacher_profile_lists_assigned_disciplines() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let teacher = app.store.find_user_by_login("teacher1").await.unwrap().unwrap();

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri(&format!("/Teachers/Details/{}", teacher.teacher_id.unwrap()))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["disciplines"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn duplicate_discipline_assignment_is_rejected() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;
    let teacher = app.store.find_user_by_login("teacher3").await.unwrap().unwrap();
    let assignment = json!({
        "teacher_id": teacher.teacher_id.unwrap(),
        "discipline_id": 6,
        "group_id": 3
    });

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Teachers/AssignDiscipline")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(assignment.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Teachers/AssignDiscipline")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(assignment)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Teachers/AssignDiscipline")
            .insert_header(("Authorization", bearer))
            .set_json(json!({
                "teacher_id": teacher.teacher_id.unwrap(),
                "discipline_id": 999
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_creates_reference_data() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("admin").await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Departments/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "name": "Chemistry" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    let department_id = body["data"]["id"].as_i64().unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Groups/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "department_id": department_id, "number_group": 901 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/Disciplines/Create")
            .insert_header(("Authorization", app.bearer("teacher1").await))
            .set_json(json!({ "name": "Organic chemistry" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Departments/Index")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);
}

#[actix_web::test]
async fn deleting_a_teacher_removes_materials_assignments_and_account() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let user = app.store.find_user_by_login("teacher1").await.unwrap().unwrap();
    let teacher_id = user.teacher_id.unwrap();

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/MaterialRequests/Create")
            .insert_header(("Authorization", app.bearer("teacher1").await))
            .set_json(json!({ "title": "Lab kits", "description": "Ten more boards" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(!app.store.list_teacher_materials(teacher_id).await.unwrap().is_empty());
    assert!(!app.store.teacher_disciplines(teacher_id).await.unwrap().is_empty());

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Teachers/Delete/{}", teacher_id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_none!(app.store.get_teacher(teacher_id).await.unwrap());
    assert!(app.store.list_teacher_materials(teacher_id).await.unwrap().is_empty());
    assert!(app.store.teacher_disciplines(teacher_id).await.unwrap().is_empty());
    assert_none!(app.store.get_user(user.id).await.unwrap());
    assert_none!(app.store.get_profile(user.id).await.unwrap());
    assert!(app.store.list_user_requests(user.id).await.unwrap().is_empty());
    assert!(app
        .store
        .list_all_requests()
        .await
        .unwrap()
        .iter()
        .all(|owned| owned.request.user_id != user.id));

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Teachers/Delete/{}", teacher_id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn session_of_a_deleted_teacher_stops_working() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let user = app.store.find_user_by_login("teacher1").await.unwrap().unwrap();
    let bearer = app.bearer("teacher1").await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/Teachers/Delete/{}", user.teacher_id.unwrap()))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/MaterialRequests/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "title": "Lab kits", "description": "Ten more boards" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store.list_user_requests(user.id).await.unwrap().is_empty());

    let session: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/Account/Session")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(session["data"]["is_authenticated"], false);
}
