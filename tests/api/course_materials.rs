use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::helpers::spawn_app;

#[actix_web::test]
async fn students_see_only_their_group_materials() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("student1").await;

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/CourseMaterials/Index")
            .insert_header(("Authorization", bearer.clone()))
            .to_request(),
    )
    .await;
    let materials = body["data"]["materials"].as_array().unwrap();
    assert_eq!(materials.len(), 2);
    assert!(materials.iter().all(|material| material["group_id"] == 1));
    assert_eq!(materials[0]["title"], "Introduction to programming");
    assert_eq!(body["data"]["disciplines"].as_array().unwrap().len(), 2);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/CourseMaterials/Index?disciplineId=2")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    let materials = body["data"]["materials"].as_array().unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0]["title"], "Relational model");
    assert_eq!(body["data"]["selected_discipline_id"], 2);
}

#[actix_web::test]
async fn material_of_another_group_is_denied_to_student() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let foreign = app
        .store
        .list_group_materials(2, None)
        .await
        .unwrap()
        .remove(0);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/CourseMaterials/Details/{}", foreign.material.id))
            .insert_header(("Authorization", app.bearer("student1").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn teacher_publishes_only_for_assigned_pairs() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let bearer = app.bearer("teacher1").await;

    let form: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/CourseMaterials/Create")
            .insert_header(("Authorization", bearer.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(form["data"]["groups"].as_array().unwrap().len(), 2);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/CourseMaterials/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "title": "Pointers",
                "description": "Lecture 5",
                "discipline_id": 1,
                "group_id": 2
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/CourseMaterials/Create")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "title": "Indexes",
                "description": "Lecture 6",
                "discipline_id": 2,
                "group_id": 2
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/CourseMaterials/TeacherMaterials")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn teacher_with_all_groups_assignment_publishes_anywhere() {
    let app = spawn_app().await;
    let service = init_app!(app);

    // teacher2 teaches Web Development to every group
    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/CourseMaterials/Create")
            .insert_header(("Authorization", app.bearer("teacher2").await))
            .set_json(json!({
                "title": "Styling",
                "description": "CSS intro",
                "discipline_id": 3,
                "group_id": 7
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn teacher_cannot_delete_a_colleagues_material() {
    let app = spawn_app().await;
    let service = init_app!(app);
    let teacher = app.store.find_user_by_login("teacher1").await.unwrap().unwrap();
    let own = app
        .store
        .list_teacher_materials(teacher.teacher_id.unwrap())
        .await
        .unwrap()
        .remove(0);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/CourseMaterials/Delete/{}", own.material.id))
            .insert_header(("Authorization", app.bearer("teacher2").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/CourseMaterials/Delete/{}", own.material.id))
            .insert_header(("Authorization", app.bearer("teacher1").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/CourseMaterials/Delete/{}", own.material.id))
            .insert_header(("Authorization", app.bearer("admin").await))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
