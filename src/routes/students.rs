use actix_web::{get, post, web, HttpResponse};

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::students::{StudentDirectory, StudentFilter};

#[tracing::instrument(name = "List students", skip(store, auth))]
#[get("/Index")]
pub async fn list_students(
    store: web::Data<Store>,
    auth: AuthContext,
    filter: web::Query<StudentFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let directory = StudentDirectory {
        students: store.list_students(&filter).await?,
        groups: store.list_groups().await?,
        departments: store.list_departments().await?,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(directory, "Students retrieved")))
}

#[tracing::instrument(name = "Student details", skip(store, auth))]
#[get("/Details/{id}")]
pub async fn student_details(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let student = store
        .get_student(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(student, "Student retrieved")))
}

#[get("/Groups")]
pub async fn list_groups(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ANY)?;
    let groups = store.list_groups().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(groups, "Groups retrieved")))
}

#[tracing::instrument(name = "Delete student", skip(store, auth))]
#[post("/Delete/{id}")]
pub async fn delete_student(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    if !store.delete_student(id.into_inner()).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Student deleted successfully")))
}
