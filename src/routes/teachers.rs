use actix_web::{get, post, web, HttpResponse};

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::teachers::{AssignDisciplineRequest, TeacherDirectory, TeacherFilter, TeacherProfile};

#[tracing::instrument(name = "List teachers", skip(store, auth))]
#[get("/Index")]
pub async fn list_teachers(
    store: web::Data<Store>,
    auth: AuthContext,
    filter: web::Query<TeacherFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let directory = TeacherDirectory {
        teachers: store.list_teachers(&filter).await?,
        departments: store.list_departments().await?,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(directory, "Teachers retrieved")))
}

#[tracing::instrument(name = "Teacher details", skip(store, auth))]
#[get("/Details/{id}")]
pub async fn teacher_details(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    let id = id.into_inner();

    let details = store.get_teacher(id).await?.ok_or_else(AppError::not_found)?;
    let profile = TeacherProfile {
        details,
        disciplines: store.teacher_disciplines(id).await?,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(profile, "Teacher retrieved")))
}

#[tracing::instrument(name = "Delete teacher", skip(store, auth))]
#[post("/Delete/{id}")]
pub async fn delete_teacher(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    if !store.delete_teacher(id.into_inner()).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Teacher deleted successfully")))
}

#[tracing::instrument(name = "Assign discipline", skip(store, auth))]
#[post("/AssignDiscipline")]
pub async fn assign_discipline(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<AssignDisciplineRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    if store.get_teacher(request.teacher_id).await?.is_none() {
        return Err(AppError::validation("Teacher does not exist"));
    }
    if !store.discipline_exists(request.discipline_id).await? {
        return Err(AppError::validation("Discipline does not exist"));
    }
    if let Some(group_id) = request.group_id {
        if !store.group_exists(group_id).await? {
            return Err(AppError::validation("Group does not exist"));
        }
    }

    let assignment = store.assign_discipline(&request).await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(assignment, "Discipline assigned successfully")))
}

#[tracing::instrument(name = "Unassign discipline", skip(store, auth))]
#[post("/UnassignDiscipline/{id}")]
pub async fn unassign_discipline(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    if !store.unassign_discipline(id.into_inner()).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Discipline unassigned successfully")))
}
