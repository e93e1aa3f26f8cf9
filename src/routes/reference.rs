use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::reference::{CreateGroupRequest, CreateNamedRequest};

#[get("/Index")]
pub async fn departments(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ANY)?;
    let departments = store.list_departments().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(departments, "Departments retrieved")))
}

#[tracing::instrument(name = "Create department", skip(store, auth))]
#[post("/Create")]
pub async fn create_department(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<CreateNamedRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    request.validate()?;

    let department = store.create_department(request.name.trim()).await?;
    Ok(HttpResponse::Created().json(AppSuccessResponse::new(department, "Department created successfully")))
}

#[get("/Index")]
pub async fn disciplines(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ANY)?;
    let disciplines = store.list_disciplines().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(disciplines, "Disciplines retrieved")))
}

#[tracing::instrument(name = "Create discipline", skip(store, auth))]
#[post("/Create")]
pub async fn create_discipline(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<CreateNamedRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    request.validate()?;

    let discipline = store.create_discipline(request.name.trim()).await?;
    Ok(HttpResponse::Created().json(AppSuccessResponse::new(discipline, "Discipline created successfully")))
}

#[tracing::instrument(name = "Create group", skip(store, auth))]
#[post("/Create")]
pub async fn create_group(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    request.validate()?;

    if !store.department_exists(request.department_id).await? {
        return Err(AppError::validation("Department does not exist"));
    }

    let group = store.create_group(&request).await?;
    Ok(HttpResponse::Created().json(AppSuccessResponse::new(group, "Group created successfully")))
}
