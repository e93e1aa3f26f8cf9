use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::material_requests::{
    CreateMaterialRequestPayload, RequestStatus, UpdateStatusRequest,
};
use crate::models::users::Role;

#[tracing::instrument(name = "Create material request", skip(store, auth, payload))]
#[post("/Create")]
pub async fn create_request(
    store: web::Data<Store>,
    auth: AuthContext,
    payload: web::Json<CreateMaterialRequestPayload>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;
    payload.validate()?;

    let request = store
        .create_request(identity.user_id, &payload, Utc::now().naive_utc())
        .await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(request, "Request submitted successfully")))
}

#[tracing::instrument(name = "My material requests", skip(store, auth))]
#[get("/MyRequests")]
pub async fn my_requests(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;
    let requests = store.list_user_requests(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(requests, "Requests retrieved")))
}

#[tracing::instrument(name = "Material request details", skip(store, auth))]
#[get("/Details/{id}")]
pub async fn request_details(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;

    let request = store
        .get_request(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    if identity.role != Role::Admin && request.user_id != identity.user_id {
        return Err(AppError::access_denied());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(request, "Request retrieved")))
}

#[tracing::instrument(name = "All material requests", skip(store, auth))]
#[get("/Admin")]
pub async fn all_requests(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    let requests = store.list_all_requests().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(requests, "Requests retrieved")))
}

#[tracing::instrument(name = "Update material request status", skip(store, auth))]
#[post("/UpdateStatus/{id}")]
pub async fn update_request_status(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
    payload: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    payload.validate()?;

    let status: RequestStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::validation("Invalid status"))?;

    let mut request = store
        .get_request(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    let payload = payload.into_inner();
    request
        .transition(status, payload.comment, Utc::now().naive_utc())
        .map_err(AppError::validation)?;
    store.save_request_status(&request).await?;

    tracing::info!(request_id = request.id, status = %request.status, "material request status changed");

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(request, "Request status updated")))
}
