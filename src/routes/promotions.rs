use actix_web::{get, post, web, HttpResponse};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::news::{NewPromotion, PromotionPayload};

const DEFAULT_PROMOTION_DAYS: i64 = 30;

#[tracing::instrument(name = "Promotions administration", skip(store, auth))]
#[get("/Admin")]
pub async fn promotions_admin(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    let promotions = store.list_promotions().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotions, "Promotions retrieved")))
}

/// Without explicit dates a promotion runs for thirty days from now.
#[tracing::instrument(name = "Create promotion", skip(store, auth, payload))]
#[post("/Create")]
pub async fn create_promotion(
    store: web::Data<Store>,
    auth: AuthContext,
    payload: web::Json<PromotionPayload>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    payload.validate()?;

    let now = Utc::now().naive_utc();
    let payload = payload.into_inner();
    let start_date = payload.start_date.unwrap_or(now);
    let end_date = payload
        .end_date
        .unwrap_or(now + Duration::days(DEFAULT_PROMOTION_DAYS));
    if end_date < start_date {
        return Err(AppError::validation("End date must not precede start date"));
    }

    let promotion = store
        .create_promotion(&NewPromotion {
            title: payload.title,
            description: payload.description,
            start_date,
            end_date,
            image_url: payload.image_url,
            is_active: payload.is_active.unwrap_or(true),
            discount: payload.discount,
        })
        .await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(promotion, "Promotion created successfully")))
}

#[get("/Edit/{id}")]
pub async fn edit_promotion_form(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let promotion = store
        .get_promotion(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotion, "Promotion retrieved")))
}

#[tracing::instrument(name = "Update promotion", skip(store, auth, payload))]
#[post("/Edit/{id}")]
pub async fn update_promotion(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
    payload: web::Json<PromotionPayload>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    payload.validate()?;

    let mut promotion = store
        .get_promotion(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    let payload = payload.into_inner();
    promotion.title = payload.title;
    promotion.description = payload.description;
    promotion.start_date = payload.start_date.unwrap_or(promotion.start_date);
    promotion.end_date = payload.end_date.unwrap_or(promotion.end_date);
    promotion.image_url = payload.image_url;
    promotion.is_active = payload.is_active.unwrap_or(promotion.is_active);
    promotion.discount = payload.discount;
    if promotion.end_date < promotion.start_date {
        return Err(AppError::validation("End date must not precede start date"));
    }

    if !store.update_promotion(&promotion).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotion, "Promotion updated successfully")))
}

#[tracing::instrument(name = "Delete promotion", skip(store, auth))]
#[post("/Delete/{id}")]
pub async fn delete_promotion(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let id = id.into_inner();
    if !store.delete_promotion(id).await? {
        tracing::debug!(promotion_id = id, "promotion was already deleted");
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Promotion deleted successfully")))
}

#[tracing::instrument(name = "Toggle promotion", skip(store, auth))]
#[post("/ToggleActive/{id}")]
pub async fn toggle_active(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let mut promotion = store
        .get_promotion(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    promotion.is_active = !promotion.is_active;
    store.update_promotion(&promotion).await?;

    let message = if promotion.is_active {
        "Promotion activated"
    } else {
        "Promotion deactivated"
    };
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotion, message)))
}
