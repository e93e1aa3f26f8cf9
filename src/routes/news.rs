use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::news::{NewNews, NewsPayload};

#[tracing::instrument(name = "News administration", skip(store, auth))]
#[get("/Admin")]
pub async fn news_admin(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    let news = store.list_news().await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, "News retrieved")))
}

/// Items are published unless the payload says otherwise and are signed
/// with the author's display name.
#[tracing::instrument(name = "Create news", skip(store, auth, payload))]
#[post("/Create")]
pub async fn create_news(
    store: web::Data<Store>,
    auth: AuthContext,
    payload: web::Json<NewsPayload>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ADMIN)?;
    payload.validate()?;

    let now = Utc::now().naive_utc();
    let payload = payload.into_inner();
    let news = store
        .create_news(&NewNews {
            title: payload.title,
            content: payload.content,
            image_url: payload.image_url,
            created_date: now,
            publish_date: Some(payload.publish_date.unwrap_or(now)),
            is_published: payload.is_published.unwrap_or(true),
            author: Some(identity.display_name.clone()),
        })
        .await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(news, "News created successfully")))
}

#[get("/Edit/{id}")]
pub async fn edit_news_form(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let news = store
        .get_news(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, "News retrieved")))
}

#[tracing::instrument(name = "Update news", skip(store, auth, payload))]
#[post("/Edit/{id}")]
pub async fn update_news(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
    payload: web::Json<NewsPayload>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    payload.validate()?;

    let mut news = store
        .get_news(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    let payload = payload.into_inner();
    news.title = payload.title;
    news.content = payload.content;
    news.image_url = payload.image_url;
    news.is_published = payload.is_published.unwrap_or(news.is_published);
    news.publish_date = payload.publish_date.or(news.publish_date);

    if !store.update_news(&news).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, "News updated successfully")))
}

/// Deleting an item that is already gone still succeeds.
#[tracing::instrument(name = "Delete news", skip(store, auth))]
#[post("/Delete/{id}")]
pub async fn delete_news(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let id = id.into_inner();
    if !store.delete_news(id).await? {
        tracing::debug!(news_id = id, "news item was already deleted");
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "News deleted successfully")))
}

#[tracing::instrument(name = "Toggle news publication", skip(store, auth))]
#[post("/TogglePublish/{id}")]
pub async fn toggle_publish(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let mut news = store
        .get_news(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    news.is_published = !news.is_published;
    if news.is_published && news.publish_date.is_none() {
        news.publish_date = Some(Utc::now().naive_utc());
    }
    store.update_news(&news).await?;

    let message = if news.is_published {
        "News published"
    } else {
        "News unpublished"
    };
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, message)))
}
