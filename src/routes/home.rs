use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;

use super::{linked_student, linked_teacher};
use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext, PasswordHashing};
use crate::db::Store;
use crate::models::home::{
    AdminDashboard, HomeIndex, SearchQuery, SearchResults, StudentDashboard, TeacherDashboard,
    LATEST_NEWS_ON_INDEX, PROMOTIONS_ON_INDEX,
};
use crate::models::material_requests::RequestStatus;
use crate::seed::{reset_and_seed, SeedSettings};

#[tracing::instrument(name = "Home index", skip(store))]
#[get("/Index")]
pub async fn home_index(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let now = Utc::now().naive_utc();

    let index = HomeIndex {
        counts: store.portal_counts().await?,
        latest_news: store.list_published_news(Some(LATEST_NEWS_ON_INDEX)).await?,
        active_promotions: store
            .list_visible_promotions(now, Some(PROMOTIONS_ON_INDEX))
            .await?,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(index, "Home page retrieved")))
}

#[get("/News")]
pub async fn public_news(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let news = store.list_published_news(None).await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, "News retrieved")))
}

#[get("/NewsDetails/{id}")]
pub async fn news_details(store: web::Data<Store>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let news = store
        .get_news(id.into_inner())
        .await?
        .filter(|news| news.is_publicly_visible())
        .ok_or_else(AppError::not_found)?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(news, "News retrieved")))
}

#[get("/Promotions")]
pub async fn public_promotions(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let promotions = store
        .list_visible_promotions(Utc::now().naive_utc(), None)
        .await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotions, "Promotions retrieved")))
}

#[get("/PromotionDetails/{id}")]
pub async fn promotion_details(
    store: web::Data<Store>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let now = Utc::now().naive_utc();
    let promotion = store
        .get_promotion(id.into_inner())
        .await?
        .filter(|promotion| promotion.is_publicly_visible(now))
        .ok_or_else(AppError::not_found)?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(promotion, "Promotion retrieved")))
}

#[tracing::instrument(name = "Public search", skip(store))]
#[get("/Search")]
pub async fn search(
    store: web::Data<Store>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let results = match query.term() {
        Some(term) => SearchResults {
            search_string: term.to_string(),
            news: store.search_published_news(term).await?,
            promotions: store
                .search_visible_promotions(term, Utc::now().naive_utc())
                .await?,
        },
        None => SearchResults::default(),
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(results, "Search completed")))
}

#[tracing::instrument(name = "Admin dashboard", skip(store, auth))]
#[get("/AdminDashboard")]
pub async fn admin_dashboard(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ADMIN)?;

    let pending_requests = store
        .list_all_requests()
        .await?
        .iter()
        .filter(|owned| owned.request.status == RequestStatus::Pending)
        .count();

    let dashboard = AdminDashboard {
        display_name: identity.display_name.clone(),
        counts: store.portal_counts().await?,
        pending_requests,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(dashboard, "Dashboard retrieved")))
}

#[tracing::instrument(name = "Teacher dashboard", skip(store, auth))]
#[get("/TeacherDashboard")]
pub async fn teacher_dashboard(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::TEACHER)?;
    let teacher = linked_teacher(&store, identity).await?;

    let dashboard = TeacherDashboard {
        disciplines: store.teacher_disciplines(teacher.teacher.id).await?,
        material_count: store.list_teacher_materials(teacher.teacher.id).await?.len(),
        teacher,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(dashboard, "Dashboard retrieved")))
}

#[tracing::instrument(name = "Student dashboard", skip(store, auth))]
#[get("/StudentDashboard")]
pub async fn student_dashboard(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::STUDENT)?;
    let student = linked_student(&store, identity).await?;

    let material_count = match student.student.group_id {
        Some(group_id) => store.list_group_materials(group_id, None).await?.len(),
        None => 0,
    };

    let dashboard = StudentDashboard {
        student,
        material_count,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(dashboard, "Dashboard retrieved")))
}

/// Drops every row and reseeds the demo data. Existing sessions survive but
/// may point at accounts that no longer exist.
#[tracing::instrument(name = "Initialize database", skip(store, hashing, settings, auth))]
#[post("/InitializeDatabase")]
pub async fn initialize_database(
    store: web::Data<Store>,
    hashing: web::Data<PasswordHashing>,
    settings: web::Data<SeedSettings>,
    auth: AuthContext,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;

    let resettable = settings.allow_reset || matches!(store.get_ref(), Store::Memory(_));
    if !resettable {
        return Err(AppError::validation("Database reset is disabled in this environment"));
    }

    reset_and_seed(&store, &hashing, &settings.default_password).await?;
    tracing::warn!("database was reset to demo data");

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Database initialized with demo data")))
}
