use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::core::auth::authenticate;
use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext, PasswordHashing, SessionStore};
use crate::db::Store;
use crate::models::users::{
    AccountProfile, LoginRequest, LoginResponse, NewAccount, RegisterRequest, Role, SessionInfo,
    UpdateProfileRequest,
};

#[tracing::instrument(name = "Login", skip(store, sessions, request), fields(login = %request.login))]
#[post("/Login")]
pub async fn login(
    store: web::Data<Store>,
    sessions: web::Data<SessionStore>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let identity = authenticate(&store, &request.login, &request.password)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid login or password"))?;

    let token = sessions.create(&identity).await?;
    tracing::info!(user_id = identity.user_id, role = %identity.role, "user logged in");

    let response = LoginResponse {
        token: token.clone(),
        user_id: identity.user_id,
        role: identity.role,
        display_name: identity.display_name,
        redirect: identity.role.dashboard_path(),
    };

    Ok(HttpResponse::Ok()
        .cookie(sessions.cookie(&token))
        .json(AppSuccessResponse::new(response, "Login successful")))
}

#[tracing::instrument(name = "Logout", skip(sessions, auth))]
#[post("/Logout")]
pub async fn logout(
    sessions: web::Data<SessionStore>,
    auth: AuthContext,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = auth.token() {
        sessions.destroy(token).await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(sessions.removal_cookie())
        .json(AppSuccessResponse::new((), "Logged out")))
}

#[get("/Session")]
pub async fn session_info(auth: AuthContext) -> Result<HttpResponse, AppError> {
    let info = SessionInfo {
        is_authenticated: auth.is_authenticated(),
        user_id: auth.user_id(),
        role: auth.role(),
        display_name: auth.display_name().to_string(),
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(info, "Session retrieved")))
}

#[get("/AccessDenied")]
pub async fn access_denied() -> Result<HttpResponse, AppError> {
    Err(AppError::access_denied())
}

/// Anonymous callers may only sign themselves up as students; an
/// administrator may also create teacher accounts.
#[tracing::instrument(name = "Register account", skip(store, hashing, auth, request), fields(login = %request.login))]
#[post("/Register")]
pub async fn register(
    store: web::Data<Store>,
    hashing: web::Data<PasswordHashing>,
    auth: AuthContext,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();

    let may_register = match (auth.role(), request.role) {
        (_, Role::Student) => true,
        (Some(Role::Admin), Role::Teacher) => true,
        _ => false,
    };
    if !may_register {
        return Err(AppError::access_denied());
    }

    request.validate()?;

    match request.role {
        Role::Student => {
            if let Some(group_id) = request.group_id {
                if !store.group_exists(group_id).await? {
                    return Err(AppError::validation("Group does not exist"));
                }
            }
        }
        Role::Teacher => {
            if let Some(department_id) = request.department_id {
                if !store.department_exists(department_id).await? {
                    return Err(AppError::validation("Department does not exist"));
                }
            }
        }
        Role::Admin => {}
    }

    if store.login_exists(request.login.trim()).await? {
        return Err(AppError::validation("This login is already taken"));
    }

    let password_hash = hashing.hash(&request.password)?;
    let account = NewAccount::from_request(&request, password_hash, Utc::now().naive_utc());
    let user = store.create_account(&account).await?;

    tracing::info!(user_id = user.id, role = %user.role, "account registered");

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(user, "Account registered successfully")))
}

#[tracing::instrument(name = "Get profile", skip(store, auth))]
#[get("/Profile")]
pub async fn get_profile(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;

    let user = store
        .get_user(identity.user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let student = match user.student_id {
        Some(id) => store.get_student(id).await?,
        None => None,
    };
    let teacher = match user.teacher_id {
        Some(id) => store.get_teacher(id).await?,
        None => None,
    };
    let profile = store.get_profile(user.id).await?;

    let account = AccountProfile {
        user,
        student,
        teacher,
        profile,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(account, "Profile retrieved")))
}

#[tracing::instrument(name = "Update profile", skip(store, auth, request))]
#[post("/Profile")]
pub async fn update_profile(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;
    request.validate()?;

    let profile = store
        .upsert_profile(identity.user_id, &request, Utc::now().naive_utc())
        .await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(profile, "Profile updated successfully")))
}

#[tracing::instrument(name = "Delete account", skip(store, auth))]
#[post("/Delete/{user_id}")]
pub async fn delete_account(
    store: web::Data<Store>,
    auth: AuthContext,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    auth.require(AllowedRoles::ADMIN)?;
    let user_id = user_id.into_inner();

    let user = store.get_user(user_id).await?.ok_or_else(AppError::not_found)?;
    if user.role == Role::Admin {
        return Err(AppError::validation("Administrator accounts cannot be deleted"));
    }

    if !store.delete_account(user_id).await? {
        return Err(AppError::not_found());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Account deleted successfully")))
}
