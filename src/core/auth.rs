use actix_web::{dev::Payload, http, web, FromRequest, HttpRequest};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;

use super::password::verify_password;
use super::session::{Identity, SessionStore, SESSION_COOKIE};
use super::AppError;
use crate::db::Store;
use crate::models::users::{display_name, Role};

/// The set of roles an action admits. There is no hierarchy: an Admin is
/// not implicitly a Teacher.
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(&'static [Role]);

impl AllowedRoles {
    pub const ADMIN: AllowedRoles = AllowedRoles(&[Role::Admin]);
    pub const TEACHER: AllowedRoles = AllowedRoles(&[Role::Teacher]);
    pub const STUDENT: AllowedRoles = AllowedRoles(&[Role::Student]);
    pub const ADMIN_OR_TEACHER: AllowedRoles = AllowedRoles(&[Role::Admin, Role::Teacher]);
    pub const ANY: AllowedRoles = AllowedRoles(&[Role::Admin, Role::Teacher, Role::Student]);

    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Session state of the current request. Anonymous requests extract fine;
/// handlers decide with [`AuthContext::require`].
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
    identity: Option<Identity>,
}

impl AuthContext {
    pub fn new(token: Option<String>, identity: Option<Identity>) -> Self {
        Self { token, identity }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|identity| identity.role)
    }

    /// 0 when anonymous.
    pub fn user_id(&self) -> i32 {
        self.identity.as_ref().map_or(0, |identity| identity.user_id)
    }

    /// Empty when anonymous.
    pub fn display_name(&self) -> &str {
        self.identity
            .as_ref()
            .map_or("", |identity| identity.display_name.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn require(&self, allowed: AllowedRoles) -> Result<&Identity, AppError> {
        match &self.identity {
            Some(identity) if allowed.permits(identity.role) => Ok(identity),
            Some(identity) => {
                tracing::warn!(
                    user_id = identity.user_id,
                    role = %identity.role,
                    "role not allowed for this action"
                );
                Err(AppError::access_denied())
            }
            None => Err(AppError::access_denied()),
        }
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let sessions = req.app_data::<web::Data<SessionStore>>().cloned();
        let store = req.app_data::<web::Data<Store>>().cloned();

        Box::pin(async move {
            let sessions =
                sessions.ok_or_else(|| AppError::internal_error("session store is not configured"))?;
            let store = store.ok_or_else(|| AppError::internal_error("store is not configured"))?;
            let token = match token {
                Some(token) => token,
                None => return Ok(AuthContext::default()),
            };

            let identity = match sessions.load(&token).await? {
                Some(identity) => identity,
                None => return Ok(AuthContext::new(Some(token), None)),
            };

            // The account may have been deleted since the session was opened.
            if store.get_user(identity.user_id).await?.is_none() {
                tracing::info!(user_id = identity.user_id, "session of a deleted account ended");
                sessions.destroy(&token).await?;
                return Ok(AuthContext::new(Some(token), None));
            }

            Ok(AuthContext::new(Some(token), Some(identity)))
        })
    }
}

/// Checks the credentials and, on success, stamps the last login and
/// builds the identity to keep in the session.
#[tracing::instrument(name = "Authenticate user", skip(store, password))]
pub async fn authenticate(
    store: &Store,
    login: &str,
    password: &str,
) -> Result<Option<Identity>, AppError> {
    let user = match store.find_user_by_login(login.trim()).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    if !verify_password(password, &user.password_hash) {
        return Ok(None);
    }

    store
        .touch_last_login(user.id, Utc::now().naive_utc())
        .await?;

    let student = match user.student_id {
        Some(student_id) => store.get_student(student_id).await?,
        None => None,
    };
    let teacher = match user.teacher_id {
        Some(teacher_id) => store.get_teacher(teacher_id).await?,
        None => None,
    };

    Ok(Some(Identity {
        user_id: user.id,
        role: user.role,
        display_name: display_name(&user, student.as_ref(), teacher.as_ref()),
    }))
}
