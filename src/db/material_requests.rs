use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use super::memory::ensure_referenced;
use super::Store;
use crate::core::AppError;
use crate::models::material_requests::{
    CreateMaterialRequestPayload, MaterialRequest, MaterialRequestWithOwner, RequestStatus,
};

const REQUEST_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.title, r.description, r.material_type, r.status,
           r.created_date, r.processed_date, r.completed_date, r.admin_comment, r.file_url
    FROM material_requests r
"#;

impl Store {
    /// New requests always start as Pending.
    #[tracing::instrument(name = "Create material request", skip(self, payload))]
    pub async fn create_request(
        &self,
        user_id: i32,
        payload: &CreateMaterialRequestPayload,
        now: NaiveDateTime,
    ) -> Result<MaterialRequest, AppError> {
        let request = MaterialRequest {
            id: 0,
            user_id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            material_type: payload.material_type.clone(),
            status: RequestStatus::Pending,
            created_date: now,
            processed_date: None,
            completed_date: None,
            admin_comment: None,
            file_url: payload.file_url.clone(),
        };

        match self {
            Store::MySql(pool) => insert_request(pool, request).await,
            Store::Memory(memory) => memory.transaction(|tables| {
                ensure_referenced(tables.users.contains(user_id), "user")?;
                Ok(tables
                    .material_requests
                    .insert_with(|id| MaterialRequest { id, ..request }))
            }),
        }
    }

    pub async fn get_request(&self, id: i32) -> Result<Option<MaterialRequest>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, MaterialRequest>(&format!("{} WHERE r.id = ?", REQUEST_SELECT))
                    .bind(id)
                    .fetch_optional(pool)
                    .await
                    .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| tables.material_requests.get(id).cloned()),
        }
    }

    /// The user's own requests, newest first.
    pub async fn list_user_requests(&self, user_id: i32) -> Result<Vec<MaterialRequest>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, MaterialRequest>(&format!(
                    "{} WHERE r.user_id = ? ORDER BY r.created_date DESC, r.id DESC",
                    REQUEST_SELECT
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| {
                let mut requests: Vec<MaterialRequest> = tables
                    .material_requests
                    .values()
                    .filter(|request| request.user_id == user_id)
                    .cloned()
                    .collect();
                sort_newest_first(&mut requests, |request| request);
                requests
            }),
        }
    }

    /// Every request with its owner's login, newest first.
    pub async fn list_all_requests(&self) -> Result<Vec<MaterialRequestWithOwner>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, MaterialRequestWithOwner>(
                    r#"
                    SELECT r.id, r.user_id, r.title, r.description, r.material_type, r.status,
                           r.created_date, r.processed_date, r.completed_date, r.admin_comment,
                           r.file_url, u.login AS user_login
                    FROM material_requests r
                    LEFT JOIN users u ON u.id = r.user_id
                    ORDER BY r.created_date DESC, r.id DESC
                    "#,
                )
                .fetch_all(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| {
                let mut requests: Vec<MaterialRequestWithOwner> = tables
                    .material_requests
                    .values()
                    .map(|request| MaterialRequestWithOwner {
                        request: request.clone(),
                        user_login: tables.users.get(request.user_id).map(|user| user.login.clone()),
                    })
                    .collect();
                sort_newest_first(&mut requests, |owned| &owned.request);
                requests
            }),
        }
    }

    /// Persists status, comment and the lifecycle dates of `request`.
    pub async fn save_request_status(&self, request: &MaterialRequest) -> Result<(), AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query(
                    r#"
                    UPDATE material_requests
                    SET status = ?, admin_comment = ?, processed_date = ?, completed_date = ?
                    WHERE id = ?
                    "#,
                )
                .bind(request.status.as_str())
                .bind(&request.admin_comment)
                .bind(request.processed_date)
                .bind(request.completed_date)
                .bind(request.id)
                .execute(pool)
                .await
                .map_err(AppError::db_error)?;
                Ok(())
            }
            Store::Memory(memory) => memory.transaction(|tables| {
                let stored = tables
                    .material_requests
                    .get_mut(request.id)
                    .ok_or_else(AppError::not_found)?;
                stored.status = request.status;
                stored.admin_comment = request.admin_comment.clone();
                stored.processed_date = request.processed_date;
                stored.completed_date = request.completed_date;
                Ok(())
            }),
        }
    }
}

fn sort_newest_first<T>(rows: &mut [T], request: impl Fn(&T) -> &MaterialRequest) {
    rows.sort_by(|a, b| {
        let (a, b) = (request(a), request(b));
        b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id))
    });
}

pub async fn insert_request(
    pool: &MySqlPool,
    request: MaterialRequest,
) -> Result<MaterialRequest, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO material_requests (user_id, title, description, material_type, status, created_date, file_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(request.user_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.material_type)
    .bind(request.status.as_str())
    .bind(request.created_date)
    .bind(&request.file_url)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    Ok(MaterialRequest {
        id: result.last_insert_id() as i32,
        ..request
    })
}
