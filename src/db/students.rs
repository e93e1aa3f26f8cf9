use sqlx::{MySqlConnection, MySqlPool};

use super::memory::Tables;
use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::search::like_pattern;
use crate::models::students::{StudentDetails, StudentFilter};

const STUDENT_DETAILS_SELECT: &str = r#"
    SELECT s.id, s.group_id, s.name, s.second_name, s.patronymic, s.phone_number,
           s.date_birthday, s.login,
           g.number_group AS group_number, g.department_id AS department_id,
           d.name AS department_name
    FROM students s
    LEFT JOIN student_groups g ON g.id = s.group_id
    LEFT JOIN departments d ON d.id = g.department_id
"#;

impl Store {
    #[tracing::instrument(name = "List students", skip(self))]
    pub async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<StudentDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_students(pool, filter).await,
            Store::Memory(memory) => memory.list_students(filter),
        }
    }

    pub async fn get_student(&self, id: i32) -> Result<Option<StudentDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_student(pool, id).await,
            Store::Memory(memory) => memory.read(|tables| {
                tables
                    .students
                    .get(id)
                    .map(|student| tables.student_details(student))
            }),
        }
    }

    /// Deletes the student with its user account, profile and material
    /// requests. Returns false when there is no such student.
    #[tracing::instrument(name = "Delete student", skip(self))]
    pub async fn delete_student(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let mut tx = pool.begin().await.map_err(AppError::db_error)?;
                let deleted = delete_student_rows(&mut *tx, id).await?;
                tx.commit().await.map_err(AppError::db_error)?;
                Ok(deleted)
            }
            Store::Memory(memory) => memory.transaction(|tables| Ok(tables.delete_student_cascade(id))),
        }
    }
}

pub async fn fetch_students(
    pool: &MySqlPool,
    filter: &StudentFilter,
) -> Result<Vec<StudentDetails>, AppError> {
    let pattern = filter.search_term().map(like_pattern);
    let sql = format!(
        r#"{}
        WHERE (? IS NULL OR s.group_id = ?)
          AND (? IS NULL OR g.department_id = ?)
          AND (? IS NULL OR LOWER(CONCAT(COALESCE(s.second_name, ''), ' ', COALESCE(s.name, ''), ' ', COALESCE(s.patronymic, ''))) LIKE ?)
        ORDER BY s.second_name, s.name, s.id
        "#,
        STUDENT_DETAILS_SELECT
    );

    sqlx::query_as::<_, StudentDetails>(&sql)
        .bind(filter.group_id)
        .bind(filter.group_id)
        .bind(filter.department_id)
        .bind(filter.department_id)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn fetch_student(pool: &MySqlPool, id: i32) -> Result<Option<StudentDetails>, AppError> {
    sqlx::query_as::<_, StudentDetails>(&format!("{} WHERE s.id = ?", STUDENT_DETAILS_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)
}

/// Runs inside the caller's transaction.
pub(crate) async fn delete_student_rows(conn: &mut MySqlConnection, id: i32) -> Result<bool, AppError> {
    sqlx::query(
        "DELETE FROM material_requests WHERE user_id IN (SELECT id FROM users WHERE student_id = ?)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(AppError::db_error)?;

    sqlx::query("DELETE FROM user_profiles WHERE user_id IN (SELECT id FROM users WHERE student_id = ?)")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::db_error)?;

    sqlx::query("DELETE FROM users WHERE student_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::db_error)?;

    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::db_error)?;

    Ok(result.rows_affected() > 0)
}

impl Tables {
    /// Removes a user with its profile and material requests.
    pub(crate) fn delete_user_rows(&mut self, user_id: i32) -> bool {
        self.material_requests.retain(|request| request.user_id != user_id);
        self.user_profiles.retain(|profile| profile.user_id != user_id);
        self.users.remove(user_id).is_some()
    }

    pub(crate) fn delete_student_cascade(&mut self, id: i32) -> bool {
        let user_ids: Vec<i32> = self
            .users
            .values()
            .filter(|user| user.student_id == Some(id))
            .map(|user| user.id)
            .collect();
        for user_id in user_ids {
            self.delete_user_rows(user_id);
        }
        self.students.remove(id).is_some()
    }
}

impl MemoryStore {
    fn list_students(&self, filter: &StudentFilter) -> Result<Vec<StudentDetails>, AppError> {
        self.read(|tables| {
            let mut students: Vec<StudentDetails> = tables
                .students
                .values()
                .map(|student| tables.student_details(student))
                .filter(|details| filter.matches(details))
                .collect();
            students.sort_by(|a, b| {
                (&a.student.second_name, &a.student.name, a.student.id).cmp(&(
                    &b.student.second_name,
                    &b.student.name,
                    b.student.id,
                ))
            });
            students
        })
    }
}
