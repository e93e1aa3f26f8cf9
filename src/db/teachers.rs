use sqlx::{MySqlConnection, MySqlPool};

use super::memory::{ensure_referenced, Tables};
use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::search::like_pattern;
use crate::models::teachers::{
    AssignDisciplineRequest, TeacherDetails, TeacherDiscipline, TeacherDisciplineDetails,
    TeacherFilter,
};

const TEACHER_DETAILS_SELECT: &str = r#"
    SELECT t.id, t.department_id, t.name, t.second_name, t.patronymic, t.phone_number, t.login,
           d.name AS department_name
    FROM teachers t
    LEFT JOIN departments d ON d.id = t.department_id
"#;

const DUPLICATE_ASSIGNMENT: &str = "The teacher already teaches this discipline to this group";

impl Store {
    #[tracing::instrument(name = "List teachers", skip(self))]
    pub async fn list_teachers(&self, filter: &TeacherFilter) -> Result<Vec<TeacherDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_teachers(pool, filter).await,
            Store::Memory(memory) => memory.list_teachers(filter),
        }
    }

    pub async fn get_teacher(&self, id: i32) -> Result<Option<TeacherDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_teacher(pool, id).await,
            Store::Memory(memory) => memory.read(|tables| {
                tables
                    .teachers
                    .get(id)
                    .map(|teacher| tables.teacher_details(teacher))
            }),
        }
    }

    pub async fn teacher_disciplines(
        &self,
        teacher_id: i32,
    ) -> Result<Vec<TeacherDisciplineDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_teacher_disciplines(pool, teacher_id).await,
            Store::Memory(memory) => memory.teacher_disciplines(teacher_id),
        }
    }

    /// Rejects an assignment identical to an existing one.
    #[tracing::instrument(name = "Assign discipline", skip(self))]
    pub async fn assign_discipline(
        &self,
        request: &AssignDisciplineRequest,
    ) -> Result<TeacherDiscipline, AppError> {
        match self {
            Store::MySql(pool) => insert_teacher_discipline(pool, request).await,
            Store::Memory(memory) => memory.assign_discipline(request),
        }
    }

    pub async fn unassign_discipline(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query("DELETE FROM teacher_disciplines WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await
                    .map_err(AppError::db_error)?;
                Ok(result.rows_affected() > 0)
            }
            Store::Memory(memory) => {
                memory.transaction(|tables| Ok(tables.teacher_disciplines.remove(id).is_some()))
            }
        }
    }

    /// Deletes the teacher with their course materials, discipline
    /// assignments, user account, profile and material requests.
    #[tracing::instrument(name = "Delete teacher", skip(self))]
    pub async fn delete_teacher(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let mut tx = pool.begin().await.map_err(AppError::db_error)?;
                let deleted = delete_teacher_rows(&mut *tx, id).await?;
                tx.commit().await.map_err(AppError::db_error)?;
                Ok(deleted)
            }
            Store::Memory(memory) => memory.transaction(|tables| Ok(tables.delete_teacher_cascade(id))),
        }
    }
}

pub async fn fetch_teachers(
    pool: &MySqlPool,
    filter: &TeacherFilter,
) -> Result<Vec<TeacherDetails>, AppError> {
    let pattern = filter
        .search_string
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(like_pattern);
    let sql = format!(
        r#"{}
        WHERE (? IS NULL OR t.department_id = ?)
          AND (? IS NULL OR LOWER(CONCAT(COALESCE(t.second_name, ''), ' ', COALESCE(t.name, ''), ' ', COALESCE(t.patronymic, ''))) LIKE ?)
        ORDER BY t.second_name, t.name, t.id
        "#,
        TEACHER_DETAILS_SELECT
    );

    sqlx::query_as::<_, TeacherDetails>(&sql)
        .bind(filter.department_id)
        .bind(filter.department_id)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn fetch_teacher(pool: &MySqlPool, id: i32) -> Result<Option<TeacherDetails>, AppError> {
    sqlx::query_as::<_, TeacherDetails>(&format!("{} WHERE t.id = ?", TEACHER_DETAILS_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn fetch_teacher_disciplines(
    pool: &MySqlPool,
    teacher_id: i32,
) -> Result<Vec<TeacherDisciplineDetails>, AppError> {
    sqlx::query_as::<_, TeacherDisciplineDetails>(
        r#"
        SELECT td.id, td.teacher_id, td.discipline_id, td.group_id,
               ds.name AS discipline_name, g.number_group AS group_number
        FROM teacher_disciplines td
        LEFT JOIN disciplines ds ON ds.id = td.discipline_id
        LEFT JOIN student_groups g ON g.id = td.group_id
        WHERE td.teacher_id = ?
        ORDER BY ds.name, g.number_group, td.id
        "#,
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::db_error)
}

pub async fn insert_teacher_discipline(
    pool: &MySqlPool,
    request: &AssignDisciplineRequest,
) -> Result<TeacherDiscipline, AppError> {
    let mut tx = pool.begin().await.map_err(AppError::db_error)?;

    let existing: Option<i32> = sqlx::query_scalar(
        r#"
        SELECT id FROM teacher_disciplines
        WHERE teacher_id = ? AND discipline_id = ? AND group_id <=> ?
        FOR UPDATE
        "#,
    )
    .bind(request.teacher_id)
    .bind(request.discipline_id)
    .bind(request.group_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(AppError::db_error)?;

    if existing.is_some() {
        return Err(AppError::validation(DUPLICATE_ASSIGNMENT));
    }

    let result = sqlx::query(
        "INSERT INTO teacher_disciplines (teacher_id, discipline_id, group_id) VALUES (?, ?, ?)",
    )
    .bind(request.teacher_id)
    .bind(request.discipline_id)
    .bind(request.group_id)
    .execute(&mut *tx)
    .await
    .map_err(AppError::db_error)?;

    tx.commit().await.map_err(AppError::db_error)?;

    Ok(TeacherDiscipline {
        id: result.last_insert_id() as i32,
        teacher_id: request.teacher_id,
        discipline_id: request.discipline_id,
        group_id: request.group_id,
    })
}

/// Runs inside the caller's transaction.
pub(crate) async fn delete_teacher_rows(conn: &mut MySqlConnection, id: i32) -> Result<bool, AppError> {
    let statements = [
        "DELETE FROM course_materials WHERE teacher_id = ?",
        "DELETE FROM teacher_disciplines WHERE teacher_id = ?",
        "DELETE FROM material_requests WHERE user_id IN (SELECT id FROM users WHERE teacher_id = ?)",
        "DELETE FROM user_profiles WHERE user_id IN (SELECT id FROM users WHERE teacher_id = ?)",
        "DELETE FROM users WHERE teacher_id = ?",
    ];
    for statement in statements {
        sqlx::query(statement)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::db_error)?;
    }

    let result = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::db_error)?;

    Ok(result.rows_affected() > 0)
}

impl Tables {
    pub(crate) fn delete_teacher_cascade(&mut self, id: i32) -> bool {
        self.course_materials.retain(|material| material.teacher_id != id);
        self.teacher_disciplines
            .retain(|assignment| assignment.teacher_id != id);

        let user_ids: Vec<i32> = self
            .users
            .values()
            .filter(|user| user.teacher_id == Some(id))
            .map(|user| user.id)
            .collect();
        for user_id in user_ids {
            self.delete_user_rows(user_id);
        }
        self.teachers.remove(id).is_some()
    }
}

impl MemoryStore {
    fn list_teachers(&self, filter: &TeacherFilter) -> Result<Vec<TeacherDetails>, AppError> {
        self.read(|tables| {
            let mut teachers: Vec<TeacherDetails> = tables
                .teachers
                .values()
                .map(|teacher| tables.teacher_details(teacher))
                .filter(|details| filter.matches(details))
                .collect();
            teachers.sort_by(|a, b| {
                (&a.teacher.second_name, &a.teacher.name, a.teacher.id).cmp(&(
                    &b.teacher.second_name,
                    &b.teacher.name,
                    b.teacher.id,
                ))
            });
            teachers
        })
    }

    fn teacher_disciplines(&self, teacher_id: i32) -> Result<Vec<TeacherDisciplineDetails>, AppError> {
        self.read(|tables| {
            let mut assignments: Vec<TeacherDisciplineDetails> = tables
                .teacher_disciplines
                .values()
                .filter(|assignment| assignment.teacher_id == teacher_id)
                .map(|assignment| tables.teacher_discipline_details(assignment))
                .collect();
            assignments.sort_by(|a, b| {
                (&a.discipline_name, a.group_number, a.assignment.id).cmp(&(
                    &b.discipline_name,
                    b.group_number,
                    b.assignment.id,
                ))
            });
            assignments
        })
    }

    fn assign_discipline(&self, request: &AssignDisciplineRequest) -> Result<TeacherDiscipline, AppError> {
        self.transaction(|tables| {
            ensure_referenced(tables.teachers.contains(request.teacher_id), "teacher")?;
            ensure_referenced(tables.disciplines.contains(request.discipline_id), "discipline")?;
            if let Some(group_id) = request.group_id {
                ensure_referenced(tables.student_groups.contains(group_id), "group")?;
            }

            let duplicate = tables.teacher_disciplines.values().any(|assignment| {
                assignment.teacher_id == request.teacher_id
                    && assignment.discipline_id == request.discipline_id
                    && assignment.group_id == request.group_id
            });
            if duplicate {
                return Err(AppError::validation(DUPLICATE_ASSIGNMENT));
            }

            Ok(tables.teacher_disciplines.insert_with(|id| TeacherDiscipline {
                id,
                teacher_id: request.teacher_id,
                discipline_id: request.discipline_id,
                group_id: request.group_id,
            }))
        })
    }
}
