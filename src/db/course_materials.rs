use sqlx::MySqlPool;

use super::memory::ensure_referenced;
use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::course_materials::{CourseMaterial, CourseMaterialDetails, NewCourseMaterial};
use crate::models::reference::Discipline;

const MATERIAL_DETAILS_SELECT: &str = r#"
    SELECT m.id, m.teacher_id, m.group_id, m.discipline_id, m.title, m.description,
           m.file_url, m.created_date,
           TRIM(CONCAT(COALESCE(t.second_name, ''), ' ', COALESCE(t.name, ''))) AS teacher_name,
           ds.name AS discipline_name,
           g.number_group AS group_number
    FROM course_materials m
    LEFT JOIN teachers t ON t.id = m.teacher_id
    LEFT JOIN disciplines ds ON ds.id = m.discipline_id
    LEFT JOIN student_groups g ON g.id = m.group_id
"#;

impl Store {
    #[tracing::instrument(name = "Create course material", skip(self, material), fields(teacher_id = material.teacher_id))]
    pub async fn create_material(&self, material: &NewCourseMaterial) -> Result<CourseMaterial, AppError> {
        match self {
            Store::MySql(pool) => insert_material(pool, material).await,
            Store::Memory(memory) => memory.create_material(material),
        }
    }

    pub async fn get_material(&self, id: i32) -> Result<Option<CourseMaterialDetails>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, CourseMaterialDetails>(&format!(
                    "{} WHERE m.id = ?",
                    MATERIAL_DETAILS_SELECT
                ))
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| {
                tables
                    .course_materials
                    .get(id)
                    .map(|material| tables.material_details(material))
            }),
        }
    }

    /// Newest first.
    pub async fn list_group_materials(
        &self,
        group_id: i32,
        discipline_id: Option<i32>,
    ) -> Result<Vec<CourseMaterialDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_group_materials(pool, group_id, discipline_id).await,
            Store::Memory(memory) => memory.list_materials(|material| {
                material.group_id == group_id
                    && discipline_id.map_or(true, |id| material.discipline_id == id)
            }),
        }
    }

    /// Disciplines that have at least one material for the group.
    pub async fn group_material_disciplines(&self, group_id: i32) -> Result<Vec<Discipline>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, Discipline>(
                    r#"
                    SELECT DISTINCT ds.id, ds.name
                    FROM disciplines ds
                    JOIN course_materials m ON m.discipline_id = ds.id
                    WHERE m.group_id = ?
                    ORDER BY ds.name, ds.id
                    "#,
                )
                .bind(group_id)
                .fetch_all(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| {
                let mut disciplines: Vec<Discipline> = tables
                    .disciplines
                    .values()
                    .filter(|discipline| {
                        tables.course_materials.values().any(|material| {
                            material.group_id == group_id && material.discipline_id == discipline.id
                        })
                    })
                    .cloned()
                    .collect();
                disciplines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                disciplines
            }),
        }
    }

    /// Newest first.
    pub async fn list_teacher_materials(
        &self,
        teacher_id: i32,
    ) -> Result<Vec<CourseMaterialDetails>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, CourseMaterialDetails>(&format!(
                    "{} WHERE m.teacher_id = ? ORDER BY m.created_date DESC, m.id DESC",
                    MATERIAL_DETAILS_SELECT
                ))
                .bind(teacher_id)
                .fetch_all(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.list_materials(|material| material.teacher_id == teacher_id),
        }
    }

    pub async fn delete_material(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query("DELETE FROM course_materials WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await
                    .map_err(AppError::db_error)?;
                Ok(result.rows_affected() > 0)
            }
            Store::Memory(memory) => {
                memory.transaction(|tables| Ok(tables.course_materials.remove(id).is_some()))
            }
        }
    }
}

pub async fn insert_material(
    pool: &MySqlPool,
    material: &NewCourseMaterial,
) -> Result<CourseMaterial, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO course_materials (teacher_id, group_id, discipline_id, title, description, file_url, created_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(material.teacher_id)
    .bind(material.group_id)
    .bind(material.discipline_id)
    .bind(&material.title)
    .bind(&material.description)
    .bind(&material.file_url)
    .bind(material.created_date)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    Ok(CourseMaterial {
        id: result.last_insert_id() as i32,
        teacher_id: material.teacher_id,
        group_id: material.group_id,
        discipline_id: material.discipline_id,
        title: material.title.clone(),
        description: material.description.clone(),
        file_url: material.file_url.clone(),
        created_date: material.created_date,
    })
}

pub async fn fetch_group_materials(
    pool: &MySqlPool,
    group_id: i32,
    discipline_id: Option<i32>,
) -> Result<Vec<CourseMaterialDetails>, AppError> {
    sqlx::query_as::<_, CourseMaterialDetails>(&format!(
        r#"{}
        WHERE m.group_id = ? AND (? IS NULL OR m.discipline_id = ?)
        ORDER BY m.created_date DESC, m.id DESC
        "#,
        MATERIAL_DETAILS_SELECT
    ))
    .bind(group_id)
    .bind(discipline_id)
    .bind(discipline_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::db_error)
}

impl MemoryStore {
    fn create_material(&self, material: &NewCourseMaterial) -> Result<CourseMaterial, AppError> {
        self.transaction(|tables| {
            ensure_referenced(tables.teachers.contains(material.teacher_id), "teacher")?;
            ensure_referenced(tables.student_groups.contains(material.group_id), "group")?;
            ensure_referenced(tables.disciplines.contains(material.discipline_id), "discipline")?;

            Ok(tables.course_materials.insert_with(|id| CourseMaterial {
                id,
                teacher_id: material.teacher_id,
                group_id: material.group_id,
                discipline_id: material.discipline_id,
                title: material.title.clone(),
                description: material.description.clone(),
                file_url: material.file_url.clone(),
                created_date: material.created_date,
            }))
        })
    }

    fn list_materials(
        &self,
        keep: impl Fn(&CourseMaterial) -> bool,
    ) -> Result<Vec<CourseMaterialDetails>, AppError> {
        self.read(|tables| {
            let mut materials: Vec<CourseMaterialDetails> = tables
                .course_materials
                .values()
                .filter(|material| keep(material))
                .map(|material| tables.material_details(material))
                .collect();
            materials.sort_by(|a, b| {
                b.material
                    .created_date
                    .cmp(&a.material.created_date)
                    .then(b.material.id.cmp(&a.material.id))
            });
            materials
        })
    }
}
