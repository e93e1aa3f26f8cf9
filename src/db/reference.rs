use sqlx::MySqlPool;

use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::reference::{
    CreateGroupRequest, Department, Discipline, GroupDetails, PortalCounts, StudentGroup,
};

impl Store {
    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        match self {
            Store::MySql(pool) => fetch_departments(pool).await,
            Store::Memory(memory) => memory.list_departments(),
        }
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        match self {
            Store::MySql(pool) => insert_department(pool, name).await,
            Store::Memory(memory) => memory.create_department(name),
        }
    }

    pub async fn department_exists(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => row_exists(pool, "departments", id).await,
            Store::Memory(memory) => memory.read(|tables| tables.departments.contains(id)),
        }
    }

    pub async fn list_disciplines(&self) -> Result<Vec<Discipline>, AppError> {
        match self {
            Store::MySql(pool) => fetch_disciplines(pool).await,
            Store::Memory(memory) => memory.list_disciplines(),
        }
    }

    pub async fn create_discipline(&self, name: &str) -> Result<Discipline, AppError> {
        match self {
            Store::MySql(pool) => insert_discipline(pool, name).await,
            Store::Memory(memory) => memory.create_discipline(name),
        }
    }

    pub async fn discipline_exists(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => row_exists(pool, "disciplines", id).await,
            Store::Memory(memory) => memory.read(|tables| tables.disciplines.contains(id)),
        }
    }

    /// Groups with their department name, ordered by group number.
    pub async fn list_groups(&self) -> Result<Vec<GroupDetails>, AppError> {
        match self {
            Store::MySql(pool) => fetch_groups(pool).await,
            Store::Memory(memory) => memory.list_groups(),
        }
    }

    pub async fn create_group(&self, request: &CreateGroupRequest) -> Result<StudentGroup, AppError> {
        match self {
            Store::MySql(pool) => insert_group(pool, request).await,
            Store::Memory(memory) => memory.create_group(request),
        }
    }

    pub async fn group_exists(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => row_exists(pool, "student_groups", id).await,
            Store::Memory(memory) => memory.read(|tables| tables.student_groups.contains(id)),
        }
    }

    pub async fn portal_counts(&self) -> Result<PortalCounts, AppError> {
        match self {
            Store::MySql(pool) => fetch_portal_counts(pool).await,
            Store::Memory(memory) => memory.read(|tables| PortalCounts {
                students: tables.students.len() as i64,
                teachers: tables.teachers.len() as i64,
                groups: tables.student_groups.len() as i64,
                departments: tables.departments.len() as i64,
                disciplines: tables.disciplines.len() as i64,
            }),
        }
    }
}

/// `table` is always one of our own table names, never user input.
pub(crate) async fn row_exists(pool: &MySqlPool, table: &str, id: i32) -> Result<bool, AppError> {
    let found: Option<i32> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(found.is_some())
}

pub async fn fetch_departments(pool: &MySqlPool) -> Result<Vec<Department>, AppError> {
    sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn insert_department(pool: &MySqlPool, name: &str) -> Result<Department, AppError> {
    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(Department {
        id: result.last_insert_id() as i32,
        name: Some(name.to_string()),
    })
}

pub async fn fetch_disciplines(pool: &MySqlPool) -> Result<Vec<Discipline>, AppError> {
    sqlx::query_as::<_, Discipline>("SELECT id, name FROM disciplines ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn insert_discipline(pool: &MySqlPool, name: &str) -> Result<Discipline, AppError> {
    let result = sqlx::query("INSERT INTO disciplines (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(Discipline {
        id: result.last_insert_id() as i32,
        name: Some(name.to_string()),
    })
}

pub async fn fetch_groups(pool: &MySqlPool) -> Result<Vec<GroupDetails>, AppError> {
    sqlx::query_as::<_, GroupDetails>(
        r#"
        SELECT g.id, g.department_id, g.number_group, d.name AS department_name
        FROM student_groups g
        LEFT JOIN departments d ON d.id = g.department_id
        ORDER BY g.number_group, g.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::db_error)
}

pub async fn insert_group(
    pool: &MySqlPool,
    request: &CreateGroupRequest,
) -> Result<StudentGroup, AppError> {
    let result = sqlx::query("INSERT INTO student_groups (department_id, number_group) VALUES (?, ?)")
        .bind(request.department_id)
        .bind(request.number_group)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(StudentGroup {
        id: result.last_insert_id() as i32,
        department_id: Some(request.department_id),
        number_group: Some(request.number_group),
    })
}

pub async fn fetch_portal_counts(pool: &MySqlPool) -> Result<PortalCounts, AppError> {
    let (students, teachers, groups, departments, disciplines) =
        sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students),
                (SELECT COUNT(*) FROM teachers),
                (SELECT COUNT(*) FROM student_groups),
                (SELECT COUNT(*) FROM departments),
                (SELECT COUNT(*) FROM disciplines)
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(PortalCounts {
        students,
        teachers,
        groups,
        departments,
        disciplines,
    })
}

impl MemoryStore {
    fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        self.read(|tables| {
            let mut departments: Vec<Department> = tables.departments.values().cloned().collect();
            departments.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            departments
        })
    }

    fn create_department(&self, name: &str) -> Result<Department, AppError> {
        self.transaction(|tables| {
            Ok(tables.departments.insert_with(|id| Department {
                id,
                name: Some(name.to_string()),
            }))
        })
    }

    fn list_disciplines(&self) -> Result<Vec<Discipline>, AppError> {
        self.read(|tables| {
            let mut disciplines: Vec<Discipline> = tables.disciplines.values().cloned().collect();
            disciplines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            disciplines
        })
    }

    fn create_discipline(&self, name: &str) -> Result<Discipline, AppError> {
        self.transaction(|tables| {
            Ok(tables.disciplines.insert_with(|id| Discipline {
                id,
                name: Some(name.to_string()),
            }))
        })
    }

    fn list_groups(&self) -> Result<Vec<GroupDetails>, AppError> {
        self.read(|tables| {
            let mut groups: Vec<GroupDetails> = tables
                .student_groups
                .values()
                .map(|group| tables.group_details(group))
                .collect();
            groups.sort_by(|a, b| {
                a.group
                    .number_group
                    .cmp(&b.group.number_group)
                    .then(a.group.id.cmp(&b.group.id))
            });
            groups
        })
    }

    fn create_group(&self, request: &CreateGroupRequest) -> Result<StudentGroup, AppError> {
        self.transaction(|tables| {
            if !tables.departments.contains(request.department_id) {
                return Err(AppError::validation("Department does not exist"));
            }
            Ok(tables.student_groups.insert_with(|id| StudentGroup {
                id,
                department_id: Some(request.department_id),
                number_group: Some(request.number_group),
            }))
        })
    }
}
