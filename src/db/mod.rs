//! Persistence. Every operation exists twice: once over MySQL and once over
//! the in-process [`MemoryStore`]; [`Store`] dispatches between them. Both
//! backends keep the same invariants, and multi-step writes are atomic in
//! both.

use sqlx::MySqlPool;

use crate::core::AppError;

pub mod course_materials;
pub mod material_requests;
pub mod memory;
pub mod news;
pub mod reference;
pub mod students;
pub mod teachers;
pub mod users;

pub use memory::MemoryStore;

#[derive(Clone)]
pub enum Store {
    MySql(MySqlPool),
    Memory(MemoryStore),
}

impl Store {
    pub fn in_memory() -> Self {
        Store::Memory(MemoryStore::default())
    }

    /// Removes every row. Used before reseeding demo data.
    #[tracing::instrument(name = "Reset store", skip(self))]
    pub async fn reset(&self) -> Result<(), AppError> {
        match self {
            Store::MySql(pool) => reset_mysql(pool).await,
            Store::Memory(memory) => memory.reset(),
        }
    }
}

async fn reset_mysql(pool: &MySqlPool) -> Result<(), AppError> {
    // Children before parents so no foreign key is violated midway.
    const TABLES: [&str; 12] = [
        "material_requests",
        "course_materials",
        "teacher_disciplines",
        "user_profiles",
        "users",
        "students",
        "teachers",
        "student_groups",
        "departments",
        "disciplines",
        "news",
        "promotions",
    ];

    let mut tx = pool.begin().await.map_err(AppError::db_error)?;
    for table in TABLES {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await
            .map_err(AppError::db_error)?;
    }
    tx.commit().await.map_err(AppError::db_error)?;
    Ok(())
}
