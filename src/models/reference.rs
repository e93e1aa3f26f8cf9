use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Department {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Discipline {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct StudentGroup {
    pub id: i32,
    pub department_id: Option<i32>,
    pub number_group: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub group: StudentGroup,
    pub department_name: Option<String>,
}

#[derive(Validate, Deserialize, Debug)]
pub struct CreateNamedRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1 to 50 characters"))]
    pub name: String,
}

#[derive(Validate, Deserialize, Debug)]
pub struct CreateGroupRequest {
    pub department_id: i32,
    #[validate(range(min = 1, message = "Group number must be positive"))]
    pub number_group: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct PortalCounts {
    pub students: i64,
    pub teachers: i64,
    pub groups: i64,
    pub departments: i64,
    pub disciplines: i64,
}

impl PortalCounts {
    /// True when no reference data has been created yet.
    pub fn is_empty(&self) -> bool {
        *self == PortalCounts::default()
    }
}
