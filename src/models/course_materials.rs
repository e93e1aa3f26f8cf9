use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::reference::{Discipline, GroupDetails};
use super::teachers::{TeacherDiscipline, TeacherDisciplineDetails};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CourseMaterial {
    pub id: i32,
    pub teacher_id: i32,
    pub group_id: i32,
    pub discipline_id: i32,
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CourseMaterialDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub material: CourseMaterial,
    pub teacher_name: Option<String>,
    pub discipline_name: Option<String>,
    pub group_number: Option<i32>,
}

#[derive(Validate, Deserialize, Serialize, Debug, Clone)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(max = 500, message = "File URL must be at most 500 characters"))]
    pub file_url: Option<String>,
    pub discipline_id: i32,
    pub group_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewCourseMaterial {
    pub teacher_id: i32,
    pub group_id: i32,
    pub discipline_id: i32,
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFilter {
    pub discipline_id: Option<i32>,
}

/// True when one of the teacher's assignments authorizes publishing for the
/// (discipline, group) pair.
pub fn may_publish(assignments: &[TeacherDiscipline], discipline_id: i32, group_id: i32) -> bool {
    assignments
        .iter()
        .any(|assignment| assignment.covers(discipline_id, group_id))
}

#[derive(Debug, Serialize)]
pub struct GroupMaterials {
    pub materials: Vec<CourseMaterialDetails>,
    pub disciplines: Vec<Discipline>,
    pub selected_discipline_id: Option<i32>,
}

/// Data a teacher needs to fill in the material form.
#[derive(Debug, Serialize)]
pub struct MaterialForm {
    pub teacher_disciplines: Vec<TeacherDisciplineDetails>,
    pub groups: Vec<GroupDetails>,
}
