use serde::{Deserialize, Serialize};

use super::reference::Department;
use super::search::name_matches;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Teacher {
    pub id: i32,
    pub department_id: Option<i32>,
    pub name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub phone_number: Option<String>,
    pub login: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeacherDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub teacher: Teacher,
    pub department_name: Option<String>,
}

/// A teacher teaches a discipline, either for one group or, when `group_id`
/// is empty, for every group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct TeacherDiscipline {
    pub id: i32,
    pub teacher_id: i32,
    pub discipline_id: i32,
    pub group_id: Option<i32>,
}

impl TeacherDiscipline {
    pub fn covers(&self, discipline_id: i32, group_id: i32) -> bool {
        self.discipline_id == discipline_id
            && self.group_id.map_or(true, |scoped| scoped == group_id)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeacherDisciplineDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub assignment: TeacherDiscipline,
    pub discipline_name: Option<String>,
    pub group_number: Option<i32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherFilter {
    #[serde(alias = "departamentId")]
    pub department_id: Option<i32>,
    pub search_string: Option<String>,
}

impl TeacherFilter {
    pub fn matches(&self, details: &TeacherDetails) -> bool {
        if let Some(department_id) = self.department_id {
            if details.teacher.department_id != Some(department_id) {
                return false;
            }
        }
        match self
            .search_string
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            Some(term) => name_matches(
                term,
                details.teacher.second_name.as_deref(),
                details.teacher.name.as_deref(),
                details.teacher.patronymic.as_deref(),
            ),
            None => true,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct AssignDisciplineRequest {
    pub teacher_id: i32,
    pub discipline_id: i32,
    pub group_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TeacherDirectory {
    pub teachers: Vec<TeacherDetails>,
    pub departments: Vec<Department>,
}

#[derive(Debug, Serialize)]
pub struct TeacherProfile {
    #[serde(flatten)]
    pub details: TeacherDetails,
    pub disciplines: Vec<TeacherDisciplineDetails>,
}
