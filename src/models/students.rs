use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reference::{Department, GroupDetails};
use super::search::name_matches;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub group_id: Option<i32>,
    pub name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub phone_number: Option<String>,
    pub date_birthday: Option<NaiveDate>,
    pub login: Option<String>,
}

/// A student with the group and department it belongs to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub student: Student,
    pub group_number: Option<i32>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilter {
    pub group_id: Option<i32>,
    #[serde(alias = "departamentId")]
    pub department_id: Option<i32>,
    pub search_string: Option<String>,
}

impl StudentFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search_string
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn matches(&self, details: &StudentDetails) -> bool {
        if let Some(group_id) = self.group_id {
            if details.student.group_id != Some(group_id) {
                return false;
            }
        }
        if let Some(department_id) = self.department_id {
            if details.department_id != Some(department_id) {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => name_matches(
                term,
                details.student.second_name.as_deref(),
                details.student.name.as_deref(),
                details.student.patronymic.as_deref(),
            ),
            None => true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentDirectory {
    pub students: Vec<StudentDetails>,
    pub groups: Vec<GroupDetails>,
    pub departments: Vec<Department>,
}
