use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::AppError;
use crate::models::course_materials::{CourseMaterial, CourseMaterialDetails};
use crate::models::material_requests::MaterialRequest;
use crate::models::news::{News, Promotion};
use crate::models::reference::{Department, Discipline, GroupDetails, StudentGroup};
use crate::models::students::{Student, StudentDetails};
use crate::models::teachers::{Teacher, TeacherDetails, TeacherDiscipline, TeacherDisciplineDetails};
use crate::models::users::{User, UserProfile};

/// Rows keyed by an auto-incremented id.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: i32) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: i32) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Table<User>,
    pub user_profiles: Table<UserProfile>,
    pub students: Table<Student>,
    pub teachers: Table<Teacher>,
    pub student_groups: Table<StudentGroup>,
    pub departments: Table<Department>,
    pub disciplines: Table<Discipline>,
    pub teacher_disciplines: Table<TeacherDiscipline>,
    pub course_materials: Table<CourseMaterial>,
    pub material_requests: Table<MaterialRequest>,
    pub news: Table<News>,
    pub promotions: Table<Promotion>,
}

/// Fails the way a MySQL foreign key does when the referenced row is missing.
pub(crate) fn ensure_referenced(present: bool, relation: &str) -> Result<(), AppError> {
    if present {
        Ok(())
    } else {
        Err(AppError::db_error(format!(
            "foreign key constraint fails: {} does not exist",
            relation
        )))
    }
}

/// Joins mirroring the LEFT JOINs of the MySQL queries.
impl Tables {
    pub fn department_name(&self, department_id: Option<i32>) -> Option<String> {
        department_id
            .and_then(|id| self.departments.get(id))
            .and_then(|department| department.name.clone())
    }

    pub fn group_details(&self, group: &StudentGroup) -> GroupDetails {
        GroupDetails {
            group: group.clone(),
            department_name: self.department_name(group.department_id),
        }
    }

    pub fn student_details(&self, student: &Student) -> StudentDetails {
        let group = student.group_id.and_then(|id| self.student_groups.get(id));
        StudentDetails {
            student: student.clone(),
            group_number: group.and_then(|group| group.number_group),
            department_id: group.and_then(|group| group.department_id),
            department_name: self.department_name(group.and_then(|group| group.department_id)),
        }
    }

    pub fn teacher_details(&self, teacher: &Teacher) -> TeacherDetails {
        TeacherDetails {
            teacher: teacher.clone(),
            department_name: self.department_name(teacher.department_id),
        }
    }

    pub fn teacher_discipline_details(&self, assignment: &TeacherDiscipline) -> TeacherDisciplineDetails {
        TeacherDisciplineDetails {
            assignment: assignment.clone(),
            discipline_name: self
                .disciplines
                .get(assignment.discipline_id)
                .and_then(|discipline| discipline.name.clone()),
            group_number: assignment
                .group_id
                .and_then(|id| self.student_groups.get(id))
                .and_then(|group| group.number_group),
        }
    }

    pub fn material_details(&self, material: &CourseMaterial) -> CourseMaterialDetails {
        let teacher_name = self.teachers.get(material.teacher_id).map(|teacher| {
            format!(
                "{} {}",
                teacher.second_name.as_deref().unwrap_or_default(),
                teacher.name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string()
        });

        CourseMaterialDetails {
            material: material.clone(),
            teacher_name,
            discipline_name: self
                .disciplines
                .get(material.discipline_id)
                .and_then(|discipline| discipline.name.clone()),
            group_number: self
                .student_groups
                .get(material.group_id)
                .and_then(|group| group.number_group),
        }
    }
}

/// In-process backend for demo mode and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal_error("memory store lock poisoned"))
    }

    pub(crate) fn read<R>(&self, query: impl FnOnce(&Tables) -> R) -> Result<R, AppError> {
        let tables = self.lock()?;
        Ok(query(&tables))
    }

    /// Runs `work` against a copy of the tables and publishes the copy only
    /// when `work` succeeds.
    pub(crate) fn transaction<R>(
        &self,
        work: impl FnOnce(&mut Tables) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut tables = self.lock()?;
        let mut draft = tables.clone();
        let result = work(&mut draft)?;
        *tables = draft;
        Ok(result)
    }

    pub(crate) fn reset(&self) -> Result<(), AppError> {
        *self.lock()? = Tables::default();
        Ok(())
    }
}
