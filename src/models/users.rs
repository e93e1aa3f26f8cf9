use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::students::StudentDetails;
use super::teachers::TeacherDetails;
use super::ModelParseError;

pub const ADMIN_DISPLAY_NAME: &str = "Administrator";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }

    /// Landing page after a successful login.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/Home/AdminDashboard",
            Role::Teacher => "/Home/TeacherDashboard",
            Role::Student => "/Home/StudentDashboard",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Teacher" => Ok(Role::Teacher),
            "Student" => Ok(Role::Student),
            other => Err(ModelParseError::Role(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ModelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub student_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub created_date: NaiveDateTime,
    pub last_login: NaiveDateTime,
}

impl User {
    /// A Student account links only a student, a Teacher account only a
    /// teacher, an Admin account neither.
    pub fn has_consistent_links(&self) -> bool {
        match self.role {
            Role::Admin => self.student_id.is_none() && self.teacher_id.is_none(),
            Role::Teacher => self.student_id.is_none() && self.teacher_id.is_some(),
            Role::Student => self.student_id.is_some() && self.teacher_id.is_none(),
        }
    }
}

/// Name shown in the session: "{second name} {name}" of the linked person,
/// a fixed label for administrators, the login otherwise.
pub fn display_name(
    user: &User,
    student: Option<&StudentDetails>,
    teacher: Option<&TeacherDetails>,
) -> String {
    let person = match (user.role, student, teacher) {
        (Role::Student, Some(s), _) => Some((&s.student.second_name, &s.student.name)),
        (Role::Teacher, _, Some(t)) => Some((&t.teacher.second_name, &t.teacher.name)),
        (Role::Admin, _, _) => return ADMIN_DISPLAY_NAME.to_string(),
        _ => None,
    };

    match person {
        Some((second_name, name)) => format!(
            "{} {}",
            second_name.as_deref().unwrap_or_default(),
            name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string(),
        None => user.login.clone(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_date: NaiveDateTime,
}

#[derive(Validate, Serialize, Deserialize, Debug, Default, Clone)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "About must be at most 500 characters"))]
    pub about: Option<String>,
    #[validate(length(max = 200, message = "Avatar URL must be at most 200 characters"))]
    pub avatar_url: Option<String>,
}

#[derive(Validate, Deserialize, Debug)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub role: Role,
    pub display_name: String,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub is_authenticated: bool,
    pub user_id: i32,
    pub role: Option<Role>,
    pub display_name: String,
}

/// Self-service or administrator-driven account creation. Anonymous callers
/// may only register students.
#[derive(Validate, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub role: Role,
    #[validate(length(min = 1, max = 50, message = "Login must be 1 to 50 characters"))]
    pub login: String,
    #[validate(length(min = 6, max = 100, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Second name is required"))]
    pub second_name: String,
    #[validate(length(max = 50, message = "Patronymic must be at most 50 characters"))]
    pub patronymic: Option<String>,
    #[validate(length(max = 50, message = "Phone number must be at most 50 characters"))]
    pub phone_number: Option<String>,
    pub date_birthday: Option<NaiveDate>,
    pub group_id: Option<i32>,
    pub department_id: Option<i32>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
}

/// Person half of a new account.
#[derive(Debug, Clone)]
pub enum NewPerson {
    Student {
        group_id: Option<i32>,
        name: String,
        second_name: String,
        patronymic: Option<String>,
        phone_number: Option<String>,
        date_birthday: Option<NaiveDate>,
    },
    Teacher {
        department_id: Option<i32>,
        name: String,
        second_name: String,
        patronymic: Option<String>,
        phone_number: Option<String>,
    },
    Admin,
}

impl NewPerson {
    pub fn role(&self) -> Role {
        match self {
            NewPerson::Student { .. } => Role::Student,
            NewPerson::Teacher { .. } => Role::Teacher,
            NewPerson::Admin => Role::Admin,
        }
    }
}

/// Everything written by one atomic registration: user, linked person, profile.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login: String,
    pub password_hash: String,
    pub person: NewPerson,
    pub email: Option<String>,
    pub created_date: NaiveDateTime,
}

impl NewAccount {
    pub fn from_request(request: &RegisterRequest, password_hash: String, now: NaiveDateTime) -> Self {
        let person = match request.role {
            Role::Student => NewPerson::Student {
                group_id: request.group_id,
                name: request.name.clone(),
                second_name: request.second_name.clone(),
                patronymic: request.patronymic.clone(),
                phone_number: request.phone_number.clone(),
                date_birthday: request.date_birthday,
            },
            Role::Teacher => NewPerson::Teacher {
                department_id: request.department_id,
                name: request.name.clone(),
                second_name: request.second_name.clone(),
                patronymic: request.patronymic.clone(),
                phone_number: request.phone_number.clone(),
            },
            Role::Admin => NewPerson::Admin,
        };

        Self {
            login: request.login.trim().to_string(),
            password_hash,
            person,
            email: request.email.clone(),
            created_date: now,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub user: User,
    pub student: Option<StudentDetails>,
    pub teacher: Option<TeacherDetails>,
    pub profile: Option<UserProfile>,
}
