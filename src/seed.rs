//! Demonstration data: departments, groups, disciplines, an administrator,
//! teachers with discipline assignments, students, course materials,
//! material requests, news and promotions.

use chrono::{Duration, NaiveDate, Utc};
use secrecy::{ExposeSecret, Secret};

use crate::core::config::SeedConfig;
use crate::core::{AppError, PasswordHashing};
use crate::db::Store;
use crate::models::course_materials::NewCourseMaterial;
use crate::models::material_requests::{CreateMaterialRequestPayload, RequestStatus};
use crate::models::news::{NewNews, NewPromotion};
use crate::models::reference::CreateGroupRequest;
use crate::models::teachers::AssignDisciplineRequest;
use crate::models::users::{NewAccount, NewPerson, ADMIN_DISPLAY_NAME};

pub const ADMIN_LOGIN: &str = "admin";

/// Seeding switches available at runtime.
#[derive(Clone)]
pub struct SeedSettings {
    pub default_password: Secret<String>,
    pub allow_reset: bool,
}

impl From<&SeedConfig> for SeedSettings {
    fn from(config: &SeedConfig) -> Self {
        Self {
            default_password: config.default_password.clone(),
            allow_reset: config.allow_reset,
        }
    }
}

const DEPARTMENTS: [&str; 5] = [
    "Computer Science",
    "Applied Mathematics",
    "General Physics",
    "Economics",
    "Foreign Languages",
];

/// (department index, group number)
const GROUPS: [(usize, i32); 7] = [
    (0, 101),
    (0, 102),
    (1, 201),
    (1, 202),
    (2, 301),
    (3, 501),
    (4, 701),
];

const DISCIPLINES: [&str; 8] = [
    "Programming",
    "Databases",
    "Web Development",
    "Algorithms and Data Structures",
    "Calculus",
    "Linear Algebra",
    "Microeconomics",
    "English",
];

/// (department index, name, second name, patronymic)
const TEACHERS: [(usize, &str, &str, &str); 5] = [
    (0, "Alexey", "Smirnov", "Vladimirovich"),
    (0, "Irina", "Zhukova", "Sergeevna"),
    (1, "Olga", "Kuznetsova", "Pavlovna"),
    (3, "Sergey", "Fedorov", "Igorevich"),
    (4, "Vladimir", "Gusev", "Alexandrovich"),
];

/// (teacher index, discipline index, group index; none means every group)
const ASSIGNMENTS: [(usize, usize, Option<usize>); 8] = [
    (0, 0, Some(0)),
    (0, 0, Some(1)),
    (0, 1, Some(0)),
    (1, 2, None),
    (1, 3, Some(1)),
    (2, 4, Some(2)),
    (3, 6, Some(5)),
    (4, 7, None),
];

const FIRST_NAMES: [&str; 8] = ["Ivan", "Maria", "Dmitry", "Anna", "Nikita", "Olga", "Pavel", "Daria"];
const LAST_NAMES: [&str; 8] = [
    "Ivanov", "Petrova", "Sokolov", "Lebedeva", "Popov", "Orlova", "Morozov", "Vasilyeva",
];
const PATRONYMICS: [&str; 8] = [
    "Sergeevich",
    "Igorevna",
    "Pavlovich",
    "Mikhailovna",
    "Nikolaevich",
    "Dmitrievna",
    "Alexandrovich",
    "Fedorovna",
];

const STUDENTS_PER_GROUP: usize = 3;

/// Fills an empty store. Every seeded account shares `password`.
#[tracing::instrument(name = "Seed demo data", skip(store, hashing, password))]
pub async fn seed(store: &Store, hashing: &PasswordHashing, password: &Secret<String>) -> Result<(), AppError> {
    let now = Utc::now().naive_utc();
    // One hash for every demo account keeps startup fast.
    let password_hash = hashing.hash(password.expose_secret())?;

    let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
    for name in DEPARTMENTS {
        department_ids.push(store.create_department(name).await?.id);
    }

    let mut group_ids = Vec::with_capacity(GROUPS.len());
    for (department, number_group) in GROUPS {
        let group = store
            .create_group(&CreateGroupRequest {
                department_id: department_ids[department],
                number_group,
            })
            .await?;
        group_ids.push(group.id);
    }

    let mut discipline_ids = Vec::with_capacity(DISCIPLINES.len());
    for name in DISCIPLINES {
        discipline_ids.push(store.create_discipline(name).await?.id);
    }

    store
        .create_account(&NewAccount {
            login: ADMIN_LOGIN.to_string(),
            password_hash: password_hash.clone(),
            person: NewPerson::Admin,
            email: Some("admin@university.example".to_string()),
            created_date: now,
        })
        .await?;

    let mut teacher_ids = Vec::with_capacity(TEACHERS.len());
    for (index, (department, name, second_name, patronymic)) in TEACHERS.into_iter().enumerate() {
        let user = store
            .create_account(&NewAccount {
                login: format!("teacher{}", index + 1),
                password_hash: password_hash.clone(),
                person: NewPerson::Teacher {
                    department_id: Some(department_ids[department]),
                    name: name.to_string(),
                    second_name: second_name.to_string(),
                    patronymic: Some(patronymic.to_string()),
                    phone_number: Some(format!("+7(999){:03}-22-33", 111 * (index + 1))),
                },
                email: None,
                created_date: now,
            })
            .await?;
        teacher_ids.push(
            user.teacher_id
                .ok_or_else(|| AppError::internal_error("seeded teacher account has no teacher"))?,
        );
    }

    for (teacher, discipline, group) in ASSIGNMENTS {
        store
            .assign_discipline(&AssignDisciplineRequest {
                teacher_id: teacher_ids[teacher],
                discipline_id: discipline_ids[discipline],
                group_id: group.map(|group| group_ids[group]),
            })
            .await?;
    }

    let mut student_user_ids = Vec::new();
    let mut counter = 0;
    for group_id in &group_ids {
        for _ in 0..STUDENTS_PER_GROUP {
            let pick = counter % FIRST_NAMES.len();
            counter += 1;
            let user = store
                .create_account(&NewAccount {
                    login: format!("student{}", counter),
                    password_hash: password_hash.clone(),
                    person: NewPerson::Student {
                        group_id: Some(*group_id),
                        name: FIRST_NAMES[pick].to_string(),
                        second_name: LAST_NAMES[(pick * 3) % LAST_NAMES.len()].to_string(),
                        patronymic: Some(PATRONYMICS[pick].to_string()),
                        phone_number: Some(format!("+7(999){:03}-45-67", 100 + counter)),
                        date_birthday: NaiveDate::from_ymd_opt(2000 + (counter % 4) as i32, 1 + (counter % 12) as u32, 15),
                    },
                    email: None,
                    created_date: now,
                })
                .await?;
            student_user_ids.push(user.id);
        }
    }

    let materials = [
        (0, 0, 0, "Introduction to programming", "Course outline and first lecture slides"),
        (0, 0, 1, "Variables and types", "Lecture 2 with exercises"),
        (0, 1, 0, "Relational model", "Tables, keys and normal forms"),
        (1, 2, 1, "HTTP basics", "Requests, responses and status codes"),
        (2, 4, 2, "Limits", "Problem set for week 1"),
    ];
    for (age, (teacher, discipline, group, title, description)) in materials.into_iter().enumerate() {
        store
            .create_material(&NewCourseMaterial {
                teacher_id: teacher_ids[teacher],
                group_id: group_ids[group],
                discipline_id: discipline_ids[discipline],
                title: title.to_string(),
                description: description.to_string(),
                file_url: Some(format!("/files/materials/{}.pdf", age + 1)),
                created_date: now - Duration::days(age as i64),
            })
            .await?;
    }

    if let Some(&first_student) = student_user_ids.first() {
        store
            .create_request(
                first_student,
                &CreateMaterialRequestPayload {
                    title: "Lecture recordings".to_string(),
                    description: "Recordings of the programming lectures".to_string(),
                    material_type: Some("Video".to_string()),
                    file_url: None,
                },
                now - Duration::days(2),
            )
            .await?;
        let mut approved = store
            .create_request(
                first_student,
                &CreateMaterialRequestPayload {
                    title: "Exam questions".to_string(),
                    description: "Question list for the databases exam".to_string(),
                    material_type: Some("Document".to_string()),
                    file_url: None,
                },
                now - Duration::days(5),
            )
            .await?;
        approved
            .transition(RequestStatus::Approved, Some("Will be published next week".to_string()), now)
            .map_err(AppError::internal_error)?;
        store.save_request_status(&approved).await?;
    }

    let news = [
        ("Admission campaign opens", "Applications for the new academic year are open.", true, 6),
        ("Library hours extended", "The library now stays open until 22:00.", true, 3),
        ("Programming contest", "Registration for the annual contest has started.", true, 1),
        ("Draft: exam schedule", "The schedule is being finalised.", false, 0),
    ];
    for (title, content, is_published, age) in news {
        let date = now - Duration::days(age);
        store
            .create_news(&NewNews {
                title: title.to_string(),
                content: content.to_string(),
                image_url: None,
                created_date: date,
                publish_date: Some(date),
                is_published,
                author: Some(ADMIN_DISPLAY_NAME.to_string()),
            })
            .await?;
    }

    let promotions = [
        ("Dormitory discount", "Reduced rent for honours students.", Some("15%"), true, 10, 30),
        ("Sports club", "Free first month at the university sports club.", None, true, 2, 60),
        ("Summer school", "Early registration discount.", Some("10%"), true, 90, -30),
    ];
    for (title, description, discount, is_active, started_ago, ends_in) in promotions {
        store
            .create_promotion(&NewPromotion {
                title: title.to_string(),
                description: description.to_string(),
                start_date: now - Duration::days(started_ago),
                end_date: now + Duration::days(ends_in),
                image_url: None,
                is_active,
                discount: discount.map(str::to_string),
            })
            .await?;
    }

    tracing::info!(
        teachers = teacher_ids.len(),
        students = student_user_ids.len(),
        "demo data seeded"
    );
    Ok(())
}

/// Wipes the store and seeds it again.
pub async fn reset_and_seed(store: &Store, hashing: &PasswordHashing, password: &Secret<String>) -> Result<(), AppError> {
    store.reset().await?;
    seed(store, hashing, password).await
}
