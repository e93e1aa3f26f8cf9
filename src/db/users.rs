use chrono::NaiveDateTime;
use sqlx::{MySqlConnection, MySqlPool};

use super::memory::{ensure_referenced, Tables};
use super::students::delete_student_rows;
use super::teachers::delete_teacher_rows;
use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::students::Student;
use crate::models::teachers::Teacher;
use crate::models::users::{NewAccount, NewPerson, UpdateProfileRequest, User, UserProfile};

const USER_SELECT: &str =
    "SELECT id, login, password_hash, role, student_id, teacher_id, created_date, last_login FROM users";

const PROFILE_SELECT: &str = "SELECT id, user_id, email, phone, address, birth_date, about, avatar_url, updated_date FROM user_profiles";

const LOGIN_TAKEN: &str = "This login is already taken";

impl Store {
    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, User>(&format!("{} WHERE login = ?", USER_SELECT))
                    .bind(login)
                    .fetch_optional(pool)
                    .await
                    .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| tables.user_by_login(login).cloned()),
        }
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, AppError> {
        match self {
            Store::MySql(pool) => fetch_user(pool, id).await,
            Store::Memory(memory) => memory.read(|tables| tables.users.get(id).cloned()),
        }
    }

    pub async fn touch_last_login(&self, user_id: i32, now: NaiveDateTime) -> Result<(), AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
                    .bind(now)
                    .bind(user_id)
                    .execute(pool)
                    .await
                    .map_err(AppError::db_error)?;
                Ok(())
            }
            Store::Memory(memory) => memory.transaction(|tables| {
                if let Some(user) = tables.users.get_mut(user_id) {
                    user.last_login = now;
                }
                Ok(())
            }),
        }
    }

    pub async fn login_exists(&self, login: &str) -> Result<bool, AppError> {
        Ok(self.find_user_by_login(login).await?.is_some())
    }

    /// Writes the person, the user and an empty profile in one transaction.
    #[tracing::instrument(name = "Create account", skip(self, account), fields(login = %account.login))]
    pub async fn create_account(&self, account: &NewAccount) -> Result<User, AppError> {
        match self {
            Store::MySql(pool) => insert_account(pool, account).await,
            Store::Memory(memory) => memory.transaction(|tables| tables.insert_account(account)),
        }
    }

    /// Deletes a user together with whatever is linked to it. Returns false
    /// when there is no such user.
    #[tracing::instrument(name = "Delete account", skip(self))]
    pub async fn delete_account(&self, user_id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let mut tx = pool.begin().await.map_err(AppError::db_error)?;
                let deleted = delete_account_rows(&mut *tx, user_id).await?;
                tx.commit().await.map_err(AppError::db_error)?;
                Ok(deleted)
            }
            Store::Memory(memory) => memory.transaction(|tables| Ok(tables.delete_account(user_id))),
        }
    }

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<UserProfile>, AppError> {
        match self {
            Store::MySql(pool) => fetch_profile(pool, user_id).await,
            Store::Memory(memory) => memory.read(|tables| tables.profile_of(user_id).cloned()),
        }
    }

    /// Creates the profile on first edit, overwrites it afterwards.
    pub async fn upsert_profile(
        &self,
        user_id: i32,
        update: &UpdateProfileRequest,
        now: NaiveDateTime,
    ) -> Result<UserProfile, AppError> {
        match self {
            Store::MySql(pool) => upsert_profile(pool, user_id, update, now).await,
            Store::Memory(memory) => memory.upsert_profile(user_id, update, now),
        }
    }
}

pub async fn fetch_user(pool: &MySqlPool, id: i32) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", USER_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn fetch_profile(pool: &MySqlPool, user_id: i32) -> Result<Option<UserProfile>, AppError> {
    sqlx::query_as::<_, UserProfile>(&format!("{} WHERE user_id = ?", PROFILE_SELECT))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn insert_account(pool: &MySqlPool, account: &NewAccount) -> Result<User, AppError> {
    let mut tx = pool.begin().await.map_err(AppError::db_error)?;

    let taken: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE login = ? FOR UPDATE")
        .bind(&account.login)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::db_error)?;
    if taken.is_some() {
        return Err(AppError::validation(LOGIN_TAKEN));
    }

    let (student_id, teacher_id) = match &account.person {
        NewPerson::Student {
            group_id,
            name,
            second_name,
            patronymic,
            phone_number,
            date_birthday,
        } => {
            let result = sqlx::query(
                r#"
                INSERT INTO students (group_id, name, second_name, patronymic, phone_number, date_birthday, login)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(group_id)
            .bind(name)
            .bind(second_name)
            .bind(patronymic)
            .bind(phone_number)
            .bind(date_birthday)
            .bind(&account.login)
            .execute(&mut *tx)
            .await
            .map_err(AppError::db_error)?;
            (Some(result.last_insert_id() as i32), None)
        }
        NewPerson::Teacher {
            department_id,
            name,
            second_name,
            patronymic,
            phone_number,
        } => {
            let result = sqlx::query(
                r#"
                INSERT INTO teachers (department_id, name, second_name, patronymic, phone_number, login)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(department_id)
            .bind(name)
            .bind(second_name)
            .bind(patronymic)
            .bind(phone_number)
            .bind(&account.login)
            .execute(&mut *tx)
            .await
            .map_err(AppError::db_error)?;
            (None, Some(result.last_insert_id() as i32))
        }
        NewPerson::Admin => (None, None),
    };

    let role = account.person.role();
    let result = sqlx::query(
        r#"
        INSERT INTO users (login, password_hash, role, student_id, teacher_id, created_date, last_login)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.login)
    .bind(&account.password_hash)
    .bind(role.as_str())
    .bind(student_id)
    .bind(teacher_id)
    .bind(account.created_date)
    .bind(account.created_date)
    .execute(&mut *tx)
    .await
    .map_err(AppError::db_error)?;
    let user_id = result.last_insert_id() as i32;

    sqlx::query("INSERT INTO user_profiles (user_id, email, updated_date) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(&account.email)
        .bind(account.created_date)
        .execute(&mut *tx)
        .await
        .map_err(AppError::db_error)?;

    tx.commit().await.map_err(AppError::db_error)?;

    Ok(User {
        id: user_id,
        login: account.login.clone(),
        password_hash: account.password_hash.clone(),
        role,
        student_id,
        teacher_id,
        created_date: account.created_date,
        last_login: account.created_date,
    })
}

async fn delete_account_rows(conn: &mut MySqlConnection, user_id: i32) -> Result<bool, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ? FOR UPDATE", USER_SELECT))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::db_error)?;

    let user = match user {
        Some(user) => user,
        None => return Ok(false),
    };

    if let Some(student_id) = user.student_id {
        delete_student_rows(&mut *conn, student_id).await?;
    }
    if let Some(teacher_id) = user.teacher_id {
        delete_teacher_rows(&mut *conn, teacher_id).await?;
    }

    for statement in [
        "DELETE FROM material_requests WHERE user_id = ?",
        "DELETE FROM user_profiles WHERE user_id = ?",
        "DELETE FROM users WHERE id = ?",
    ] {
        sqlx::query(statement)
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::db_error)?;
    }

    Ok(true)
}

pub async fn upsert_profile(
    pool: &MySqlPool,
    user_id: i32,
    update: &UpdateProfileRequest,
    now: NaiveDateTime,
) -> Result<UserProfile, AppError> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, email, phone, address, birth_date, about, avatar_url, updated_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            email = VALUES(email),
            phone = VALUES(phone),
            address = VALUES(address),
            birth_date = VALUES(birth_date),
            about = VALUES(about),
            avatar_url = VALUES(avatar_url),
            updated_date = VALUES(updated_date)
        "#,
    )
    .bind(user_id)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(&update.address)
    .bind(update.birth_date)
    .bind(&update.about)
    .bind(&update.avatar_url)
    .bind(now)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    fetch_profile(pool, user_id)
        .await?
        .ok_or_else(|| AppError::internal_error("profile missing right after upsert"))
}

impl Tables {
    pub(crate) fn user_by_login(&self, login: &str) -> Option<&User> {
        self.users.values().find(|user| user.login == login)
    }

    pub(crate) fn profile_of(&self, user_id: i32) -> Option<&UserProfile> {
        self.user_profiles
            .values()
            .find(|profile| profile.user_id == user_id)
    }

    fn insert_account(&mut self, account: &NewAccount) -> Result<User, AppError> {
        if self.user_by_login(&account.login).is_some() {
            return Err(AppError::validation(LOGIN_TAKEN));
        }

        let (student_id, teacher_id) = match &account.person {
            NewPerson::Student {
                group_id,
                name,
                second_name,
                patronymic,
                phone_number,
                date_birthday,
            } => {
                if let Some(group_id) = group_id {
                    ensure_referenced(self.student_groups.contains(*group_id), "group")?;
                }
                let student = self.students.insert_with(|id| Student {
                    id,
                    group_id: *group_id,
                    name: Some(name.clone()),
                    second_name: Some(second_name.clone()),
                    patronymic: patronymic.clone(),
                    phone_number: phone_number.clone(),
                    date_birthday: *date_birthday,
                    login: Some(account.login.clone()),
                });
                (Some(student.id), None)
            }
            NewPerson::Teacher {
                department_id,
                name,
                second_name,
                patronymic,
                phone_number,
            } => {
                if let Some(department_id) = department_id {
                    ensure_referenced(self.departments.contains(*department_id), "department")?;
                }
                let teacher = self.teachers.insert_with(|id| Teacher {
                    id,
                    department_id: *department_id,
                    name: Some(name.clone()),
                    second_name: Some(second_name.clone()),
                    patronymic: patronymic.clone(),
                    phone_number: phone_number.clone(),
                    login: Some(account.login.clone()),
                });
                (None, Some(teacher.id))
            }
            NewPerson::Admin => (None, None),
        };

        let user = self.users.insert_with(|id| User {
            id,
            login: account.login.clone(),
            password_hash: account.password_hash.clone(),
            role: account.person.role(),
            student_id,
            teacher_id,
            created_date: account.created_date,
            last_login: account.created_date,
        });

        self.user_profiles.insert_with(|id| UserProfile {
            id,
            user_id: user.id,
            email: account.email.clone(),
            phone: None,
            address: None,
            birth_date: None,
            about: None,
            avatar_url: None,
            updated_date: account.created_date,
        });

        Ok(user)
    }

    fn delete_account(&mut self, user_id: i32) -> bool {
        let user = match self.users.get(user_id) {
            Some(user) => user.clone(),
            None => return false,
        };

        if let Some(student_id) = user.student_id {
            self.delete_student_cascade(student_id);
        }
        if let Some(teacher_id) = user.teacher_id {
            self.delete_teacher_cascade(teacher_id);
        }
        self.delete_user_rows(user_id);
        true
    }
}

impl MemoryStore {
    fn upsert_profile(
        &self,
        user_id: i32,
        update: &UpdateProfileRequest,
        now: NaiveDateTime,
    ) -> Result<UserProfile, AppError> {
        self.transaction(|tables| {
            ensure_referenced(tables.users.contains(user_id), "user")?;
            let existing = tables.profile_of(user_id).map(|profile| profile.id);
            let apply = |id: i32| UserProfile {
                id,
                user_id,
                email: update.email.clone(),
                phone: update.phone.clone(),
                address: update.address.clone(),
                birth_date: update.birth_date,
                about: update.about.clone(),
                avatar_url: update.avatar_url.clone(),
                updated_date: now,
            };

            match existing.and_then(|id| tables.user_profiles.get_mut(id)) {
                Some(profile) => {
                    *profile = apply(profile.id);
                    Ok(profile.clone())
                }
                None => Ok(tables.user_profiles.insert_with(apply)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;
    use chrono::Utc;

    fn student_account(login: &str) -> NewAccount {
        NewAccount {
            login: login.to_string(),
            password_hash: "hash".to_string(),
            person: NewPerson::Student {
                group_id: None,
                name: "Anna".to_string(),
                second_name: "Smirnova".to_string(),
                patronymic: None,
                phone_number: None,
                date_birthday: None,
            },
            email: Some("anna@example.com".to_string()),
            created_date: Utc::now().naive_utc(),
        }
    }

    #[actix_web::test]
    async fn account_creation_writes_person_user_and_profile() {
        let store = Store::in_memory();
        let user = store.create_account(&student_account("anna")).await.unwrap();

        assert_eq!(user.role, Role::Student);
        assert!(user.has_consistent_links());
        let student = store.get_student(user.student_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(student.student.login.as_deref(), Some("anna"));
        let profile = store.get_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.email.as_deref(), Some("anna@example.com"));
    }

    #[actix_web::test]
    async fn duplicate_login_leaves_no_partial_rows() {
        let store = Store::in_memory();
        store.create_account(&student_account("anna")).await.unwrap();
        let error = store
            .create_account(&student_account("anna"))
            .await
            .unwrap_err();

        assert_eq!(error.message(), LOGIN_TAKEN);
        assert_eq!(store.portal_counts().await.unwrap().students, 1);
    }

    #[actix_web::test]
    async fn deleting_an_account_removes_everything_linked() {
        let store = Store::in_memory();
        let user = store.create_account(&student_account("anna")).await.unwrap();

        assert!(store.delete_account(user.id).await.unwrap());
        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.get_profile(user.id).await.unwrap().is_none());
        assert!(store
            .get_student(user.student_id.unwrap())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_account(user.id).await.unwrap());
    }

    #[actix_web::test]
    async fn profile_upsert_updates_in_place() {
        let store = Store::in_memory();
        let user = store.create_account(&student_account("anna")).await.unwrap();
        let now = Utc::now().naive_utc();
        let update = UpdateProfileRequest {
            about: Some("Second year".to_string()),
            ..Default::default()
        };

        let first = store.upsert_profile(user.id, &update, now).await.unwrap();
        let second = store.upsert_profile(user.id, &update, now).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.about.as_deref(), Some("Second year"));
        assert_eq!(second.email, None);
    }
}
