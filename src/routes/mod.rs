use actix_web::web::{self, scope, ServiceConfig};
use actix_web::Scope;

use crate::core::{AppError, Identity};
use crate::db::Store;
use crate::models::students::StudentDetails;
use crate::models::teachers::TeacherDetails;

use account::{
    access_denied, delete_account, get_profile, login, logout, register, session_info,
    update_profile,
};
use course_materials::{
    create_material, delete_material, group_materials, material_details, material_form,
    teacher_materials,
};
use home::{
    admin_dashboard, home_index, initialize_database, news_details, promotion_details,
    public_news, public_promotions, search, student_dashboard, teacher_dashboard,
};
use material_requests::{
    all_requests, create_request, my_requests, request_details, update_request_status,
};
use news::{create_news, delete_news, edit_news_form, news_admin, toggle_publish, update_news};
use promotions::{
    create_promotion, delete_promotion, edit_promotion_form, promotions_admin, toggle_active,
    update_promotion,
};
use reference::{create_department, create_discipline, create_group, departments, disciplines};
use students::{delete_student, list_groups, list_students, student_details};
use teachers::{
    assign_discipline, delete_teacher, list_teachers, teacher_details, unassign_discipline,
};

mod account;
mod course_materials;
mod health_check;
mod home;
mod material_requests;
mod news;
mod promotions;
mod reference;
mod students;
mod teachers;

fn account_routes() -> Scope {
    scope("/Account")
        .service(login)
        .service(logout)
        .service(session_info)
        .service(access_denied)
        .service(register)
        .service(get_profile)
        .service(update_profile)
        .service(delete_account)
}

fn home_routes() -> Scope {
    scope("/Home")
        .service(home_index)
        .service(public_news)
        .service(news_details)
        .service(public_promotions)
        .service(promotion_details)
        .service(search)
        .service(admin_dashboard)
        .service(teacher_dashboard)
        .service(student_dashboard)
        .service(initialize_database)
}

fn students_routes() -> Scope {
    scope("/Students")
        .service(list_students)
        .service(student_details)
        .service(list_groups)
        .service(delete_student)
}

fn teachers_routes() -> Scope {
    scope("/Teachers")
        .service(list_teachers)
        .service(teacher_details)
        .service(delete_teacher)
        .service(assign_discipline)
        .service(unassign_discipline)
}

fn reference_routes() -> Vec<Scope> {
    vec![
        scope("/Departments")
            .service(departments)
            .service(create_department),
        scope("/Disciplines")
            .service(disciplines)
            .service(create_discipline),
        scope("/Groups").service(create_group),
    ]
}

fn course_materials_routes() -> Scope {
    scope("/CourseMaterials")
        .service(group_materials)
        .service(material_form)
        .service(create_material)
        .service(teacher_materials)
        .service(material_details)
        .service(delete_material)
}

fn material_requests_routes() -> Scope {
    scope("/MaterialRequests")
        .service(create_request)
        .service(my_requests)
        .service(request_details)
        .service(all_requests)
        .service(update_request_status)
}

fn news_routes() -> Scope {
    scope("/News")
        .service(news_admin)
        .service(create_news)
        .service(edit_news_form)
        .service(update_news)
        .service(delete_news)
        .service(toggle_publish)
}

fn promotions_routes() -> Scope {
    scope("/Promotions")
        .service(promotions_admin)
        .service(create_promotion)
        .service(edit_promotion_form)
        .service(update_promotion)
        .service(delete_promotion)
        .service(toggle_active)
}

/// Malformed bodies, queries and paths answer with the regular error envelope.
fn extractor_config(conf: &mut ServiceConfig) {
    conf.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|_, _| AppError::not_found().into()));
}

pub fn portal_routes(conf: &mut ServiceConfig) {
    extractor_config(conf);
    conf.service(health_check::health_check)
        .service(account_routes())
        .service(home_routes())
        .service(students_routes())
        .service(teachers_routes())
        .service(course_materials_routes())
        .service(material_requests_routes())
        .service(news_routes())
        .service(promotions_routes());
    for scope in reference_routes() {
        conf.service(scope);
    }
}

/// The student record behind the caller's account.
pub(crate) async fn linked_student(store: &Store, identity: &Identity) -> Result<StudentDetails, AppError> {
    let user = store
        .get_user(identity.user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let student_id = user.student_id.ok_or_else(AppError::access_denied)?;
    store
        .get_student(student_id)
        .await?
        .ok_or_else(AppError::not_found)
}

/// The teacher record behind the caller's account.
pub(crate) async fn linked_teacher(store: &Store, identity: &Identity) -> Result<TeacherDetails, AppError> {
    let user = store
        .get_user(identity.user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let teacher_id = user.teacher_id.ok_or_else(AppError::access_denied)?;
    store
        .get_teacher(teacher_id)
        .await?
        .ok_or_else(AppError::not_found)
}
