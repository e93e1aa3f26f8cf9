use std::collections::BTreeSet;

use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use super::{linked_student, linked_teacher};
use crate::core::{AllowedRoles, AppError, AppSuccessResponse, AuthContext};
use crate::db::Store;
use crate::models::course_materials::{
    may_publish, CreateMaterialRequest, GroupMaterials, MaterialFilter, MaterialForm,
    NewCourseMaterial,
};
use crate::models::users::Role;

#[tracing::instrument(name = "Group materials", skip(store, auth))]
#[get("/Index")]
pub async fn group_materials(
    store: web::Data<Store>,
    auth: AuthContext,
    filter: web::Query<MaterialFilter>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::STUDENT)?;
    let student = linked_student(&store, identity).await?;
    let group_id = student
        .student
        .group_id
        .ok_or_else(|| AppError::validation("You are not assigned to a group"))?;

    let materials = GroupMaterials {
        materials: store
            .list_group_materials(group_id, filter.discipline_id)
            .await?,
        disciplines: store.group_material_disciplines(group_id).await?,
        selected_discipline_id: filter.discipline_id,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(materials, "Materials retrieved")))
}

#[tracing::instrument(name = "Material form", skip(store, auth))]
#[get("/Create")]
pub async fn material_form(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::TEACHER)?;
    let teacher = linked_teacher(&store, identity).await?;

    let teacher_disciplines: Vec<_> = store
        .teacher_disciplines(teacher.teacher.id)
        .await?
        .into_iter()
        .filter(|details| details.assignment.group_id.is_some())
        .collect();
    if teacher_disciplines.is_empty() {
        return Err(AppError::validation(
            "You have no disciplines assigned to a group",
        ));
    }

    let group_ids: BTreeSet<i32> = teacher_disciplines
        .iter()
        .filter_map(|details| details.assignment.group_id)
        .collect();
    let groups = store
        .list_groups()
        .await?
        .into_iter()
        .filter(|details| group_ids.contains(&details.group.id))
        .collect();

    let form = MaterialForm {
        teacher_disciplines,
        groups,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(form, "Material form retrieved")))
}

#[tracing::instrument(name = "Create material", skip(store, auth, request))]
#[post("/Create")]
pub async fn create_material(
    store: web::Data<Store>,
    auth: AuthContext,
    request: web::Json<CreateMaterialRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::TEACHER)?;
    request.validate()?;
    let teacher = linked_teacher(&store, identity).await?;

    let assignments: Vec<_> = store
        .teacher_disciplines(teacher.teacher.id)
        .await?
        .into_iter()
        .map(|details| details.assignment)
        .collect();
    if !may_publish(&assignments, request.discipline_id, request.group_id) {
        return Err(AppError::validation(
            "You do not teach this discipline to this group",
        ));
    }
    if !store.group_exists(request.group_id).await? {
        return Err(AppError::validation("Group does not exist"));
    }

    let request = request.into_inner();
    let material = store
        .create_material(&NewCourseMaterial {
            teacher_id: teacher.teacher.id,
            group_id: request.group_id,
            discipline_id: request.discipline_id,
            title: request.title,
            description: request.description,
            file_url: request.file_url,
            created_date: Utc::now().naive_utc(),
        })
        .await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse::new(material, "Material created successfully")))
}

#[tracing::instrument(name = "Teacher materials", skip(store, auth))]
#[get("/TeacherMaterials")]
pub async fn teacher_materials(store: web::Data<Store>, auth: AuthContext) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::TEACHER)?;
    let teacher = linked_teacher(&store, identity).await?;

    let materials = store.list_teacher_materials(teacher.teacher.id).await?;
    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(materials, "Materials retrieved")))
}

/// Students see materials of their own group, teachers their own
/// materials, administrators everything.
#[tracing::instrument(name = "Material details", skip(store, auth))]
#[get("/Details/{id}")]
pub async fn material_details(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ANY)?;

    let material = store
        .get_material(id.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;

    let allowed = match identity.role {
        Role::Admin => true,
        Role::Teacher => linked_teacher(&store, identity).await?.teacher.id == material.material.teacher_id,
        Role::Student => {
            linked_student(&store, identity).await?.student.group_id == Some(material.material.group_id)
        }
    };
    if !allowed {
        return Err(AppError::access_denied());
    }

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new(material, "Material retrieved")))
}

#[tracing::instrument(name = "Delete material", skip(store, auth))]
#[post("/Delete/{id}")]
pub async fn delete_material(
    store: web::Data<Store>,
    auth: AuthContext,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require(AllowedRoles::ADMIN_OR_TEACHER)?;
    let id = id.into_inner();

    let material = store.get_material(id).await?.ok_or_else(AppError::not_found)?;
    if identity.role == Role::Teacher {
        let teacher = linked_teacher(&store, identity).await?;
        if teacher.teacher.id != material.material.teacher_id {
            return Err(AppError::access_denied());
        }
    }

    store.delete_material(id).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse::new((), "Material deleted successfully")))
}
