use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{OrganizationService, validate_fields};
use crate::models::{
    ApiResponse, ErrorCode,
    organizations::requests::{
        CreateDepartmentRequest, OrganizationListParams, OrganizationListQuery,
        UpdateDepartmentRequest,
    },
    privileges::entities::Permission,
};
use crate::services::{
    not_found,
    privileges::{access_context, college_target, department_target},
    storage_error, write_error,
};

pub async fn create_department(
    service: &OrganizationService,
    req: CreateDepartmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(validate_fields(Some(&req.name), Some(&req.code)));

    let target = try_or_respond!(college_target(&storage, req.college_id).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &target));

    match storage.create_department(req).await {
        Ok(department) => Ok(HttpResponse::Created().json(ApiResponse::success(
            department,
            "Department created successfully",
        ))),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::CollegeNotFound,
        )),
    }
}

/// `parent_id` 为所属学院
pub async fn list_departments(
    service: &OrganizationService,
    query: OrganizationListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_departments(OrganizationListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Departments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_department(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_department_by_id(id).await {
        Ok(Some(department)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            department,
            "Department retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::DepartmentNotFound, "Department not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_department(
    service: &OrganizationService,
    id: i64,
    req: UpdateDepartmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let target = try_or_respond!(department_target(&storage, id).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &target));
    try_or_respond!(validate_fields(req.name.as_ref(), req.code.as_ref()));

    match storage.update_department(id, req).await {
        Ok(Some(department)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            department,
            "Department updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::DepartmentNotFound, "Department not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::OrganizationInUse,
        )),
    }
}

/// 仍有学生或课程时拒绝删除
pub async fn delete_department(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let target = try_or_respond!(department_target(&storage, id).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &target));

    match storage.delete_department(id).await {
        Ok(true) => {
            tracing::info!("Department {} deleted by {}", id, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Department deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::DepartmentNotFound, "Department not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationInUse,
            ErrorCode::OrganizationInUse,
        )),
    }
}
