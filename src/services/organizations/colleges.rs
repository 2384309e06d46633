use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{OrganizationService, validate_fields};
use crate::models::{
    ApiResponse, ErrorCode,
    organizations::requests::{
        CreateCollegeRequest, OrganizationListParams, OrganizationListQuery, UpdateCollegeRequest,
    },
    privileges::entities::{AccessTarget, Permission},
};
use crate::services::{
    not_found,
    privileges::{access_context, college_target},
    storage_error, write_error,
};

pub async fn create_college(
    service: &OrganizationService,
    req: CreateCollegeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(validate_fields(Some(&req.name), Some(&req.code)));

    match storage.get_university_by_id(req.university_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::UniversityNotFound, "University not found")),
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
    try_or_respond!(ctx.require(
        Permission::ManageOrganization,
        &AccessTarget::University(req.university_id)
    ));

    match storage.create_college(req).await {
        Ok(college) => Ok(HttpResponse::Created().json(ApiResponse::success(
            college,
            "College created successfully",
        ))),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::UniversityNotFound,
        )),
    }
}

/// `parent_id` 为所属大学
pub async fn list_colleges(
    service: &OrganizationService,
    query: OrganizationListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_colleges(OrganizationListQuery::from(query)).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Colleges retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_college(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_college_by_id(id).await {
        Ok(Some(college)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            college,
            "College retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CollegeNotFound, "College not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_college(
    service: &OrganizationService,
    id: i64,
    req: UpdateCollegeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let target = try_or_respond!(college_target(&storage, id).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &target));
    try_or_respond!(validate_fields(req.name.as_ref(), req.code.as_ref()));

    match storage.update_college(id, req).await {
        Ok(Some(college)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            college,
            "College updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CollegeNotFound, "College not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::OrganizationInUse,
        )),
    }
}

/// 仍有下属院系时拒绝删除
pub async fn delete_college(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let target = try_or_respond!(college_target(&storage, id).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &target));

    match storage.delete_college(id).await {
        Ok(true) => {
            tracing::info!("College {} deleted by {}", id, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "College deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::CollegeNotFound, "College not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationInUse,
            ErrorCode::OrganizationInUse,
        )),
    }
}
