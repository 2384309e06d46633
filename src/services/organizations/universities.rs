use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{OrganizationService, validate_fields};
use crate::models::{
    ApiResponse, ErrorCode,
    organizations::requests::{
        CreateUniversityRequest, OrganizationListParams, OrganizationListQuery,
        UpdateUniversityRequest,
    },
    privileges::entities::{AccessTarget, Permission},
};
use crate::services::{
    forbidden, not_found, privileges::access_context, storage_error, write_error,
};

pub async fn create_university(
    service: &OrganizationService,
    req: CreateUniversityRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    // 新建大学不隶属任何已有范围
    if !ctx.is_super_admin() {
        return Ok(forbidden("Only super administrators can create universities"));
    }
    try_or_respond!(validate_fields(Some(&req.name), Some(&req.code)));

    match storage.create_university(req).await {
        Ok(university) => {
            tracing::info!("University {} created by {}", university.code, ctx.user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                university,
                "University created successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::OrganizationInUse,
        )),
    }
}

pub async fn list_universities(
    service: &OrganizationService,
    query: OrganizationListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_universities(OrganizationListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Universities retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_university(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_university_by_id(id).await {
        Ok(Some(university)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            university,
            "University retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::UniversityNotFound, "University not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

/// 大学及下属学院、院系
pub async fn get_university_tree(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_university_tree(id).await {
        Ok(Some(tree)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            tree,
            "Organization tree retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::UniversityNotFound, "University not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_university(
    service: &OrganizationService,
    id: i64,
    req: UpdateUniversityRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &AccessTarget::University(id)));
    try_or_respond!(validate_fields(req.name.as_ref(), req.code.as_ref()));

    match storage.update_university(id, req).await {
        Ok(Some(university)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            university,
            "University updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::UniversityNotFound, "University not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationAlreadyExists,
            ErrorCode::OrganizationInUse,
        )),
    }
}

/// 仍有下属学院时拒绝删除
pub async fn delete_university(
    service: &OrganizationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageOrganization, &AccessTarget::University(id)));

    match storage.delete_university(id).await {
        Ok(true) => {
            tracing::info!("University {} deleted by {}", id, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "University deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::UniversityNotFound, "University not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::OrganizationInUse,
            ErrorCode::OrganizationInUse,
        )),
    }
}
