use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PrivilegeService, access::invalidate_privileges};
use crate::models::{
    ApiResponse, ErrorCode,
    privileges::{
        entities::{Permission, ScopeKind, normalize_permissions},
        requests::{GrantPrivilegeRequest, UpdatePrivilegeRequest},
        responses::PrivilegeListResponse,
    },
    users::entities::UserRole,
};
use crate::services::{Respond, bad_request, not_found, storage_error, unprocessable};
use crate::storage::Storage;

/// 确认权限范围指向的组织存在
async fn ensure_scope_exists(
    storage: &Arc<dyn Storage>,
    scope: ScopeKind,
    scope_id: i64,
) -> Respond<()> {
    let (exists, code) = match scope {
        ScopeKind::University => (
            storage.get_university_by_id(scope_id).await.map(|o| o.is_some()),
            ErrorCode::UniversityNotFound,
        ),
        ScopeKind::Faculty => (
            storage.get_college_by_id(scope_id).await.map(|o| o.is_some()),
            ErrorCode::CollegeNotFound,
        ),
        ScopeKind::Department => (
            storage.get_department_by_id(scope_id).await.map(|o| o.is_some()),
            ErrorCode::DepartmentNotFound,
        ),
    };

    match exists {
        Ok(true) => Ok(()),
        Ok(false) => Err(not_found(code, format!("{scope} {scope_id} not found"))),
        Err(e) => Err(storage_error(e, code)),
    }
}

fn non_empty(permissions: Vec<Permission>) -> Respond<Vec<Permission>> {
    let permissions = normalize_permissions(permissions);
    if permissions.is_empty() {
        return Err(bad_request(
            ErrorCode::PrivilegeInvalid,
            "At least one permission is required",
        ));
    }
    Ok(permissions)
}

/// 授予权限，同一用户在同一范围已有记录时合并
pub async fn grant_privilege(
    service: &PrivilegeService,
    req: GrantPrivilegeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let permissions = try_or_respond!(non_empty(req.permissions));

    let target = match storage.get_user_by_id(req.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, ErrorCode::UserNotFound)),
    };
    if target.role != UserRole::Admin {
        return Ok(unprocessable(
            ErrorCode::PrivilegeInvalid,
            "Privileges can only be granted to users with the admin role",
        ));
    }

    try_or_respond!(ensure_scope_exists(&storage, req.scope, req.scope_id).await);

    let existing = match storage
        .get_privilege_by_scope(req.user_id, req.scope, req.scope_id)
        .await
    {
        Ok(existing) => existing,
        Err(e) => return Ok(storage_error(e, ErrorCode::PrivilegeInvalid)),
    };

    let result = match existing {
        Some(existing) => {
            let mut merged = existing.permissions.clone();
            merged.extend(permissions);
            storage
                .update_privilege_permissions(existing.id, &normalize_permissions(merged))
                .await
                .map(|updated| updated.map(|p| (p, false)))
        }
        None => storage
            .create_privilege(req.user_id, req.scope, req.scope_id, &permissions)
            .await
            .map(|created| Some((created, true))),
    };

    invalidate_privileges(request, req.user_id).await;

    match result {
        Ok(Some((privilege, created))) => {
            tracing::info!(
                "Granted {:?} on {} {} to user {}",
                privilege.permissions,
                privilege.scope,
                privilege.scope_id,
                privilege.user_id
            );
            let response = ApiResponse::success(privilege, "Privilege granted successfully");
            if created {
                Ok(HttpResponse::Created().json(response))
            } else {
                Ok(HttpResponse::Ok().json(response))
            }
        }
        Ok(None) => Ok(not_found(ErrorCode::PrivilegeNotFound, "Privilege not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::PrivilegeInvalid)),
    }
}

pub async fn list_user_privileges(
    service: &PrivilegeService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_user_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, ErrorCode::UserNotFound)),
    }

    match storage.list_user_privileges(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PrivilegeListResponse { user_id, items },
            "Privileges retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

/// 整体替换权限列表
pub async fn update_privilege(
    service: &PrivilegeService,
    id: i64,
    req: UpdatePrivilegeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let permissions = try_or_respond!(non_empty(req.permissions));

    match storage.update_privilege_permissions(id, &permissions).await {
        Ok(Some(privilege)) => {
            invalidate_privileges(request, privilege.user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                privilege,
                "Privilege updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::PrivilegeNotFound, "Privilege not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::PrivilegeInvalid)),
    }
}

pub async fn revoke_privilege(
    service: &PrivilegeService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let privilege = match storage.get_privilege_by_id(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return Ok(not_found(ErrorCode::PrivilegeNotFound, "Privilege not found")),
        Err(e) => return Ok(storage_error(e, ErrorCode::PrivilegeNotFound)),
    };

    match storage.delete_privilege(id).await {
        Ok(true) => {
            invalidate_privileges(request, privilege.user_id).await;
            tracing::info!(
                "Revoked privilege {} from user {}",
                privilege.id,
                privilege.user_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Privilege revoked successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::PrivilegeNotFound, "Privilege not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::PrivilegeNotFound)),
    }
}
