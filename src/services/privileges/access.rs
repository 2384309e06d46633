//! 分级权限判定
//!
//! 超级管理员拥有全部权限；普通管理员的权限来自 `admin_privileges` 记录，
//! 每条记录在一个组织范围（大学 / 学院 / 院系）内授予若干权限；学生没有管理权限。
//!
//! 管理员的权限列表按 `privileges:{user_id}` 缓存，授予、修改、撤销时清除。

use std::sync::Arc;

use actix_web::HttpRequest;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ErrorCode,
    privileges::entities::{AccessTarget, AdminPrivilege, Permission},
    users::entities::{User, UserRole},
};
use crate::services::{
    Respond, cache_from_request, current_user, forbidden, not_found, storage_error,
};
use crate::storage::Storage;

pub fn privileges_cache_key(user_id: i64) -> String {
    format!("privileges:{user_id}")
}

/// 判断用户能否在目标范围内行使某项权限
pub fn has_permission(
    user: &User,
    privileges: &[AdminPrivilege],
    permission: Permission,
    target: &AccessTarget,
) -> bool {
    match user.role {
        UserRole::SuperAdmin => true,
        UserRole::Admin => privileges.iter().any(|p| p.grants(permission, target)),
        UserRole::Student => false,
    }
}

/// 当前请求的用户及其管理权限
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub user: User,
    pub privileges: Vec<AdminPrivilege>,
}

impl AccessContext {
    pub fn is_super_admin(&self) -> bool {
        self.user.role == UserRole::SuperAdmin
    }

    pub fn is_student(&self) -> bool {
        self.user.role == UserRole::Student
    }

    pub fn can(&self, permission: Permission, target: &AccessTarget) -> bool {
        has_permission(&self.user, &self.privileges, permission, target)
    }

    /// 无权限时返回 403 响应
    pub fn require(&self, permission: Permission, target: &AccessTarget) -> Respond<()> {
        if self.can(permission, target) {
            Ok(())
        } else {
            tracing::info!(
                "User {} denied {} on {:?}",
                self.user.id,
                permission,
                target
            );
            Err(forbidden(format!("Permission '{permission}' required")))
        }
    }
}

/// 读取用户的权限列表，优先使用缓存
pub async fn load_privileges(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    user_id: i64,
) -> Result<Vec<AdminPrivilege>> {
    let key = privileges_cache_key(user_id);

    if let Some(cache) = cache
        && let CacheResult::Found(json) = cache.get_raw(&key).await
    {
        match serde_json::from_str::<Vec<AdminPrivilege>>(&json) {
            Ok(privileges) => return Ok(privileges),
            Err(e) => {
                tracing::info!("Dropping undecodable cached privileges {}: {}", user_id, e);
                cache.remove(&key).await;
            }
        }
    }

    let privileges = storage.list_user_privileges(user_id).await?;

    if let Some(cache) = cache
        && let Ok(json) = serde_json::to_string(&privileges)
    {
        cache
            .insert_raw(key, json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(privileges)
}

pub async fn invalidate_privileges(request: &HttpRequest, user_id: i64) {
    if let Some(cache) = cache_from_request(request) {
        cache.remove(&privileges_cache_key(user_id)).await;
    }
}

/// 构造当前请求的权限上下文，只有普通管理员需要读取权限记录
pub async fn access_context(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
) -> Respond<AccessContext> {
    let user = current_user(request)?;

    let privileges = if user.role == UserRole::Admin {
        let cache = cache_from_request(request);
        load_privileges(storage, cache.as_ref(), user.id)
            .await
            .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
    } else {
        Vec::new()
    };

    Ok(AccessContext { user, privileges })
}

/// 院系对应的权限目标
pub async fn department_target(
    storage: &Arc<dyn Storage>,
    department_id: i64,
) -> Respond<AccessTarget> {
    storage
        .get_department_lineage(department_id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::DepartmentNotFound))?
        .map(AccessTarget::Department)
        .ok_or_else(|| not_found(ErrorCode::DepartmentNotFound, "Department not found"))
}

/// 学院对应的权限目标
pub async fn college_target(storage: &Arc<dyn Storage>, college_id: i64) -> Respond<AccessTarget> {
    storage
        .get_college_by_id(college_id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::CollegeNotFound))?
        .map(|college| AccessTarget::College {
            college_id: college.id,
            university_id: college.university_id,
        })
        .ok_or_else(|| not_found(ErrorCode::CollegeNotFound, "College not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::organizations::entities::DepartmentLineage;
    use crate::models::privileges::entities::ScopeKind;
    use crate::models::users::entities::UserStatus;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: 7,
            username: "registrar".into(),
            email: "registrar@example.edu".into(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn privilege(scope: ScopeKind, scope_id: i64, permissions: Vec<Permission>) -> AdminPrivilege {
        let now = Utc::now();
        AdminPrivilege {
            id: 1,
            user_id: 7,
            scope,
            scope_id,
            permissions,
            created_at: now,
            updated_at: now,
        }
    }

    fn department() -> AccessTarget {
        AccessTarget::Department(DepartmentLineage {
            department_id: 3,
            college_id: 2,
            university_id: 1,
        })
    }

    #[test]
    fn test_super_admin_has_every_permission() {
        let admin = user(UserRole::SuperAdmin);
        assert!(has_permission(
            &admin,
            &[],
            Permission::ManageGrades,
            &AccessTarget::Global
        ));
    }

    #[test]
    fn test_student_has_no_permission_even_with_records() {
        let student = user(UserRole::Student);
        let records = vec![privilege(
            ScopeKind::University,
            1,
            vec![Permission::ManageStudents],
        )];
        assert!(!has_permission(
            &student,
            &records,
            Permission::ManageStudents,
            &department()
        ));
    }

    #[test]
    fn test_admin_permission_follows_scope() {
        let admin = user(UserRole::Admin);
        let records = vec![privilege(
            ScopeKind::Faculty,
            2,
            vec![Permission::ManageCourses],
        )];
        assert!(has_permission(
            &admin,
            &records,
            Permission::ManageCourses,
            &department()
        ));
        assert!(!has_permission(
            &admin,
            &records,
            Permission::ManageGrades,
            &department()
        ));
        assert!(!has_permission(
            &admin,
            &records,
            Permission::ManageCourses,
            &AccessTarget::Global
        ));
    }

    #[test]
    fn test_context_require_returns_forbidden() {
        let ctx = AccessContext {
            user: user(UserRole::Admin),
            privileges: Vec::new(),
        };
        let response = ctx
            .require(Permission::ManageSemesters, &AccessTarget::Global)
            .unwrap_err();
        assert_eq!(response.status(), actix_web::http::StatusCode::FORBIDDEN);
    }
}
