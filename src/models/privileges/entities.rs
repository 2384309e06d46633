//! 分级管理员权限模型
//!
//! 权限列表在数据库中以逗号拼接的字符串保存（如 `manage_students,manage_courses`），
//! 读取时解析回 [`Permission`] 列表。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::organizations::entities::DepartmentLineage;

// 管理权限
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "privilege.ts")]
pub enum Permission {
    ManageOrganization,
    ManageStudents,
    ManageCourses,
    ManageSemesters,
    ManageEnrollments,
    ManageGrades,
    ViewReports,
}

string_enum!(Permission, "permission" {
    ManageOrganization => "manage_organization",
    ManageStudents => "manage_students",
    ManageCourses => "manage_courses",
    ManageSemesters => "manage_semesters",
    ManageEnrollments => "manage_enrollments",
    ManageGrades => "manage_grades",
    ViewReports => "view_reports",
});

/// 解析逗号拼接的权限字符串
///
/// 忽略空白与空段，遇到未知权限名返回错误。结果去重并按固定顺序排列。
pub fn parse_permissions(raw: &str) -> Result<Vec<Permission>, String> {
    let mut permissions = Vec::new();
    for segment in raw.split(',') {
        let name = segment.trim();
        if name.is_empty() {
            continue;
        }
        permissions.push(name.parse::<Permission>()?);
    }
    Ok(normalize_permissions(permissions))
}

/// 序列化为逗号拼接的字符串
pub fn join_permissions(permissions: &[Permission]) -> String {
    normalize_permissions(permissions.to_vec())
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn normalize_permissions(mut permissions: Vec<Permission>) -> Vec<Permission> {
    permissions.sort();
    permissions.dedup();
    permissions
}

// 权限范围类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "privilege.ts")]
pub enum ScopeKind {
    University,
    Faculty,
    Department,
}

string_enum!(ScopeKind, "privilege scope" {
    University => "university",
    Faculty => "faculty",
    Department => "department",
});

/// 权限生效范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeScope {
    University(i64),
    Faculty(i64),
    Department(i64),
}

impl PrivilegeScope {
    pub fn new(kind: ScopeKind, id: i64) -> Self {
        match kind {
            ScopeKind::University => Self::University(id),
            ScopeKind::Faculty => Self::Faculty(id),
            ScopeKind::Department => Self::Department(id),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::University(_) => ScopeKind::University,
            Self::Faculty(_) => ScopeKind::Faculty,
            Self::Department(_) => ScopeKind::Department,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::University(id) | Self::Faculty(id) | Self::Department(id) => *id,
        }
    }

    /// 判断该范围是否覆盖目标对象
    pub fn covers(&self, target: &AccessTarget) -> bool {
        match (self, target) {
            // 学期等全局资源只能由大学级权限管理
            (Self::University(_), AccessTarget::Global) => true,
            (_, AccessTarget::Global) => false,
            (Self::University(id), AccessTarget::University(university_id)) => id == university_id,
            (_, AccessTarget::University(_)) => false,
            (Self::University(id), AccessTarget::College { university_id, .. }) => {
                id == university_id
            }
            (Self::Faculty(id), AccessTarget::College { college_id, .. }) => id == college_id,
            (Self::Department(_), AccessTarget::College { .. }) => false,
            (Self::University(id), AccessTarget::Department(lineage)) => {
                *id == lineage.university_id
            }
            (Self::Faculty(id), AccessTarget::Department(lineage)) => *id == lineage.college_id,
            (Self::Department(id), AccessTarget::Department(lineage)) => {
                *id == lineage.department_id
            }
        }
    }
}

/// 权限检查的目标对象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTarget {
    /// 不隶属任何组织的资源（学期、系统设置）
    Global,
    University(i64),
    College { college_id: i64, university_id: i64 },
    Department(DepartmentLineage),
}

// 管理员权限记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "privilege.ts")]
pub struct AdminPrivilege {
    pub id: i64,
    pub user_id: i64,
    pub scope: ScopeKind,
    pub scope_id: i64,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminPrivilege {
    pub fn privilege_scope(&self) -> PrivilegeScope {
        PrivilegeScope::new(self.scope, self.scope_id)
    }

    /// 该记录是否在目标范围内授予指定权限
    pub fn grants(&self, permission: Permission, target: &AccessTarget) -> bool {
        self.permissions.contains(&permission) && self.privilege_scope().covers(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage() -> DepartmentLineage {
        DepartmentLineage {
            department_id: 30,
            college_id: 20,
            university_id: 10,
        }
    }

    fn privilege(scope: ScopeKind, scope_id: i64, permissions: Vec<Permission>) -> AdminPrivilege {
        let now = Utc::now();
        AdminPrivilege {
            id: 1,
            user_id: 2,
            scope,
            scope_id,
            permissions,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_parse_permissions_trims_and_skips_empty() {
        let parsed = parse_permissions(" manage_courses, ,manage_students,,").expect("valid list");
        assert_eq!(
            parsed,
            vec![Permission::ManageStudents, Permission::ManageCourses]
        );
        assert!(parse_permissions("").expect("empty list").is_empty());
    }

    #[test]
    fn test_parse_permissions_rejects_unknown() {
        let err = parse_permissions("manage_courses,delete_everything").unwrap_err();
        assert!(err.contains("delete_everything"));
    }

    #[test]
    fn test_join_permissions_canonical_and_deduplicated() {
        let joined = join_permissions(&[
            Permission::ViewReports,
            Permission::ManageCourses,
            Permission::ViewReports,
            Permission::ManageOrganization,
        ]);
        assert_eq!(joined, "manage_organization,manage_courses,view_reports");
        assert_eq!(
            parse_permissions(&joined).expect("round trip"),
            vec![
                Permission::ManageOrganization,
                Permission::ManageCourses,
                Permission::ViewReports
            ]
        );
    }

    #[test]
    fn test_scope_covers_department_lineage() {
        let target = AccessTarget::Department(lineage());
        assert!(PrivilegeScope::University(10).covers(&target));
        assert!(PrivilegeScope::Faculty(20).covers(&target));
        assert!(PrivilegeScope::Department(30).covers(&target));
        assert!(!PrivilegeScope::University(11).covers(&target));
        assert!(!PrivilegeScope::Faculty(21).covers(&target));
        assert!(!PrivilegeScope::Department(31).covers(&target));
    }

    #[test]
    fn test_scope_covers_college_and_global() {
        let college = AccessTarget::College {
            college_id: 20,
            university_id: 10,
        };
        assert!(PrivilegeScope::University(10).covers(&college));
        assert!(PrivilegeScope::Faculty(20).covers(&college));
        assert!(!PrivilegeScope::Department(30).covers(&college));

        assert!(PrivilegeScope::University(99).covers(&AccessTarget::Global));
        assert!(!PrivilegeScope::Faculty(20).covers(&AccessTarget::Global));
        assert!(!PrivilegeScope::Faculty(20).covers(&AccessTarget::University(10)));
    }

    #[test]
    fn test_privilege_grants_requires_permission_and_scope() {
        let p = privilege(ScopeKind::Faculty, 20, vec![Permission::ManageStudents]);
        let target = AccessTarget::Department(lineage());
        assert!(p.grants(Permission::ManageStudents, &target));
        assert!(!p.grants(Permission::ManageCourses, &target));

        let other = AccessTarget::Department(DepartmentLineage {
            department_id: 31,
            college_id: 21,
            university_id: 10,
        });
        assert!(!p.grants(Permission::ManageStudents, &other));
    }
}
