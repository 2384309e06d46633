use super::entities::{Permission, ScopeKind};
use serde::Deserialize;
use ts_rs::TS;

/// 授予权限，同一用户同一范围已存在记录时合并权限
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "privilege.ts")]
pub struct GrantPrivilegeRequest {
    pub user_id: i64,
    pub scope: ScopeKind,
    pub scope_id: i64,
    pub permissions: Vec<Permission>,
}

/// 替换权限列表
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "privilege.ts")]
pub struct UpdatePrivilegeRequest {
    pub permissions: Vec<Permission>,
}
