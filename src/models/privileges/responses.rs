use super::entities::AdminPrivilege;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "privilege.ts")]
pub struct PrivilegeListResponse {
    pub user_id: i64,
    pub items: Vec<AdminPrivilege>,
}
