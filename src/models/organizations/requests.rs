use crate::models::common::{PaginationQuery, deserialize_optional_from_str};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct CreateUniversityRequest {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct UpdateUniversityRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct CreateCollegeRequest {
    pub university_id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct UpdateCollegeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct CreateDepartmentRequest {
    pub college_id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub code: Option<String>,
}

/// 组织架构列表查询参数
///
/// `parent_id` 对学院列表表示所属大学，对院系列表表示所属学院。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct OrganizationListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub parent_id: Option<i64>,
    pub search: Option<String>,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct OrganizationListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub parent_id: Option<i64>,
    pub search: Option<String>,
}

impl From<OrganizationListParams> for OrganizationListQuery {
    fn from(params: OrganizationListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            parent_id: params.parent_id,
            search: params.search,
        }
    }
}
