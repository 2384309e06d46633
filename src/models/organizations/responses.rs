use super::entities::{College, Department, University};
use serde::Serialize;
use ts_rs::TS;

/// 大学及其下属学院、院系
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct UniversityTreeResponse {
    pub university: University,
    pub colleges: Vec<CollegeNode>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct CollegeNode {
    pub college: College,
    pub departments: Vec<Department>,
}
