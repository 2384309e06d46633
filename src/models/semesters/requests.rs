use super::entities::Term;
use crate::models::common::{PaginationQuery, deserialize_optional_from_str};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "semester.ts")]
pub struct CreateSemesterRequest {
    pub name: String,
    pub term: Term,
    pub year: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "semester.ts")]
pub struct UpdateSemesterRequest {
    pub name: Option<String>,
    pub term: Option<Term>,
    pub year: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "semester.ts")]
pub struct SemesterListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub year: Option<i32>,
    pub term: Option<Term>,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct SemesterListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub year: Option<i32>,
    pub term: Option<Term>,
}

impl From<SemesterListParams> for SemesterListQuery {
    fn from(params: SemesterListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            year: params.year,
            term: params.term,
        }
    }
}
