use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SemesterService, load_semester};
use crate::models::{
    ApiResponse, ErrorCode,
    privileges::entities::{AccessTarget, Permission},
    semesters::{
        entities::{Semester, SemesterDates},
        requests::{
            CreateSemesterRequest, SemesterListParams, SemesterListQuery, UpdateSemesterRequest,
        },
    },
};
use crate::services::{
    Respond, bad_request, not_found, privileges::access_context, storage_error, write_error,
};
use crate::utils::validate::validate_name;

const MAX_NAME_LEN: usize = 64;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    bad_request(ErrorCode::SemesterInvalid, msg)
}

fn validate_year(year: i32) -> Respond<()> {
    if (1900..=2200).contains(&year) {
        Ok(())
    } else {
        Err(invalid("year is out of range"))
    }
}

fn validate_create(req: &CreateSemesterRequest) -> Respond<()> {
    validate_name(&req.name, MAX_NAME_LEN).map_err(invalid)?;
    validate_year(req.year)?;
    SemesterDates {
        start_date: req.start_date,
        end_date: req.end_date,
        registration_start: req.registration_start,
        registration_end: req.registration_end,
    }
    .validate()
    .map_err(invalid)
}

/// 部分更新时把新值合并到现有日期上再整体校验
fn merged_dates(existing: &Semester, req: &UpdateSemesterRequest) -> SemesterDates {
    let current = existing.dates();
    SemesterDates {
        start_date: req.start_date.unwrap_or(current.start_date),
        end_date: req.end_date.unwrap_or(current.end_date),
        registration_start: req.registration_start.unwrap_or(current.registration_start),
        registration_end: req.registration_end.unwrap_or(current.registration_end),
    }
}

fn validate_update(existing: &Semester, req: &UpdateSemesterRequest) -> Respond<()> {
    if let Some(name) = &req.name {
        validate_name(name, MAX_NAME_LEN).map_err(invalid)?;
    }
    if let Some(year) = req.year {
        validate_year(year)?;
    }
    merged_dates(existing, req).validate().map_err(invalid)
}

pub async fn list_semesters(
    service: &SemesterService,
    query: SemesterListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_semesters_with_pagination(SemesterListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Semesters retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_semester(
    service: &SemesterService,
    mut req: CreateSemesterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageSemesters, &AccessTarget::Global));

    req.name = req.name.trim().to_string();
    try_or_respond!(validate_create(&req));

    match storage.create_semester(req).await {
        Ok(semester) => {
            tracing::info!("Semester {} created by {}", semester.name, ctx.user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                semester,
                "Semester created successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::SemesterAlreadyExists,
            ErrorCode::SemesterInvalid,
        )),
    }
}

pub async fn get_semester(
    service: &SemesterService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let semester = try_or_respond!(load_semester(&storage, id).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        semester,
        "Semester retrieved successfully",
    )))
}

pub async fn update_semester(
    service: &SemesterService,
    id: i64,
    mut req: UpdateSemesterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageSemesters, &AccessTarget::Global));

    let existing = try_or_respond!(load_semester(&storage, id).await);
    req.name = req.name.map(|n| n.trim().to_string());
    try_or_respond!(validate_update(&existing, &req));

    match storage.update_semester(id, req).await {
        Ok(Some(semester)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            semester,
            "Semester updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::SemesterNotFound, "Semester not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::SemesterAlreadyExists,
            ErrorCode::SemesterInvalid,
        )),
    }
}

pub async fn delete_semester(
    service: &SemesterService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageSemesters, &AccessTarget::Global));

    match storage.delete_semester(id).await {
        Ok(true) => {
            tracing::info!("Semester {} deleted by {}", id, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Semester deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::SemesterNotFound, "Semester not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::SemesterInvalid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::semesters::entities::Term;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    fn semester() -> Semester {
        Semester {
            id: 1,
            name: "Fall 2025".into(),
            term: Term::Fall,
            year: 2025,
            start_date: at(9, 1),
            end_date: at(12, 20),
            registration_start: at(8, 1),
            registration_end: at(9, 15),
            is_current: false,
            created_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    #[test]
    fn test_update_merges_with_existing_dates() {
        let existing = semester();

        // 只改报名截止日，仍在学期结束之前
        let ok = UpdateSemesterRequest {
            registration_end: Some(at(9, 30)),
            ..Default::default()
        };
        assert!(validate_update(&existing, &ok).is_ok());

        // 单独把开始日期挪到结束日期之后
        let bad = UpdateSemesterRequest {
            start_date: Some(at(12, 25)),
            ..Default::default()
        };
        assert!(validate_update(&existing, &bad).is_err());
    }

    #[test]
    fn test_create_rejects_inverted_registration_window() {
        let req = CreateSemesterRequest {
            name: "Spring 2026".into(),
            term: Term::Spring,
            year: 2026,
            start_date: at(2, 1),
            end_date: at(6, 1),
            registration_start: at(2, 10),
            registration_end: at(1, 10),
            is_current: false,
        };
        assert!(validate_create(&req).is_err());
    }
}
