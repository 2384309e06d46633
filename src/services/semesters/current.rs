use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::{SemesterService, load_semester};
use crate::models::{
    ApiResponse, ErrorCode,
    privileges::entities::{AccessTarget, Permission},
    semesters::responses::SemesterStatusResponse,
};
use crate::services::{not_found, privileges::access_context, storage_error};

pub async fn get_current_semester(
    service: &SemesterService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_current_semester().await {
        Ok(Some(semester)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SemesterStatusResponse {
                registration_open: semester.is_registration_open(Utc::now()),
                semester,
            },
            "Current semester retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::SemesterNotFound,
            "No current semester configured",
        )),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

/// 同一时刻只有一个当前学期，由存储层在事务中清除旧标记
pub async fn set_current_semester(
    service: &SemesterService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    try_or_respond!(ctx.require(Permission::ManageSemesters, &AccessTarget::Global));

    match storage.set_current_semester(id).await {
        Ok(Some(semester)) => {
            tracing::info!("Semester {} marked current by {}", semester.name, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                semester,
                "Current semester updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::SemesterNotFound, "Semester not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::SemesterInvalid)),
    }
}

pub async fn get_semester_status(
    service: &SemesterService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let semester = try_or_respond!(load_semester(&storage, id).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SemesterStatusResponse {
            registration_open: semester.is_registration_open(Utc::now()),
            semester,
        },
        "Semester status retrieved successfully",
    )))
}
