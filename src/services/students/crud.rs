use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, ensure_can_read, load_student};
use crate::models::{
    ApiResponse, ErrorCode,
    privileges::entities::Permission,
    students::requests::{
        CreateStudentRequest, StudentListParams, StudentListQuery, UpdateStudentRequest,
    },
    users::entities::UserRole,
};
use crate::services::{
    Respond, bad_request, forbidden, not_found,
    privileges::{access_context, department_target},
    storage_error, unprocessable, write_error,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_email, validate_name, validate_student_number};
use std::sync::Arc;

const MAX_NAME_LEN: usize = 64;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    bad_request(ErrorCode::StudentInvalid, msg)
}

fn validate_create(req: &CreateStudentRequest) -> Respond<()> {
    validate_student_number(&req.student_number).map_err(invalid)?;
    validate_name(&req.first_name, MAX_NAME_LEN).map_err(invalid)?;
    validate_name(&req.last_name, MAX_NAME_LEN).map_err(invalid)?;
    validate_email(&req.email).map_err(invalid)?;
    if !(1900..=2200).contains(&req.enrollment_year) {
        return Err(invalid("enrollment_year is out of range"));
    }
    Ok(())
}

fn validate_update(req: &UpdateStudentRequest) -> Respond<()> {
    if let Some(first_name) = &req.first_name {
        validate_name(first_name, MAX_NAME_LEN).map_err(invalid)?;
    }
    if let Some(last_name) = &req.last_name {
        validate_name(last_name, MAX_NAME_LEN).map_err(invalid)?;
    }
    if let Some(email) = &req.email {
        validate_email(email).map_err(invalid)?;
    }
    if let Some(year) = req.enrollment_year
        && !(1900..=2200).contains(&year)
    {
        return Err(invalid("enrollment_year is out of range"));
    }
    Ok(())
}

/// 关联的登录账号必须存在且角色为学生
async fn ensure_linkable_user(storage: &Arc<dyn Storage>, user_id: i64) -> Respond<()> {
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.role == UserRole::Student => Ok(()),
        Ok(Some(_)) => Err(unprocessable(
            ErrorCode::StudentInvalid,
            "Linked user must have the student role",
        )),
        Ok(None) => Err(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Err(storage_error(e, ErrorCode::InternalServerError)),
    }
}

/// 超级管理员可查看全部；普通管理员必须按有权限的院系过滤；学生不能列出
pub async fn list_students(
    service: &StudentService,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    if ctx.is_student() {
        return Ok(forbidden("Students cannot list student records"));
    }
    if !ctx.is_super_admin() {
        let Some(department_id) = query.department_id else {
            return Ok(forbidden("department_id filter is required"));
        };
        let target = try_or_respond!(department_target(&storage, department_id).await);
        if !ctx.can(Permission::ManageStudents, &target)
            && !ctx.can(Permission::ViewReports, &target)
        {
            return Ok(forbidden("No access to students of this department"));
        }
    }

    match storage
        .list_students_with_pagination(StudentListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_student(
    service: &StudentService,
    mut req: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    req.email = req.email.trim().to_lowercase();
    try_or_respond!(validate_create(&req));

    let target = try_or_respond!(department_target(&storage, req.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageStudents, &target));

    if let Some(user_id) = req.user_id {
        try_or_respond!(ensure_linkable_user(&storage, user_id).await);
    }

    match storage.create_student(req).await {
        Ok(student) => {
            tracing::info!(
                "Student {} created by {}",
                student.student_number,
                ctx.user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                student,
                "Student created successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::StudentAlreadyExists,
            ErrorCode::StudentInvalid,
        )),
    }
}

pub async fn get_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let student = try_or_respond!(load_student(&storage, id).await);
    try_or_respond!(ensure_can_read(&storage, &ctx, &student).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        student,
        "Student retrieved successfully",
    )))
}

/// 转院系时需要同时拥有原院系与新院系的权限
pub async fn update_student(
    service: &StudentService,
    id: i64,
    mut req: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let student = try_or_respond!(load_student(&storage, id).await);

    let current = try_or_respond!(department_target(&storage, student.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageStudents, &current));

    if let Some(department_id) = req.department_id
        && department_id != student.department_id
    {
        let next = try_or_respond!(department_target(&storage, department_id).await);
        try_or_respond!(ctx.require(Permission::ManageStudents, &next));
    }

    req.email = req.email.map(|e| e.trim().to_lowercase());
    try_or_respond!(validate_update(&req));

    if let Some(user_id) = req.user_id {
        try_or_respond!(ensure_linkable_user(&storage, user_id).await);
    }

    match storage.update_student(id, req).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            student,
            "Student updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::StudentAlreadyExists,
            ErrorCode::StudentInvalid,
        )),
    }
}

pub async fn delete_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let student = try_or_respond!(load_student(&storage, id).await);

    let target = try_or_respond!(department_target(&storage, student.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageStudents, &target));

    match storage.delete_student(id).await {
        Ok(true) => {
            tracing::info!(
                "Student {} deleted by {}",
                student.student_number,
                ctx.user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Student deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::StudentInvalid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateStudentRequest {
        CreateStudentRequest {
            user_id: None,
            student_number: "S2025001".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.edu".into(),
            department_id: 1,
            enrollment_year: 2025,
            status: None,
        }
    }

    #[test]
    fn test_validate_create_accepts_valid_request() {
        assert!(validate_create(&request()).is_ok());
    }

    #[test]
    fn test_validate_create_rejects_bad_fields() {
        let mut req = request();
        req.student_number = "S-1".into();
        assert!(validate_create(&req).is_err());

        let mut req = request();
        req.email = "not-an-email".into();
        assert!(validate_create(&req).is_err());

        let mut req = request();
        req.enrollment_year = 1800;
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_validate_update_checks_only_present_fields() {
        assert!(validate_update(&UpdateStudentRequest::default()).is_ok());
        let req = UpdateStudentRequest {
            last_name: Some(" ".into()),
            ..Default::default()
        };
        assert!(validate_update(&req).is_err());
    }
}
