use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, load_course};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        entities::{MAX_CREDITS, MIN_CREDITS},
        requests::{CourseListParams, CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseDetailResponse,
    },
    privileges::entities::Permission,
};
use crate::services::{
    Respond, bad_request, not_found,
    privileges::{access_context, department_target},
    storage_error, write_error,
};
use crate::utils::validate::{validate_code, validate_name};

const MAX_TITLE_LEN: usize = 200;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    bad_request(ErrorCode::CourseInvalid, msg)
}

fn validate_credits(credits: i32) -> Respond<()> {
    if (MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
        Ok(())
    } else {
        Err(invalid(format!(
            "credits must be between {MIN_CREDITS} and {MAX_CREDITS}"
        )))
    }
}

fn validate_capacity(capacity: i32) -> Respond<()> {
    if capacity > 0 {
        Ok(())
    } else {
        Err(invalid("capacity must be greater than 0"))
    }
}

fn validate_create(req: &CreateCourseRequest) -> Respond<()> {
    validate_code(&req.code).map_err(invalid)?;
    validate_name(&req.title, MAX_TITLE_LEN).map_err(invalid)?;
    validate_credits(req.credits)?;
    validate_capacity(req.capacity)
}

fn validate_update(req: &UpdateCourseRequest) -> Respond<()> {
    if let Some(code) = &req.code {
        validate_code(code).map_err(invalid)?;
    }
    if let Some(title) = &req.title {
        validate_name(title, MAX_TITLE_LEN).map_err(invalid)?;
    }
    if let Some(credits) = req.credits {
        validate_credits(credits)?;
    }
    if let Some(capacity) = req.capacity {
        validate_capacity(capacity)?;
    }
    Ok(())
}

pub async fn list_courses(
    service: &CourseService,
    query: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_courses_with_pagination(CourseListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_course(
    service: &CourseService,
    mut req: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    req.code = req.code.trim().to_uppercase();
    try_or_respond!(validate_create(&req));

    let target = try_or_respond!(department_target(&storage, req.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageCourses, &target));

    match storage.create_course(req).await {
        Ok(course) => {
            tracing::info!("Course {} created by {}", course.code, ctx.user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                course,
                "Course created successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::CourseAlreadyExists,
            ErrorCode::CourseInvalid,
        )),
    }
}

/// 课程详情，附带先修要求
pub async fn get_course(
    service: &CourseService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let course = try_or_respond!(load_course(&storage, id).await);

    match storage.list_prerequisites(id).await {
        Ok(prerequisites) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseDetailResponse {
                course,
                prerequisites,
            },
            "Course retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

/// 更换院系时需要同时拥有两个院系的权限
pub async fn update_course(
    service: &CourseService,
    id: i64,
    mut req: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let course = try_or_respond!(load_course(&storage, id).await);

    let current = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageCourses, &current));

    if let Some(department_id) = req.department_id
        && department_id != course.department_id
    {
        let next = try_or_respond!(department_target(&storage, department_id).await);
        try_or_respond!(ctx.require(Permission::ManageCourses, &next));
    }

    req.code = req.code.map(|c| c.trim().to_uppercase());
    try_or_respond!(validate_update(&req));

    match storage.update_course(id, req).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::CourseAlreadyExists,
            ErrorCode::CourseInvalid,
        )),
    }
}

pub async fn delete_course(
    service: &CourseService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let course = try_or_respond!(load_course(&storage, id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageCourses, &target));

    match storage.delete_course(id).await {
        Ok(true) => {
            tracing::info!("Course {} deleted by {}", course.code, ctx.user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Course deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error(e, ErrorCode::CourseInvalid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCourseRequest {
        CreateCourseRequest {
            department_id: 1,
            code: "CS101".into(),
            title: "Introduction to Programming".into(),
            description: None,
            credits: 4,
            capacity: 120,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_create_bounds() {
        assert!(validate_create(&request()).is_ok());

        let mut req = request();
        req.credits = 0;
        assert!(validate_create(&req).is_err());
        req.credits = 13;
        assert!(validate_create(&req).is_err());

        let mut req = request();
        req.capacity = 0;
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_validate_update_partial() {
        assert!(validate_update(&UpdateCourseRequest::default()).is_ok());
        let req = UpdateCourseRequest {
            credits: Some(12),
            capacity: Some(-1),
            ..Default::default()
        };
        assert!(validate_update(&req).is_err());
    }
}
