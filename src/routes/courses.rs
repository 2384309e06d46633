use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    AddPrerequisiteRequest, CourseListParams, CreateCourseRequest, UpdateCourseRequest,
};
use crate::services::CourseService;
use crate::utils::{SafeIDI64, SafePrerequisiteIdI64};

static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(id.0, &req).await
}

pub async fn update_course(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(id.0, &req).await
}

// 先修课程
pub async fn list_prerequisites(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_prerequisites(id.0, &req).await
}

pub async fn add_prerequisite(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<AddPrerequisiteRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .add_prerequisite(id.0, body.into_inner(), &req)
        .await
}

pub async fn remove_prerequisite(
    req: HttpRequest,
    id: SafeIDI64,
    prerequisite_id: SafePrerequisiteIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .remove_prerequisite(id.0, prerequisite_id.0, &req)
        .await
}

pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/{id}", web::get().to(get_course))
            .route("/{id}", web::put().to(update_course))
            .route("/{id}", web::delete().to(delete_course))
            .route("/{id}/prerequisites", web::get().to(list_prerequisites))
            .route("/{id}/prerequisites", web::post().to(add_prerequisite))
            .route(
                "/{id}/prerequisites/{prerequisite_id}",
                web::delete().to(remove_prerequisite),
            ),
    );
}
