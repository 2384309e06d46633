use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grading::requests::{
    CreateGradingComponentRequest, RecordScoreRequest, UpdateGradingComponentRequest,
};
use crate::services::GradingService;
use crate::utils::SafeIDI64;

static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

// 评分项，{id} 为课程 ID
pub async fn list_components(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list_components(course_id.0, &req).await
}

pub async fn create_component(
    req: HttpRequest,
    course_id: SafeIDI64,
    body: web::Json<CreateGradingComponentRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .create_component(course_id.0, body.into_inner(), &req)
        .await
}

pub async fn update_component(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateGradingComponentRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .update_component(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_component(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.delete_component(id.0, &req).await
}

// 得分，{id} 为选课记录 ID
pub async fn list_scores(req: HttpRequest, enrollment_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list_scores(enrollment_id.0, &req).await
}

pub async fn record_score(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
    body: web::Json<RecordScoreRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .record_score(enrollment_id.0, body.into_inner(), &req)
        .await
}

pub async fn finalize_grade(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.finalize_grade(enrollment_id.0, &req).await
}

pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading")
            .wrap(middlewares::RequireJWT)
            .route("/courses/{id}/components", web::get().to(list_components))
            .route("/courses/{id}/components", web::post().to(create_component))
            .route("/components/{id}", web::put().to(update_component))
            .route("/components/{id}", web::delete().to(delete_component))
            .route("/enrollments/{id}/scores", web::get().to(list_scores))
            .route("/enrollments/{id}/scores", web::put().to(record_score))
            .route("/enrollments/{id}/finalize", web::post().to(finalize_grade)),
    );
}
