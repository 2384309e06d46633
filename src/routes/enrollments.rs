use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::enrollments::requests::{
    BulkEnrollRequest, EligibilityQuery, EnrollRequest, EnrollmentListParams, FinalGradeRequest,
};
use crate::services::EnrollmentService;
use crate::utils::SafeIDI64;

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn list_enrollments(
    req: HttpRequest,
    query: web::Query<EnrollmentListParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_enrollments(query.into_inner(), &req)
        .await
}

pub async fn enroll(req: HttpRequest, body: web::Json<EnrollRequest>) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.enroll(body.into_inner(), &req).await
}

pub async fn check_eligibility(
    req: HttpRequest,
    query: web::Query<EligibilityQuery>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .check_eligibility(query.into_inner(), &req)
        .await
}

pub async fn bulk_enroll(
    req: HttpRequest,
    body: web::Json<BulkEnrollRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.bulk_enroll(body.into_inner(), &req).await
}

pub async fn get_enrollment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.get_enrollment(id.0, &req).await
}

pub async fn drop_enrollment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.drop_enrollment(id.0, &req).await
}

pub async fn record_final_grade(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<FinalGradeRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .record_final_grade(id.0, body.into_inner(), &req)
        .await
}

// 固定路径需注册在 /{id} 之前
pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_enrollments))
            .route("", web::post().to(enroll))
            .route("/eligibility", web::get().to(check_eligibility))
            .service(
                web::resource("/bulk")
                    .wrap(RateLimit::bulk_enroll())
                    .route(web::post().to(bulk_enroll)),
            )
            .route("/{id}", web::get().to(get_enrollment))
            .route("/{id}/drop", web::post().to(drop_enrollment))
            .route("/{id}/final-grade", web::put().to(record_final_grade)),
    );
}
