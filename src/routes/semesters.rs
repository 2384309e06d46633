use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::semesters::requests::{
    CreateSemesterRequest, SemesterListParams, UpdateSemesterRequest,
};
use crate::services::SemesterService;
use crate::utils::SafeIDI64;

static SEMESTER_SERVICE: Lazy<SemesterService> = Lazy::new(SemesterService::new_lazy);

pub async fn list_semesters(
    req: HttpRequest,
    query: web::Query<SemesterListParams>,
) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.list_semesters(query.into_inner(), &req).await
}

pub async fn create_semester(
    req: HttpRequest,
    body: web::Json<CreateSemesterRequest>,
) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.create_semester(body.into_inner(), &req).await
}

pub async fn get_current_semester(req: HttpRequest) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.get_current_semester(&req).await
}

pub async fn get_semester(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.get_semester(id.0, &req).await
}

pub async fn get_semester_status(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.get_semester_status(id.0, &req).await
}

pub async fn update_semester(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateSemesterRequest>,
) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE
        .update_semester(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_semester(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.delete_semester(id.0, &req).await
}

pub async fn set_current_semester(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SEMESTER_SERVICE.set_current_semester(id.0, &req).await
}

pub fn configure_semester_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/semesters")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_semesters))
            .route("", web::post().to(create_semester))
            .route("/current", web::get().to(get_current_semester))
            .route("/{id}", web::get().to(get_semester))
            .route("/{id}", web::put().to(update_semester))
            .route("/{id}", web::delete().to(delete_semester))
            .route("/{id}/status", web::get().to(get_semester_status))
            .route("/{id}/current", web::post().to(set_current_semester)),
    );
}
