use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::organizations::requests::{
    CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
    OrganizationListParams, UpdateCollegeRequest, UpdateDepartmentRequest,
    UpdateUniversityRequest,
};
use crate::services::OrganizationService;
use crate::utils::SafeIDI64;

static ORGANIZATION_SERVICE: Lazy<OrganizationService> =
    Lazy::new(OrganizationService::new_lazy);

// 大学
pub async fn list_universities(
    req: HttpRequest,
    query: web::Query<OrganizationListParams>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .list_universities(query.into_inner(), &req)
        .await
}

pub async fn create_university(
    req: HttpRequest,
    body: web::Json<CreateUniversityRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .create_university(body.into_inner(), &req)
        .await
}

pub async fn get_university(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.get_university(id.0, &req).await
}

pub async fn get_university_tree(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.get_university_tree(id.0, &req).await
}

pub async fn update_university(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateUniversityRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .update_university(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_university(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.delete_university(id.0, &req).await
}

// 学院
pub async fn list_colleges(
    req: HttpRequest,
    query: web::Query<OrganizationListParams>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .list_colleges(query.into_inner(), &req)
        .await
}

pub async fn create_college(
    req: HttpRequest,
    body: web::Json<CreateCollegeRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .create_college(body.into_inner(), &req)
        .await
}

pub async fn get_college(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.get_college(id.0, &req).await
}

pub async fn update_college(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCollegeRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .update_college(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_college(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.delete_college(id.0, &req).await
}

// 院系
pub async fn list_departments(
    req: HttpRequest,
    query: web::Query<OrganizationListParams>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .list_departments(query.into_inner(), &req)
        .await
}

pub async fn create_department(
    req: HttpRequest,
    body: web::Json<CreateDepartmentRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .create_department(body.into_inner(), &req)
        .await
}

pub async fn get_department(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.get_department(id.0, &req).await
}

pub async fn update_department(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateDepartmentRequest>,
) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE
        .update_department(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_department(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ORGANIZATION_SERVICE.delete_department(id.0, &req).await
}

// 读取对所有登录用户开放，写操作的权限由服务层按组织范围判定
pub fn configure_organization_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/universities")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_universities))
            .route("", web::post().to(create_university))
            .route("/{id}", web::get().to(get_university))
            .route("/{id}", web::put().to(update_university))
            .route("/{id}", web::delete().to(delete_university))
            .route("/{id}/tree", web::get().to(get_university_tree)),
    )
    .service(
        web::scope("/api/v1/colleges")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_colleges))
            .route("", web::post().to(create_college))
            .route("/{id}", web::get().to(get_college))
            .route("/{id}", web::put().to(update_college))
            .route("/{id}", web::delete().to(delete_college)),
    )
    .service(
        web::scope("/api/v1/departments")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_departments))
            .route("", web::post().to(create_department))
            .route("/{id}", web::get().to(get_department))
            .route("/{id}", web::put().to(update_department))
            .route("/{id}", web::delete().to(delete_department)),
    );
}
