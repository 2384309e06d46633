use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::privileges::requests::{GrantPrivilegeRequest, UpdatePrivilegeRequest};
use crate::models::users::entities::UserRole;
use crate::services::PrivilegeService;
use crate::utils::SafeIDI64;

static PRIVILEGE_SERVICE: Lazy<PrivilegeService> = Lazy::new(PrivilegeService::new_lazy);

pub async fn grant_privilege(
    req: HttpRequest,
    body: web::Json<GrantPrivilegeRequest>,
) -> ActixResult<HttpResponse> {
    PRIVILEGE_SERVICE.grant(body.into_inner(), &req).await
}

pub async fn list_user_privileges(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PRIVILEGE_SERVICE.list_for_user(user_id.0, &req).await
}

pub async fn update_privilege(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdatePrivilegeRequest>,
) -> ActixResult<HttpResponse> {
    PRIVILEGE_SERVICE.update(id.0, body.into_inner(), &req).await
}

pub async fn revoke_privilege(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PRIVILEGE_SERVICE.revoke(id.0, &req).await
}

pub fn configure_privilege_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/privileges")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::super_admin_roles(),
                    ))
                    .route("", web::post().to(grant_privilege))
                    .route("/users/{id}", web::get().to(list_user_privileges))
                    .route("/{id}", web::put().to(update_privilege))
                    .route("/{id}", web::delete().to(revoke_privilege)),
            ),
    );
}
