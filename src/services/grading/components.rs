use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GradingService, load_component};
use crate::models::{
    ApiResponse, ErrorCode,
    grading::{
        entities::GradingComponent,
        requests::{CreateGradingComponentRequest, UpdateGradingComponentRequest},
        responses::GradingSchemeResponse,
    },
    privileges::entities::Permission,
};
use crate::services::{
    Respond, bad_request, courses::load_course, not_found,
    privileges::{access_context, department_target},
    storage_error, unprocessable, write_error,
};
use crate::utils::validate::validate_name;

pub const MAX_TOTAL_WEIGHT: f64 = 100.0;
const WEIGHT_EPSILON: f64 = 1e-6;
const MAX_NAME_LEN: usize = 64;

/// 课程评分项权重合计，`excluding` 用于更新时扣除自身旧权重
pub fn total_weight(components: &[GradingComponent], excluding: Option<i64>) -> f64 {
    components
        .iter()
        .filter(|c| Some(c.id) != excluding)
        .map(|c| c.weight)
        .sum()
}

fn invalid(msg: impl Into<String>) -> HttpResponse {
    bad_request(ErrorCode::BadRequest, msg)
}

fn validate_weight(weight: f64) -> Respond<()> {
    if weight.is_finite() && weight > 0.0 && weight <= MAX_TOTAL_WEIGHT {
        Ok(())
    } else {
        Err(invalid("weight must be greater than 0 and at most 100"))
    }
}

fn validate_max_score(max_score: f64) -> Respond<()> {
    if max_score.is_finite() && max_score > 0.0 {
        Ok(())
    } else {
        Err(invalid("max_score must be greater than 0"))
    }
}

/// 满分不能低于已录入的得分
fn ensure_covers_recorded(max_score: f64, highest: Option<f64>) -> Respond<()> {
    match highest {
        Some(highest) if highest > max_score => Err(unprocessable(
            ErrorCode::GradingScoreInvalid,
            format!("max_score {max_score} is below an already recorded score of {highest}"),
        )),
        _ => Ok(()),
    }
}

fn ensure_weight_budget(existing: f64, added: f64) -> Respond<()> {
    if existing + added > MAX_TOTAL_WEIGHT + WEIGHT_EPSILON {
        Err(unprocessable(
            ErrorCode::GradingWeightExceeded,
            format!(
                "Total weight would be {:.2}, exceeding {MAX_TOTAL_WEIGHT}",
                existing + added
            ),
        ))
    } else {
        Ok(())
    }
}

pub async fn list_components(
    service: &GradingService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    try_or_respond!(load_course(&storage, course_id).await);

    match storage.list_grading_components(course_id).await {
        Ok(components) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GradingSchemeResponse {
                total_weight: total_weight(&components, None),
                components,
            },
            "Grading components retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_component(
    service: &GradingService,
    course_id: i64,
    mut req: CreateGradingComponentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let course = try_or_respond!(load_course(&storage, course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    req.name = req.name.trim().to_string();
    try_or_respond!(validate_name(&req.name, MAX_NAME_LEN).map_err(invalid));
    try_or_respond!(validate_weight(req.weight));
    try_or_respond!(validate_max_score(req.max_score));

    let existing = match storage.list_grading_components(course_id).await {
        Ok(components) => components,
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };
    try_or_respond!(ensure_weight_budget(
        total_weight(&existing, None),
        req.weight
    ));

    match storage.create_grading_component(course_id, req).await {
        Ok(component) => {
            tracing::info!(
                "Grading component '{}' added to {}",
                component.name,
                course.code
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                component,
                "Grading component created successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::GradingComponentAlreadyExists,
            ErrorCode::BadRequest,
        )),
    }
}

pub async fn update_component(
    service: &GradingService,
    id: i64,
    mut req: UpdateGradingComponentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let component = try_or_respond!(load_component(&storage, id).await);
    let course = try_or_respond!(load_course(&storage, component.course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    req.name = req.name.map(|n| n.trim().to_string());
    if let Some(name) = &req.name {
        try_or_respond!(validate_name(name, MAX_NAME_LEN).map_err(invalid));
    }
    if let Some(max_score) = req.max_score {
        try_or_respond!(validate_max_score(max_score));
        let highest = match storage.max_component_score(id).await {
            Ok(highest) => highest,
            Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
        };
        try_or_respond!(ensure_covers_recorded(max_score, highest));
    }
    if let Some(weight) = req.weight {
        try_or_respond!(validate_weight(weight));
        let siblings = match storage.list_grading_components(component.course_id).await {
            Ok(components) => components,
            Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
        };
        try_or_respond!(ensure_weight_budget(
            total_weight(&siblings, Some(id)),
            weight
        ));
    }

    match storage.update_grading_component(id, req).await {
        Ok(Some(component)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            component,
            "Grading component updated successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::GradingComponentNotFound,
            "Grading component not found",
        )),
        Err(e) => Ok(write_error(
            e,
            ErrorCode::GradingComponentAlreadyExists,
            ErrorCode::BadRequest,
        )),
    }
}

pub async fn delete_component(
    service: &GradingService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let component = try_or_respond!(load_component(&storage, id).await);
    let course = try_or_respond!(load_course(&storage, component.course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    match storage.delete_grading_component(id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Grading component deleted successfully",
        ))),
        Ok(false) => Ok(not_found(
            ErrorCode::GradingComponentNotFound,
            "Grading component not found",
        )),
        Err(e) => Ok(storage_error(e, ErrorCode::GradingComponentNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::ComponentType;
    use chrono::Utc;

    fn component(id: i64, weight: f64) -> GradingComponent {
        GradingComponent {
            id,
            course_id: 1,
            name: format!("c{id}"),
            component_type: ComponentType::Exam,
            weight,
            max_score: 100.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_weight_excluding_self() {
        let components = [component(1, 30.0), component(2, 45.5)];
        assert_eq!(total_weight(&components, None), 75.5);
        assert_eq!(total_weight(&components, Some(2)), 30.0);
    }

    #[test]
    fn test_weight_budget() {
        assert!(ensure_weight_budget(60.0, 40.0).is_ok());
        assert!(ensure_weight_budget(60.0, 40.5).is_err());
        // 浮点累加误差不应误判
        assert!(ensure_weight_budget(0.1 + 0.2 + 69.7, 30.0).is_ok());
    }

    #[test]
    fn test_component_field_bounds() {
        assert!(validate_weight(100.0).is_ok());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_max_score(0.0).is_err());
    }

    #[test]
    fn test_max_score_must_cover_recorded_scores() {
        assert!(ensure_covers_recorded(50.0, None).is_ok());
        assert!(ensure_covers_recorded(50.0, Some(50.0)).is_ok());

        let response = ensure_covers_recorded(40.0, Some(45.5)).expect_err("score above max");
        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
