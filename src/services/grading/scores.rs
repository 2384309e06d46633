//! 评分项得分与总评
//!
//! 总评 = Σ(得分 / 满分 × 权重) / Σ权重 × 100，保留两位小数。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{GradingService, load_component};
use crate::models::{
    ApiResponse, ErrorCode,
    enrollments::entities::EnrollmentStatus,
    grading::{
        entities::{ComponentScore, GradingComponent},
        requests::RecordScoreRequest,
        responses::{EnrollmentScoresResponse, FinalizeGradeResponse},
    },
    privileges::entities::Permission,
};
use crate::services::{
    bad_request, courses::load_course,
    enrollments::{
        load_enrollment,
        manage::{apply_final_grade, ensure_can_view},
    },
    privileges::{access_context, department_target},
    storage_error,
    system::DynamicConfig,
    unprocessable,
};

const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum ScoringGap {
    NoComponents,
    WeightsIncomplete(f64),
    MissingScore(String),
}

impl ScoringGap {
    pub fn message(&self) -> String {
        match self {
            Self::NoComponents => "Course has no grading components".to_string(),
            Self::WeightsIncomplete(total) => {
                format!("Component weights total {total:.2}, expected 100")
            }
            Self::MissingScore(name) => format!("No score recorded for component '{name}'"),
        }
    }
}

/// 按权重计算总评
///
/// 要求权重合计为 100 且每个评分项都有得分。
pub fn weighted_final_score(
    components: &[GradingComponent],
    scores: &[ComponentScore],
) -> Result<f64, ScoringGap> {
    if components.is_empty() {
        return Err(ScoringGap::NoComponents);
    }

    let total: f64 = components.iter().map(|c| c.weight).sum();
    if (total - 100.0).abs() > WEIGHT_EPSILON {
        return Err(ScoringGap::WeightsIncomplete(total));
    }

    let by_component: HashMap<i64, f64> =
        scores.iter().map(|s| (s.component_id, s.score)).collect();

    let mut weighted = 0.0;
    for component in components {
        let Some(score) = by_component.get(&component.id) else {
            return Err(ScoringGap::MissingScore(component.name.clone()));
        };
        weighted += score / component.max_score * component.weight;
    }

    Ok((weighted / total * 100.0 * 100.0).round() / 100.0)
}

pub async fn record_score(
    service: &GradingService,
    enrollment_id: i64,
    req: RecordScoreRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, enrollment_id).await);
    let component = try_or_respond!(load_component(&storage, req.component_id).await);

    if component.course_id != enrollment.course_id {
        return Ok(bad_request(
            ErrorCode::GradingScoreInvalid,
            "Grading component does not belong to this enrollment's course",
        ));
    }

    let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);
    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    if enrollment.status == EnrollmentStatus::Dropped {
        return Ok(unprocessable(
            ErrorCode::EnrollmentStatusInvalid,
            "Dropped enrollments cannot be graded",
        ));
    }
    if !req.score.is_finite() || req.score < 0.0 || req.score > component.max_score {
        return Ok(bad_request(
            ErrorCode::GradingScoreInvalid,
            format!("score must be between 0 and {}", component.max_score),
        ));
    }

    match storage
        .upsert_component_score(enrollment.id, component.id, req.score, ctx.user.id)
        .await
    {
        Ok(score) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            score,
            "Score recorded successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::GradingScoreInvalid)),
    }
}

pub async fn list_scores(
    service: &GradingService,
    enrollment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, enrollment_id).await);
    let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);
    try_or_respond!(ensure_can_view(&storage, &ctx, &enrollment, course.department_id).await);

    match storage.list_component_scores(enrollment_id).await {
        Ok(scores) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentScoresResponse {
                enrollment_id,
                scores,
            },
            "Scores retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn finalize_grade(
    service: &GradingService,
    enrollment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, enrollment_id).await);
    let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    let components = match storage.list_grading_components(course.id).await {
        Ok(components) => components,
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };
    let scores = match storage.list_component_scores(enrollment_id).await {
        Ok(scores) => scores,
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };

    let final_score = match weighted_final_score(&components, &scores) {
        Ok(score) => score,
        Err(gap) => return Ok(unprocessable(ErrorCode::GradingIncomplete, gap.message())),
    };

    let rules = DynamicConfig::registration_rules().await;
    let (updated, letter) =
        try_or_respond!(apply_final_grade(&storage, &enrollment, final_score, &rules).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        FinalizeGradeResponse {
            enrollment: updated,
            final_score,
            letter_grade: letter.to_string(),
        },
        "Grade finalized successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::ComponentType;
    use chrono::Utc;

    fn component(id: i64, weight: f64, max_score: f64) -> GradingComponent {
        GradingComponent {
            id,
            course_id: 1,
            name: format!("part-{id}"),
            component_type: ComponentType::Assignment,
            weight,
            max_score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn score(component_id: i64, score: f64) -> ComponentScore {
        ComponentScore {
            id: component_id,
            enrollment_id: 1,
            component_id,
            score,
            graded_by: Some(1),
            graded_at: Utc::now(),
        }
    }

    #[test]
    fn test_weighted_score_normalizes_max_scores() {
        // 期中 40% 满分 50 得 40；期末 60% 满分 100 得 90
        let components = [component(1, 40.0, 50.0), component(2, 60.0, 100.0)];
        let scores = [score(1, 40.0), score(2, 90.0)];
        assert_eq!(weighted_final_score(&components, &scores), Ok(86.0));
    }

    #[test]
    fn test_weighted_score_rounds_to_two_places() {
        let components = [component(1, 100.0, 3.0)];
        assert_eq!(weighted_final_score(&components, &[score(1, 2.0)]), Ok(66.67));
    }

    #[test]
    fn test_missing_score_is_reported() {
        let components = [component(1, 50.0, 100.0), component(2, 50.0, 100.0)];
        assert_eq!(
            weighted_final_score(&components, &[score(1, 70.0)]),
            Err(ScoringGap::MissingScore("part-2".into()))
        );
    }

    #[test]
    fn test_weights_must_total_100() {
        let components = [component(1, 40.0, 100.0)];
        assert_eq!(
            weighted_final_score(&components, &[score(1, 70.0)]),
            Err(ScoringGap::WeightsIncomplete(40.0))
        );
        assert_eq!(
            weighted_final_score(&[], &[]),
            Err(ScoringGap::NoComponents)
        );
    }
}
