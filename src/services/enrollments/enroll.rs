use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;

use super::{
    EnrollmentService,
    eligibility::{check_student, load_prerequisites},
    resolve_student,
};
use crate::config::AppConfig;
use crate::errors::CampusError;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::Course,
    enrollments::{
        entities::Enrollment,
        requests::{BulkEnrollRequest, EnrollRequest},
        responses::{BulkEnrollOutcome, BulkEnrollResponse, BulkEnrollResult, EnrollmentRejection},
    },
    privileges::entities::Permission,
    semesters::entities::Semester,
    students::entities::Student,
    system::entities::RegistrationRules,
};
use crate::services::{
    Respond, bad_request, courses::load_course, forbidden,
    privileges::{access_context, department_target},
    semesters::load_semester, system::DynamicConfig, write_error,
};
use crate::storage::Storage;

/// 去重并保持首次出现的顺序
pub fn dedupe_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// 去重后检查批量请求的学生数
pub(crate) fn prepare_bulk_ids(ids: &[i64], limit: usize) -> Respond<Vec<i64>> {
    let student_ids = dedupe_ids(ids);
    if student_ids.is_empty() {
        return Err(bad_request(ErrorCode::BadRequest, "student_ids must not be empty"));
    }
    if student_ids.len() > limit {
        return Err(bad_request(
            ErrorCode::BulkEnrollLimitExceeded,
            format!("At most {limit} students can be enrolled per request"),
        ));
    }
    Ok(student_ids)
}

/// 判定资格并创建选课记录
///
/// 不满足条件时返回 422，响应体带有全部原因。
pub(crate) async fn enroll_student(
    storage: &Arc<dyn Storage>,
    student: &Student,
    course: &Course,
    semester: &Semester,
    rules: &RegistrationRules,
) -> Respond<Enrollment> {
    let prerequisites = load_prerequisites(storage, course.id).await?;
    let reasons = check_student(storage, student, course, semester, &prerequisites, rules).await?;

    if !reasons.is_empty() {
        tracing::info!(
            "Enrollment of {} in {} rejected: {} reason(s)",
            student.student_number,
            course.code,
            reasons.len()
        );
        return Err(HttpResponse::UnprocessableEntity().json(ApiResponse::error(
            ErrorCode::EnrollmentNotEligible,
            EnrollmentRejection { reasons },
            "Student is not eligible for this course",
        )));
    }

    let enrollment = storage
        .create_enrollment(student.id, course.id, semester.id)
        .await
        .map_err(|e| {
            write_error(
                e,
                ErrorCode::EnrollmentNotEligible,
                ErrorCode::EnrollmentNotEligible,
            )
        })?;
    tracing::info!(
        "Student {} enrolled in {} ({})",
        student.student_number,
        course.code,
        semester.name
    );
    Ok(enrollment)
}

pub async fn enroll(
    service: &EnrollmentService,
    req: EnrollRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    let course = try_or_respond!(load_course(&storage, req.course_id).await);
    let semester = try_or_respond!(load_semester(&storage, req.semester_id).await);
    let student =
        try_or_respond!(resolve_student(&storage, &ctx, req.student_id, &course, true).await);

    let rules = DynamicConfig::registration_rules().await;
    let enrollment =
        try_or_respond!(enroll_student(&storage, &student, &course, &semester, &rules).await);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        enrollment,
        "Enrolled successfully",
    )))
}

/// 逐个学生判定并选课，单个失败不影响其他学生
pub(crate) async fn enroll_many(
    storage: &Arc<dyn Storage>,
    course: &Course,
    semester: &Semester,
    student_ids: &[i64],
    rules: &RegistrationRules,
) -> Respond<Vec<BulkEnrollResult>> {
    let prerequisites = load_prerequisites(storage, course.id).await?;

    let mut results = Vec::with_capacity(student_ids.len());
    for &student_id in student_ids {
        let student = match storage.get_student_by_id(student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => {
                results.push(failed(student_id, "Student not found".to_string()));
                continue;
            }
            Err(e) => {
                results.push(failed(student_id, failure_message(e)));
                continue;
            }
        };

        // 每次都重新读取在修人数，前一个学生占用的名额会被计入
        let reasons =
            match check_student(storage, &student, course, semester, &prerequisites, rules).await
            {
                Ok(reasons) => reasons,
                Err(_) => {
                    results.push(failed(student_id, "Eligibility check failed".to_string()));
                    continue;
                }
            };
        if !reasons.is_empty() {
            results.push(BulkEnrollResult {
                student_id,
                outcome: BulkEnrollOutcome::Skipped,
                enrollment_id: None,
                reasons,
                message: None,
            });
            continue;
        }

        match storage
            .create_enrollment(student.id, course.id, semester.id)
            .await
        {
            Ok(enrollment) => results.push(BulkEnrollResult {
                student_id,
                outcome: BulkEnrollOutcome::Enrolled,
                enrollment_id: Some(enrollment.id),
                reasons: Vec::new(),
                message: None,
            }),
            Err(e) => {
                tracing::warn!("Bulk enrollment of student {} failed: {}", student_id, e);
                results.push(failed(student_id, failure_message(e)));
            }
        }
    }
    Ok(results)
}

pub async fn bulk_enroll(
    service: &EnrollmentService,
    req: BulkEnrollRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    if ctx.is_student() {
        return Ok(forbidden("Students cannot bulk enroll"));
    }

    let student_ids = try_or_respond!(prepare_bulk_ids(
        &req.student_ids,
        AppConfig::get().registration.bulk_enroll_limit
    ));

    let course = try_or_respond!(load_course(&storage, req.course_id).await);
    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageEnrollments, &target));
    let semester = try_or_respond!(load_semester(&storage, req.semester_id).await);

    let rules = DynamicConfig::registration_rules().await;
    let results =
        try_or_respond!(enroll_many(&storage, &course, &semester, &student_ids, &rules).await);

    let response = BulkEnrollResponse::from_results(results);
    tracing::info!(
        "Bulk enrollment into {} by {}: {} enrolled, {} skipped, {} failed",
        course.code,
        ctx.user.id,
        response.enrolled,
        response.skipped,
        response.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Bulk enrollment processed",
    )))
}

/// 只向客户端透露业务冲突的原因，其余错误统一描述
fn failure_message(err: CampusError) -> String {
    match err {
        CampusError::Conflict(msg) | CampusError::RuleViolation(msg) => msg,
        other => {
            tracing::error!("{}", other.format_simple());
            "Internal error while enrolling".to_string()
        }
    }
}

fn failed(student_id: i64, message: String) -> BulkEnrollResult {
    BulkEnrollResult {
        student_id,
        outcome: BulkEnrollOutcome::Failed,
        enrollment_id: None,
        reasons: Vec::new(),
        message: Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrollments::entities::IneligibilityReason;
    use crate::services::enrollments::fixtures;
    use actix_web::http::StatusCode;

    #[test]
    fn test_dedupe_preserves_first_occurrence() {
        assert_eq!(dedupe_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedupe_ids(&[]).is_empty());
    }

    #[test]
    fn test_bulk_totals() {
        let response = BulkEnrollResponse::from_results(vec![
            BulkEnrollResult {
                student_id: 1,
                outcome: BulkEnrollOutcome::Enrolled,
                enrollment_id: Some(10),
                reasons: Vec::new(),
                message: None,
            },
            failed(2, "Student not found".into()),
        ]);
        assert_eq!(response.total, 2);
        assert_eq!(response.enrolled, 1);
        assert_eq!(response.failed, 1);
        assert_eq!(response.skipped, 0);
    }

    #[test]
    fn test_prepare_bulk_ids_checks_size() {
        assert_eq!(prepare_bulk_ids(&[4, 4, 5], 2).ok(), Some(vec![4, 5]));

        let empty = prepare_bulk_ids(&[], 10).expect_err("empty list rejected");
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let ids: Vec<i64> = (1..=4).collect();
        let over = prepare_bulk_ids(&ids, 3).expect_err("over the limit");
        assert_eq!(over.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_limit_error_carries_code() {
        let ids: Vec<i64> = (1..=501).collect();
        let response = prepare_bulk_ids(&ids, 500).expect_err("over the limit");
        let body = fixtures::body_json(response).await;
        assert_eq!(body["code"], ErrorCode::BulkEnrollLimitExceeded as i32);
    }

    #[actix_web::test]
    async fn test_ineligible_enrollment_returns_reasons() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS101", 1, false).await;
        let semester = fixtures::semester(&storage).await;
        let first = fixtures::student(&storage, department_id, "S001").await;
        let second = fixtures::student(&storage, department_id, "S002").await;
        storage
            .create_enrollment(first.id, course.id, semester.id)
            .await
            .expect("seed enrollment");

        let response = enroll_student(&storage, &second, &course, &semester, &fixtures::rules())
            .await
            .expect_err("ineligible student");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = fixtures::body_json(response).await;
        assert_eq!(body["code"], ErrorCode::EnrollmentNotEligible as i32);
        let rules: Vec<&str> = body["data"]["reasons"]
            .as_array()
            .expect("reasons array")
            .iter()
            .filter_map(|r| r["rule"].as_str())
            .collect();
        assert_eq!(rules, vec!["course_inactive", "course_full"]);

        let count = storage
            .count_active_enrollments(course.id, semester.id)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn test_eligible_enrollment_is_created() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS102", 10, true).await;
        let semester = fixtures::semester(&storage).await;
        let student = fixtures::student(&storage, department_id, "S001").await;

        let enrollment =
            enroll_student(&storage, &student, &course, &semester, &fixtures::rules())
                .await
                .expect("eligible student");
        assert_eq!(enrollment.student_id, student.id);
        assert_eq!(enrollment.course_id, course.id);
    }

    #[actix_web::test]
    async fn test_bulk_enroll_stops_at_capacity() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS201", 2, true).await;
        let semester = fixtures::semester(&storage).await;

        let mut ids = Vec::new();
        for number in ["S001", "S002", "S003"] {
            ids.push(fixtures::student(&storage, department_id, number).await.id);
        }
        ids.push(9_999);

        let results = enroll_many(&storage, &course, &semester, &ids, &fixtures::rules())
            .await
            .expect("bulk enroll");
        let response = BulkEnrollResponse::from_results(results);
        assert_eq!(response.total, 4);
        assert_eq!(response.enrolled, 2);
        assert_eq!(response.skipped, 1);
        assert_eq!(response.failed, 1);

        let skipped = &response.results[2];
        assert_eq!(skipped.student_id, ids[2]);
        assert_eq!(skipped.outcome, BulkEnrollOutcome::Skipped);
        assert_eq!(
            skipped.reasons,
            vec![IneligibilityReason::CourseFull { capacity: 2 }]
        );
        assert_eq!(response.results[3].message.as_deref(), Some("Student not found"));
    }
}
