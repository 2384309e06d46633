use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{EnrollmentService, load_enrollment, own_student};
use crate::models::{
    ApiResponse, ErrorCode,
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::{EnrollmentListParams, EnrollmentListQuery, FinalGradeRequest},
        responses::EnrollmentDetailResponse,
    },
    grading::entities::LetterGrade,
    privileges::entities::Permission,
    semesters::entities::Semester,
    system::entities::RegistrationRules,
};
use crate::services::{
    Respond, bad_request, courses::load_course, error_response, forbidden, not_found,
    privileges::{AccessContext, access_context, department_target},
    semesters::load_semester,
    storage_error,
    students::load_student,
    system::DynamicConfig,
    unprocessable,
};
use crate::storage::Storage;

/// 管理员在课程院系上拥有任一权限即可查看选课记录
const READ_PERMISSIONS: [Permission; 3] = [
    Permission::ManageEnrollments,
    Permission::ManageGrades,
    Permission::ViewReports,
];

pub(crate) async fn ensure_can_view(
    storage: &Arc<dyn Storage>,
    ctx: &AccessContext,
    enrollment: &Enrollment,
    course_department_id: i64,
) -> Respond<()> {
    if ctx.is_student() {
        let student = own_student(storage, ctx).await?;
        return if student.id == enrollment.student_id {
            Ok(())
        } else {
            Err(forbidden("Students may only access their own enrollments"))
        };
    }

    let target = department_target(storage, course_department_id).await?;
    if READ_PERMISSIONS.iter().any(|p| ctx.can(*p, &target)) {
        Ok(())
    } else {
        Err(forbidden("No access to this enrollment"))
    }
}

/// 最终成绩对应的状态：达到及格分为 completed，否则 failed
pub fn final_status(score: f64, rules: &RegistrationRules) -> EnrollmentStatus {
    if score >= rules.min_passing_score {
        EnrollmentStatus::Completed
    } else {
        EnrollmentStatus::Failed
    }
}

/// 写入最终成绩，已退课的记录不能给分；已有成绩时允许覆盖
pub(crate) async fn apply_final_grade(
    storage: &Arc<dyn Storage>,
    enrollment: &Enrollment,
    score: f64,
    rules: &RegistrationRules,
) -> Respond<(Enrollment, LetterGrade)> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(bad_request(
            ErrorCode::GradingScoreInvalid,
            "final_score must be between 0 and 100",
        ));
    }
    if enrollment.status == EnrollmentStatus::Dropped {
        return Err(unprocessable(
            ErrorCode::EnrollmentStatusInvalid,
            "Dropped enrollments cannot be graded",
        ));
    }

    let letter = LetterGrade::from_score(score);
    let status = final_status(score, rules);

    match storage
        .record_final_grade(enrollment.id, score, letter.as_str(), status)
        .await
    {
        Ok(Some(updated)) => {
            tracing::info!(
                "Final grade {} ({}) recorded for enrollment {}",
                score,
                letter,
                enrollment.id
            );
            Ok((updated, letter))
        }
        Ok(None) => Err(not_found(
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        )),
        Err(e) => Err(storage_error(e, ErrorCode::EnrollmentStatusInvalid)),
    }
}

/// 学生只能看到自己的记录；普通管理员必须按课程或学生过滤
pub async fn list_enrollments(
    service: &EnrollmentService,
    mut query: EnrollmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    if ctx.is_student() {
        let student = try_or_respond!(own_student(&storage, &ctx).await);
        query.student_id = Some(student.id);
    } else if !ctx.is_super_admin() {
        let department_id = if let Some(course_id) = query.course_id {
            try_or_respond!(load_course(&storage, course_id).await).department_id
        } else if let Some(student_id) = query.student_id {
            try_or_respond!(load_student(&storage, student_id).await).department_id
        } else {
            return Ok(forbidden("course_id or student_id filter is required"));
        };
        let target = try_or_respond!(department_target(&storage, department_id).await);
        if !READ_PERMISSIONS.iter().any(|p| ctx.can(*p, &target)) {
            return Ok(forbidden("No access to these enrollments"));
        }
    }

    match storage
        .list_enrollments_with_pagination(EnrollmentListQuery::from(query))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Enrollments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_enrollment(
    service: &EnrollmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, id).await);
    let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);
    try_or_respond!(ensure_can_view(&storage, &ctx, &enrollment, course.department_id).await);
    let semester = try_or_respond!(load_semester(&storage, enrollment.semester_id).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EnrollmentDetailResponse {
            enrollment,
            course_code: course.code,
            course_title: course.title,
            credits: course.credits,
            semester_name: semester.name,
        },
        "Enrollment retrieved successfully",
    )))
}

/// 学生自助退课的前置条件：开启自助选课且未过选课截止时间
pub(crate) fn check_student_drop(
    semester: &Semester,
    rules: &RegistrationRules,
    now: DateTime<Utc>,
) -> Respond<()> {
    if !rules.student_self_enrollment {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            ErrorCode::SelfEnrollmentDisabled,
            "Student self-enrollment is disabled",
        ));
    }
    if now > semester.registration_end {
        return Err(unprocessable(
            ErrorCode::DropDeadlinePassed,
            "The drop deadline for this semester has passed",
        ));
    }
    Ok(())
}

/// 只有在修的记录可以退课
pub(crate) async fn drop_active(
    storage: &Arc<dyn Storage>,
    enrollment: &Enrollment,
) -> Respond<Enrollment> {
    if !enrollment.status.is_active() {
        return Err(unprocessable(
            ErrorCode::EnrollmentStatusInvalid,
            format!("Cannot drop an enrollment in status {}", enrollment.status),
        ));
    }

    storage
        .update_enrollment_status(enrollment.id, EnrollmentStatus::Dropped)
        .await
        .map_err(|e| storage_error(e, ErrorCode::EnrollmentStatusInvalid))?
        .ok_or_else(|| not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"))
}

/// 退课
///
/// 学生需开启自助选课且在选课截止前操作；管理员不受时间限制。
pub async fn drop_enrollment(
    service: &EnrollmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, id).await);

    if ctx.is_student() {
        let student = try_or_respond!(own_student(&storage, &ctx).await);
        if student.id != enrollment.student_id {
            return Ok(forbidden("Students may only drop their own enrollments"));
        }
        let semester = try_or_respond!(load_semester(&storage, enrollment.semester_id).await);
        let rules = DynamicConfig::registration_rules().await;
        try_or_respond!(check_student_drop(&semester, &rules, Utc::now()));
    } else {
        let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);
        let target = try_or_respond!(department_target(&storage, course.department_id).await);
        try_or_respond!(ctx.require(Permission::ManageEnrollments, &target));
    }

    let updated = try_or_respond!(drop_active(&storage, &enrollment).await);
    tracing::info!("Enrollment {} dropped by {}", id, ctx.user.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        updated,
        "Enrollment dropped successfully",
    )))
}

pub async fn record_final_grade(
    service: &EnrollmentService,
    id: i64,
    req: FinalGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let enrollment = try_or_respond!(load_enrollment(&storage, id).await);
    let course = try_or_respond!(load_course(&storage, enrollment.course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageGrades, &target));

    let rules = DynamicConfig::registration_rules().await;
    let (updated, _) =
        try_or_respond!(apply_final_grade(&storage, &enrollment, req.final_score, &rules).await);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        updated,
        "Final grade recorded successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::enrollments::fixtures;
    use chrono::Duration;

    #[test]
    fn test_final_status_uses_passing_score() {
        let rules = RegistrationRules {
            min_passing_score: 60.0,
            ..RegistrationRules::default()
        };
        assert_eq!(final_status(60.0, &rules), EnrollmentStatus::Completed);
        assert_eq!(final_status(59.99, &rules), EnrollmentStatus::Failed);

        let strict = RegistrationRules {
            min_passing_score: 70.0,
            ..rules
        };
        assert_eq!(final_status(65.0, &strict), EnrollmentStatus::Failed);
    }

    #[actix_web::test]
    async fn test_student_drop_respects_deadline_and_switch() {
        let storage = fixtures::storage().await;
        let semester = fixtures::semester(&storage).await;
        let rules = fixtures::rules();

        assert!(check_student_drop(&semester, &rules, Utc::now()).is_ok());
        assert!(check_student_drop(&semester, &rules, semester.registration_end).is_ok());

        let late = check_student_drop(
            &semester,
            &rules,
            semester.registration_end + Duration::seconds(1),
        )
        .expect_err("past the deadline");
        assert_eq!(late.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = fixtures::body_json(late).await;
        assert_eq!(body["code"], ErrorCode::DropDeadlinePassed as i32);

        let disabled = RegistrationRules {
            student_self_enrollment: false,
            ..rules
        };
        let denied = check_student_drop(&semester, &disabled, Utc::now())
            .expect_err("self-enrollment disabled");
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let body = fixtures::body_json(denied).await;
        assert_eq!(body["code"], ErrorCode::SelfEnrollmentDisabled as i32);
    }

    #[actix_web::test]
    async fn test_drop_only_from_enrolled() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS101", 10, true).await;
        let semester = fixtures::semester(&storage).await;
        let student = fixtures::student(&storage, department_id, "S001").await;
        let enrollment = storage
            .create_enrollment(student.id, course.id, semester.id)
            .await
            .expect("enroll");

        let dropped = drop_active(&storage, &enrollment).await.expect("drop");
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);

        let again = drop_active(&storage, &dropped)
            .await
            .expect_err("already dropped");
        assert_eq!(again.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let count = storage
            .count_active_enrollments(course.id, semester.id)
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[actix_web::test]
    async fn test_final_grade_rejected_for_dropped_enrollment() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS101", 10, true).await;
        let semester = fixtures::semester(&storage).await;
        let student = fixtures::student(&storage, department_id, "S001").await;
        let enrollment = storage
            .create_enrollment(student.id, course.id, semester.id)
            .await
            .expect("enroll");
        let dropped = drop_active(&storage, &enrollment).await.expect("drop");

        let response = apply_final_grade(&storage, &dropped, 88.0, &fixtures::rules())
            .await
            .expect_err("dropped enrollment");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = fixtures::body_json(response).await;
        assert_eq!(body["code"], ErrorCode::EnrollmentStatusInvalid as i32);

        let stored = storage
            .get_enrollment_by_id(enrollment.id)
            .await
            .expect("query")
            .expect("enrollment exists");
        assert_eq!(stored.final_score, None);
    }

    #[actix_web::test]
    async fn test_final_grade_sets_status_from_passing_score() {
        let storage = fixtures::storage().await;
        let department_id = fixtures::department(&storage).await;
        let course = fixtures::course(&storage, department_id, "CS101", 10, true).await;
        let semester = fixtures::semester(&storage).await;
        let student = fixtures::student(&storage, department_id, "S001").await;
        let enrollment = storage
            .create_enrollment(student.id, course.id, semester.id)
            .await
            .expect("enroll");

        let (graded, letter) = apply_final_grade(&storage, &enrollment, 55.0, &fixtures::rules())
            .await
            .expect("grade");
        assert_eq!(graded.status, EnrollmentStatus::Failed);
        assert_eq!(graded.final_score, Some(55.0));
        assert_eq!(graded.letter_grade.as_deref(), Some(letter.as_str()));
    }
}
