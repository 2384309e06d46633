//! 选课资格判定
//!
//! [`evaluate`] 是纯函数，所有数据由调用方预先加载；返回的原因列表顺序固定。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{EnrollmentService, resolve_student};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::{Course, Prerequisite},
    enrollments::{
        entities::{Enrollment, EnrollmentStatus, IneligibilityReason},
        requests::EligibilityQuery,
        responses::EligibilityResponse,
    },
    semesters::entities::Semester,
    students::entities::Student,
    system::entities::RegistrationRules,
};
use crate::services::{
    Respond, courses::load_course, privileges::access_context, semesters::load_semester,
    storage_error, system::DynamicConfig,
};
use crate::storage::Storage;

pub struct EligibilityContext<'a> {
    pub student: &'a Student,
    pub course: &'a Course,
    pub semester: &'a Semester,
    /// 该学生的全部选课记录
    pub history: &'a [Enrollment],
    pub prerequisites: &'a [Prerequisite],
    pub active_count: u64,
    /// 学生本学期已选学分
    pub credit_load: i32,
    pub rules: &'a RegistrationRules,
    pub now: DateTime<Utc>,
}

pub fn evaluate(ctx: &EligibilityContext<'_>) -> Vec<IneligibilityReason> {
    let mut reasons = Vec::new();
    let EligibilityContext {
        student,
        course,
        semester,
        history,
        rules,
        ..
    } = ctx;

    if !student.is_active() {
        reasons.push(IneligibilityReason::StudentNotActive {
            status: student.status.to_string(),
        });
    }

    if !course.is_active {
        reasons.push(IneligibilityReason::CourseInactive);
    }

    if !rules.allow_late_registration && !semester.is_registration_open(ctx.now) {
        reasons.push(IneligibilityReason::RegistrationClosed {
            opens_at: semester.registration_start,
            closes_at: semester.registration_end,
        });
    }

    // 同一学期只要存在未退课的记录就无法再选，已结课的记录也会占用该组合
    if let Some(current) = history.iter().find(|e| {
        e.course_id == course.id
            && e.semester_id == semester.id
            && e.status != EnrollmentStatus::Dropped
    }) {
        reasons.push(IneligibilityReason::AlreadyEnrolled {
            enrollment_id: current.id,
        });
    }

    if !rules.allow_retake
        && let Some(passed) = history
            .iter()
            .find(|e| e.course_id == course.id && e.status == EnrollmentStatus::Completed)
    {
        reasons.push(IneligibilityReason::AlreadyCompleted {
            enrollment_id: passed.id,
        });
    }

    for prerequisite in ctx.prerequisites {
        let required = prerequisite.min_score.unwrap_or(rules.min_passing_score);
        let met = history.iter().any(|e| {
            e.course_id == prerequisite.prerequisite_id
                && e.status == EnrollmentStatus::Completed
                && e.final_score.is_some_and(|score| score >= required)
        });
        if !met {
            reasons.push(IneligibilityReason::PrerequisiteNotMet {
                course_code: prerequisite.prerequisite_code.clone(),
                required_score: required,
            });
        }
    }

    if ctx.active_count >= course.capacity.max(0) as u64 {
        reasons.push(IneligibilityReason::CourseFull {
            capacity: course.capacity,
        });
    }

    if ctx.credit_load + course.credits > rules.max_credits_per_semester {
        reasons.push(IneligibilityReason::CreditLimitExceeded {
            current: ctx.credit_load,
            requested: course.credits,
            limit: rules.max_credits_per_semester,
        });
    }

    reasons
}

/// 加载学生相关的实时数据后判定
///
/// 先修列表按课程加载一次，批量选课时可复用。
pub(crate) async fn check_student(
    storage: &Arc<dyn Storage>,
    student: &Student,
    course: &Course,
    semester: &Semester,
    prerequisites: &[Prerequisite],
    rules: &RegistrationRules,
) -> Respond<Vec<IneligibilityReason>> {
    let internal = |e| storage_error(e, ErrorCode::InternalServerError);

    let history = storage
        .list_student_enrollments(student.id)
        .await
        .map_err(internal)?;
    let active_count = storage
        .count_active_enrollments(course.id, semester.id)
        .await
        .map_err(internal)?;
    let credit_load = storage
        .get_semester_credit_load(student.id, semester.id)
        .await
        .map_err(internal)?;

    Ok(evaluate(&EligibilityContext {
        student,
        course,
        semester,
        history: &history,
        prerequisites,
        active_count,
        credit_load,
        rules,
        now: Utc::now(),
    }))
}

pub(crate) async fn load_prerequisites(
    storage: &Arc<dyn Storage>,
    course_id: i64,
) -> Respond<Vec<Prerequisite>> {
    storage
        .list_prerequisites(course_id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))
}

pub async fn check_eligibility(
    service: &EnrollmentService,
    query: EligibilityQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);

    let course = try_or_respond!(load_course(&storage, query.course_id).await);
    let semester = try_or_respond!(load_semester(&storage, query.semester_id).await);
    let student = try_or_respond!(
        resolve_student(&storage, &ctx, query.student_id, &course, false).await
    );

    let prerequisites = try_or_respond!(load_prerequisites(&storage, course.id).await);
    let rules = DynamicConfig::registration_rules().await;
    let reasons = try_or_respond!(
        check_student(&storage, &student, &course, &semester, &prerequisites, &rules).await
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EligibilityResponse::from_reasons(reasons),
        "Eligibility evaluated",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::semesters::entities::Term;
    use crate::models::students::entities::StudentStatus;
    use chrono::TimeZone;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    fn student() -> Student {
        Student {
            id: 7,
            user_id: None,
            student_number: "S2025007".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.edu".into(),
            department_id: 1,
            enrollment_year: 2025,
            status: StudentStatus::Active,
            created_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    fn course(id: i64, code: &str) -> Course {
        Course {
            id,
            department_id: 1,
            code: code.into(),
            title: code.into(),
            description: None,
            credits: 4,
            capacity: 2,
            is_active: true,
            created_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    fn semester() -> Semester {
        Semester {
            id: 3,
            name: "Fall 2025".into(),
            term: Term::Fall,
            year: 2025,
            start_date: at(9, 1),
            end_date: at(12, 20),
            registration_start: at(8, 1),
            registration_end: at(9, 15),
            is_current: true,
            created_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    fn rules() -> RegistrationRules {
        RegistrationRules {
            max_credits_per_semester: 12,
            min_passing_score: 60.0,
            allow_late_registration: false,
            allow_retake: false,
            student_self_enrollment: true,
        }
    }

    fn record(
        id: i64,
        course_id: i64,
        semester_id: i64,
        status: EnrollmentStatus,
        score: Option<f64>,
    ) -> Enrollment {
        Enrollment {
            id,
            student_id: 7,
            course_id,
            semester_id,
            status,
            final_score: score,
            letter_grade: None,
            enrolled_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    fn prerequisite(min_score: Option<f64>) -> Prerequisite {
        Prerequisite {
            course_id: 2,
            prerequisite_id: 1,
            prerequisite_code: "CS101".into(),
            prerequisite_title: "Intro".into(),
            min_score,
        }
    }

    struct Fixture {
        student: Student,
        course: Course,
        semester: Semester,
        history: Vec<Enrollment>,
        prerequisites: Vec<Prerequisite>,
        active_count: u64,
        credit_load: i32,
        rules: RegistrationRules,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                student: student(),
                course: course(2, "CS201"),
                semester: semester(),
                history: Vec::new(),
                prerequisites: Vec::new(),
                active_count: 0,
                credit_load: 0,
                rules: rules(),
                now: at(8, 15),
            }
        }

        fn run(&self) -> Vec<IneligibilityReason> {
            evaluate(&EligibilityContext {
                student: &self.student,
                course: &self.course,
                semester: &self.semester,
                history: &self.history,
                prerequisites: &self.prerequisites,
                active_count: self.active_count,
                credit_load: self.credit_load,
                rules: &self.rules,
                now: self.now,
            })
        }
    }

    #[test]
    fn test_eligible_student_has_no_reasons() {
        assert!(Fixture::new().run().is_empty());
    }

    #[test]
    fn test_registration_window_and_late_override() {
        let mut f = Fixture::new();
        f.now = at(10, 1);
        assert!(matches!(
            f.run().as_slice(),
            [IneligibilityReason::RegistrationClosed { .. }]
        ));

        f.rules.allow_late_registration = true;
        assert!(f.run().is_empty());
    }

    #[test]
    fn test_prerequisite_uses_passing_score_by_default() {
        let mut f = Fixture::new();
        f.prerequisites = vec![prerequisite(None)];
        f.history = vec![record(1, 1, 1, EnrollmentStatus::Completed, Some(65.0))];
        assert!(f.run().is_empty());

        f.prerequisites = vec![prerequisite(Some(70.0))];
        assert_eq!(
            f.run(),
            vec![IneligibilityReason::PrerequisiteNotMet {
                course_code: "CS101".into(),
                required_score: 70.0,
            }]
        );
    }

    #[test]
    fn test_failed_prerequisite_is_not_met() {
        let mut f = Fixture::new();
        f.prerequisites = vec![prerequisite(None)];
        f.history = vec![record(1, 1, 1, EnrollmentStatus::Failed, Some(80.0))];
        assert_eq!(f.run().len(), 1);
    }

    #[test]
    fn test_already_enrolled_and_completed() {
        let mut f = Fixture::new();
        f.history = vec![record(9, 2, 3, EnrollmentStatus::Enrolled, None)];
        assert_eq!(
            f.run(),
            vec![IneligibilityReason::AlreadyEnrolled { enrollment_id: 9 }]
        );

        // 退课记录不算在修
        f.history = vec![record(9, 2, 3, EnrollmentStatus::Dropped, None)];
        assert!(f.run().is_empty());

        f.history = vec![record(4, 2, 1, EnrollmentStatus::Completed, Some(88.0))];
        assert_eq!(
            f.run(),
            vec![IneligibilityReason::AlreadyCompleted { enrollment_id: 4 }]
        );
        f.rules.allow_retake = true;
        assert!(f.run().is_empty());
    }

    #[test]
    fn test_finalized_record_in_same_semester_blocks_enrollment() {
        let mut f = Fixture::new();
        f.rules.allow_retake = true;

        f.history = vec![record(5, 2, 3, EnrollmentStatus::Failed, Some(40.0))];
        assert_eq!(
            f.run(),
            vec![IneligibilityReason::AlreadyEnrolled { enrollment_id: 5 }]
        );

        f.history = vec![record(6, 2, 3, EnrollmentStatus::Completed, Some(90.0))];
        assert_eq!(
            f.run(),
            vec![IneligibilityReason::AlreadyEnrolled { enrollment_id: 6 }]
        );

        // 其他学期的失败记录不影响重修
        f.history = vec![record(5, 2, 1, EnrollmentStatus::Failed, Some(40.0))];
        assert!(f.run().is_empty());
    }

    #[test]
    fn test_capacity_and_credit_limit() {
        let mut f = Fixture::new();
        f.active_count = 2;
        f.credit_load = 9;
        assert_eq!(
            f.run(),
            vec![
                IneligibilityReason::CourseFull { capacity: 2 },
                IneligibilityReason::CreditLimitExceeded {
                    current: 9,
                    requested: 4,
                    limit: 12,
                },
            ]
        );

        // 恰好达到上限仍可选
        f.active_count = 1;
        f.credit_load = 8;
        assert!(f.run().is_empty());
    }

    #[test]
    fn test_reasons_keep_fixed_order() {
        let mut f = Fixture::new();
        f.student.status = StudentStatus::Suspended;
        f.course.is_active = false;
        f.now = at(12, 1);
        f.active_count = 5;

        let reasons = f.run();
        assert!(matches!(
            reasons.as_slice(),
            [
                IneligibilityReason::StudentNotActive { .. },
                IneligibilityReason::CourseInactive,
                IneligibilityReason::RegistrationClosed { .. },
                IneligibilityReason::CourseFull { .. },
            ]
        ));
    }
}
