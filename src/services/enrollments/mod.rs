pub mod eligibility;
pub mod enroll;
pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    courses::entities::Course,
    enrollments::{
        entities::Enrollment,
        requests::{
            BulkEnrollRequest, EligibilityQuery, EnrollRequest, EnrollmentListParams,
            FinalGradeRequest,
        },
    },
    privileges::entities::Permission,
    students::entities::Student,
};
use crate::services::{
    Respond, bad_request, error_response, forbidden, not_found,
    privileges::{AccessContext, department_target},
    storage_error,
    students::load_student,
    system::DynamicConfig,
};
use crate::storage::Storage;

pub(crate) async fn load_enrollment(storage: &Arc<dyn Storage>, id: i64) -> Respond<Enrollment> {
    storage
        .get_enrollment_by_id(id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"))
}

/// 当前登录学生对应的学籍
pub(crate) async fn own_student(storage: &Arc<dyn Storage>, ctx: &AccessContext) -> Respond<Student> {
    storage
        .get_student_by_user_id(ctx.user.id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| forbidden("No student record is linked to this account"))
}

/// 确定本次操作针对的学生
///
/// 学生只能操作自己，`self_service` 为真时还要求开启学生自助选课；
/// 管理员必须指定学生，并在课程所属院系拥有 manage_enrollments。
pub(crate) async fn resolve_student(
    storage: &Arc<dyn Storage>,
    ctx: &AccessContext,
    student_id: Option<i64>,
    course: &Course,
    self_service: bool,
) -> Respond<Student> {
    if ctx.is_student() {
        let student = own_student(storage, ctx).await?;
        if student_id.is_some_and(|id| id != student.id) {
            return Err(forbidden("Students may only act on their own enrollments"));
        }
        if self_service && !DynamicConfig::registration_rules().await.student_self_enrollment {
            return Err(error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::SelfEnrollmentDisabled,
                "Student self-enrollment is disabled",
            ));
        }
        return Ok(student);
    }

    let target = department_target(storage, course.department_id).await?;
    ctx.require(Permission::ManageEnrollments, &target)?;

    let Some(student_id) = student_id else {
        return Err(bad_request(ErrorCode::BadRequest, "student_id is required"));
    };
    load_student(storage, student_id).await
}

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn check_eligibility(
        &self,
        query: EligibilityQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        eligibility::check_eligibility(self, query, request).await
    }

    pub async fn enroll(&self, req: EnrollRequest, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enroll::enroll(self, req, request).await
    }

    pub async fn bulk_enroll(
        &self,
        req: BulkEnrollRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::bulk_enroll(self, req, request).await
    }

    pub async fn list_enrollments(
        &self,
        query: EnrollmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_enrollments(self, query, request).await
    }

    pub async fn get_enrollment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_enrollment(self, id, request).await
    }

    pub async fn drop_enrollment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::drop_enrollment(self, id, request).await
    }

    pub async fn record_final_grade(
        &self,
        id: i64,
        req: FinalGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::record_final_grade(self, id, req, request).await
    }
}

/// 服务层测试使用的内存库与种子数据
#[cfg(test)]
pub(crate) mod fixtures {
    use actix_web::HttpResponse;
    use chrono::{Duration, Utc};
    use sea_orm::{ConnectOptions, Database};
    use std::sync::Arc;

    use crate::models::{
        courses::{entities::Course, requests::CreateCourseRequest},
        organizations::requests::{
            CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
        },
        semesters::{
            entities::{Semester, Term},
            requests::CreateSemesterRequest,
        },
        students::{entities::Student, requests::CreateStudentRequest},
        system::entities::RegistrationRules,
    };
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

    pub(crate) async fn storage() -> Arc<dyn Storage> {
        // 内存库每个连接各自独立，必须限制为单连接
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("connect in-memory sqlite");
        Arc::new(
            SeaOrmStorage::from_connection(db)
                .await
                .expect("run migrations"),
        )
    }

    pub(crate) fn rules() -> RegistrationRules {
        RegistrationRules {
            max_credits_per_semester: 21,
            min_passing_score: 60.0,
            allow_late_registration: false,
            allow_retake: false,
            student_self_enrollment: true,
        }
    }

    pub(crate) async fn department(storage: &Arc<dyn Storage>) -> i64 {
        let university = storage
            .create_university(CreateUniversityRequest {
                name: "Northfield University".into(),
                code: "NFU".into(),
                address: None,
            })
            .await
            .expect("create university");
        let college = storage
            .create_college(CreateCollegeRequest {
                university_id: university.id,
                name: "College of Engineering".into(),
                code: "ENG".into(),
            })
            .await
            .expect("create college");
        storage
            .create_department(CreateDepartmentRequest {
                college_id: college.id,
                name: "Computer Science".into(),
                code: "CS".into(),
            })
            .await
            .expect("create department")
            .id
    }

    pub(crate) async fn student(
        storage: &Arc<dyn Storage>,
        department_id: i64,
        number: &str,
    ) -> Student {
        storage
            .create_student(CreateStudentRequest {
                user_id: None,
                student_number: number.into(),
                first_name: "Test".into(),
                last_name: number.into(),
                email: format!("{}@example.edu", number.to_lowercase()),
                department_id,
                enrollment_year: 2025,
                status: None,
            })
            .await
            .expect("create student")
    }

    pub(crate) async fn course(
        storage: &Arc<dyn Storage>,
        department_id: i64,
        code: &str,
        capacity: i32,
        is_active: bool,
    ) -> Course {
        storage
            .create_course(CreateCourseRequest {
                department_id,
                code: code.into(),
                title: format!("{code} title"),
                description: None,
                credits: 3,
                capacity,
                is_active,
            })
            .await
            .expect("create course")
    }

    /// 选课窗口覆盖当前时间
    pub(crate) async fn semester(storage: &Arc<dyn Storage>) -> Semester {
        let now = Utc::now();
        storage
            .create_semester(CreateSemesterRequest {
                name: "Fall 2025".into(),
                term: Term::Fall,
                year: 2025,
                start_date: now,
                end_date: now + Duration::days(120),
                registration_start: now - Duration::days(7),
                registration_end: now + Duration::days(14),
                is_current: false,
            })
            .await
            .expect("create semester")
    }

    pub(crate) async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }
}
