use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    courses::{
        entities::{Course, Prerequisite},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
    },
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::EnrollmentListQuery,
    },
    grading::{
        entities::{ComponentScore, GradingComponent},
        requests::{CreateGradingComponentRequest, UpdateGradingComponentRequest},
    },
    organizations::{
        entities::{College, Department, DepartmentLineage, University},
        requests::{
            CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
            OrganizationListQuery, UpdateCollegeRequest, UpdateDepartmentRequest,
            UpdateUniversityRequest,
        },
        responses::UniversityTreeResponse,
    },
    privileges::entities::{AdminPrivilege, Permission, ScopeKind},
    semesters::{
        entities::Semester,
        requests::{CreateSemesterRequest, SemesterListQuery, UpdateSemesterRequest},
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::TranscriptEntry,
    },
    system::{
        entities::SystemSetting, requests::SettingAuditQuery, responses::SettingAuditListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 组织架构方法
    async fn create_university(&self, req: CreateUniversityRequest) -> Result<University>;
    async fn get_university_by_id(&self, id: i64) -> Result<Option<University>>;
    async fn list_universities(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<University>>;
    async fn update_university(
        &self,
        id: i64,
        update: UpdateUniversityRequest,
    ) -> Result<Option<University>>;
    async fn delete_university(&self, id: i64) -> Result<bool>;
    // 获取大学及下属学院、院系
    async fn get_university_tree(&self, id: i64) -> Result<Option<UniversityTreeResponse>>;

    async fn create_college(&self, req: CreateCollegeRequest) -> Result<College>;
    async fn get_college_by_id(&self, id: i64) -> Result<Option<College>>;
    async fn list_colleges(&self, query: OrganizationListQuery)
    -> Result<PaginatedResponse<College>>;
    async fn update_college(&self, id: i64, update: UpdateCollegeRequest)
    -> Result<Option<College>>;
    async fn delete_college(&self, id: i64) -> Result<bool>;

    async fn create_department(&self, req: CreateDepartmentRequest) -> Result<Department>;
    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>>;
    async fn list_departments(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<Department>>;
    async fn update_department(
        &self,
        id: i64,
        update: UpdateDepartmentRequest,
    ) -> Result<Option<Department>>;
    async fn delete_department(&self, id: i64) -> Result<bool>;
    // 获取院系的上级归属链
    async fn get_department_lineage(&self, department_id: i64)
    -> Result<Option<DepartmentLineage>>;

    /// 学生管理方法
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>>;
    async fn get_student_by_number(&self, student_number: &str) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>>;
    async fn update_student(&self, id: i64, update: UpdateStudentRequest)
    -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;
    // 成绩单条目（按学期、课程代码排序）
    async fn list_transcript_entries(&self, student_id: i64) -> Result<Vec<TranscriptEntry>>;

    /// 课程管理方法
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    // 先修课程
    async fn list_prerequisites(&self, course_id: i64) -> Result<Vec<Prerequisite>>;
    async fn add_prerequisite(
        &self,
        course_id: i64,
        prerequisite_id: i64,
        min_score: Option<f64>,
    ) -> Result<Prerequisite>;
    async fn remove_prerequisite(&self, course_id: i64, prerequisite_id: i64) -> Result<bool>;
    // 全部先修关系 (course_id, prerequisite_id)，用于环检测
    async fn list_prerequisite_edges(&self) -> Result<Vec<(i64, i64)>>;

    /// 学期管理方法
    async fn create_semester(&self, req: CreateSemesterRequest) -> Result<Semester>;
    async fn get_semester_by_id(&self, id: i64) -> Result<Option<Semester>>;
    async fn get_current_semester(&self) -> Result<Option<Semester>>;
    async fn list_semesters_with_pagination(
        &self,
        query: SemesterListQuery,
    ) -> Result<PaginatedResponse<Semester>>;
    async fn update_semester(
        &self,
        id: i64,
        update: UpdateSemesterRequest,
    ) -> Result<Option<Semester>>;
    async fn delete_semester(&self, id: i64) -> Result<bool>;
    // 设为当前学期，同时清除其他学期的标记
    async fn set_current_semester(&self, id: i64) -> Result<Option<Semester>>;

    /// 选课管理方法
    // 创建选课记录，若同一学生/课程/学期已有退课记录则重新激活
    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>>;
    // 学生的全部选课记录
    async fn list_student_enrollments(&self, student_id: i64) -> Result<Vec<Enrollment>>;
    // 课程在某学期的在修人数
    async fn count_active_enrollments(&self, course_id: i64, semester_id: i64) -> Result<u64>;
    // 学生在某学期在修课程的学分合计
    async fn get_semester_credit_load(&self, student_id: i64, semester_id: i64) -> Result<i32>;
    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>>;
    // 写入最终成绩
    async fn record_final_grade(
        &self,
        id: i64,
        final_score: f64,
        letter_grade: &str,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>>;

    /// 成绩管理方法
    async fn create_grading_component(
        &self,
        course_id: i64,
        req: CreateGradingComponentRequest,
    ) -> Result<GradingComponent>;
    async fn get_grading_component_by_id(&self, id: i64) -> Result<Option<GradingComponent>>;
    async fn list_grading_components(&self, course_id: i64) -> Result<Vec<GradingComponent>>;
    async fn update_grading_component(
        &self,
        id: i64,
        update: UpdateGradingComponentRequest,
    ) -> Result<Option<GradingComponent>>;
    async fn delete_grading_component(&self, id: i64) -> Result<bool>;
    // 写入或覆盖评分项得分
    async fn upsert_component_score(
        &self,
        enrollment_id: i64,
        component_id: i64,
        score: f64,
        graded_by: i64,
    ) -> Result<ComponentScore>;
    async fn list_component_scores(&self, enrollment_id: i64) -> Result<Vec<ComponentScore>>;
    // 评分项已录入的最高分
    async fn max_component_score(&self, component_id: i64) -> Result<Option<f64>>;

    /// 管理员权限方法
    async fn list_user_privileges(&self, user_id: i64) -> Result<Vec<AdminPrivilege>>;
    async fn get_privilege_by_id(&self, id: i64) -> Result<Option<AdminPrivilege>>;
    async fn get_privilege_by_scope(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
    ) -> Result<Option<AdminPrivilege>>;
    async fn create_privilege(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
        permissions: &[Permission],
    ) -> Result<AdminPrivilege>;
    async fn update_privilege_permissions(
        &self,
        id: i64,
        permissions: &[Permission],
    ) -> Result<Option<AdminPrivilege>>;
    async fn delete_privilege(&self, id: i64) -> Result<bool>;

    /// 系统设置方法
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<SystemSetting>;
    async fn batch_update_settings(
        &self,
        updates: Vec<(String, String)>,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<Vec<SystemSetting>>;
    async fn list_setting_audits(&self, query: SettingAuditQuery)
    -> Result<SettingAuditListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
