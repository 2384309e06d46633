//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod courses;
mod enrollments;
mod grading;
mod organizations;
mod privileges;
mod semesters;
mod students;
mod system_settings;
mod users;

use crate::config::AppConfig;
use crate::errors::{CampusError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| CampusError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已有连接创建存储实例并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| CampusError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CampusError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| CampusError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| CampusError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CampusError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 将写操作的数据库错误映射为业务错误
///
/// 唯一约束冲突映射为 Conflict，外键约束失败映射为 RuleViolation。
pub(crate) fn map_write_err(context: &str, err: DbErr) -> CampusError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            CampusError::conflict(format!("{context}: {detail}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            CampusError::rule_violation(format!("{context}: {detail}"))
        }
        _ => CampusError::database_operation(format!("{context}: {err}")),
    }
}

/// 读操作的数据库错误
pub(crate) fn map_read_err(context: &str, err: DbErr) -> CampusError {
    CampusError::database_operation(format!("{context}: {err}"))
}

/// 规范化分页参数，返回 (page, size)
pub(crate) fn page_params(page: Option<i64>, size: Option<i64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1) as u64;
    let size = size.unwrap_or(10).clamp(1, 100) as u64;
    (page, size)
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 组织架构模块
    async fn create_university(&self, req: CreateUniversityRequest) -> Result<University> {
        self.create_university_impl(req).await
    }

    async fn get_university_by_id(&self, id: i64) -> Result<Option<University>> {
        self.get_university_by_id_impl(id).await
    }

    async fn list_universities(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<University>> {
        self.list_universities_impl(query).await
    }

    async fn update_university(
        &self,
        id: i64,
        update: UpdateUniversityRequest,
    ) -> Result<Option<University>> {
        self.update_university_impl(id, update).await
    }

    async fn delete_university(&self, id: i64) -> Result<bool> {
        self.delete_university_impl(id).await
    }

    async fn get_university_tree(&self, id: i64) -> Result<Option<UniversityTreeResponse>> {
        self.get_university_tree_impl(id).await
    }

    async fn create_college(&self, req: CreateCollegeRequest) -> Result<College> {
        self.create_college_impl(req).await
    }

    async fn get_college_by_id(&self, id: i64) -> Result<Option<College>> {
        self.get_college_by_id_impl(id).await
    }

    async fn list_colleges(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<College>> {
        self.list_colleges_impl(query).await
    }

    async fn update_college(
        &self,
        id: i64,
        update: UpdateCollegeRequest,
    ) -> Result<Option<College>> {
        self.update_college_impl(id, update).await
    }

    async fn delete_college(&self, id: i64) -> Result<bool> {
        self.delete_college_impl(id).await
    }

    async fn create_department(&self, req: CreateDepartmentRequest) -> Result<Department> {
        self.create_department_impl(req).await
    }

    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>> {
        self.get_department_by_id_impl(id).await
    }

    async fn list_departments(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<Department>> {
        self.list_departments_impl(query).await
    }

    async fn update_department(
        &self,
        id: i64,
        update: UpdateDepartmentRequest,
    ) -> Result<Option<Department>> {
        self.update_department_impl(id, update).await
    }

    async fn delete_department(&self, id: i64) -> Result<bool> {
        self.delete_department_impl(id).await
    }

    async fn get_department_lineage(
        &self,
        department_id: i64,
    ) -> Result<Option<DepartmentLineage>> {
        self.get_department_lineage_impl(department_id).await
    }

    // 学生模块
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(req).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        self.get_student_by_user_id_impl(user_id).await
    }

    async fn get_student_by_number(&self, student_number: &str) -> Result<Option<Student>> {
        self.get_student_by_number_impl(student_number).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    async fn list_transcript_entries(&self, student_id: i64) -> Result<Vec<TranscriptEntry>> {
        self.list_transcript_entries_impl(student_id).await
    }

    // 课程模块
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(req).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.get_course_by_code_impl(code).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn list_prerequisites(&self, course_id: i64) -> Result<Vec<Prerequisite>> {
        self.list_prerequisites_impl(course_id).await
    }

    async fn add_prerequisite(
        &self,
        course_id: i64,
        prerequisite_id: i64,
        min_score: Option<f64>,
    ) -> Result<Prerequisite> {
        self.add_prerequisite_impl(course_id, prerequisite_id, min_score)
            .await
    }

    async fn remove_prerequisite(&self, course_id: i64, prerequisite_id: i64) -> Result<bool> {
        self.remove_prerequisite_impl(course_id, prerequisite_id)
            .await
    }

    async fn list_prerequisite_edges(&self) -> Result<Vec<(i64, i64)>> {
        self.list_prerequisite_edges_impl().await
    }

    // 学期模块
    async fn create_semester(&self, req: CreateSemesterRequest) -> Result<Semester> {
        self.create_semester_impl(req).await
    }

    async fn get_semester_by_id(&self, id: i64) -> Result<Option<Semester>> {
        self.get_semester_by_id_impl(id).await
    }

    async fn get_current_semester(&self) -> Result<Option<Semester>> {
        self.get_current_semester_impl().await
    }

    async fn list_semesters_with_pagination(
        &self,
        query: SemesterListQuery,
    ) -> Result<PaginatedResponse<Semester>> {
        self.list_semesters_with_pagination_impl(query).await
    }

    async fn update_semester(
        &self,
        id: i64,
        update: UpdateSemesterRequest,
    ) -> Result<Option<Semester>> {
        self.update_semester_impl(id, update).await
    }

    async fn delete_semester(&self, id: i64) -> Result<bool> {
        self.delete_semester_impl(id).await
    }

    async fn set_current_semester(&self, id: i64) -> Result<Option<Semester>> {
        self.set_current_semester_impl(id).await
    }

    // 选课模块
    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> Result<Enrollment> {
        self.create_enrollment_impl(student_id, course_id, semester_id)
            .await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        self.list_enrollments_with_pagination_impl(query).await
    }

    async fn list_student_enrollments(&self, student_id: i64) -> Result<Vec<Enrollment>> {
        self.list_student_enrollments_impl(student_id).await
    }

    async fn count_active_enrollments(&self, course_id: i64, semester_id: i64) -> Result<u64> {
        self.count_active_enrollments_impl(course_id, semester_id)
            .await
    }

    async fn get_semester_credit_load(&self, student_id: i64, semester_id: i64) -> Result<i32> {
        self.get_semester_credit_load_impl(student_id, semester_id)
            .await
    }

    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_status_impl(id, status).await
    }

    async fn record_final_grade(
        &self,
        id: i64,
        final_score: f64,
        letter_grade: &str,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        self.record_final_grade_impl(id, final_score, letter_grade, status)
            .await
    }

    // 成绩模块
    async fn create_grading_component(
        &self,
        course_id: i64,
        req: CreateGradingComponentRequest,
    ) -> Result<GradingComponent> {
        self.create_grading_component_impl(course_id, req).await
    }

    async fn get_grading_component_by_id(&self, id: i64) -> Result<Option<GradingComponent>> {
        self.get_grading_component_by_id_impl(id).await
    }

    async fn list_grading_components(&self, course_id: i64) -> Result<Vec<GradingComponent>> {
        self.list_grading_components_impl(course_id).await
    }

    async fn update_grading_component(
        &self,
        id: i64,
        update: UpdateGradingComponentRequest,
    ) -> Result<Option<GradingComponent>> {
        self.update_grading_component_impl(id, update).await
    }

    async fn delete_grading_component(&self, id: i64) -> Result<bool> {
        self.delete_grading_component_impl(id).await
    }

    async fn upsert_component_score(
        &self,
        enrollment_id: i64,
        component_id: i64,
        score: f64,
        graded_by: i64,
    ) -> Result<ComponentScore> {
        self.upsert_component_score_impl(enrollment_id, component_id, score, graded_by)
            .await
    }

    async fn list_component_scores(&self, enrollment_id: i64) -> Result<Vec<ComponentScore>> {
        self.list_component_scores_impl(enrollment_id).await
    }

    async fn max_component_score(&self, component_id: i64) -> Result<Option<f64>> {
        self.max_component_score_impl(component_id).await
    }

    // 权限模块
    async fn list_user_privileges(&self, user_id: i64) -> Result<Vec<AdminPrivilege>> {
        self.list_user_privileges_impl(user_id).await
    }

    async fn get_privilege_by_id(&self, id: i64) -> Result<Option<AdminPrivilege>> {
        self.get_privilege_by_id_impl(id).await
    }

    async fn get_privilege_by_scope(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
    ) -> Result<Option<AdminPrivilege>> {
        self.get_privilege_by_scope_impl(user_id, scope, scope_id)
            .await
    }

    async fn create_privilege(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
        permissions: &[Permission],
    ) -> Result<AdminPrivilege> {
        self.create_privilege_impl(user_id, scope, scope_id, permissions)
            .await
    }

    async fn update_privilege_permissions(
        &self,
        id: i64,
        permissions: &[Permission],
    ) -> Result<Option<AdminPrivilege>> {
        self.update_privilege_permissions_impl(id, permissions)
            .await
    }

    async fn delete_privilege(&self, id: i64) -> Result<bool> {
        self.delete_privilege_impl(id).await
    }

    // 系统设置模块
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_by_key_impl(key).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<SystemSetting> {
        self.update_setting_impl(key, value, user_id, ip_address)
            .await
    }

    async fn batch_update_settings(
        &self,
        updates: Vec<(String, String)>,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<Vec<SystemSetting>> {
        self.batch_update_settings_impl(updates, user_id, ip_address)
            .await
    }

    async fn list_setting_audits(
        &self,
        query: SettingAuditQuery,
    ) -> Result<SettingAuditListResponse> {
        self.list_setting_audits_impl(query).await
    }
}
