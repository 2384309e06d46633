//! 存储层集成测试，使用内存 SQLite 并执行完整迁移

use std::sync::Arc;

use campus_admin::errors::CampusError;
use campus_admin::models::{
    courses::requests::CreateCourseRequest,
    enrollments::entities::EnrollmentStatus,
    grading::{entities::ComponentType, requests::CreateGradingComponentRequest},
    organizations::requests::{
        CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
    },
    privileges::entities::{Permission, ScopeKind},
    semesters::{entities::Term, requests::CreateSemesterRequest},
    students::requests::CreateStudentRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use campus_admin::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database};

async fn storage() -> Arc<dyn Storage> {
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

/// 大学 → 学院 → 院系，返回院系 ID
async fn seed_department(storage: &Arc<dyn Storage>) -> i64 {
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

async fn seed_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> i64 {
    storage
        .create_user(CreateUserRequest {
            username: username.into(),
            email: format!("{username}@example.edu"),
            password: "hashed".into(),
            role,
            display_name: None,
        })
        .await
        .expect("create user")
        .id
}

async fn seed_student(storage: &Arc<dyn Storage>, department_id: i64, number: &str) -> i64 {
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
        .id
}

async fn seed_course(storage: &Arc<dyn Storage>, department_id: i64, code: &str, credits: i32) -> i64 {
    storage
        .create_course(CreateCourseRequest {
            department_id,
            code: code.into(),
            title: format!("{code} title"),
            description: None,
            credits,
            capacity: 30,
            is_active: true,
        })
        .await
        .expect("create course")
        .id
}

async fn seed_semester(storage: &Arc<dyn Storage>, name: &str) -> i64 {
    let now = Utc::now();
    storage
        .create_semester(CreateSemesterRequest {
            name: name.into(),
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
        .id
}

#[tokio::test]
async fn test_department_lineage_resolves_ancestors() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;

    let lineage = storage
        .get_department_lineage(department_id)
        .await
        .expect("query lineage")
        .expect("lineage exists");
    assert_eq!(lineage.department_id, department_id);

    let college = storage
        .get_college_by_id(lineage.college_id)
        .await
        .expect("query college")
        .expect("college exists");
    assert_eq!(college.university_id, lineage.university_id);

    assert!(
        storage
            .get_department_lineage(9999)
            .await
            .expect("query lineage")
            .is_none()
    );
}

#[tokio::test]
async fn test_duplicate_student_number_is_conflict() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    seed_student(&storage, department_id, "S2025001").await;

    let err = storage
        .create_student(CreateStudentRequest {
            user_id: None,
            student_number: "S2025001".into(),
            first_name: "Other".into(),
            last_name: "Person".into(),
            email: "other@example.edu".into(),
            department_id,
            enrollment_year: 2025,
            status: None,
        })
        .await
        .expect_err("duplicate number");
    assert!(matches!(err, CampusError::Conflict(_)));

    let found = storage
        .get_student_by_number("S2025001")
        .await
        .expect("query student");
    assert!(found.is_some());
}

#[tokio::test]
async fn test_prerequisite_edges_and_duplicates() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let intro = seed_course(&storage, department_id, "CS101", 4).await;
    let data = seed_course(&storage, department_id, "CS201", 4).await;

    let prerequisite = storage
        .add_prerequisite(data, intro, Some(70.0))
        .await
        .expect("add prerequisite");
    assert_eq!(prerequisite.prerequisite_code, "CS101");

    let edges = storage
        .list_prerequisite_edges()
        .await
        .expect("list edges");
    assert_eq!(edges, vec![(data, intro)]);

    let err = storage
        .add_prerequisite(data, intro, None)
        .await
        .expect_err("duplicate prerequisite");
    assert!(matches!(err, CampusError::Conflict(_)));

    assert!(
        storage
            .remove_prerequisite(data, intro)
            .await
            .expect("remove")
    );
    assert!(
        !storage
            .remove_prerequisite(data, intro)
            .await
            .expect("remove again")
    );

    let by_code = storage
        .get_course_by_code("CS201")
        .await
        .expect("query course");
    assert_eq!(by_code.map(|c| c.id), Some(data));
}

#[tokio::test]
async fn test_set_current_semester_is_exclusive() {
    let storage = storage().await;
    let fall = seed_semester(&storage, "Fall 2025").await;
    let spring = seed_semester(&storage, "Spring 2026").await;

    storage
        .set_current_semester(fall)
        .await
        .expect("set current")
        .expect("semester exists");
    storage
        .set_current_semester(spring)
        .await
        .expect("set current")
        .expect("semester exists");

    let current = storage
        .get_current_semester()
        .await
        .expect("query current")
        .expect("current semester");
    assert_eq!(current.id, spring);

    let fall = storage
        .get_semester_by_id(fall)
        .await
        .expect("query semester")
        .expect("semester exists");
    assert!(!fall.is_current);
}

#[tokio::test]
async fn test_enrollment_counts_and_reactivation() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let student = seed_student(&storage, department_id, "S2025002").await;
    let algorithms = seed_course(&storage, department_id, "CS301", 4).await;
    let networks = seed_course(&storage, department_id, "CS302", 3).await;
    let semester = seed_semester(&storage, "Fall 2025").await;

    let first = storage
        .create_enrollment(student, algorithms, semester)
        .await
        .expect("enroll");
    storage
        .create_enrollment(student, networks, semester)
        .await
        .expect("enroll");

    assert_eq!(
        storage
            .get_semester_credit_load(student, semester)
            .await
            .expect("credit load"),
        7
    );
    assert_eq!(
        storage
            .count_active_enrollments(algorithms, semester)
            .await
            .expect("count"),
        1
    );

    let err = storage
        .create_enrollment(student, algorithms, semester)
        .await
        .expect_err("already enrolled");
    assert!(matches!(err, CampusError::Conflict(_)));

    storage
        .update_enrollment_status(first.id, EnrollmentStatus::Dropped)
        .await
        .expect("drop")
        .expect("enrollment exists");
    assert_eq!(
        storage
            .get_semester_credit_load(student, semester)
            .await
            .expect("credit load"),
        3
    );

    // 退课后重新选课复用原记录
    let again = storage
        .create_enrollment(student, algorithms, semester)
        .await
        .expect("re-enroll");
    assert_eq!(again.id, first.id);
    assert_eq!(again.status, EnrollmentStatus::Enrolled);
}

#[tokio::test]
async fn test_final_grade_appears_on_transcript() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let student = seed_student(&storage, department_id, "S2025003").await;
    let course = seed_course(&storage, department_id, "CS110", 4).await;
    let semester = seed_semester(&storage, "Fall 2025").await;

    let enrollment = storage
        .create_enrollment(student, course, semester)
        .await
        .expect("enroll");
    let graded = storage
        .record_final_grade(enrollment.id, 91.5, "A", EnrollmentStatus::Completed)
        .await
        .expect("record grade")
        .expect("enrollment exists");
    assert_eq!(graded.final_score, Some(91.5));

    let transcript = storage
        .list_transcript_entries(student)
        .await
        .expect("transcript");
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].course_code, "CS110");
    assert_eq!(transcript[0].letter_grade.as_deref(), Some("A"));
    assert_eq!(transcript[0].semester_name, "Fall 2025");
}

#[tokio::test]
async fn test_component_scores_upsert() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let student = seed_student(&storage, department_id, "S2025004").await;
    let course = seed_course(&storage, department_id, "CS120", 3).await;
    let semester = seed_semester(&storage, "Fall 2025").await;
    let grader = seed_user(&storage, "grader", UserRole::Admin).await;
    let enrollment = storage
        .create_enrollment(student, course, semester)
        .await
        .expect("enroll");

    let component = storage
        .create_grading_component(
            course,
            CreateGradingComponentRequest {
                name: "Final exam".into(),
                component_type: ComponentType::Exam,
                weight: 60.0,
                max_score: 100.0,
            },
        )
        .await
        .expect("create component");

    storage
        .upsert_component_score(enrollment.id, component.id, 55.0, grader)
        .await
        .expect("first score");
    let updated = storage
        .upsert_component_score(enrollment.id, component.id, 78.0, grader)
        .await
        .expect("overwrite score");
    assert_eq!(updated.score, 78.0);

    let scores = storage
        .list_component_scores(enrollment.id)
        .await
        .expect("list scores");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].score, 78.0);
}

#[tokio::test]
async fn test_reactivated_enrollment_starts_without_scores() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let student = seed_student(&storage, department_id, "S2025005").await;
    let course = seed_course(&storage, department_id, "CS130", 3).await;
    let semester = seed_semester(&storage, "Fall 2025").await;
    let grader = seed_user(&storage, "grader", UserRole::Admin).await;

    let first = storage
        .create_enrollment(student, course, semester)
        .await
        .expect("enroll");
    let component = storage
        .create_grading_component(
            course,
            CreateGradingComponentRequest {
                name: "Final exam".into(),
                component_type: ComponentType::Exam,
                weight: 100.0,
                max_score: 100.0,
            },
        )
        .await
        .expect("create component");
    storage
        .upsert_component_score(first.id, component.id, 95.0, grader)
        .await
        .expect("score");

    storage
        .update_enrollment_status(first.id, EnrollmentStatus::Dropped)
        .await
        .expect("drop")
        .expect("enrollment exists");
    let again = storage
        .create_enrollment(student, course, semester)
        .await
        .expect("re-enroll");
    assert_eq!(again.id, first.id);
    assert_eq!(again.final_score, None);

    let scores = storage
        .list_component_scores(again.id)
        .await
        .expect("list scores");
    assert!(scores.is_empty());
}

#[tokio::test]
async fn test_max_component_score_across_enrollments() {
    let storage = storage().await;
    let department_id = seed_department(&storage).await;
    let course = seed_course(&storage, department_id, "CS140", 3).await;
    let semester = seed_semester(&storage, "Fall 2025").await;
    let grader = seed_user(&storage, "grader", UserRole::Admin).await;
    let component = storage
        .create_grading_component(
            course,
            CreateGradingComponentRequest {
                name: "Lab".into(),
                component_type: ComponentType::Exam,
                weight: 40.0,
                max_score: 50.0,
            },
        )
        .await
        .expect("create component");

    let highest = storage
        .max_component_score(component.id)
        .await
        .expect("query max score");
    assert_eq!(highest, None);

    for (number, score) in [("S2025006", 31.5), ("S2025007", 47.0), ("S2025008", 12.0)] {
        let student = seed_student(&storage, department_id, number).await;
        let enrollment = storage
            .create_enrollment(student, course, semester)
            .await
            .expect("enroll");
        storage
            .upsert_component_score(enrollment.id, component.id, score, grader)
            .await
            .expect("score");
    }

    let highest = storage
        .max_component_score(component.id)
        .await
        .expect("query max score");
    assert_eq!(highest, Some(47.0));
}

#[tokio::test]
async fn test_privilege_permissions_round_trip_through_column() {
    let storage = storage().await;
    let user = seed_user(&storage, "registrar", UserRole::Admin).await;

    let privilege = storage
        .create_privilege(
            user,
            ScopeKind::Faculty,
            2,
            &[Permission::ManageCourses, Permission::ManageStudents],
        )
        .await
        .expect("create privilege");

    let updated = storage
        .update_privilege_permissions(privilege.id, &[Permission::ViewReports])
        .await
        .expect("update")
        .expect("privilege exists");
    assert_eq!(updated.permissions, vec![Permission::ViewReports]);

    let found = storage
        .get_privilege_by_scope(user, ScopeKind::Faculty, 2)
        .await
        .expect("query by scope");
    assert_eq!(found.map(|p| p.id), Some(privilege.id));
}

#[tokio::test]
async fn test_registration_settings_are_seeded() {
    let storage = storage().await;

    let setting = storage
        .get_setting_by_key("registration.max_credits_per_semester")
        .await
        .expect("query setting")
        .expect("seeded setting");
    assert_eq!(setting.value, "21");

    let updated = storage
        .update_setting("registration.max_credits_per_semester", "18", 1, None)
        .await
        .expect("update setting");
    assert_eq!(updated.value, "18");

    let err = storage
        .update_setting("registration.unknown", "1", 1, None)
        .await
        .expect_err("missing key");
    assert!(matches!(err, CampusError::NotFound(_)));
}
