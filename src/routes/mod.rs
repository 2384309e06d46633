pub mod auth;

pub mod users;

pub mod privileges;

pub mod organizations;

pub mod students;

pub mod courses;

pub mod semesters;

pub mod enrollments;

pub mod grading;

pub mod system;

pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use enrollments::configure_enrollment_routes;
pub use grading::configure_grading_routes;
pub use organizations::configure_organization_routes;
pub use privileges::configure_privilege_routes;
pub use semesters::configure_semester_routes;
pub use students::configure_student_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
