pub mod crud;
pub mod transcript;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    privileges::entities::Permission,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListParams, UpdateStudentRequest},
    },
};
use crate::services::{
    Respond, forbidden, not_found,
    privileges::{AccessContext, department_target},
    storage_error,
};
use crate::storage::Storage;

pub(crate) async fn load_student(storage: &Arc<dyn Storage>, id: i64) -> Respond<Student> {
    storage
        .get_student_by_id(id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| not_found(ErrorCode::StudentNotFound, "Student not found"))
}

/// 学生本人，或在其院系范围内有 manage_students / view_reports 的管理员
pub(crate) async fn ensure_can_read(
    storage: &Arc<dyn Storage>,
    ctx: &AccessContext,
    student: &Student,
) -> Respond<()> {
    if ctx.is_student() {
        return if student.user_id == Some(ctx.user.id) {
            Ok(())
        } else {
            Err(forbidden("Students may only access their own record"))
        };
    }

    let target = department_target(storage, student.department_id).await?;
    if ctx.can(Permission::ManageStudents, &target) || ctx.can(Permission::ViewReports, &target) {
        Ok(())
    } else {
        Err(forbidden("No access to this student"))
    }
}

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_students(
        &self,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::list_students(self, query, request).await
    }

    pub async fn create_student(
        &self,
        req: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_student(self, req, request).await
    }

    pub async fn get_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::get_student(self, id, request).await
    }

    pub async fn update_student(
        &self,
        id: i64,
        req: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_student(self, id, req, request).await
    }

    pub async fn delete_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::delete_student(self, id, request).await
    }

    // 成绩单
    pub async fn get_transcript(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        transcript::get_transcript(self, id, request).await
    }
}
