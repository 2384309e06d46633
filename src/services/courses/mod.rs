pub mod crud;
pub mod prerequisites;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    courses::{
        entities::Course,
        requests::{
            AddPrerequisiteRequest, CourseListParams, CreateCourseRequest, UpdateCourseRequest,
        },
    },
};
use crate::services::{Respond, not_found, storage_error};
use crate::storage::Storage;

pub(crate) async fn load_course(storage: &Arc<dyn Storage>, id: i64) -> Respond<Course> {
    storage
        .get_course_by_id(id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| not_found(ErrorCode::CourseNotFound, "Course not found"))
}

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::list_courses(self, query, request).await
    }

    pub async fn create_course(
        &self,
        req: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_course(self, req, request).await
    }

    pub async fn get_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::get_course(self, id, request).await
    }

    pub async fn update_course(
        &self,
        id: i64,
        req: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_course(self, id, req, request).await
    }

    pub async fn delete_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::delete_course(self, id, request).await
    }

    // 先修课程
    pub async fn list_prerequisites(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        prerequisites::list_prerequisites(self, course_id, request).await
    }

    pub async fn add_prerequisite(
        &self,
        course_id: i64,
        req: AddPrerequisiteRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        prerequisites::add_prerequisite(self, course_id, req, request).await
    }

    pub async fn remove_prerequisite(
        &self,
        course_id: i64,
        prerequisite_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        prerequisites::remove_prerequisite(self, course_id, prerequisite_id, request).await
    }
}
