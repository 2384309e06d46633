pub mod crud;
pub mod current;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    semesters::{
        entities::Semester,
        requests::{CreateSemesterRequest, SemesterListParams, UpdateSemesterRequest},
    },
};
use crate::services::{Respond, not_found, storage_error};
use crate::storage::Storage;

pub(crate) async fn load_semester(storage: &Arc<dyn Storage>, id: i64) -> Respond<Semester> {
    storage
        .get_semester_by_id(id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| not_found(ErrorCode::SemesterNotFound, "Semester not found"))
}

pub struct SemesterService {
    storage: Option<Arc<dyn Storage>>,
}

impl SemesterService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_semesters(
        &self,
        query: SemesterListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::list_semesters(self, query, request).await
    }

    pub async fn create_semester(
        &self,
        req: CreateSemesterRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_semester(self, req, request).await
    }

    pub async fn get_semester(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::get_semester(self, id, request).await
    }

    pub async fn update_semester(
        &self,
        id: i64,
        req: UpdateSemesterRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_semester(self, id, req, request).await
    }

    pub async fn delete_semester(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::delete_semester(self, id, request).await
    }

    pub async fn get_current_semester(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        current::get_current_semester(self, request).await
    }

    pub async fn set_current_semester(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        current::set_current_semester(self, id, request).await
    }

    pub async fn get_semester_status(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        current::get_semester_status(self, id, request).await
    }
}
