pub mod components;
pub mod scores;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    grading::{
        entities::GradingComponent,
        requests::{
            CreateGradingComponentRequest, RecordScoreRequest, UpdateGradingComponentRequest,
        },
    },
};
use crate::services::{Respond, not_found, storage_error};
use crate::storage::Storage;

pub(crate) async fn load_component(
    storage: &Arc<dyn Storage>,
    id: i64,
) -> Respond<GradingComponent> {
    storage
        .get_grading_component_by_id(id)
        .await
        .map_err(|e| storage_error(e, ErrorCode::InternalServerError))?
        .ok_or_else(|| {
            not_found(
                ErrorCode::GradingComponentNotFound,
                "Grading component not found",
            )
        })
}

pub struct GradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_components(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        components::list_components(self, course_id, request).await
    }

    pub async fn create_component(
        &self,
        course_id: i64,
        req: CreateGradingComponentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        components::create_component(self, course_id, req, request).await
    }

    pub async fn update_component(
        &self,
        id: i64,
        req: UpdateGradingComponentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        components::update_component(self, id, req, request).await
    }

    pub async fn delete_component(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        components::delete_component(self, id, request).await
    }

    // 得分与总评
    pub async fn record_score(
        &self,
        enrollment_id: i64,
        req: RecordScoreRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        scores::record_score(self, enrollment_id, req, request).await
    }

    pub async fn list_scores(
        &self,
        enrollment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        scores::list_scores(self, enrollment_id, request).await
    }

    pub async fn finalize_grade(
        &self,
        enrollment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        scores::finalize_grade(self, enrollment_id, request).await
    }
}
