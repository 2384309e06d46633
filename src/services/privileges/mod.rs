pub mod access;
pub mod grant;

pub use access::{AccessContext, access_context, college_target, department_target};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::privileges::requests::{GrantPrivilegeRequest, UpdatePrivilegeRequest};
use crate::storage::Storage;

pub struct PrivilegeService {
    storage: Option<Arc<dyn Storage>>,
}

impl PrivilegeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub async fn grant(
        &self,
        req: GrantPrivilegeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grant::grant_privilege(self, req, request).await
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grant::list_user_privileges(self, user_id, request).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: UpdatePrivilegeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grant::update_privilege(self, id, req, request).await
    }

    pub async fn revoke(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        grant::revoke_privilege(self, id, request).await
    }
}
