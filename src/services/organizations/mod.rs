//! 组织架构：大学 → 学院 → 院系
//!
//! 查询对所有已登录用户开放；写操作需要 `manage_organization` 权限，
//! 新建大学只允许超级管理员。

pub mod colleges;
pub mod departments;
pub mod universities;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    organizations::requests::{
        CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
        OrganizationListParams, UpdateCollegeRequest, UpdateDepartmentRequest,
        UpdateUniversityRequest,
    },
};
use crate::services::{Respond, bad_request};
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_name};

const MAX_NAME_LEN: usize = 128;

/// 校验名称与代码，未提供的字段跳过
pub(crate) fn validate_fields(name: Option<&String>, code: Option<&String>) -> Respond<()> {
    if let Some(name) = name {
        validate_name(name, MAX_NAME_LEN).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(code) = code {
        validate_code(code).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    Ok(())
}

pub struct OrganizationService {
    storage: Option<Arc<dyn Storage>>,
}

impl OrganizationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 大学
    pub async fn create_university(
        &self,
        req: CreateUniversityRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        universities::create_university(self, req, request).await
    }

    pub async fn list_universities(
        &self,
        query: OrganizationListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        universities::list_universities(self, query, request).await
    }

    pub async fn get_university(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        universities::get_university(self, id, request).await
    }

    pub async fn get_university_tree(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        universities::get_university_tree(self, id, request).await
    }

    pub async fn update_university(
        &self,
        id: i64,
        req: UpdateUniversityRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        universities::update_university(self, id, req, request).await
    }

    pub async fn delete_university(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        universities::delete_university(self, id, request).await
    }

    // 学院
    pub async fn create_college(
        &self,
        req: CreateCollegeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        colleges::create_college(self, req, request).await
    }

    pub async fn list_colleges(
        &self,
        query: OrganizationListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        colleges::list_colleges(self, query, request).await
    }

    pub async fn get_college(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        colleges::get_college(self, id, request).await
    }

    pub async fn update_college(
        &self,
        id: i64,
        req: UpdateCollegeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        colleges::update_college(self, id, req, request).await
    }

    pub async fn delete_college(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        colleges::delete_college(self, id, request).await
    }

    // 院系
    pub async fn create_department(
        &self,
        req: CreateDepartmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        departments::create_department(self, req, request).await
    }

    pub async fn list_departments(
        &self,
        query: OrganizationListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        departments::list_departments(self, query, request).await
    }

    pub async fn get_department(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        departments::get_department(self, id, request).await
    }

    pub async fn update_department(
        &self,
        id: i64,
        req: UpdateDepartmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        departments::update_department(self, id, req, request).await
    }

    pub async fn delete_department(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        departments::delete_department(self, id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields(Some(&"Computer Science".to_string()), Some(&"CS".to_string())).is_ok());
        assert!(validate_fields(None, None).is_ok());
        assert!(validate_fields(Some(&"   ".to_string()), None).is_err());
        assert!(validate_fields(None, Some(&"bad code!".to_string())).is_err());
    }
}
