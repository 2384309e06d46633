//! 先修课程管理
//!
//! 先修关系构成有向图（课程 → 先修课程），新增关系前检查不会形成环。

use std::collections::{HashMap, HashSet, VecDeque};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, load_course};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::requests::AddPrerequisiteRequest,
    privileges::entities::Permission,
};
use crate::services::{
    bad_request, not_found,
    privileges::{access_context, department_target},
    storage_error, unprocessable, write_error,
};

/// 新增 `course_id` 依赖 `prerequisite_id` 的边后是否成环
///
/// 等价于在现有图中 `course_id` 可以从 `prerequisite_id` 出发沿先修关系到达。
pub fn creates_cycle(edges: &[(i64, i64)], course_id: i64, prerequisite_id: i64) -> bool {
    if course_id == prerequisite_id {
        return true;
    }

    let mut outgoing: HashMap<i64, Vec<i64>> = HashMap::new();
    for &(course, prerequisite) in edges {
        outgoing.entry(course).or_default().push(prerequisite);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([prerequisite_id]);
    visited.insert(prerequisite_id);

    while let Some(current) = queue.pop_front() {
        if current == course_id {
            return true;
        }
        if let Some(next) = outgoing.get(&current) {
            for &neighbor in next {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    false
}

pub async fn list_prerequisites(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    try_or_respond!(load_course(&storage, course_id).await);

    match storage.list_prerequisites(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items,
            "Prerequisites retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn add_prerequisite(
    service: &CourseService,
    course_id: i64,
    req: AddPrerequisiteRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let course = try_or_respond!(load_course(&storage, course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageCourses, &target));

    if req.prerequisite_id == course_id {
        return Ok(bad_request(
            ErrorCode::PrerequisiteInvalid,
            "A course cannot be its own prerequisite",
        ));
    }
    if let Some(min_score) = req.min_score
        && !(0.0..=100.0).contains(&min_score)
    {
        return Ok(bad_request(
            ErrorCode::PrerequisiteInvalid,
            "min_score must be between 0 and 100",
        ));
    }

    try_or_respond!(load_course(&storage, req.prerequisite_id).await);

    let edges = match storage.list_prerequisite_edges().await {
        Ok(edges) => edges,
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };
    if edges.contains(&(course_id, req.prerequisite_id)) {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::PrerequisiteInvalid,
            "Prerequisite already exists",
        )));
    }
    if creates_cycle(&edges, course_id, req.prerequisite_id) {
        return Ok(unprocessable(
            ErrorCode::PrerequisiteCycle,
            "Adding this prerequisite would create a cycle",
        ));
    }

    match storage
        .add_prerequisite(course_id, req.prerequisite_id, req.min_score)
        .await
    {
        Ok(prerequisite) => {
            tracing::info!(
                "Course {} now requires {}",
                course.code,
                prerequisite.prerequisite_code
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                prerequisite,
                "Prerequisite added successfully",
            )))
        }
        Err(e) => Ok(write_error(
            e,
            ErrorCode::PrerequisiteInvalid,
            ErrorCode::PrerequisiteInvalid,
        )),
    }
}

pub async fn remove_prerequisite(
    service: &CourseService,
    course_id: i64,
    prerequisite_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let course = try_or_respond!(load_course(&storage, course_id).await);

    let target = try_or_respond!(department_target(&storage, course.department_id).await);
    try_or_respond!(ctx.require(Permission::ManageCourses, &target));

    match storage.remove_prerequisite(course_id, prerequisite_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Prerequisite removed successfully",
        ))),
        Ok(false) => Ok(not_found(
            ErrorCode::PrerequisiteNotFound,
            "Prerequisite not found",
        )),
        Err(e) => Ok(storage_error(e, ErrorCode::PrerequisiteInvalid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 依赖 2，2 依赖 1
    const CHAIN: [(i64, i64); 2] = [(3, 2), (2, 1)];

    #[test]
    fn test_self_reference_is_cycle() {
        assert!(creates_cycle(&[], 5, 5));
    }

    #[test]
    fn test_direct_back_edge_is_cycle() {
        assert!(creates_cycle(&CHAIN, 1, 2));
    }

    #[test]
    fn test_transitive_back_edge_is_cycle() {
        assert!(creates_cycle(&CHAIN, 1, 3));
    }

    #[test]
    fn test_forward_edges_are_allowed() {
        assert!(!creates_cycle(&CHAIN, 3, 1));
        assert!(!creates_cycle(&CHAIN, 4, 3));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let edges = [(4, 2), (4, 3), (2, 1)];
        assert!(!creates_cycle(&edges, 3, 1));
    }
}
