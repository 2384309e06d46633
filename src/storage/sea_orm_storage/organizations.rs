//! 组织架构存储实现（大学 / 学院 / 院系）

use super::{SeaOrmStorage, map_read_err, map_write_err, page_params};
use crate::entity::{colleges, departments, universities};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationInfo,
    organizations::{
        entities::{College, Department, DepartmentLineage, University},
        requests::{
            CreateCollegeRequest, CreateDepartmentRequest, CreateUniversityRequest,
            OrganizationListQuery, UpdateCollegeRequest, UpdateDepartmentRequest,
            UpdateUniversityRequest,
        },
        responses::{CollegeNode, UniversityTreeResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    // ==================== 大学 ====================

    pub async fn create_university_impl(&self, req: CreateUniversityRequest) -> Result<University> {
        let now = chrono::Utc::now().timestamp();

        let model = universities::ActiveModel {
            name: Set(req.name),
            code: Set(req.code),
            address: Set(req.address),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建大学失败", e))?;

        Ok(result.into_university())
    }

    pub async fn get_university_by_id_impl(&self, id: i64) -> Result<Option<University>> {
        let result = universities::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询大学失败", e))?;

        Ok(result.map(|m| m.into_university()))
    }

    pub async fn list_universities_impl(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<University>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = universities::Entity::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(universities::Column::Name.contains(&escaped))
                    .add(universities::Column::Code.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(universities::Column::Name)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询大学总数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询大学列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_university()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_university_impl(
        &self,
        id: i64,
        update: UpdateUniversityRequest,
    ) -> Result<Option<University>> {
        let Some(existing) = universities::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询大学失败", e))?
        else {
            return Ok(None);
        };

        let mut model: universities::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新大学失败", e))?;

        Ok(Some(updated.into_university()))
    }

    pub async fn delete_university_impl(&self, id: i64) -> Result<bool> {
        let result = universities::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除大学失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_university_tree_impl(&self, id: i64) -> Result<Option<UniversityTreeResponse>> {
        let Some(university) = self.get_university_by_id_impl(id).await? else {
            return Ok(None);
        };

        let college_models = colleges::Entity::find()
            .filter(colleges::Column::UniversityId.eq(id))
            .order_by_asc(colleges::Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询学院列表失败", e))?;

        let college_ids: Vec<i64> = college_models.iter().map(|c| c.id).collect();
        let department_models = if college_ids.is_empty() {
            Vec::new()
        } else {
            departments::Entity::find()
                .filter(departments::Column::CollegeId.is_in(college_ids))
                .order_by_asc(departments::Column::Code)
                .all(&self.db)
                .await
                .map_err(|e| map_read_err("查询院系列表失败", e))?
        };

        let mut departments_by_college: std::collections::HashMap<i64, Vec<Department>> =
            std::collections::HashMap::new();
        for model in department_models {
            departments_by_college
                .entry(model.college_id)
                .or_default()
                .push(model.into_department());
        }

        let colleges = college_models
            .into_iter()
            .map(|model| {
                let departments = departments_by_college.remove(&model.id).unwrap_or_default();
                CollegeNode {
                    college: model.into_college(),
                    departments,
                }
            })
            .collect();

        Ok(Some(UniversityTreeResponse {
            university,
            colleges,
        }))
    }

    // ==================== 学院 ====================

    pub async fn create_college_impl(&self, req: CreateCollegeRequest) -> Result<College> {
        let now = chrono::Utc::now().timestamp();

        let model = colleges::ActiveModel {
            university_id: Set(req.university_id),
            name: Set(req.name),
            code: Set(req.code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建学院失败", e))?;

        Ok(result.into_college())
    }

    pub async fn get_college_by_id_impl(&self, id: i64) -> Result<Option<College>> {
        let result = colleges::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学院失败", e))?;

        Ok(result.map(|m| m.into_college()))
    }

    pub async fn list_colleges_impl(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<College>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = colleges::Entity::find();

        if let Some(university_id) = query.parent_id {
            select = select.filter(colleges::Column::UniversityId.eq(university_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(colleges::Column::Name.contains(&escaped))
                    .add(colleges::Column::Code.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(colleges::Column::Name)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询学院总数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询学院列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_college()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_college_impl(
        &self,
        id: i64,
        update: UpdateCollegeRequest,
    ) -> Result<Option<College>> {
        let Some(existing) = colleges::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学院失败", e))?
        else {
            return Ok(None);
        };

        let mut model: colleges::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新学院失败", e))?;

        Ok(Some(updated.into_college()))
    }

    pub async fn delete_college_impl(&self, id: i64) -> Result<bool> {
        let result = colleges::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除学院失败", e))?;

        Ok(result.rows_affected > 0)
    }

    // ==================== 院系 ====================

    pub async fn create_department_impl(&self, req: CreateDepartmentRequest) -> Result<Department> {
        let now = chrono::Utc::now().timestamp();

        let model = departments::ActiveModel {
            college_id: Set(req.college_id),
            name: Set(req.name),
            code: Set(req.code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建院系失败", e))?;

        Ok(result.into_department())
    }

    pub async fn get_department_by_id_impl(&self, id: i64) -> Result<Option<Department>> {
        let result = departments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询院系失败", e))?;

        Ok(result.map(|m| m.into_department()))
    }

    pub async fn list_departments_impl(
        &self,
        query: OrganizationListQuery,
    ) -> Result<PaginatedResponse<Department>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = departments::Entity::find();

        if let Some(college_id) = query.parent_id {
            select = select.filter(departments::Column::CollegeId.eq(college_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(departments::Column::Name.contains(&escaped))
                    .add(departments::Column::Code.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(departments::Column::Name)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询院系总数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询院系列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_department()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_department_impl(
        &self,
        id: i64,
        update: UpdateDepartmentRequest,
    ) -> Result<Option<Department>> {
        let Some(existing) = departments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询院系失败", e))?
        else {
            return Ok(None);
        };

        let mut model: departments::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新院系失败", e))?;

        Ok(Some(updated.into_department()))
    }

    pub async fn delete_department_impl(&self, id: i64) -> Result<bool> {
        let result = departments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除院系失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 院系 → 学院 → 大学
    pub async fn get_department_lineage_impl(
        &self,
        department_id: i64,
    ) -> Result<Option<DepartmentLineage>> {
        let result = departments::Entity::find_by_id(department_id)
            .find_also_related(colleges::Entity)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询院系归属失败", e))?;

        Ok(match result {
            Some((department, Some(college))) => Some(DepartmentLineage {
                department_id: department.id,
                college_id: college.id,
                university_id: college.university_id,
            }),
            _ => None,
        })
    }
}
