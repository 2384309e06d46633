use super::{SeaOrmStorage, map_read_err, map_write_err, page_params};
use crate::entity::course_prerequisites;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{CampusError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    courses::{
        entities::{Course, Prerequisite},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            department_id: Set(req.department_id),
            code: Set(req.code),
            title: Set(req.title),
            description: Set(req.description),
            credits: Set(req.credits),
            capacity: Set(req.capacity),
            is_active: Set(req.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建课程失败", e))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询课程失败", e))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn get_course_by_code_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询课程失败", e))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Courses::find();

        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Code.contains(&escaped))
                    .add(Column::Title.contains(&escaped)),
            );
        }

        let paginator = select.order_by_asc(Column::Code).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询课程总数失败", e))?;
        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询课程列表失败", e))?;

        Ok(PaginatedResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询课程失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(department_id) = update.department_id {
            model.department_id = Set(department_id);
        }
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(credits) = update.credits {
            model.credits = Set(credits);
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(capacity);
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新课程失败", e))?;

        Ok(Some(updated.into_course()))
    }

    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除课程失败", e))?;

        Ok(result.rows_affected > 0)
    }

    // ==================== 先修课程 ====================

    pub async fn list_prerequisites_impl(&self, course_id: i64) -> Result<Vec<Prerequisite>> {
        let rows = course_prerequisites::Entity::find()
            .filter(course_prerequisites::Column::CourseId.eq(course_id))
            .find_also_related(Courses)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询先修课程失败", e))?;

        let mut prerequisites: Vec<Prerequisite> = rows
            .into_iter()
            .filter_map(|(link, course)| course.map(|c| link.into_prerequisite(c)))
            .collect();
        prerequisites.sort_by(|a, b| a.prerequisite_code.cmp(&b.prerequisite_code));

        Ok(prerequisites)
    }

    pub async fn add_prerequisite_impl(
        &self,
        course_id: i64,
        prerequisite_id: i64,
        min_score: Option<f64>,
    ) -> Result<Prerequisite> {
        let prerequisite_course = Courses::find_by_id(prerequisite_id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询课程失败", e))?
            .ok_or_else(|| CampusError::not_found(format!("课程不存在: {prerequisite_id}")))?;

        let model = course_prerequisites::ActiveModel {
            course_id: Set(course_id),
            prerequisite_id: Set(prerequisite_id),
            min_score: Set(min_score),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let link = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("添加先修课程失败", e))?;

        Ok(link.into_prerequisite(prerequisite_course))
    }

    pub async fn remove_prerequisite_impl(
        &self,
        course_id: i64,
        prerequisite_id: i64,
    ) -> Result<bool> {
        let result = course_prerequisites::Entity::delete_many()
            .filter(course_prerequisites::Column::CourseId.eq(course_id))
            .filter(course_prerequisites::Column::PrerequisiteId.eq(prerequisite_id))
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除先修课程失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_prerequisite_edges_impl(&self) -> Result<Vec<(i64, i64)>> {
        let edges = course_prerequisites::Entity::find()
            .select_only()
            .column(course_prerequisites::Column::CourseId)
            .column(course_prerequisites::Column::PrerequisiteId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询先修关系失败", e))?;

        Ok(edges)
    }
}
