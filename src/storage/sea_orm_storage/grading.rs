//! 评分项与评分项得分存储实现

use super::{SeaOrmStorage, map_read_err, map_write_err};
use crate::entity::{component_scores, grading_components};
use crate::errors::Result;
use crate::models::grading::{
    entities::{ComponentScore, GradingComponent},
    requests::{CreateGradingComponentRequest, UpdateGradingComponentRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_grading_component_impl(
        &self,
        course_id: i64,
        req: CreateGradingComponentRequest,
    ) -> Result<GradingComponent> {
        let now = chrono::Utc::now().timestamp();

        let model = grading_components::ActiveModel {
            course_id: Set(course_id),
            name: Set(req.name),
            component_type: Set(req.component_type.to_string()),
            weight: Set(req.weight),
            max_score: Set(req.max_score),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建评分项失败", e))?;

        Ok(result.into_component())
    }

    pub async fn get_grading_component_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<GradingComponent>> {
        let result = grading_components::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项失败", e))?;

        Ok(result.map(|m| m.into_component()))
    }

    pub async fn list_grading_components_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<GradingComponent>> {
        let result = grading_components::Entity::find()
            .filter(grading_components::Column::CourseId.eq(course_id))
            .order_by_asc(grading_components::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项列表失败", e))?;

        Ok(result.into_iter().map(|m| m.into_component()).collect())
    }

    pub async fn update_grading_component_impl(
        &self,
        id: i64,
        update: UpdateGradingComponentRequest,
    ) -> Result<Option<GradingComponent>> {
        let Some(existing) = grading_components::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项失败", e))?
        else {
            return Ok(None);
        };

        let mut model: grading_components::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(component_type) = update.component_type {
            model.component_type = Set(component_type.to_string());
        }
        if let Some(weight) = update.weight {
            model.weight = Set(weight);
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新评分项失败", e))?;

        Ok(Some(updated.into_component()))
    }

    pub async fn delete_grading_component_impl(&self, id: i64) -> Result<bool> {
        let result = grading_components::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除评分项失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 写入评分项得分，已存在时覆盖
    pub async fn upsert_component_score_impl(
        &self,
        enrollment_id: i64,
        component_id: i64,
        score: f64,
        graded_by: i64,
    ) -> Result<ComponentScore> {
        let now = chrono::Utc::now().timestamp();

        let existing = component_scores::Entity::find()
            .filter(component_scores::Column::EnrollmentId.eq(enrollment_id))
            .filter(component_scores::Column::ComponentId.eq(component_id))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项得分失败", e))?;

        let saved = match existing {
            Some(existing) => {
                let mut model: component_scores::ActiveModel = existing.into();
                model.score = Set(score);
                model.graded_by = Set(Some(graded_by));
                model.graded_at = Set(now);
                model
                    .update(&self.db)
                    .await
                    .map_err(|e| map_write_err("更新评分项得分失败", e))?
            }
            None => component_scores::ActiveModel {
                enrollment_id: Set(enrollment_id),
                component_id: Set(component_id),
                score: Set(score),
                graded_by: Set(Some(graded_by)),
                graded_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("写入评分项得分失败", e))?,
        };

        Ok(saved.into_score())
    }

    pub async fn list_component_scores_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<Vec<ComponentScore>> {
        let result = component_scores::Entity::find()
            .filter(component_scores::Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(component_scores::Column::ComponentId)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项得分失败", e))?;

        Ok(result.into_iter().map(|m| m.into_score()).collect())
    }

    pub async fn max_component_score_impl(&self, component_id: i64) -> Result<Option<f64>> {
        let highest = component_scores::Entity::find()
            .filter(component_scores::Column::ComponentId.eq(component_id))
            .order_by_desc(component_scores::Column::Score)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询评分项最高分失败", e))?;

        Ok(highest.map(|m| m.score))
    }
}
