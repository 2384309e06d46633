//! 评分项得分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "component_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub enrollment_id: i64,
    pub component_id: i64,
    pub score: f64,
    pub graded_by: Option<i64>,
    pub graded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id",
        on_delete = "Cascade"
    )]
    Enrollment,
    #[sea_orm(
        belongs_to = "super::grading_components::Entity",
        from = "Column::ComponentId",
        to = "super::grading_components::Column::Id",
        on_delete = "Cascade"
    )]
    Component,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::grading_components::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Component.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_score(self) -> crate::models::grading::entities::ComponentScore {
        crate::models::grading::entities::ComponentScore {
            id: self.id,
            enrollment_id: self.enrollment_id,
            component_id: self.component_id,
            score: self.score,
            graded_by: self.graded_by,
            graded_at: super::to_datetime(self.graded_at),
        }
    }
}
