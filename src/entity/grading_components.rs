//! 评分项实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub component_type: String,
    pub weight: f64,
    pub max_score: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(has_many = "super::component_scores::Entity")]
    ComponentScores,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::component_scores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComponentScores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_component(self) -> crate::models::grading::entities::GradingComponent {
        use crate::models::grading::entities::{ComponentType, GradingComponent};

        GradingComponent {
            id: self.id,
            course_id: self.course_id,
            name: self.name,
            component_type: self
                .component_type
                .parse::<ComponentType>()
                .unwrap_or(ComponentType::Assignment),
            weight: self.weight,
            max_score: self.max_score,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
