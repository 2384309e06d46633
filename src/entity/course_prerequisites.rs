//! 先修课程关系实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_prerequisites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub prerequisite_id: i64,
    pub min_score: Option<f64>,
    pub created_at: i64,
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
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::PrerequisiteId",
        to = "super::courses::Column::Id",
        on_delete = "Cascade"
    )]
    PrerequisiteCourse,
}

// 默认关联到先修课程本身，便于查询时带出课程代码
impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrerequisiteCourse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_prerequisite(
        self,
        prerequisite: super::courses::Model,
    ) -> crate::models::courses::entities::Prerequisite {
        crate::models::courses::entities::Prerequisite {
            course_id: self.course_id,
            prerequisite_id: self.prerequisite_id,
            prerequisite_code: prerequisite.code,
            prerequisite_title: prerequisite.title,
            min_score: self.min_score,
        }
    }
}
