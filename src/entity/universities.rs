//! 大学实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "universities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::colleges::Entity")]
    Colleges,
}

impl Related<super::colleges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Colleges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_university(self) -> crate::models::organizations::entities::University {
        crate::models::organizations::entities::University {
            id: self.id,
            name: self.name,
            code: self.code,
            address: self.address,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
