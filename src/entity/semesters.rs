//! 学期实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "semesters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub term: String,
    pub year: i32,
    pub start_date: i64,
    pub end_date: i64,
    pub registration_start: i64,
    pub registration_end: i64,
    pub is_current: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_semester(self) -> crate::models::semesters::entities::Semester {
        use crate::models::semesters::entities::{Semester, Term};
        use super::to_datetime;

        Semester {
            id: self.id,
            name: self.name,
            term: self.term.parse::<Term>().unwrap_or(Term::Fall),
            year: self.year,
            start_date: to_datetime(self.start_date),
            end_date: to_datetime(self.end_date),
            registration_start: to_datetime(self.registration_start),
            registration_end: to_datetime(self.registration_end),
            is_current: self.is_current,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
