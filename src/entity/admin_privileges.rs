//! 管理员权限实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_privileges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub scope: String,
    pub scope_id: i64,
    /// 逗号拼接的权限名
    #[sea_orm(column_type = "Text")]
    pub permissions: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型
    ///
    /// 范围或权限字符串无法解析时返回错误，不做任何替换。
    pub fn into_privilege(
        self,
    ) -> crate::errors::Result<crate::models::privileges::entities::AdminPrivilege> {
        use crate::errors::CampusError;
        use crate::models::privileges::entities::{AdminPrivilege, ScopeKind, parse_permissions};

        let scope = self.scope.parse::<ScopeKind>().map_err(|e| {
            CampusError::database_operation(format!("管理员权限 {} 范围无效: {e}", self.id))
        })?;
        let permissions = parse_permissions(&self.permissions).map_err(|e| {
            CampusError::database_operation(format!("管理员权限 {} 权限列表无效: {e}", self.id))
        })?;

        Ok(AdminPrivilege {
            id: self.id,
            user_id: self.user_id,
            scope,
            scope_id: self.scope_id,
            permissions,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CampusError;
    use crate::models::privileges::entities::{Permission, ScopeKind};

    fn model(scope: &str, permissions: &str) -> Model {
        Model {
            id: 7,
            user_id: 3,
            scope: scope.to_string(),
            scope_id: 30,
            permissions: permissions.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_into_privilege_parses_stored_columns() {
        let privilege = model("faculty", "manage_students, manage_courses,")
            .into_privilege()
            .expect("valid row");
        assert_eq!(privilege.scope, ScopeKind::Faculty);
        assert_eq!(privilege.scope_id, 30);
        assert_eq!(
            privilege.permissions,
            vec![Permission::ManageStudents, Permission::ManageCourses]
        );
    }

    #[test]
    fn test_into_privilege_rejects_unknown_scope() {
        let err = model("campus", "manage_students")
            .into_privilege()
            .expect_err("unknown scope");
        assert!(matches!(err, CampusError::DatabaseOperation(_)));
    }

    #[test]
    fn test_into_privilege_rejects_unknown_permission() {
        let err = model("department", "manage_students,delete_everything")
            .into_privilege()
            .expect_err("unknown permission");
        assert!(matches!(err, CampusError::DatabaseOperation(_)));
    }
}
