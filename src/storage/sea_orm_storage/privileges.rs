//! 管理员权限存储实现
//!
//! 权限列表以逗号拼接的字符串保存在 `permissions` 列中。

use super::{SeaOrmStorage, map_read_err, map_write_err};
use crate::entity::admin_privileges::{ActiveModel, Column, Entity as AdminPrivileges};
use crate::errors::Result;
use crate::models::privileges::entities::{
    AdminPrivilege, Permission, ScopeKind, join_permissions,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn list_user_privileges_impl(&self, user_id: i64) -> Result<Vec<AdminPrivilege>> {
        let result = AdminPrivileges::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询管理员权限失败", e))?;

        result.into_iter().map(|m| m.into_privilege()).collect()
    }

    pub async fn get_privilege_by_id_impl(&self, id: i64) -> Result<Option<AdminPrivilege>> {
        let result = AdminPrivileges::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询管理员权限失败", e))?;

        result.map(|m| m.into_privilege()).transpose()
    }

    pub async fn get_privilege_by_scope_impl(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
    ) -> Result<Option<AdminPrivilege>> {
        let result = AdminPrivileges::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Scope.eq(scope.as_str()))
            .filter(Column::ScopeId.eq(scope_id))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询管理员权限失败", e))?;

        result.map(|m| m.into_privilege()).transpose()
    }

    pub async fn create_privilege_impl(
        &self,
        user_id: i64,
        scope: ScopeKind,
        scope_id: i64,
        permissions: &[Permission],
    ) -> Result<AdminPrivilege> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(user_id),
            scope: Set(scope.to_string()),
            scope_id: Set(scope_id),
            permissions: Set(join_permissions(permissions)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建管理员权限失败", e))?;

        result.into_privilege()
    }

    pub async fn update_privilege_permissions_impl(
        &self,
        id: i64,
        permissions: &[Permission],
    ) -> Result<Option<AdminPrivilege>> {
        let Some(existing) = AdminPrivileges::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询管理员权限失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.permissions = Set(join_permissions(permissions));
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新管理员权限失败", e))?;

        updated.into_privilege().map(Some)
    }

    pub async fn delete_privilege_impl(&self, id: i64) -> Result<bool> {
        let result = AdminPrivileges::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除管理员权限失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
