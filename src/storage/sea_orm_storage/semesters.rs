use super::{SeaOrmStorage, map_read_err, map_write_err, page_params};
use crate::entity::semesters::{ActiveModel, Column, Entity as Semesters};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationInfo,
    semesters::{
        entities::Semester,
        requests::{CreateSemesterRequest, SemesterListQuery, UpdateSemesterRequest},
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建学期，若标记为当前学期则清除其他学期的标记
    pub async fn create_semester_impl(&self, req: CreateSemesterRequest) -> Result<Semester> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| map_write_err("开启事务失败", e))?;

        if req.is_current {
            clear_current_flag(&txn).await?;
        }

        let model = ActiveModel {
            name: Set(req.name),
            term: Set(req.term.to_string()),
            year: Set(req.year),
            start_date: Set(req.start_date.timestamp()),
            end_date: Set(req.end_date.timestamp()),
            registration_start: Set(req.registration_start.timestamp()),
            registration_end: Set(req.registration_end.timestamp()),
            is_current: Set(req.is_current),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&txn)
            .await
            .map_err(|e| map_write_err("创建学期失败", e))?;

        txn.commit()
            .await
            .map_err(|e| map_write_err("提交事务失败", e))?;

        Ok(result.into_semester())
    }

    pub async fn get_semester_by_id_impl(&self, id: i64) -> Result<Option<Semester>> {
        let result = Semesters::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学期失败", e))?;

        Ok(result.map(|m| m.into_semester()))
    }

    pub async fn get_current_semester_impl(&self) -> Result<Option<Semester>> {
        let result = Semesters::find()
            .filter(Column::IsCurrent.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询当前学期失败", e))?;

        Ok(result.map(|m| m.into_semester()))
    }

    pub async fn list_semesters_with_pagination_impl(
        &self,
        query: SemesterListQuery,
    ) -> Result<PaginatedResponse<Semester>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Semesters::find();

        if let Some(year) = query.year {
            select = select.filter(Column::Year.eq(year));
        }

        if let Some(term) = query.term {
            select = select.filter(Column::Term.eq(term.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::StartDate)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询学期总数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询学期列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_semester()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_semester_impl(
        &self,
        id: i64,
        update: UpdateSemesterRequest,
    ) -> Result<Option<Semester>> {
        let Some(existing) = Semesters::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学期失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(term) = update.term {
            model.term = Set(term.to_string());
        }
        if let Some(year) = update.year {
            model.year = Set(year);
        }
        if let Some(start_date) = update.start_date {
            model.start_date = Set(start_date.timestamp());
        }
        if let Some(end_date) = update.end_date {
            model.end_date = Set(end_date.timestamp());
        }
        if let Some(registration_start) = update.registration_start {
            model.registration_start = Set(registration_start.timestamp());
        }
        if let Some(registration_end) = update.registration_end {
            model.registration_end = Set(registration_end.timestamp());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新学期失败", e))?;

        Ok(Some(updated.into_semester()))
    }

    pub async fn delete_semester_impl(&self, id: i64) -> Result<bool> {
        let result = Semesters::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除学期失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 设为当前学期（事务内先清除全部标记）
    pub async fn set_current_semester_impl(&self, id: i64) -> Result<Option<Semester>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| map_write_err("开启事务失败", e))?;

        let Some(existing) = Semesters::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| map_read_err("查询学期失败", e))?
        else {
            return Ok(None);
        };

        clear_current_flag(&txn).await?;

        let mut model: ActiveModel = existing.into();
        model.is_current = Set(true);
        model.updated_at = Set(chrono::Utc::now().timestamp());
        let updated = model
            .update(&txn)
            .await
            .map_err(|e| map_write_err("设置当前学期失败", e))?;

        txn.commit()
            .await
            .map_err(|e| map_write_err("提交事务失败", e))?;

        Ok(Some(updated.into_semester()))
    }
}

async fn clear_current_flag<C: ConnectionTrait>(conn: &C) -> Result<()> {
    Semesters::update_many()
        .col_expr(Column::IsCurrent, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
        .filter(Column::IsCurrent.eq(true))
        .exec(conn)
        .await
        .map_err(|e| map_write_err("清除当前学期标记失败", e))?;
    Ok(())
}
