use super::{SeaOrmStorage, map_read_err, map_write_err, page_params};
use crate::entity::component_scores::{Column as ScoreColumn, Entity as ComponentScores};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::entity::prelude::Courses;
use crate::errors::{CampusError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::EnrollmentListQuery,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建选课记录
    ///
    /// 同一学生/课程/学期已存在退课记录时重新激活该记录，并清空退课前的评分项得分；
    /// 已存在其他状态的记录返回冲突。
    pub async fn create_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let existing = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::SemesterId.eq(semester_id))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询选课记录失败", e))?;

        if let Some(existing) = existing {
            if existing.status != EnrollmentStatus::Dropped.as_str() {
                return Err(CampusError::conflict(format!(
                    "选课记录已存在: student={student_id}, course={course_id}, semester={semester_id}"
                )));
            }

            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| map_write_err("开启事务失败", e))?;

            ComponentScores::delete_many()
                .filter(ScoreColumn::EnrollmentId.eq(existing.id))
                .exec(&txn)
                .await
                .map_err(|e| map_write_err("清除评分项得分失败", e))?;

            let mut model: ActiveModel = existing.into();
            model.status = Set(EnrollmentStatus::Enrolled.to_string());
            model.final_score = Set(None);
            model.letter_grade = Set(None);
            model.enrolled_at = Set(now);
            model.updated_at = Set(now);

            let reactivated = model
                .update(&txn)
                .await
                .map_err(|e| map_write_err("恢复选课记录失败", e))?;

            txn.commit()
                .await
                .map_err(|e| map_write_err("提交事务失败", e))?;

            return Ok(reactivated.into_enrollment());
        }

        let model = ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            semester_id: Set(semester_id),
            status: Set(EnrollmentStatus::Enrolled.to_string()),
            final_score: Set(None),
            letter_grade: Set(None),
            enrolled_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建选课记录失败", e))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询选课记录失败", e))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn list_enrollments_with_pagination_impl(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Enrollments::find();

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(semester_id) = query.semester_id {
            select = select.filter(Column::SemesterId.eq(semester_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::EnrolledAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询选课总数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询选课列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_enrollment()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn list_student_enrollments_impl(&self, student_id: i64) -> Result<Vec<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询学生选课记录失败", e))?;

        Ok(result.into_iter().map(|m| m.into_enrollment()).collect())
    }

    pub async fn count_active_enrollments_impl(
        &self,
        course_id: i64,
        semester_id: i64,
    ) -> Result<u64> {
        Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::SemesterId.eq(semester_id))
            .filter(Column::Status.eq(EnrollmentStatus::Enrolled.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| map_read_err("统计选课人数失败", e))
    }

    pub async fn get_semester_credit_load_impl(
        &self,
        student_id: i64,
        semester_id: i64,
    ) -> Result<i32> {
        let rows = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::SemesterId.eq(semester_id))
            .filter(Column::Status.eq(EnrollmentStatus::Enrolled.as_str()))
            .find_also_related(Courses)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("统计学期学分失败", e))?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, course)| course.map(|c| c.credits))
            .sum())
    }

    pub async fn update_enrollment_status_impl(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        let Some(existing) = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询选课记录失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新选课状态失败", e))?;

        Ok(Some(updated.into_enrollment()))
    }

    pub async fn record_final_grade_impl(
        &self,
        id: i64,
        final_score: f64,
        letter_grade: &str,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        let Some(existing) = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询选课记录失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.final_score = Set(Some(final_score));
        model.letter_grade = Set(Some(letter_grade.to_string()));
        model.status = Set(status.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("写入最终成绩失败", e))?;

        Ok(Some(updated.into_enrollment()))
    }
}
