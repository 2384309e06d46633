use std::collections::HashMap;

use super::{SeaOrmStorage, map_read_err, map_write_err, page_params};
use crate::entity::prelude::{Courses, Enrollments, Semesters};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::entity::{enrollments, semesters};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationInfo,
    enrollments::entities::EnrollmentStatus,
    students::{
        entities::{Student, StudentStatus},
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::TranscriptEntry,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建学生档案
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(req.user_id),
            student_number: Set(req.student_number),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            email: Set(req.email),
            department_id: Set(req.department_id),
            enrollment_year: Set(req.enrollment_year),
            status: Set(req.status.unwrap_or(StudentStatus::Active).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建学生失败", e))?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_user_id_impl(&self, user_id: i64) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_number_impl(&self, student_number: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::StudentNumber.eq(student_number))
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 分页列出学生
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Students::find();

        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        // 搜索姓名、学号、邮箱
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::FirstName.contains(&escaped))
                    .add(Column::LastName.contains(&escaped))
                    .add(Column::StudentNumber.contains(&escaped))
                    .add(Column::Email.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(Column::StudentNumber)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_read_err("查询学生总数失败", e))?;
        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| map_read_err("查询学生列表失败", e))?;

        Ok(PaginatedResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_read_err("查询学生失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(user_id) = update.user_id {
            model.user_id = Set(Some(user_id));
        }
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(department_id) = update.department_id {
            model.department_id = Set(department_id);
        }
        if let Some(enrollment_year) = update.enrollment_year {
            model.enrollment_year = Set(enrollment_year);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新学生失败", e))?;

        Ok(Some(updated.into_student()))
    }

    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err("删除学生失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 成绩单：学生全部选课记录及课程、学期信息
    pub async fn list_transcript_entries_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<TranscriptEntry>> {
        let rows = Enrollments::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .find_also_related(Courses)
            .all(&self.db)
            .await
            .map_err(|e| map_read_err("查询成绩单失败", e))?;

        let semester_ids: Vec<i64> = rows.iter().map(|(e, _)| e.semester_id).collect();
        let semester_models = if semester_ids.is_empty() {
            Vec::new()
        } else {
            Semesters::find()
                .filter(semesters::Column::Id.is_in(semester_ids))
                .all(&self.db)
                .await
                .map_err(|e| map_read_err("查询学期失败", e))?
        };
        let semesters: HashMap<i64, semesters::Model> =
            semester_models.into_iter().map(|s| (s.id, s)).collect();

        let mut entries: Vec<(i64, TranscriptEntry)> = rows
            .into_iter()
            .filter_map(|(enrollment, course)| {
                let course = course?;
                let semester = semesters.get(&enrollment.semester_id)?;
                Some((
                    semester.start_date,
                    TranscriptEntry {
                        enrollment_id: enrollment.id,
                        course_id: course.id,
                        course_code: course.code,
                        course_title: course.title,
                        credits: course.credits,
                        semester_id: semester.id,
                        semester_name: semester.name.clone(),
                        status: enrollment
                            .status
                            .parse::<EnrollmentStatus>()
                            .unwrap_or(EnrollmentStatus::Dropped),
                        final_score: enrollment.final_score,
                        letter_grade: enrollment.letter_grade,
                    },
                ))
            })
            .collect();

        entries.sort_by(|(a_start, a), (b_start, b)| {
            a_start
                .cmp(b_start)
                .then_with(|| a.course_code.cmp(&b.course_code))
        });

        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }
}
