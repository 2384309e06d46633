use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, ensure_can_read, load_student};
use crate::models::{
    ApiResponse, ErrorCode,
    enrollments::entities::EnrollmentStatus,
    grading::entities::LetterGrade,
    students::{
        entities::Student,
        responses::{TranscriptEntry, TranscriptResponse},
    },
};
use crate::services::{privileges::access_context, storage_error};

/// 已结课记录对应的等级成绩，优先使用记录中的等级
fn entry_grade(entry: &TranscriptEntry) -> Option<LetterGrade> {
    if !entry.status.is_finalized() {
        return None;
    }
    entry
        .letter_grade
        .as_deref()
        .and_then(|g| g.parse().ok())
        .or_else(|| entry.final_score.map(LetterGrade::from_score))
}

/// 汇总学分与绩点
///
/// 返回 (已结课学分, 已通过学分, GPA)。GPA 按学分加权，保留两位小数。
pub fn summarize(entries: &[TranscriptEntry]) -> (i32, i32, Option<f64>) {
    let mut attempted = 0;
    let mut completed = 0;
    let mut weighted_points = 0.0;

    for entry in entries {
        let Some(grade) = entry_grade(entry) else {
            continue;
        };
        attempted += entry.credits;
        if entry.status == EnrollmentStatus::Completed {
            completed += entry.credits;
        }
        weighted_points += grade.grade_points() * f64::from(entry.credits);
    }

    let gpa = (attempted > 0)
        .then(|| (weighted_points / f64::from(attempted) * 100.0).round() / 100.0);

    (attempted, completed, gpa)
}

pub fn build_transcript(student: Student, entries: Vec<TranscriptEntry>) -> TranscriptResponse {
    let (attempted_credits, completed_credits, gpa) = summarize(&entries);
    TranscriptResponse {
        student,
        entries,
        attempted_credits,
        completed_credits,
        gpa,
    }
}

pub async fn get_transcript(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = try_or_respond!(access_context(&storage, request).await);
    let student = try_or_respond!(load_student(&storage, id).await);
    try_or_respond!(ensure_can_read(&storage, &ctx, &student).await);

    match storage.list_transcript_entries(id).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            build_transcript(student, entries),
            "Transcript retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        credits: i32,
        status: EnrollmentStatus,
        final_score: Option<f64>,
        letter_grade: Option<&str>,
    ) -> TranscriptEntry {
        TranscriptEntry {
            enrollment_id: 1,
            course_id: 1,
            course_code: "CS101".into(),
            course_title: "Intro".into(),
            credits,
            semester_id: 1,
            semester_name: "Fall 2025".into(),
            status,
            final_score,
            letter_grade: letter_grade.map(str::to_string),
        }
    }

    #[test]
    fn test_summarize_weights_by_credits() {
        let entries = vec![
            entry(4, EnrollmentStatus::Completed, Some(95.0), Some("A")),
            entry(2, EnrollmentStatus::Completed, Some(72.0), Some("C")),
            entry(3, EnrollmentStatus::Failed, Some(40.0), Some("F")),
        ];
        let (attempted, completed, gpa) = summarize(&entries);
        assert_eq!(attempted, 9);
        assert_eq!(completed, 6);
        // (4*4 + 2*2 + 0*3) / 9 = 2.22
        assert_eq!(gpa, Some(2.22));
    }

    #[test]
    fn test_summarize_ignores_open_and_dropped() {
        let entries = vec![
            entry(3, EnrollmentStatus::Enrolled, None, None),
            entry(3, EnrollmentStatus::Dropped, None, None),
        ];
        assert_eq!(summarize(&entries), (0, 0, None));
    }

    #[test]
    fn test_summarize_falls_back_to_score() {
        let entries = vec![entry(3, EnrollmentStatus::Completed, Some(85.0), None)];
        assert_eq!(summarize(&entries), (3, 3, Some(3.0)));
    }
}
