use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学期类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "semester.ts")]
pub enum Term {
    Fall,
    Spring,
    Summer,
    Winter,
}

string_enum!(Term, "term" {
    Fall => "fall",
    Spring => "spring",
    Summer => "summer",
    Winter => "winter",
});

// 学期
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "semester.ts")]
pub struct Semester {
    pub id: i64,
    pub name: String,
    pub term: Term,
    pub year: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 学期日期集合
#[derive(Debug, Clone, Copy)]
pub struct SemesterDates {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
}

impl SemesterDates {
    /// 校验日期先后关系，返回第一条违反的约束
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.start_date >= self.end_date {
            return Err("start_date must be earlier than end_date");
        }
        if self.registration_start >= self.registration_end {
            return Err("registration_start must be earlier than registration_end");
        }
        if self.registration_end > self.end_date {
            return Err("registration_end must not be later than end_date");
        }
        Ok(())
    }
}

impl Semester {
    pub fn dates(&self) -> SemesterDates {
        SemesterDates {
            start_date: self.start_date,
            end_date: self.end_date,
            registration_start: self.registration_start,
            registration_end: self.registration_end,
        }
    }

    /// 选课窗口为闭区间 [registration_start, registration_end]
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.registration_start && now <= self.registration_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    fn dates() -> SemesterDates {
        SemesterDates {
            start_date: at(9, 1),
            end_date: at(12, 20),
            registration_start: at(8, 1),
            registration_end: at(9, 15),
        }
    }

    #[test]
    fn test_valid_dates() {
        assert!(dates().validate().is_ok());
    }

    #[test]
    fn test_start_after_end_rejected() {
        let mut d = dates();
        d.end_date = at(8, 30);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_registration_window_inverted_rejected() {
        let mut d = dates();
        d.registration_start = at(9, 20);
        assert_eq!(
            d.validate(),
            Err("registration_start must be earlier than registration_end")
        );
    }

    #[test]
    fn test_registration_past_semester_end_rejected() {
        let mut d = dates();
        d.registration_end = at(12, 21);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_registration_window_bounds_inclusive() {
        let d = dates();
        let now = Utc::now();
        let semester = Semester {
            id: 1,
            name: "Fall 2025".into(),
            term: Term::Fall,
            year: 2025,
            start_date: d.start_date,
            end_date: d.end_date,
            registration_start: d.registration_start,
            registration_end: d.registration_end,
            is_current: true,
            created_at: now,
            updated_at: now,
        };
        assert!(semester.is_registration_open(at(8, 1)));
        assert!(semester.is_registration_open(at(9, 15)));
        assert!(!semester.is_registration_open(at(9, 16)));
        assert!(!semester.is_registration_open(at(7, 31)));
    }
}
