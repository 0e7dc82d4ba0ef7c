use std::sync::Arc;

use chrono::{DateTime, Datelike, Month, TimeZone};
use serde::Serialize;

use super::entities::{Subject, TimeSpent};

/// Sum of every subject's time, normalized back into hours and minutes.
pub fn aggregate(subjects: &[Subject]) -> TimeSpent {
    let total = subjects
        .iter()
        .fold(0u64, |acc, v| acc.saturating_add(v.time().total_minutes()));
    TimeSpent::from_total_minutes(total)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRow {
    pub name: Arc<str>,
    #[serde(flatten)]
    pub time: TimeSpent,
}

/// Per-subject listing in collection order together with the overall total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeReport {
    pub subjects: Vec<SubjectRow>,
    pub total: TimeSpent,
}

pub fn time_report(subjects: &[Subject]) -> TimeReport {
    TimeReport {
        subjects: subjects
            .iter()
            .map(|v| SubjectRow {
                name: v.name().into(),
                time: v.time(),
            })
            .collect(),
        total: aggregate(subjects),
    }
}

/// Total labelled with the month it is requested in. Subjects are not filtered by date, so the
/// total is the same as in [TimeReport].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub month: String,
    pub subject_count: usize,
    pub total: TimeSpent,
}

pub fn monthly_report<Tz: TimeZone>(subjects: &[Subject], now: DateTime<Tz>) -> MonthlyReport {
    MonthlyReport {
        month: month_name(now.month()),
        subject_count: subjects.len(),
        total: aggregate(subjects),
    }
}

fn month_name(month: u32) -> String {
    Month::try_from(month as u8)
        .map(|v| v.name().to_string())
        .unwrap_or_else(|_| month.to_string())
}
