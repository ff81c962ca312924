//! Submission reports for managers and admins.
//!
//! The summary block is always computed here from the submissions in scope.
//! Insights and recommendations come from the model when one is configured
//! ([`parse_generated_analysis`]) and from [`offline_analysis`] otherwise.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::approval::SubmissionStatus;
use crate::dashboard::StatusCounts;
use crate::error::CoreError;
use crate::generator::strip_code_fences;
use crate::schema::SubmittedData;
use crate::types::Timestamp;

/// At most this many recommendations are returned.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// System instruction sent with every report request.
pub const REPORT_SYSTEM_PROMPT: &str = r#"You are an analyst reviewing field inspection form submissions.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "insights": [
    {
      "category": "string - short topic",
      "description": "string - what the data shows",
      "impact": "high|medium|low"
    }
  ],
  "recommendations": [
    {
      "title": "string - short action",
      "description": "string - what to do and why",
      "priority": "high|medium|low"
    }
  ]
}

Rules:
- Identify 3-5 meaningful patterns, recurring issues or threshold alerts
- Give at most 3 actionable recommendations with clear priorities
- Use professional, concise language"#;

/// One submission as the analysis sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub form_title: String,
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
    /// Names of the fields whose thresholds fired on this submission.
    pub alerted_fields: Vec<String>,
    pub data: SubmittedData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Case-insensitive; anything unrecognised reads as `medium`.
impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub description: String,
    pub impact: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_submissions: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub pending_count: usize,
    /// Approved share of all submissions, in percent.
    pub compliance_rate: f64,
    pub analysis_period: String,
}

/// The narrative half of a report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
}

impl Report {
    pub fn new(entries: &[ReportEntry], analysis: Analysis) -> Self {
        let mut recommendations = analysis.recommendations;
        recommendations.truncate(MAX_RECOMMENDATIONS);
        Self {
            summary: summarize(entries),
            insights: analysis.insights,
            recommendations,
        }
    }
}

pub fn summarize(entries: &[ReportEntry]) -> ReportSummary {
    let counts = StatusCounts::tally(entries.iter().map(|e| e.status));
    ReportSummary {
        total_submissions: counts.total(),
        approved_count: counts.approved,
        rejected_count: counts.rejected,
        pending_count: counts.pending,
        compliance_rate: counts.completion_rate(),
        analysis_period: analysis_period(entries),
    }
}

/// `first to last` creation date, or the single date when they coincide.
pub fn analysis_period(entries: &[ReportEntry]) -> String {
    let first = entries.iter().map(|e| e.created_at).min();
    let last = entries.iter().map(|e| e.created_at).max();
    match (first, last) {
        (Some(first), Some(last)) => {
            let first = first.format("%Y-%m-%d").to_string();
            let last = last.format("%Y-%m-%d").to_string();
            if first == last {
                first
            } else {
                format!("{first} to {last}")
            }
        }
        _ => "No submissions".to_string(),
    }
}

/// Rule-based analysis over review states and threshold alerts.
pub fn offline_analysis(entries: &[ReportEntry]) -> Analysis {
    let counts = StatusCounts::tally(entries.iter().map(|e| e.status));
    let total = counts.total();
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    if counts.pending > 0 {
        let impact = if counts.pending * 2 >= total {
            Severity::High
        } else {
            Severity::Medium
        };
        insights.push(Insight {
            category: "Review backlog".into(),
            description: format!(
                "{} of {total} submissions are awaiting review",
                counts.pending
            ),
            impact,
        });
        recommendations.push(Recommendation {
            title: "Clear the review queue".into(),
            description: "Approve or reject pending submissions so field agents get timely feedback"
                .into(),
            priority: impact,
        });
    }

    let alerted = entries.iter().filter(|e| !e.alerted_fields.is_empty()).count();
    let alerted_fields = entries.iter().flat_map(|e| &e.alerted_fields);
    if let Some((field, hits)) = most_common(alerted_fields.map(String::as_str)) {
        insights.push(Insight {
            category: "Threshold alerts".into(),
            description: format!(
                "Threshold notifications fired on {alerted} of {total} submissions, most often on {field} ({hits})"
            ),
            impact: Severity::High,
        });
        recommendations.push(Recommendation {
            title: "Follow up on flagged readings".into(),
            description: format!("Schedule follow-up inspections where {field} crossed its threshold"),
            priority: Severity::High,
        });
    }

    if counts.rejected > 0 {
        let decided = counts.approved + counts.rejected;
        insights.push(Insight {
            category: "Rejections".into(),
            description: format!(
                "{} of {decided} reviewed submissions were rejected",
                counts.rejected
            ),
            impact: if counts.rejected > counts.approved {
                Severity::High
            } else {
                Severity::Medium
            },
        });
        recommendations.push(Recommendation {
            title: "Clarify form guidance".into(),
            description: "Walk through rejected submissions with field agents and tighten field instructions"
                .into(),
            priority: Severity::Medium,
        });
    }

    if let Some((title, count)) = most_common(entries.iter().map(|e| e.form_title.as_str())) {
        insights.push(Insight {
            category: "Form activity".into(),
            description: format!("{title} received {count} of {total} submissions"),
            impact: Severity::Low,
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            title: "Keep the current cadence".into(),
            description: "Submissions are reviewed and approved without threshold alerts".into(),
            priority: Severity::Low,
        });
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);

    Analysis {
        insights,
        recommendations,
    }
}

/// The most frequent item and its count. Ties go to the alphabetically
/// first item.
fn most_common<'a>(items: impl Iterator<Item = &'a str>) -> Option<(&'a str, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    counts.into_iter().fold(None, |best, (item, n)| match best {
        Some((_, top)) if top >= n => best,
        _ => Some((item, n)),
    })
}

/// The user turn for a report request.
pub fn report_prompt(entries: &[ReportEntry]) -> Result<String, GeneratedReportError> {
    let submissions = serde_json::to_string_pretty(entries)?;
    Ok(format!("Analyze these form submissions:\n{submissions}"))
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratedReportError {
    #[error("Report JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid report structure returned by AI")]
    Structure,
}

/// Parse a model reply into an [`Analysis`]. Code fences are tolerated;
/// `insights` and `recommendations` must both be arrays.
pub fn parse_generated_analysis(content: &str) -> Result<Analysis, GeneratedReportError> {
    let stripped = strip_code_fences(content.trim());
    let value: Value = serde_json::from_str(stripped.trim())?;

    let is_array = |key: &str| value.get(key).is_some_and(Value::is_array);
    if !is_array("insights") || !is_array("recommendations") {
        return Err(GeneratedReportError::Structure);
    }
    Ok(serde_json::from_value(value)?)
}

/// Inclusive creation-time window a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl ReportWindow {
    /// Bounds are RFC 3339 instants or `YYYY-MM-DD` dates. A date-only
    /// `to` covers that whole day. Blank bounds are ignored.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, CoreError> {
        let from = parse_bound(from, "date_from", NaiveTime::MIN)?;
        let to = parse_bound(to, "date_to", end_of_day())?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(CoreError::Validation(
                    "date_from must not be after date_to".into(),
                ));
            }
        }
        Ok(Self { from, to })
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time of day")
}

fn parse_bound(
    raw: Option<&str>,
    name: &str,
    time_of_day: NaiveTime,
) -> Result<Option<Timestamp>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(date.and_time(time_of_day).and_utc()))
        .map_err(|_| CoreError::Validation(format!("{name} must be a valid date")))
}
