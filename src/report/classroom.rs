//! Classroom-level ingestion and instructor-facing outputs.
//!
//! Documents arrive one per learner and are validated independently: a bad
//! file is reported and skipped, the rest of the batch still lands. All
//! outputs (table rows, CSV, text report) are deterministic functions of the
//! corpus and the reference time.

use super::aggregate::{self, DifficultyEntry, UnitsStats};
use crate::content;
use crate::export::document::{validate_export, ExportDocument, ValidationError};
use chrono::{DateTime, Duration, Local, Utc};
use std::collections::BTreeMap;

/// Result of a batch import. Rejections carry the source name so the
/// instructor can tell which file was bad.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub accepted: Vec<ExportDocument>,
    pub rejected: Vec<(String, ValidationError)>,
}

/// Validates each (source name, JSON text) pair independently.
pub fn ingest(sources: &[(String, String)]) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    for (name, text) in sources {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(text);
        let verdict = match parsed {
            Ok(value) => validate_export(&value),
            Err(e) => Err(ValidationError::Malformed(e.to_string())),
        };
        match verdict {
            Ok(doc) => outcome.accepted.push(doc),
            Err(e) => {
                log::warn!("import rejected: {} ({})", name, e);
                outcome.rejected.push((name.clone(), e));
            }
        }
    }
    outcome
}

/// One row of the teacher table.
#[derive(Clone, Debug)]
pub struct LearnerRow {
    pub profile_id: String,
    pub first_name: String,
    pub grade_year: u8,
    pub units: UnitsStats,
    pub fair_mastery: i32,
    pub coverage: usize,
    /// Set when too few skills clear the evidence bar to trust the score.
    pub low_evidence: bool,
    pub weekly_active_days: u32,
    pub last_active_at: Option<DateTime<Utc>>,
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub top_difficulties: Vec<DifficultyEntry>,
    pub top_error: Option<(String, u32)>,
    pub inclusion_flags: Vec<&'static str>,
    pub recommendation: String,
}

fn top_error_of(doc: &ExportDocument) -> Option<(String, u32)> {
    doc.errors
        .by_type
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(code, count)| (code.clone(), *count))
}

fn inclusion_flags_of(doc: &ExportDocument) -> Vec<&'static str> {
    let inc = &doc.settings.inclusion;
    let mut flags = Vec::new();
    if inc.focus_mode {
        flags.push("focusMode");
    }
    if inc.no_timer {
        flags.push("noTimer");
    }
    if inc.reading_easy {
        flags.push("readingEasy");
    }
    if inc.reduce_motion {
        flags.push("reduceMotion");
    }
    flags
}

/// Short next-step suggestion keyed off the dominant error type and the
/// fair-mastery band.
fn auto_recommendation(top_error: Option<&str>, fair_mastery: i32) -> String {
    match top_error {
        Some("E_FACT") => "Fact micro-drill (3 min) plus 5 spaced-review items.".to_string(),
        Some("E_PLACE") => "Place-value and decimals work (8 min) plus 2 boss items.".to_string(),
        Some("E_PROC") => "Step-by-step worked examples (10 min), then retry.".to_string(),
        Some("E_TIME") => "Untimed practice first; reintroduce the timer gradually.".to_string(),
        _ if fair_mastery < 50 => {
            "Back to basics: 2 days of short drills plus daily spaced review.".to_string()
        }
        _ => "Daily spaced review (3 items), then attempt the boss (80%).".to_string(),
    }
}

pub fn learner_row(doc: &ExportDocument, now: DateTime<Utc>) -> LearnerRow {
    let fair = aggregate::fair_mastery(&doc.skills, now);
    let top_error = top_error_of(doc);
    LearnerRow {
        profile_id: doc.profile_id.clone(),
        first_name: doc.student.first_name.clone(),
        grade_year: doc.student.grade_year,
        units: aggregate::units_stats(&doc.units),
        fair_mastery: fair.score,
        coverage: fair.coverage,
        low_evidence: fair.coverage < 5,
        weekly_active_days: doc.overview.weekly_active_days,
        last_active_at: doc.overview.last_active_at,
        total_sessions: doc.overview.total_sessions,
        total_minutes: doc.overview.total_minutes,
        top_difficulties: aggregate::top_difficulties(&doc.skills, now, 2),
        recommendation: auto_recommendation(top_error.as_ref().map(|(c, _)| c.as_str()), fair.score),
        top_error,
        inclusion_flags: inclusion_flags_of(doc),
    }
}

pub fn class_rows(docs: &[ExportDocument], now: DateTime<Utc>) -> Vec<LearnerRow> {
    let mut rows: Vec<LearnerRow> = docs.iter().map(|d| learner_row(d, now)).collect();
    rows.sort_by(|a, b| a.first_name.cmp(&b.first_name));
    rows
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(t) => t.with_timezone(&Local).format("%d/%m %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Delimited export mirroring the teacher table, one line per learner.
pub fn csv_export(school: &str, class_group: &str, rows: &[LearnerRow]) -> String {
    let header = [
        "School", "Class", "Grade", "Student", "ProfileId", "ActiveDays7", "LastActive",
        "Sessions", "Minutes", "UnitsSeen", "UnitsPassed", "BossesTried", "BossesPassed",
        "FairMastery", "SkillCoverage", "TopDifficulty1", "TopDifficulty1Mastery",
        "TopDifficulty2", "TopDifficulty2Mastery", "TopErrorType", "TopErrorCount",
        "InclusionFlags", "Recommendation",
    ];
    let mut lines = vec![header.join(",")];

    for row in rows {
        let d1 = row.top_difficulties.first();
        let d2 = row.top_difficulties.get(1);
        let fields = [
            csv_escape(school),
            csv_escape(class_group),
            row.grade_year.to_string(),
            csv_escape(&row.first_name),
            csv_escape(&row.profile_id),
            row.weekly_active_days.to_string(),
            csv_escape(&format_time(row.last_active_at)),
            row.total_sessions.to_string(),
            row.total_minutes.to_string(),
            row.units.units_seen.to_string(),
            row.units.units_passed.to_string(),
            row.units.bosses_tried.to_string(),
            row.units.bosses_passed.to_string(),
            row.fair_mastery.to_string(),
            row.coverage.to_string(),
            csv_escape(d1.map(|d| d.title.as_str()).unwrap_or("")),
            d1.map(|d| d.mastery.to_string()).unwrap_or_default(),
            csv_escape(d2.map(|d| d.title.as_str()).unwrap_or("")),
            d2.map(|d| d.mastery.to_string()).unwrap_or_default(),
            row.top_error.as_ref().map(|(c, _)| c.clone()).unwrap_or_default(),
            row.top_error.as_ref().map(|(_, n)| n.to_string()).unwrap_or_default(),
            row.inclusion_flags.join("|"),
            csv_escape(&row.recommendation),
        ];
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Most common hard skills across the class: majority vote over each
/// learner's top-3 difficulty list.
fn class_top_difficulties(docs: &[ExportDocument], now: DateTime<Utc>, limit: usize) -> Vec<String> {
    let mut votes: BTreeMap<String, u32> = BTreeMap::new();
    for doc in docs {
        for entry in aggregate::top_difficulties(&doc.skills, now, 3) {
            *votes.entry(entry.skill_id).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, u32)> = votes.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(skill_id, _)| skill_id).collect()
}

fn class_error_histogram(docs: &[ExportDocument]) -> Vec<(String, u32)> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for doc in docs {
        for (code, count) in &doc.errors.by_type {
            *counts.entry(code.clone()).or_insert(0) += count;
        }
    }
    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Plain-text class summary for the last seven days.
pub fn class_report_text(
    school: &str,
    class_group: &str,
    docs: &[ExportDocument],
    now: DateTime<Utc>,
) -> String {
    let today = now.with_timezone(&Local).date_naive();
    let period_start = today - Duration::days(6);

    let n_total = docs.len();
    let n_active = docs.iter().filter(|d| d.overview.weekly_active_days > 0).count();

    let mastery_values: Vec<i32> = docs
        .iter()
        .map(|d| aggregate::fair_mastery(&d.skills, now).score)
        .collect();
    let class_mastery = if mastery_values.is_empty() {
        0
    } else {
        (mastery_values.iter().sum::<i32>() as f64 / mastery_values.len() as f64).round() as i32
    };

    let mut units_seen = 0;
    let mut units_passed = 0;
    let mut bosses_tried = 0;
    let mut bosses_passed = 0;
    for doc in docs {
        let stats = aggregate::units_stats(&doc.units);
        units_seen += stats.units_seen;
        units_passed += stats.units_passed;
        bosses_tried += stats.bosses_tried;
        bosses_passed += stats.bosses_passed;
    }
    let avg_seen = if n_total > 0 { (units_seen as f64 / n_total as f64).round() as usize } else { 0 };
    let avg_passed = if n_total > 0 { (units_passed as f64 / n_total as f64).round() as usize } else { 0 };

    let top3 = class_top_difficulties(docs, now, 3);
    let errors = class_error_histogram(docs);

    let mut report = Vec::new();
    report.push(format!("School: {}", school));
    report.push(format!("Class: {}", class_group));
    report.push(format!("Period: {} to {} (last 7 days)", period_start, today));
    report.push(format!("Learners imported: {} | Active this week: {}", n_total, n_active));
    report.push(String::new());
    report.push("1) Overview".to_string());
    report.push(format!("- Progress (units): average {}/{}", avg_passed, avg_seen));
    report.push(format!("- Class fair mastery: {}", class_mastery));
    report.push(format!("- Bosses (80%): {}/{}", bosses_passed, bosses_tried));
    report.push(String::new());
    report.push("2) Main difficulties (top 3)".to_string());
    if top3.is_empty() {
        report.push("- none yet".to_string());
    } else {
        for (i, skill_id) in top3.iter().enumerate() {
            report.push(format!("{}) {}", i + 1, content::skill_title(skill_id)));
        }
    }
    report.push(String::new());
    report.push("3) Most frequent error types".to_string());
    if errors.is_empty() {
        report.push("- none yet".to_string());
    } else {
        for (code, count) in errors.iter().take(3) {
            report.push(format!("- {}: {}", code, count));
        }
    }
    report.push(String::new());
    report.push("4) Ten-minute plan for the next class".to_string());
    report.push("- 3 min: micro-drill on the top difficulty".to_string());
    report.push("- 5 min: spaced review (5 overdue items)".to_string());
    report.push("- 2 min: quick check (2 boss items)".to_string());
    report.push(String::new());
    report.push("5) Notes".to_string());
    report.push("- Group by band: Basics (<50), Consolidating (50-69), Advancing (>=70).".to_string());
    report.push("- For accommodations, prefer untimed mode, easy reading and short sessions.".to_string());

    report.join("\n")
}
