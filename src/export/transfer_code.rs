//! Single-line transfer codes: a fixed prefix plus a base64 JSON payload.
//!
//! The payload is a lightweight report card, small enough for a QR code or a
//! copy-paste when moving a file around is inconvenient. Decoding rejects
//! anything without the prefix, anything that does not decode, and any
//! schema version this build does not know.

use crate::content;
use crate::models::Progress;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const CODE_PREFIX: &str = "MMR1:";
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub questions: u32,
    pub correct: u32,
    pub wrong: u32,
    /// Whole percent, 0-100.
    pub accuracy: u32,
    pub xp_total: i64,
    pub streak_current: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisBreakdown {
    pub questions: u32,
    pub correct: u32,
    pub accuracy: u32,
}

/// The lightweight report variant of the export document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub profile_id: String,
    pub student_name: String,
    pub class_group: String,
    pub school: String,
    pub summary: ReportSummary,
    pub by_axis: BTreeMap<String, AxisBreakdown>,
    /// (error code, count), most frequent first.
    pub top_errors: Vec<(String, u32)>,
}

/// Builds the report card from the learner's accumulated skill counters.
pub fn build_report_card(progress: &Progress, now: DateTime<Utc>) -> ReportCard {
    let mut summary = ReportSummary {
        xp_total: progress.xp,
        streak_current: progress.streak.current,
        ..Default::default()
    };
    let mut by_axis: BTreeMap<String, AxisBreakdown> = BTreeMap::new();

    for (skill_id, record) in &progress.skills.skills {
        let attempts = record.attempts();
        summary.questions += attempts;
        summary.correct += record.correct;
        summary.wrong += record.wrong;

        let axis = content::SKILLS
            .iter()
            .find(|s| s.id == skill_id)
            .map(|s| s.axis)
            .unwrap_or("other");
        let entry = by_axis.entry(axis.to_string()).or_default();
        entry.questions += attempts;
        entry.correct += record.correct;
    }
    if summary.questions > 0 {
        summary.accuracy =
            (summary.correct as f64 / summary.questions as f64 * 100.0).round() as u32;
    }
    for entry in by_axis.values_mut() {
        if entry.questions > 0 {
            entry.accuracy =
                (entry.correct as f64 / entry.questions as f64 * 100.0).round() as u32;
        }
    }

    let mut top_errors: Vec<(String, u32)> = progress
        .errors
        .by_type
        .iter()
        .map(|(code, count)| (code.clone(), *count))
        .collect();
    top_errors.sort_by(|a, b| b.1.cmp(&a.1));
    top_errors.truncate(3);

    ReportCard {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        created_at: now,
        profile_id: progress.profile_id.clone(),
        student_name: progress.student.first_name.clone(),
        class_group: progress.student.class_group.clone(),
        school: progress.school.name.clone(),
        summary,
        by_axis,
        top_errors,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("invalid code: expected the {CODE_PREFIX} prefix")]
    MissingPrefix,
    #[error("invalid code: payload is not decodable")]
    BadPayload,
    #[error("invalid code: payload is not a report")]
    BadJson,
    #[error("unsupported report version {0}")]
    UnsupportedVersion(String),
}

pub fn encode(card: &ReportCard) -> String {
    // Serializing a fully-owned struct cannot fail
    let json = serde_json::to_string(card).expect("report card serializes");
    format!("{}{}", CODE_PREFIX, STANDARD.encode(json))
}

pub fn decode(code: &str) -> Result<ReportCard, CodeError> {
    let raw = code.trim();
    let payload = raw.strip_prefix(CODE_PREFIX).ok_or(CodeError::MissingPrefix)?;
    let bytes = STANDARD.decode(payload).map_err(|_| CodeError::BadPayload)?;
    let json = String::from_utf8(bytes).map_err(|_| CodeError::BadPayload)?;
    let card: ReportCard = serde_json::from_str(&json).map_err(|_| CodeError::BadJson)?;
    if card.schema_version != REPORT_SCHEMA_VERSION {
        return Err(CodeError::UnsupportedVersion(card.schema_version));
    }
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, ErrorType, Profile};

    fn sample_card() -> ReportCard {
        let profile = Profile {
            profile_id: "p_code0001".to_string(),
            first_name: "Iris".to_string(),
            grade_year: 5,
            class_group: "5A".to_string(),
            school_name: "Riverside".to_string(),
            start_entry: 1,
            created_at: Utc::now(),
        };
        let mut progress = Progress::new_for_profile(&profile, Utc::now());
        let now = Utc::now();
        for _ in 0..4 {
            progress.skills.record_outcome("g5_div_2digit", true, Difficulty::Mid, now);
        }
        progress.skills.record_outcome("g5_dec_addsub", false, Difficulty::Mid, now);
        progress.errors.record(ErrorType::PlaceValue, Some("g5_dec_addsub"), now);
        progress.xp = 44;
        build_report_card(&progress, now)
    }

    #[test]
    fn test_encode_decode_is_an_exact_round_trip() {
        let card = sample_card();
        let code = encode(&card);
        assert!(code.starts_with(CODE_PREFIX));
        assert!(!code.contains('\n'));
        let decoded = decode(&code).unwrap();
        assert_eq!(decoded, card);
    }

    #[test]
    fn test_summary_counts_come_from_the_ledger() {
        let card = sample_card();
        assert_eq!(card.summary.questions, 5);
        assert_eq!(card.summary.correct, 4);
        assert_eq!(card.summary.wrong, 1);
        assert_eq!(card.summary.accuracy, 80);
        assert_eq!(card.top_errors, vec![("E_PLACE".to_string(), 1)]);
        assert_eq!(card.by_axis.get("operations").unwrap().questions, 4);
        assert_eq!(card.by_axis.get("decimals").unwrap().questions, 1);
    }

    #[test]
    fn test_wrong_prefix_is_rejected() {
        assert_eq!(decode("XXR1:abcd").unwrap_err(), CodeError::MissingPrefix);
    }

    #[test]
    fn test_garbage_payload_is_rejected() {
        assert_eq!(decode("MMR1:@@@not-base64@@@").unwrap_err(), CodeError::BadPayload);
    }

    #[test]
    fn test_non_report_json_is_rejected() {
        let code = format!("{}{}", CODE_PREFIX, STANDARD.encode("{\"hello\":1}"));
        assert_eq!(decode(&code).unwrap_err(), CodeError::BadJson);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut card = sample_card();
        card.schema_version = "2.4".to_string();
        let json = serde_json::to_string(&card).unwrap();
        let code = format!("{}{}", CODE_PREFIX, STANDARD.encode(json));
        assert_eq!(
            decode(&code).unwrap_err(),
            CodeError::UnsupportedVersion("2.4".to_string())
        );
    }
}
