//! The progress export document: what a learner hands to an instructor.
//!
//! Produced from a `Progress` snapshot, serialized as JSON, and treated as
//! untrusted input on the way back in. All shape checks live in
//! `validate_export` so import paths share one verdict.

use crate::content;
use crate::models::profile::{ErrorLog, SchoolIdentity, StudentIdentity, UnitRecord};
use crate::models::{Progress, Settings, SkillRecord};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const EXPORT_SCHEMA: &str = "progress_export";
pub const EXPORT_SCHEMA_VERSION: &str = "1.2";
/// Versions this build can still read.
pub const SUPPORTED_VERSIONS: [&str; 3] = ["1.0", "1.1", "1.2"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppStamp {
    pub name: String,
    pub version: String,
}

impl Default for AppStamp {
    fn default() -> Self {
        Self {
            name: "Math Trails".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default)]
    pub start_entry: String,
    #[serde(default)]
    pub current_year_track: String,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub total_minutes: u32,
    #[serde(default)]
    pub weekly_active_days: u32,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_seen_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEntry {
    pub node_id: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub best_score: f64,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub stars: u8,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionFlags {
    pub focus_mode: bool,
    pub no_timer: bool,
    pub reading_easy: bool,
    pub reduce_motion: bool,
}

impl From<&Settings> for InclusionFlags {
    fn from(s: &Settings) -> Self {
        Self {
            focus_mode: s.focus_mode,
            no_timer: s.no_timer,
            reading_easy: s.reading_easy,
            reduce_motion: s.reduce_motion,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub inclusion: InclusionFlags,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub schema: String,
    pub schema_version: String,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app: AppStamp,
    pub profile_id: String,
    pub student: StudentIdentity,
    pub school: SchoolIdentity,
    #[serde(default)]
    pub overview: Overview,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillRecord>,
    #[serde(default)]
    pub errors: ErrorLog,
    #[serde(default)]
    pub settings: ExportSettings,
}

fn unit_entry(node_id: &str, record: &UnitRecord) -> UnitEntry {
    UnitEntry {
        node_id: node_id.to_string(),
        attempts: record.attempts,
        best_score: record.best_score,
        passed: record.passed,
        stars: record.stars,
        last_attempt_at: record.last_attempt_at,
    }
}

/// Snapshot of a learner's progress, ready to serialize.
pub fn build_export(progress: &Progress, now: DateTime<Utc>) -> ExportDocument {
    let today = now.with_timezone(&Local).date_naive();
    ExportDocument {
        schema: EXPORT_SCHEMA.to_string(),
        schema_version: EXPORT_SCHEMA_VERSION.to_string(),
        exported_at: Some(now),
        app: AppStamp::default(),
        profile_id: progress.profile_id.clone(),
        student: progress.student.clone(),
        school: progress.school.clone(),
        overview: Overview {
            start_entry: content::track_key_from_grade(progress.start_entry).to_string(),
            current_year_track: progress.current_track.clone(),
            total_sessions: progress.history.total_sessions,
            total_minutes: progress.history.total_minutes,
            weekly_active_days: progress.weekly_active_days(today),
            last_active_at: progress.history.last_active_at,
            first_seen_at: Some(progress.history.first_seen_at),
        },
        units: progress.units.iter().map(|(id, r)| unit_entry(id, r)).collect(),
        skills: progress.skills.skills.clone(),
        errors: progress.errors.clone(),
        settings: ExportSettings { inclusion: InclusionFlags::from(&progress.settings) },
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not a JSON object")]
    NotAnObject,
    #[error("wrong schema (expected {EXPORT_SCHEMA})")]
    WrongSchema,
    #[error("missing schema version")]
    MissingVersion,
    #[error("unsupported schema version {0}")]
    UnsupportedVersion(String),
    #[error("missing required fields: {0}")]
    MissingFields(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

fn field_present(value: &serde_json::Value, path: &[&str]) -> bool {
    let mut cursor = value;
    for key in path {
        match cursor.get(key) {
            Some(next) => cursor = next,
            None => return false,
        }
    }
    !cursor.is_null() && cursor.as_str().map(|s| !s.is_empty()).unwrap_or(true)
}

/// The one shape check for export documents. Returns the parsed document or
/// the first violated constraint, so callers can report a precise reason.
pub fn validate_export(value: &serde_json::Value) -> Result<ExportDocument, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::NotAnObject);
    }
    if value.get("schema").and_then(|v| v.as_str()) != Some(EXPORT_SCHEMA) {
        return Err(ValidationError::WrongSchema);
    }
    let version = match value.get("schemaVersion").and_then(|v| v.as_str()) {
        None | Some("") => return Err(ValidationError::MissingVersion),
        Some(v) => v,
    };
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ValidationError::UnsupportedVersion(version.to_string()));
    }

    let required: [&[&str]; 5] = [
        &["profileId"],
        &["student", "firstName"],
        &["student", "gradeYear"],
        &["student", "classGroup"],
        &["school", "name"],
    ];
    let missing: Vec<String> = required
        .iter()
        .filter(|path| !field_present(value, path))
        .map(|path| path.join("."))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing.join(", ")));
    }

    serde_json::from_value(value.clone()).map_err(|e| ValidationError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, ErrorType, Profile};

    fn sample_progress() -> Progress {
        let profile = Profile {
            profile_id: "p_doc00001".to_string(),
            first_name: "Mira".to_string(),
            grade_year: 6,
            class_group: "6A".to_string(),
            school_name: "Riverside".to_string(),
            start_entry: 6,
            created_at: Utc::now(),
        };
        let mut progress = Progress::new_for_profile(&profile, Utc::now());
        progress.skills.record_outcome("g6_order_ops", true, Difficulty::Mid, Utc::now());
        progress.errors.record(ErrorType::Procedural, Some("g6_order_ops"), Utc::now());
        progress.unit_record_mut("g6_u1_b1").passed = true;
        progress
    }

    #[test]
    fn test_export_round_trips_through_validation() {
        let doc = build_export(&sample_progress(), Utc::now());
        let value = serde_json::to_value(&doc).unwrap();
        let validated = validate_export(&value).unwrap();
        assert_eq!(validated.profile_id, "p_doc00001");
        assert_eq!(validated.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(validated.units.len(), 1);
        assert_eq!(validated.skills.len(), 1);
    }

    #[test]
    fn test_wrong_schema_is_rejected() {
        let mut value = serde_json::to_value(build_export(&sample_progress(), Utc::now())).unwrap();
        value["schema"] = serde_json::json!("session_export");
        assert_eq!(validate_export(&value).unwrap_err(), ValidationError::WrongSchema);
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let mut value = serde_json::to_value(build_export(&sample_progress(), Utc::now())).unwrap();
        value.as_object_mut().unwrap().remove("schemaVersion");
        assert_eq!(validate_export(&value).unwrap_err(), ValidationError::MissingVersion);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut value = serde_json::to_value(build_export(&sample_progress(), Utc::now())).unwrap();
        value["schemaVersion"] = serde_json::json!("9.0");
        assert_eq!(
            validate_export(&value).unwrap_err(),
            ValidationError::UnsupportedVersion("9.0".to_string())
        );
    }

    #[test]
    fn test_missing_identity_fields_are_listed() {
        let mut value = serde_json::to_value(build_export(&sample_progress(), Utc::now())).unwrap();
        value["student"].as_object_mut().unwrap().remove("firstName");
        value["school"].as_object_mut().unwrap().remove("name");
        match validate_export(&value).unwrap_err() {
            ValidationError::MissingFields(fields) => {
                assert!(fields.contains("student.firstName"));
                assert!(fields.contains("school.name"));
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert_eq!(
            validate_export(&serde_json::json!([1, 2, 3])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }
}
