//! Learner identity and the persistent progress document.
//!
//! `Profile` is the identity row; `Progress` is everything the learner
//! accumulates. One progress document per profile, stored whole under the
//! profile's storage namespace. Deleting a profile drops both.

use super::{ErrorType, SkillLedger, Streak};
use crate::content::{self, Track};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum entries kept in the recent-error list.
pub const RECENT_ERROR_CAP: usize = 50;

/// How many recent errors the error drill looks at.
const ERROR_DRILL_WINDOW: usize = 30;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: String,
    pub first_name: String,
    pub grade_year: u8,
    pub class_group: String,
    pub school_name: String,
    /// Entry point into the curriculum: grade 1 or grade 6.
    pub start_entry: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub first_name: String,
    pub grade_year: u8,
    pub class_group: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchoolIdentity {
    pub name: String,
}

/// Progress on one trail node (lesson, review or boss).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub attempts: u32,
    pub best_score: f64,
    pub passed: bool,
    pub stars: u8,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub at: DateTime<Utc>,
    /// Stored as the wire code so foreign tags survive a round trip.
    pub error_type: String,
    #[serde(default)]
    pub skill_id: Option<String>,
}

/// Bounded recent-error list plus per-type counters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    pub by_type: BTreeMap<String, u32>,
    pub recent: Vec<ErrorEntry>,
}

impl ErrorLog {
    pub fn record(&mut self, error_type: ErrorType, skill_id: Option<&str>, at: DateTime<Utc>) {
        let code = error_type.code().to_string();
        *self.by_type.entry(code.clone()).or_insert(0) += 1;
        self.recent.insert(
            0,
            ErrorEntry { at, error_type: code, skill_id: skill_id.map(str::to_string) },
        );
        self.recent.truncate(RECENT_ERROR_CAP);
    }

    /// Most frequent error code, with its count.
    pub fn top_error(&self) -> Option<(&str, u32)> {
        self.by_type
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(code, count)| (code.as_str(), *count))
    }

    /// Skills that show up most in the recent errors, for the error drill.
    pub fn most_frequent_skills(&self, limit: usize) -> Vec<String> {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for entry in self.recent.iter().take(ERROR_DRILL_WINDOW) {
            if let Some(skill_id) = &entry.skill_id {
                *counts.entry(skill_id.as_str()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, u32)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(limit).map(|(id, _)| id.to_string()).collect()
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
        self.recent.clear();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub first_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    pub weekly_active_days: u32,
}

/// Accessibility and pacing settings. These travel with the export so an
/// instructor sees which accommodations are active.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub no_timer: bool,
    pub reading_easy: bool,
    pub focus_mode: bool,
    pub reduce_motion: bool,
    pub inclusion_pack: bool,
}

/// Outcome of one weekly event, keyed by ISO week.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecord {
    pub warmup_done: bool,
    pub boss_best_score: f64,
    pub boss_passed: bool,
    #[serde(default)]
    pub last_at: Option<DateTime<Utc>>,
}

/// Everything one learner accumulates. The aggregate root of persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub profile_id: String,
    pub student: StudentIdentity,
    pub school: SchoolIdentity,
    pub start_entry: u8,
    pub current_track: String,
    pub xp: i64,
    pub coins: i64,
    pub streak: Streak,
    pub history: History,
    pub settings: Settings,
    pub units: BTreeMap<String, UnitRecord>,
    pub skills: SkillLedger,
    pub errors: ErrorLog,
    pub weekly: BTreeMap<String, WeeklyRecord>,
}

impl Progress {
    pub fn new_for_profile(profile: &Profile, now: DateTime<Utc>) -> Self {
        Self {
            profile_id: profile.profile_id.clone(),
            student: StudentIdentity {
                first_name: profile.first_name.clone(),
                grade_year: profile.grade_year,
                class_group: profile.class_group.clone(),
            },
            school: SchoolIdentity { name: profile.school_name.clone() },
            start_entry: profile.start_entry,
            current_track: content::track_key_from_grade(profile.start_entry).to_string(),
            xp: 0,
            coins: 0,
            streak: Streak::default(),
            history: History {
                total_sessions: 0,
                total_minutes: 0,
                first_seen_at: now,
                last_active_at: None,
                weekly_active_days: 0,
            },
            settings: Settings::default(),
            units: BTreeMap::new(),
            skills: SkillLedger::default(),
            errors: ErrorLog::default(),
            weekly: BTreeMap::new(),
        }
    }

    pub fn unit_record_mut(&mut self, node_id: &str) -> &mut UnitRecord {
        self.units.entry(node_id.to_string()).or_default()
    }

    /// Unit 1 is always open; unit N opens once unit N-1's boss is passed.
    pub fn is_unit_unlocked(&self, track: &Track, unit_idx: usize) -> bool {
        if unit_idx == 0 {
            return true;
        }
        let Some(prev) = track.units.get(unit_idx - 1) else {
            return false;
        };
        self.units
            .get(&prev.boss_node_id())
            .map(|r| r.passed)
            .unwrap_or(false)
    }

    /// Spends coins on one freeze credit. False when coins are short.
    pub fn buy_freeze(&mut self) -> bool {
        if self.coins < super::streak::FREEZE_PRICE {
            return false;
        }
        self.coins -= super::streak::FREEZE_PRICE;
        self.streak.freezes += 1;
        true
    }

    /// Coarse weekly-activity estimate: 1 when the last practiced day falls
    /// inside the trailing week, else 0.
    pub fn weekly_active_days(&self, today: NaiveDate) -> u32 {
        match self.streak.last_active_date {
            Some(last) if (today - last).num_days() <= 6 => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile() -> Profile {
        Profile {
            profile_id: "p_test0001".to_string(),
            first_name: "Ada".to_string(),
            grade_year: 6,
            class_group: "6B".to_string(),
            school_name: "Hilltop".to_string(),
            start_entry: 6,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_progress_starts_on_entry_track() {
        let p = Progress::new_for_profile(&profile(), Utc::now());
        assert_eq!(p.current_track, "g6");
        assert_eq!(p.xp, 0);
        assert!(p.units.is_empty());
    }

    #[test]
    fn test_error_log_caps_recent_entries() {
        let mut log = ErrorLog::default();
        let now = Utc::now();
        for i in 0..(RECENT_ERROR_CAP + 10) {
            log.record(ErrorType::Procedural, Some("g6_order_ops"), now + Duration::seconds(i as i64));
        }
        assert_eq!(log.recent.len(), RECENT_ERROR_CAP);
        assert_eq!(log.by_type.get("E_PROC"), Some(&(RECENT_ERROR_CAP as u32 + 10)));
    }

    #[test]
    fn test_most_frequent_skills_ranks_by_count() {
        let mut log = ErrorLog::default();
        let now = Utc::now();
        for _ in 0..3 {
            log.record(ErrorType::FactRecall, Some("g4_mul_facts_6_9"), now);
        }
        log.record(ErrorType::Conceptual, Some("g6_frac_equiv"), now);
        log.record(ErrorType::Conceptual, None, now);
        let top = log.most_frequent_skills(3);
        assert_eq!(top[0], "g4_mul_facts_6_9");
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_buy_freeze_needs_coins() {
        let mut p = Progress::new_for_profile(&profile(), Utc::now());
        assert!(!p.buy_freeze());
        p.coins = super::super::streak::FREEZE_PRICE;
        assert!(p.buy_freeze());
        assert_eq!(p.coins, 0);
        assert_eq!(p.streak.freezes, 1);
    }

    #[test]
    fn test_unit_unlocking_follows_boss_gate() {
        let tracks = content::tracks();
        let track = tracks.iter().find(|t| t.track_key == "g6").unwrap();
        let mut p = Progress::new_for_profile(&profile(), Utc::now());

        assert!(p.is_unit_unlocked(track, 0));
        assert!(!p.is_unit_unlocked(track, 1));

        let boss = track.units[0].boss_node_id();
        p.unit_record_mut(&boss).passed = true;
        assert!(p.is_unit_unlocked(track, 1));
    }

    #[test]
    fn test_progress_document_round_trips_through_json() {
        let mut p = Progress::new_for_profile(&profile(), Utc::now());
        p.skills.record_outcome("g6_order_ops", true, super::super::Difficulty::Mid, Utc::now());
        p.errors.record(ErrorType::PlaceValue, Some("g6_dec_compare"), Utc::now());

        let json = serde_json::to_string(&p).unwrap();
        let back: Progress = serde_json::from_str(&json).unwrap();
        assert_eq!(back.profile_id, p.profile_id);
        assert_eq!(back.skills.skills.len(), 1);
        assert_eq!(back.errors.by_type.get("E_PLACE"), Some(&1));
    }
}
