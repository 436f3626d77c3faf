//! Per-skill mastery records and the ledger that owns them.

use super::{mastery, Difficulty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mastery state of a single skill for one learner.
///
/// Created lazily on the first attempt; never removed except by a full
/// profile reset.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub mastery: i32,
    pub correct: u32,
    pub wrong: u32,
    pub stage: u8,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl SkillRecord {
    pub fn new() -> Self {
        Self {
            mastery: mastery::STARTING_MASTERY,
            correct: 0,
            wrong: 0,
            stage: 0,
            next_review_at: None,
            last_seen_at: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.correct + self.wrong
    }
}

impl Default for SkillRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// All skill records of one learner, keyed by skill id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillLedger {
    pub skills: BTreeMap<String, SkillRecord>,
}

impl SkillLedger {
    pub fn get_or_create(&mut self, skill_id: &str) -> &mut SkillRecord {
        self.skills.entry(skill_id.to_string()).or_default()
    }

    pub fn get(&self, skill_id: &str) -> Option<&SkillRecord> {
        self.skills.get(skill_id)
    }

    /// Applies one answer outcome to the named skill.
    pub fn record_outcome(
        &mut self,
        skill_id: &str,
        is_correct: bool,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) {
        let record = self.get_or_create(skill_id);
        mastery::apply_outcome(record, is_correct, difficulty, now);
    }

    /// Skills whose review date has arrived, most overdue first.
    pub fn due_skills(&self, now: DateTime<Utc>, limit: usize) -> Vec<String> {
        let mut due: Vec<(&String, DateTime<Utc>)> = self
            .skills
            .iter()
            .filter_map(|(id, r)| r.next_review_at.filter(|at| *at <= now).map(|at| (id, at)))
            .collect();
        due.sort_by_key(|(_, at)| *at);
        due.into_iter().take(limit).map(|(id, _)| id.clone()).collect()
    }

    /// Lowest-mastery skills within a track prefix. Skills with fewer than
    /// three attempts are excluded so one unlucky answer cannot dominate.
    pub fn weakest_in_scope(&self, track_key: &str, limit: usize) -> Vec<String> {
        let prefix = format!("{}_", track_key);
        let mut weak: Vec<(&String, i32)> = self
            .skills
            .iter()
            .filter(|(id, r)| id.starts_with(&prefix) && r.attempts() >= 3)
            .map(|(id, r)| (id, r.mastery))
            .collect();
        weak.sort_by_key(|(_, m)| *m);
        weak.into_iter().take(limit).map(|(id, _)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_due_skills_orders_most_overdue_first() {
        let now = Utc::now();
        let mut ledger = SkillLedger::default();
        ledger.get_or_create("g6_order_ops").next_review_at = Some(now - Duration::days(1));
        ledger.get_or_create("g6_dec_compare").next_review_at = Some(now - Duration::days(5));
        ledger.get_or_create("g6_frac_equiv").next_review_at = Some(now + Duration::days(2));

        let due = ledger.due_skills(now, 10);
        assert_eq!(due, vec!["g6_dec_compare".to_string(), "g6_order_ops".to_string()]);
    }

    #[test]
    fn test_due_skills_never_returns_future_reviews() {
        let now = Utc::now();
        let mut ledger = SkillLedger::default();
        for i in 0..10 {
            let id = format!("g6_skill_{}", i);
            ledger.get_or_create(&id).next_review_at = Some(now + Duration::days(i - 4));
        }
        for id in ledger.due_skills(now, 100) {
            assert!(ledger.get(&id).unwrap().next_review_at.unwrap() <= now);
        }
    }

    #[test]
    fn test_weakest_requires_three_attempts() {
        let now = Utc::now();
        let mut ledger = SkillLedger::default();
        // One bad attempt only: excluded
        ledger.record_outcome("g6_order_ops", false, Difficulty::Hard, now);
        // Three attempts: included
        for _ in 0..3 {
            ledger.record_outcome("g6_dec_compare", false, Difficulty::Mid, now);
        }
        let weak = ledger.weakest_in_scope("g6", 5);
        assert_eq!(weak, vec!["g6_dec_compare".to_string()]);
    }

    #[test]
    fn test_weakest_is_scoped_to_track() {
        let now = Utc::now();
        let mut ledger = SkillLedger::default();
        for _ in 0..3 {
            ledger.record_outcome("g6_order_ops", false, Difficulty::Mid, now);
            ledger.record_outcome("g7_int_ops", false, Difficulty::Mid, now);
        }
        assert_eq!(ledger.weakest_in_scope("g7", 5), vec!["g7_int_ops".to_string()]);
    }

    #[test]
    fn test_weakest_orders_by_ascending_mastery() {
        let now = Utc::now();
        let mut ledger = SkillLedger::default();
        for _ in 0..3 {
            ledger.record_outcome("g6_order_ops", true, Difficulty::Mid, now);
            ledger.record_outcome("g6_dec_compare", false, Difficulty::Mid, now);
        }
        let weak = ledger.weakest_in_scope("g6", 5);
        assert_eq!(weak[0], "g6_dec_compare");
        assert_eq!(weak[1], "g6_order_ops");
    }
}
