//! Evidence- and recency-weighted aggregates over skill records.
//!
//! Raw mastery overstates both stale knowledge and lucky streaks. The "fair"
//! score weights each skill by how much evidence exists (attempts, capped)
//! and how fresh it is, and reports how many skills actually clear the
//! evidence bar so thin data is flagged instead of hidden.

use crate::content;
use crate::export::document::UnitEntry;
use crate::models::SkillRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Skills with at least this many attempts count toward coverage.
pub const COVERAGE_ATTEMPTS: u32 = 5;

fn combined_weight(record: &SkillRecord, now: DateTime<Utc>) -> f64 {
    let evidence = (record.attempts() as f64 / 20.0).clamp(0.2, 1.0);
    let recency = match record.last_seen_at {
        Some(at) => {
            let days = (now - at).num_seconds() as f64 / 86_400.0;
            if days <= 7.0 {
                1.0
            } else if days <= 30.0 {
                0.7
            } else {
                0.5
            }
        }
        None => 0.5,
    };
    evidence * recency
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FairMastery {
    pub score: i32,
    /// Number of skills with enough evidence to trust.
    pub coverage: usize,
}

/// Weighted mastery average. Falls back to one-attempt skills when fewer
/// than five skills clear the evidence bar; reports 0/0 on no data at all.
pub fn fair_mastery(skills: &BTreeMap<String, SkillRecord>, now: DateTime<Utc>) -> FairMastery {
    let weighted: Vec<(f64, f64, u32)> = skills
        .values()
        .map(|r| (r.mastery as f64, combined_weight(r, now), r.attempts()))
        .collect();

    let coverage = weighted.iter().filter(|(_, _, a)| *a >= COVERAGE_ATTEMPTS).count();

    let used: Vec<&(f64, f64, u32)> = if coverage >= 5 {
        weighted.iter().filter(|(_, _, a)| *a >= COVERAGE_ATTEMPTS).collect()
    } else {
        weighted.iter().filter(|(_, _, a)| *a >= 1).collect()
    };

    let total_weight: f64 = used.iter().map(|(_, w, _)| w).sum();
    if total_weight == 0.0 {
        return FairMastery { score: 0, coverage };
    }
    let score = used.iter().map(|(m, w, _)| m * w).sum::<f64>() / total_weight;
    FairMastery { score: score.round() as i32, coverage }
}

#[derive(Clone, Debug)]
pub struct DifficultyEntry {
    pub skill_id: String,
    pub title: String,
    pub mastery: i32,
    pub score: f64,
}

/// Skills ranked by weighted difficulty, hardest first. Needs three attempts
/// of evidence before a skill can be called difficult.
pub fn top_difficulties(
    skills: &BTreeMap<String, SkillRecord>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<DifficultyEntry> {
    let mut entries: Vec<DifficultyEntry> = skills
        .iter()
        .filter(|(_, r)| r.attempts() >= 3)
        .map(|(id, r)| DifficultyEntry {
            skill_id: id.clone(),
            title: content::skill_title(id).to_string(),
            mastery: r.mastery,
            score: (100.0 - r.mastery as f64) * combined_weight(r, now),
        })
        .collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(limit);
    entries
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitsStats {
    pub units_seen: usize,
    pub units_passed: usize,
    pub bosses_tried: usize,
    pub bosses_passed: usize,
}

/// Unit-level rollup from exported node records. Node ids look like
/// "g6_u2_b1"; the "_b1" suffix marks the unit's boss.
pub fn units_stats(units: &[UnitEntry]) -> UnitsStats {
    let mut seen: BTreeMap<String, bool> = BTreeMap::new();
    let mut stats = UnitsStats::default();

    for unit in units {
        let parts: Vec<&str> = unit.node_id.split('_').collect();
        if parts.len() < 2 {
            continue;
        }
        let unit_key = format!("{}_{}", parts[0], parts[1]);
        let entry = seen.entry(unit_key).or_insert(false);
        let is_boss = unit.node_id.ends_with("_b1");
        if is_boss {
            if unit.attempts >= 1 {
                stats.bosses_tried += 1;
            }
            if unit.passed {
                stats.bosses_passed += 1;
                *entry = true;
            }
        }
    }

    stats.units_seen = seen.len();
    stats.units_passed = seen.values().filter(|passed| **passed).count();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(mastery: i32, correct: u32, wrong: u32, seen_days_ago: i64) -> SkillRecord {
        SkillRecord {
            mastery,
            correct,
            wrong,
            stage: 1,
            next_review_at: None,
            last_seen_at: Some(Utc::now() - Duration::days(seen_days_ago)),
        }
    }

    #[test]
    fn test_fresh_heavy_evidence_dominates_stale_thin_evidence() {
        let mut skills = BTreeMap::new();
        skills.insert("a".to_string(), record(80, 18, 2, 1));
        skills.insert("b".to_string(), record(20, 1, 0, 40));
        let result = fair_mastery(&skills, Utc::now());
        // Weight 1.0 against 0.2 * 0.5: the fresh skill wins decisively
        assert!(result.score > 70, "got {}", result.score);
        assert_eq!(result.coverage, 1);
    }

    #[test]
    fn test_no_data_reports_zero_without_dividing() {
        let skills = BTreeMap::new();
        let result = fair_mastery(&skills, Utc::now());
        assert_eq!(result, FairMastery { score: 0, coverage: 0 });
    }

    #[test]
    fn test_coverage_counts_only_evidenced_skills() {
        let mut skills = BTreeMap::new();
        for i in 0..6 {
            skills.insert(format!("s{}", i), record(60, 5, 1, 1));
        }
        skills.insert("thin".to_string(), record(10, 1, 0, 1));
        let result = fair_mastery(&skills, Utc::now());
        assert_eq!(result.coverage, 6);
        // With five or more evidenced skills, the thin one is excluded
        assert_eq!(result.score, 60);
    }

    #[test]
    fn test_recency_discounts_old_practice() {
        let fresh = record(50, 10, 10, 1);
        let stale = record(50, 10, 10, 60);
        let now = Utc::now();
        assert!(combined_weight(&fresh, now) > combined_weight(&stale, now));
        assert_eq!(combined_weight(&stale, now), 0.5);
    }

    #[test]
    fn test_difficulty_ranking_needs_three_attempts() {
        let mut skills = BTreeMap::new();
        skills.insert("hard".to_string(), record(10, 1, 4, 1));
        skills.insert("unlucky".to_string(), record(5, 0, 1, 1));
        let ranked = top_difficulties(&skills, Utc::now(), 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].skill_id, "hard");
    }

    #[test]
    fn test_difficulty_ranking_orders_hardest_first() {
        let mut skills = BTreeMap::new();
        skills.insert("g6_order_ops".to_string(), record(20, 2, 4, 1));
        skills.insert("g6_dec_compare".to_string(), record(70, 4, 2, 1));
        let ranked = top_difficulties(&skills, Utc::now(), 2);
        assert_eq!(ranked[0].skill_id, "g6_order_ops");
        assert_eq!(ranked[0].title, "Order of operations");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_units_stats_from_node_ids() {
        let units = vec![
            UnitEntry { node_id: "g6_u1_l1".into(), attempts: 2, best_score: 0.9, passed: true, stars: 2, last_attempt_at: None },
            UnitEntry { node_id: "g6_u1_b1".into(), attempts: 1, best_score: 0.9, passed: true, stars: 2, last_attempt_at: None },
            UnitEntry { node_id: "g6_u2_l1".into(), attempts: 1, best_score: 0.5, passed: false, stars: 0, last_attempt_at: None },
            UnitEntry { node_id: "g6_u2_b1".into(), attempts: 1, best_score: 0.5, passed: false, stars: 0, last_attempt_at: None },
        ];
        let stats = units_stats(&units);
        assert_eq!(stats.units_seen, 2);
        assert_eq!(stats.units_passed, 1);
        assert_eq!(stats.bosses_tried, 2);
        assert_eq!(stats.bosses_passed, 1);
    }
}
