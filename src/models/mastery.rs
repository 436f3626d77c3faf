//! Mastery and review-interval rules.
//!
//! Every answer moves a skill's mastery score and its review stage:
//! - Correct answers add {easy 2, mid 3, hard 4} mastery and advance the stage
//! - Wrong answers remove {easy 4, mid 5, hard 6} mastery and regress the stage
//! - Mastery is clamped to 0-100, the stage to 0..=6
//! - The next review date comes from a fixed interval table indexed by stage

use super::{Difficulty, SkillRecord};
use chrono::{DateTime, Duration, Utc};

/// Days until a skill resurfaces, indexed by `stage - 1`.
pub const REVIEW_INTERVALS_DAYS: [i64; 6] = [1, 3, 7, 14, 30, 60];

/// Mastery assigned to a skill on its first attempt.
pub const STARTING_MASTERY: i32 = 45;

pub fn max_stage() -> u8 {
    REVIEW_INTERVALS_DAYS.len() as u8
}

fn mastery_gain(difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Easy => 2,
        Difficulty::Mid => 3,
        Difficulty::Hard => 4,
    }
}

fn mastery_loss(difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Easy => 4,
        Difficulty::Mid => 5,
        Difficulty::Hard => 6,
    }
}

/// Applies one answer outcome to a skill record.
pub fn apply_outcome(
    record: &mut SkillRecord,
    is_correct: bool,
    difficulty: Difficulty,
    now: DateTime<Utc>,
) {
    if is_correct {
        record.correct += 1;
        record.mastery = (record.mastery + mastery_gain(difficulty)).clamp(0, 100);
        record.stage = (record.stage + 1).min(max_stage());
    } else {
        record.wrong += 1;
        record.mastery = (record.mastery - mastery_loss(difficulty)).clamp(0, 100);
        record.stage = record.stage.saturating_sub(1);
    }
    record.last_seen_at = Some(now);

    let idx = (record.stage as usize).saturating_sub(1).min(REVIEW_INTERVALS_DAYS.len() - 1);
    record.next_review_at = Some(now + Duration::days(REVIEW_INTERVALS_DAYS[idx]));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SkillRecord {
        SkillRecord::new()
    }

    #[test]
    fn test_correct_answer_raises_mastery_and_stage() {
        let mut r = record();
        let now = Utc::now();
        apply_outcome(&mut r, true, Difficulty::Mid, now);
        assert_eq!(r.mastery, STARTING_MASTERY + 3);
        assert_eq!(r.stage, 1);
        assert_eq!(r.correct, 1);
        assert_eq!(r.next_review_at, Some(now + Duration::days(1)));
    }

    #[test]
    fn test_wrong_answer_lowers_mastery_and_stage() {
        let mut r = record();
        let now = Utc::now();
        apply_outcome(&mut r, true, Difficulty::Mid, now);
        apply_outcome(&mut r, false, Difficulty::Hard, now);
        assert_eq!(r.mastery, STARTING_MASTERY + 3 - 6);
        assert_eq!(r.stage, 0);
        assert_eq!(r.wrong, 1);
        // Stage 0 still schedules the shortest interval
        assert_eq!(r.next_review_at, Some(now + Duration::days(1)));
    }

    #[test]
    fn test_mastery_stays_in_bounds_under_any_sequence() {
        let mut r = record();
        let now = Utc::now();
        for i in 0..200 {
            let correct = i % 3 != 0;
            let difficulty = [Difficulty::Easy, Difficulty::Mid, Difficulty::Hard][i % 3];
            apply_outcome(&mut r, correct, difficulty, now);
            assert!((0..=100).contains(&r.mastery));
            assert!(r.stage <= max_stage());
        }
    }

    #[test]
    fn test_stage_caps_at_interval_table_length() {
        let mut r = record();
        let now = Utc::now();
        for _ in 0..20 {
            apply_outcome(&mut r, true, Difficulty::Easy, now);
        }
        assert_eq!(r.stage, max_stage());
        assert_eq!(r.next_review_at, Some(now + Duration::days(60)));
    }

    #[test]
    fn test_interval_follows_stage() {
        let mut r = record();
        let now = Utc::now();
        let expected = [1, 3, 7, 14, 30, 60];
        for days in expected {
            apply_outcome(&mut r, true, Difficulty::Mid, now);
            assert_eq!(r.next_review_at, Some(now + Duration::days(days)));
        }
    }
}
