//! Answer scoring and progress updates.
//!
//! Each submitted answer is committed to the ledger immediately; abandoning a
//! session later never rolls those commits back. Only the session-level
//! result (pass/fail, unit record, weekly record, streak day) waits for
//! `finish_session`.

use super::composer;
use crate::models::{Difficulty, Progress, Session, SessionKind, StreakUpdate};
use chrono::{DateTime, Local, Utc};

/// Accuracy required to pass any session. Exact: 4/5 passes, 79/100 fails.
pub const PASS_SCORE: f64 = 0.80;

/// Factor applied to the time multiplier after a wrong answer, and its floor.
const TIME_SHRINK: f32 = 0.85;
const TIME_FLOOR: f32 = 0.60;

#[derive(Clone, Debug)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub xp: i64,
    pub coins: i64,
}

#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub kind: SessionKind,
    pub total: usize,
    pub correct: u32,
    pub score: f64,
    pub passed: bool,
    pub earned_xp: i64,
    pub earned_coins: i64,
    /// Stars on the node's best score, for node sessions.
    pub stars: Option<u8>,
    pub streak_update: StreakUpdate,
}

fn xp_for(difficulty: Difficulty, kind: SessionKind, correct: bool) -> i64 {
    let base = match difficulty {
        Difficulty::Easy => 8,
        Difficulty::Mid => 10,
        Difficulty::Hard => 14,
    };
    let bonus = if kind == SessionKind::Boss { 4 } else { 0 };
    if correct {
        base + bonus
    } else {
        // Consolation XP keeps experimenting cheap
        (base / 4).max(2)
    }
}

fn coins_for(difficulty: Difficulty, kind: SessionKind, correct: bool) -> i64 {
    if !correct {
        return 0;
    }
    let base = match difficulty {
        Difficulty::Easy => 1,
        Difficulty::Mid => 2,
        Difficulty::Hard => 3,
    };
    base + if kind == SessionKind::Boss { 1 } else { 0 }
}

pub fn stars_for(best_score: f64) -> u8 {
    if best_score >= 0.93 {
        3
    } else if best_score >= 0.85 {
        2
    } else if best_score >= PASS_SCORE {
        1
    } else {
        0
    }
}

/// Scores the selected option against the current question and commits the
/// ledger, reward and error-log updates. Returns `None` once the session has
/// no current question.
pub fn submit_answer(
    session: &mut Session,
    progress: &mut Progress,
    selected: &str,
    now: DateTime<Utc>,
) -> Option<AnswerOutcome> {
    let question = session.current_question()?.clone();
    let is_correct = selected == question.correct;

    if is_correct {
        session.correct += 1;
        session.time_multiplier = 1.0;
    } else {
        session.wrong += 1;
        if session.timer_on {
            session.time_multiplier = (session.time_multiplier * TIME_SHRINK).max(TIME_FLOOR);
        }
        progress
            .errors
            .record(question.error_type, Some(&question.skill_id), now);
    }

    let xp = xp_for(question.difficulty, session.kind, is_correct);
    let coins = coins_for(question.difficulty, session.kind, is_correct);
    session.earned_xp += xp;
    session.earned_coins += coins;
    progress.xp += xp;
    progress.coins += coins;

    progress
        .skills
        .record_outcome(&question.skill_id, is_correct, question.difficulty, now);

    session.idx += 1;
    Some(AnswerOutcome {
        is_correct,
        correct_answer: question.correct,
        xp,
        coins,
    })
}

/// Handles an expired question timer: counts as wrong for the ledger and the
/// error log, but grants nothing at all.
pub fn submit_timeout(session: &mut Session, progress: &mut Progress, now: DateTime<Utc>) {
    let Some(question) = session.current_question().cloned() else {
        return;
    };
    session.wrong += 1;
    progress
        .errors
        .record(crate::models::ErrorType::Timeout, Some(&question.skill_id), now);
    progress
        .skills
        .record_outcome(&question.skill_id, false, question.difficulty, now);
    session.idx += 1;
}

/// Commits the session-level result: unit/weekly records, history, streak.
pub fn finish_session(
    session: &Session,
    progress: &mut Progress,
    now: DateTime<Utc>,
) -> SessionSummary {
    let total = session.total();
    let score = session.score();
    let passed = score >= PASS_SCORE;

    let mut stars = None;
    if let Some(node_id) = &session.node_id {
        let record = progress.unit_record_mut(node_id);
        record.attempts += 1;
        record.best_score = record.best_score.max(score);
        record.passed = record.best_score >= PASS_SCORE;
        record.stars = stars_for(record.best_score);
        record.last_attempt_at = Some(now);
        stars = Some(record.stars);
    }

    if session.kind == SessionKind::Weekly {
        let week_key = composer::weekly_theme(now.with_timezone(&Local).date_naive()).week_key;
        let record = progress.weekly.entry(week_key).or_default();
        if total <= 3 {
            record.warmup_done = true;
        } else {
            record.boss_best_score = record.boss_best_score.max(score);
            record.boss_passed = record.boss_best_score >= PASS_SCORE;
        }
        record.last_at = Some(now);
    }

    progress.history.total_sessions += 1;
    let minutes_per_question = if session.timer_on { 0.6 } else { 0.9 };
    let estimated_minutes = ((total as f64 * minutes_per_question).round() as u32).max(1);
    progress.history.total_minutes += estimated_minutes;
    progress.history.last_active_at = Some(now);

    let today = now.with_timezone(&Local).date_naive();
    let streak_update = progress.streak.mark_practiced(today);

    SessionSummary {
        kind: session.kind,
        total,
        correct: session.correct,
        score,
        passed,
        earned_xp: session.earned_xp,
        earned_coins: session.earned_coins,
        stars,
        streak_update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorType, Profile, Question};
    use chrono::Utc;

    fn test_progress() -> Progress {
        let profile = Profile {
            profile_id: "p_eval0001".to_string(),
            first_name: "Lia".to_string(),
            grade_year: 6,
            class_group: "6C".to_string(),
            school_name: "Hilltop".to_string(),
            start_entry: 6,
            created_at: Utc::now(),
        };
        Progress::new_for_profile(&profile, Utc::now())
    }

    fn test_question(n: usize) -> Question {
        Question {
            prompt: format!("{} + 1 = ?", n),
            correct: (n + 1).to_string(),
            options: vec![
                (n + 1).to_string(),
                (n + 2).to_string(),
                (n + 3).to_string(),
                (n + 4).to_string(),
            ],
            hint: String::new(),
            skill_id: "g6_order_ops".to_string(),
            difficulty: Difficulty::Mid,
            error_type: ErrorType::Procedural,
        }
    }

    fn test_session(kind: SessionKind, questions: usize, timer_on: bool) -> Session {
        Session {
            kind,
            node_id: None,
            track_key: "g6".to_string(),
            difficulty: Difficulty::Mid,
            timer_on,
            base_time_secs: 22.0,
            time_multiplier: 1.0,
            questions: (0..questions).map(test_question).collect(),
            idx: 0,
            correct: 0,
            wrong: 0,
            earned_xp: 0,
            earned_coins: 0,
        }
    }

    fn answer_correct(session: &mut Session, progress: &mut Progress) {
        let answer = session.current_question().unwrap().correct.clone();
        submit_answer(session, progress, &answer, Utc::now()).unwrap();
    }

    fn answer_wrong(session: &mut Session, progress: &mut Progress) {
        submit_answer(session, progress, "not it", Utc::now()).unwrap();
    }

    #[test]
    fn test_exact_pass_boundary_four_of_five() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Boss, 5, true);
        for _ in 0..4 {
            answer_correct(&mut session, &mut progress);
        }
        answer_wrong(&mut session, &mut progress);
        let summary = finish_session(&session, &mut progress, Utc::now());
        assert_eq!(summary.score, 0.8);
        assert!(summary.passed);
    }

    #[test]
    fn test_just_below_threshold_fails() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Boss, 10, true);
        for _ in 0..7 {
            answer_correct(&mut session, &mut progress);
        }
        for _ in 0..3 {
            answer_wrong(&mut session, &mut progress);
        }
        let summary = finish_session(&session, &mut progress, Utc::now());
        assert!(!summary.passed);
    }

    #[test]
    fn test_wrong_answers_shrink_timer_down_to_floor() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Practice, 8, true);
        answer_wrong(&mut session, &mut progress);
        assert!((session.time_multiplier - 0.85).abs() < 1e-6);
        answer_wrong(&mut session, &mut progress);
        assert!((session.time_multiplier - 0.7225).abs() < 1e-6);
        for _ in 0..4 {
            answer_wrong(&mut session, &mut progress);
        }
        assert_eq!(session.time_multiplier, 0.60);
        // A correct answer resets the pressure
        answer_correct(&mut session, &mut progress);
        assert_eq!(session.time_multiplier, 1.0);
    }

    #[test]
    fn test_untimed_sessions_do_not_shrink() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Practice, 2, false);
        answer_wrong(&mut session, &mut progress);
        assert_eq!(session.time_multiplier, 1.0);
    }

    #[test]
    fn test_rewards_and_consolation() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Practice, 2, true);
        let won = {
            let answer = session.current_question().unwrap().correct.clone();
            submit_answer(&mut session, &mut progress, &answer, Utc::now()).unwrap()
        };
        assert_eq!(won.xp, 10);
        assert_eq!(won.coins, 2);
        let lost = submit_answer(&mut session, &mut progress, "no", Utc::now()).unwrap();
        assert_eq!(lost.xp, 2);
        assert_eq!(lost.coins, 0);
        assert_eq!(progress.xp, 12);
        assert_eq!(progress.coins, 2);
    }

    #[test]
    fn test_boss_bonus_applies() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Boss, 1, true);
        let answer = session.current_question().unwrap().correct.clone();
        let outcome = submit_answer(&mut session, &mut progress, &answer, Utc::now()).unwrap();
        assert_eq!(outcome.xp, 14);
        assert_eq!(outcome.coins, 3);
    }

    #[test]
    fn test_timeout_grants_nothing_but_counts_against_ledger() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Practice, 1, true);
        submit_timeout(&mut session, &mut progress, Utc::now());
        assert_eq!(session.idx, 1);
        assert_eq!(session.wrong, 1);
        assert_eq!(progress.xp, 0);
        assert_eq!(progress.coins, 0);
        assert_eq!(progress.errors.by_type.get("E_TIME"), Some(&1));
        let record = progress.skills.get("g6_order_ops").unwrap();
        assert_eq!(record.wrong, 1);
    }

    #[test]
    fn test_wrong_answer_lands_in_error_log() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Practice, 1, true);
        answer_wrong(&mut session, &mut progress);
        assert_eq!(progress.errors.by_type.get("E_PROC"), Some(&1));
        assert_eq!(
            progress.errors.recent[0].skill_id.as_deref(),
            Some("g6_order_ops")
        );
    }

    #[test]
    fn test_node_session_updates_unit_record_and_stars() {
        let mut progress = test_progress();
        let mut session = test_session(SessionKind::Boss, 10, true);
        session.node_id = Some("g6_u1_b1".to_string());
        for _ in 0..9 {
            answer_correct(&mut session, &mut progress);
        }
        answer_wrong(&mut session, &mut progress);
        let summary = finish_session(&session, &mut progress, Utc::now());
        assert!(summary.passed);
        assert_eq!(summary.stars, Some(2)); // 0.90 -> two stars
        let record = progress.units.get("g6_u1_b1").unwrap();
        assert_eq!(record.attempts, 1);
        assert!(record.passed);
    }

    #[test]
    fn test_star_bands() {
        assert_eq!(stars_for(0.95), 3);
        assert_eq!(stars_for(0.93), 3);
        assert_eq!(stars_for(0.85), 2);
        assert_eq!(stars_for(0.80), 1);
        assert_eq!(stars_for(0.79), 0);
    }

    #[test]
    fn test_two_sessions_same_day_count_one_streak_day() {
        let mut progress = test_progress();
        for _ in 0..2 {
            let mut session = test_session(SessionKind::Practice, 1, false);
            answer_correct(&mut session, &mut progress);
            finish_session(&session, &mut progress, Utc::now());
        }
        assert_eq!(progress.streak.current, 1);
        assert_eq!(progress.history.total_sessions, 2);
    }
}
