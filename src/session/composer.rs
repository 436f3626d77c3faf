//! Session composition: which skills get asked, in what order, with what
//! time budget.
//!
//! A standard lesson/review/practice of size N draws 70% from the target
//! scope, 20% from overdue reviews and 10% from the weakest skills in the
//! current track, then shuffles so the learner cannot tell the sources apart.
//! Empty sources under-fill their quota; they are never backfilled from the
//! others. Bosses draw from the target only. Spaced review and the error
//! drill fail fast when their source pool is empty.

use crate::content::{Node, NodeKind};
use crate::generators::GeneratorRegistry;
use crate::models::{Difficulty, Progress, Session, SessionKind};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("no reviews are due right now")]
    NothingDue,
    #[error("the error log is empty")]
    NoErrorsLogged,
}

/// Base seconds per question before session-kind adjustments.
fn base_time_for(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 15.0,
        Difficulty::Mid => 30.0,
        Difficulty::Hard => 45.0,
    }
}

/// Bosses get the full base; reviews and everything else shave some off.
fn session_time_for(kind: SessionKind, difficulty: Difficulty) -> f32 {
    let base = base_time_for(difficulty);
    match kind {
        SessionKind::Boss => base,
        SessionKind::Review | SessionKind::SpacedReview => (base - 5.0).max(12.0),
        _ => (base - 8.0).max(10.0),
    }
}

/// 70/20/10 target/due/weakest plan. Quotas of empty sources are dropped.
fn mixed_plan(
    progress: &Progress,
    target: &[String],
    count: usize,
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Vec<String> {
    let n_target = (((count as f64) * 0.7).floor() as usize).max(1);
    let n_due = ((count as f64) * 0.2).floor() as usize;
    let n_weak = count.saturating_sub(n_target + n_due);

    let due = progress.skills.due_skills(now, n_due.max(1));
    let weak = progress.skills.weakest_in_scope(&progress.current_track, n_weak.max(1));

    let mut plan: Vec<String> = Vec::with_capacity(count);
    if !target.is_empty() {
        for i in 0..n_target {
            plan.push(target[i % target.len()].clone());
        }
    }
    if !due.is_empty() {
        for i in 0..n_due {
            plan.push(due[i % due.len()].clone());
        }
    }
    if !weak.is_empty() {
        for i in 0..n_weak {
            plan.push(weak[i % weak.len()].clone());
        }
    }
    plan.shuffle(rng);
    plan
}

fn round_robin(skills: &[String], count: usize) -> Vec<String> {
    if skills.is_empty() {
        return Vec::new();
    }
    (0..count).map(|i| skills[i % skills.len()].clone()).collect()
}

#[allow(clippy::too_many_arguments)]
fn build_session(
    registry: &GeneratorRegistry,
    kind: SessionKind,
    node_id: Option<String>,
    track_key: &str,
    plan: Vec<String>,
    difficulty: Difficulty,
    timer_on: bool,
    rng: &mut dyn RngCore,
) -> Session {
    let questions = plan
        .iter()
        .map(|skill_id| registry.generate(skill_id, difficulty, rng))
        .collect();
    Session {
        kind,
        node_id,
        track_key: track_key.to_string(),
        difficulty,
        timer_on,
        base_time_secs: session_time_for(kind, difficulty),
        time_multiplier: 1.0,
        questions,
        idx: 0,
        correct: 0,
        wrong: 0,
        earned_xp: 0,
        earned_coins: 0,
    }
}

/// Session for a trail node. Lessons and reviews use the standard mix;
/// bosses stay on the unit's own skills.
pub fn compose_node(
    registry: &GeneratorRegistry,
    progress: &Progress,
    node: &Node,
    unit_skills: &[&str],
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Session {
    let kind = match node.kind {
        NodeKind::Lesson => SessionKind::Lesson,
        NodeKind::Review => SessionKind::Review,
        NodeKind::Boss => SessionKind::Boss,
    };
    let count = if progress.settings.focus_mode {
        if kind == SessionKind::Boss { 8 } else { 6 }
    } else {
        match kind {
            SessionKind::Boss => 10,
            SessionKind::Review => 6,
            _ => 8,
        }
    };
    let target: Vec<String> = unit_skills.iter().map(|s| s.to_string()).collect();
    let plan = if kind == SessionKind::Boss {
        round_robin(&target, count)
    } else {
        mixed_plan(progress, &target, count, now, rng)
    };
    let timer_on = !progress.settings.no_timer;
    build_session(
        registry,
        kind,
        Some(node.node_id.clone()),
        &progress.current_track,
        plan,
        Difficulty::Mid,
        timer_on,
        rng,
    )
}

/// Free practice over a chosen set of skills.
pub fn compose_practice(
    registry: &GeneratorRegistry,
    progress: &Progress,
    target: &[String],
    count: usize,
    difficulty: Difficulty,
    no_timer: bool,
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Session {
    let plan = mixed_plan(progress, target, count, now, rng);
    let timer_on = !(no_timer || progress.settings.no_timer);
    build_session(
        registry,
        SessionKind::Practice,
        None,
        &progress.current_track,
        plan,
        difficulty,
        timer_on,
        rng,
    )
}

/// Review of whatever is overdue, untimed. Fails when nothing is due.
pub fn compose_spaced_review(
    registry: &GeneratorRegistry,
    progress: &Progress,
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Result<Session, ComposeError> {
    let due = progress.skills.due_skills(now, 12);
    if due.is_empty() {
        return Err(ComposeError::NothingDue);
    }
    let count = due.len().min(8);
    let plan = round_robin(&due, count);
    Ok(build_session(
        registry,
        SessionKind::SpacedReview,
        None,
        &progress.current_track,
        plan,
        Difficulty::Mid,
        false,
        rng,
    ))
}

/// Short, easy, untimed drill on the most-missed recent skills.
pub fn compose_error_drill(
    registry: &GeneratorRegistry,
    progress: &Progress,
    rng: &mut dyn RngCore,
) -> Result<Session, ComposeError> {
    let top = progress.errors.most_frequent_skills(3);
    if top.is_empty() {
        return Err(ComposeError::NoErrorsLogged);
    }
    let plan = round_robin(&top, 5);
    Ok(build_session(
        registry,
        SessionKind::ErrorDrill,
        None,
        &progress.current_track,
        plan,
        Difficulty::Easy,
        false,
        rng,
    ))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeeklyVariant {
    Warmup,
    Challenge,
}

#[derive(Clone, Debug)]
pub struct WeeklyTheme {
    pub week_key: String,
    pub title: &'static str,
    pub skill_id: &'static str,
}

/// Rotating weekly theme, a deterministic function of the ISO week number.
pub fn weekly_theme(today: NaiveDate) -> WeeklyTheme {
    let iso = today.iso_week();
    let week_key = format!("{}-W{:02}", iso.year(), iso.week());
    let (title, skill_id) = match iso.week() % 3 {
        0 => ("Patterns", "ob_patterns"),
        1 => ("Parity", "ob_parity"),
        _ => ("Counting", "ob_counting"),
    };
    WeeklyTheme { week_key, title, skill_id }
}

/// Weekly event session. The warm-up is short and untimed; the challenge is
/// hard and timed unless the profile says otherwise.
pub fn compose_weekly(
    registry: &GeneratorRegistry,
    progress: &Progress,
    variant: WeeklyVariant,
    today: NaiveDate,
    rng: &mut dyn RngCore,
) -> Session {
    let theme = weekly_theme(today);
    let target = vec![theme.skill_id.to_string()];
    let (count, difficulty, timer_on) = match variant {
        WeeklyVariant::Warmup => (3, Difficulty::Mid, false),
        WeeklyVariant::Challenge => (8, Difficulty::Hard, !progress.settings.no_timer),
    };
    let plan = round_robin(&target, count);
    build_session(
        registry,
        SessionKind::Weekly,
        None,
        &progress.current_track,
        plan,
        difficulty,
        timer_on,
        rng,
    )
}

/// Fixed placement check used once when a learner enters at grade 6.
pub fn diagnostic_plan() -> Vec<String> {
    [
        "g4_mul_facts_6_9",
        "g4_mul_facts_6_9",
        "g5_div_2digit",
        "g6_dec_compare",
        "g6_dec_compare",
        "g6_order_ops",
        "g4_frac_equiv",
        "g6_frac_equiv",
        "g2_place_value",
        "g6_percent_simple",
        "g6_order_ops",
        "g5_dec_addsub",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub fn compose_diagnostic(
    registry: &GeneratorRegistry,
    progress: &Progress,
    rng: &mut dyn RngCore,
) -> Session {
    build_session(
        registry,
        SessionKind::Practice,
        None,
        &progress.current_track,
        diagnostic_plan(),
        Difficulty::Mid,
        false,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content;
    use crate::models::{ErrorType, Profile};
    use rand::thread_rng;

    fn fresh_progress() -> Progress {
        let profile = Profile {
            profile_id: "p_compose01".to_string(),
            first_name: "Noa".to_string(),
            grade_year: 6,
            class_group: "6A".to_string(),
            school_name: "Hilltop".to_string(),
            start_entry: 6,
            created_at: Utc::now(),
        };
        Progress::new_for_profile(&profile, Utc::now())
    }

    #[test]
    fn test_fresh_learner_mix_underfills_to_seven_of_ten() {
        let registry = GeneratorRegistry::new();
        let progress = fresh_progress();
        let mut rng = thread_rng();
        let session = compose_practice(
            &registry,
            &progress,
            &["g6_order_ops".to_string()],
            10,
            Difficulty::Mid,
            true,
            Utc::now(),
            &mut rng,
        );
        // No due reviews, no qualifying weak skills: only the 70% remains
        assert_eq!(session.total(), 7);
        assert!(session.questions.iter().all(|q| q.skill_id == "g6_order_ops"));
    }

    #[test]
    fn test_mix_blends_due_and_weak_sources() {
        let registry = GeneratorRegistry::new();
        let mut progress = fresh_progress();
        let now = Utc::now();
        // Make one skill overdue and another weak with enough evidence
        progress.skills.record_outcome("g4_frac_equiv", true, Difficulty::Mid, now - chrono::Duration::days(9));
        for _ in 0..3 {
            progress.skills.record_outcome("g6_dec_compare", false, Difficulty::Mid, now - chrono::Duration::days(3));
        }
        let mut rng = thread_rng();
        let session = compose_practice(
            &registry,
            &progress,
            &["g6_order_ops".to_string()],
            10,
            Difficulty::Mid,
            true,
            now,
            &mut rng,
        );
        assert_eq!(session.total(), 10);
        let target_count = session.questions.iter().filter(|q| q.skill_id == "g6_order_ops").count();
        assert_eq!(target_count, 7);
    }

    #[test]
    fn test_boss_session_stays_on_target_skills() {
        let registry = GeneratorRegistry::new();
        let mut progress = fresh_progress();
        let now = Utc::now();
        // Plenty of due/weak noise that a boss must ignore
        for _ in 0..3 {
            progress.skills.record_outcome("g6_dec_compare", false, Difficulty::Mid, now - chrono::Duration::days(5));
        }
        let tracks = content::tracks();
        let unit = &tracks.iter().find(|t| t.track_key == "g6").unwrap().units[0];
        let boss = unit.nodes().into_iter().find(|n| n.kind == NodeKind::Boss).unwrap();
        let mut rng = thread_rng();
        let skills: Vec<&str> = unit.skill_ids.clone();
        let session = compose_node(&registry, &progress, &boss, &skills, now, &mut rng);
        assert_eq!(session.kind, SessionKind::Boss);
        assert_eq!(session.total(), 10);
        assert!(session.questions.iter().all(|q| q.skill_id == "g6_order_ops"));
    }

    #[test]
    fn test_spaced_review_fails_fast_when_nothing_is_due() {
        let registry = GeneratorRegistry::new();
        let progress = fresh_progress();
        let mut rng = thread_rng();
        let result = compose_spaced_review(&registry, &progress, Utc::now(), &mut rng);
        assert_eq!(result.unwrap_err(), ComposeError::NothingDue);
    }

    #[test]
    fn test_error_drill_fails_fast_on_empty_log() {
        let registry = GeneratorRegistry::new();
        let progress = fresh_progress();
        let mut rng = thread_rng();
        let result = compose_error_drill(&registry, &progress, &mut rng);
        assert_eq!(result.unwrap_err(), ComposeError::NoErrorsLogged);
    }

    #[test]
    fn test_error_drill_uses_most_missed_skills() {
        let registry = GeneratorRegistry::new();
        let mut progress = fresh_progress();
        let now = Utc::now();
        for _ in 0..4 {
            progress.errors.record(ErrorType::FactRecall, Some("g4_mul_facts_6_9"), now);
        }
        let mut rng = thread_rng();
        let session = compose_error_drill(&registry, &progress, &mut rng).unwrap();
        assert_eq!(session.kind, SessionKind::ErrorDrill);
        assert_eq!(session.total(), 5);
        assert!(!session.timer_on);
        assert!(session.questions.iter().all(|q| q.skill_id == "g4_mul_facts_6_9"));
    }

    #[test]
    fn test_weekly_theme_rotates_with_iso_week() {
        let theme_a = weekly_theme("2026-01-05".parse().unwrap()); // week 2
        let theme_b = weekly_theme("2026-01-12".parse().unwrap()); // week 3
        let theme_c = weekly_theme("2026-01-19".parse().unwrap()); // week 4
        let theme_a_again = weekly_theme("2026-01-26".parse().unwrap()); // week 5
        assert_ne!(theme_a.skill_id, theme_b.skill_id);
        assert_ne!(theme_b.skill_id, theme_c.skill_id);
        assert_eq!(theme_a.skill_id, theme_a_again.skill_id);
        assert!(theme_a.week_key.starts_with("2026-W"));
    }

    #[test]
    fn test_weekly_variants_differ_in_size_and_timer() {
        let registry = GeneratorRegistry::new();
        let progress = fresh_progress();
        let today = "2026-03-02".parse().unwrap();
        let mut rng = thread_rng();
        let warmup = compose_weekly(&registry, &progress, WeeklyVariant::Warmup, today, &mut rng);
        let challenge = compose_weekly(&registry, &progress, WeeklyVariant::Challenge, today, &mut rng);
        assert_eq!(warmup.total(), 3);
        assert!(!warmup.timer_on);
        assert_eq!(challenge.total(), 8);
        assert!(challenge.timer_on);
        assert_eq!(challenge.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_time_budgets_by_kind() {
        assert_eq!(session_time_for(SessionKind::Boss, Difficulty::Mid), 30.0);
        assert_eq!(session_time_for(SessionKind::Review, Difficulty::Mid), 25.0);
        assert_eq!(session_time_for(SessionKind::Lesson, Difficulty::Mid), 22.0);
        assert_eq!(session_time_for(SessionKind::Practice, Difficulty::Easy), 10.0);
        assert_eq!(session_time_for(SessionKind::Boss, Difficulty::Hard), 45.0);
    }

    #[test]
    fn test_diagnostic_plan_is_twelve_items() {
        assert_eq!(diagnostic_plan().len(), 12);
    }
}
