//! A session is one finite run of questions plus its live counters.
//!
//! Sessions are built by the composer, mutated by the evaluator one answer at
//! a time, and discarded after the result screen. Nothing in here persists;
//! the ledger and unit records carry the durable outcome.

use super::{Difficulty, Question};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    Lesson,
    Review,
    /// Gate assessment: pass at 80% to unlock the next unit.
    Boss,
    Practice,
    SpacedReview,
    ErrorDrill,
    Weekly,
}

impl SessionKind {
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Lesson => "Lesson",
            SessionKind::Review => "Review",
            SessionKind::Boss => "Boss (80%)",
            SessionKind::Practice => "Practice",
            SessionKind::SpacedReview => "Spaced review",
            SessionKind::ErrorDrill => "Error drill",
            SessionKind::Weekly => "Weekly event",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub kind: SessionKind,
    /// Set when the session plays a trail node; drives unit records.
    pub node_id: Option<String>,
    pub track_key: String,
    pub difficulty: Difficulty,
    pub timer_on: bool,
    /// Per-question budget in seconds before the multiplier.
    pub base_time_secs: f32,
    /// Shrinks after wrong answers, resets on a correct one. Floor 0.60.
    pub time_multiplier: f32,
    pub questions: Vec<Question>,
    pub idx: usize,
    pub correct: u32,
    pub wrong: u32,
    pub earned_xp: i64,
    pub earned_coins: i64,
}

impl Session {
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.idx)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.idx >= self.questions.len()
    }

    pub fn score(&self) -> f64 {
        if self.questions.is_empty() {
            0.0
        } else {
            self.correct as f64 / self.questions.len() as f64
        }
    }

    /// Seconds allowed for the current question.
    pub fn question_time_secs(&self) -> f32 {
        self.base_time_secs * self.time_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_session() -> Session {
        Session {
            kind: SessionKind::Practice,
            node_id: None,
            track_key: "g6".to_string(),
            difficulty: Difficulty::Mid,
            timer_on: false,
            base_time_secs: 22.0,
            time_multiplier: 1.0,
            questions: Vec::new(),
            idx: 0,
            correct: 0,
            wrong: 0,
            earned_xp: 0,
            earned_coins: 0,
        }
    }

    #[test]
    fn test_empty_session_is_finished_and_scores_zero() {
        let s = empty_session();
        assert!(s.is_finished());
        assert_eq!(s.score(), 0.0);
        assert!(s.current_question().is_none());
    }
}
