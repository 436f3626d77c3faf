//! Daily practice streak with purchasable freeze credits.
//!
//! Days are compared as calendar dates, not instants. A freeze credit
//! forgives exactly one missed day. When a gap is larger than the available
//! credits, the credits that do exist are still consumed and the streak
//! resets anyway.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coin price of one freeze credit.
pub const FREEZE_PRICE: i64 = 150;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: u32,
    pub best: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
    pub freezes: u32,
}

/// What happened to the streak when a practice day was counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakUpdate {
    Started,
    Extended,
    AlreadyCounted,
    /// The gap was fully covered by freeze credits.
    Protected { freezes_used: u32 },
    /// Credits did not cover the gap; whatever was available is spent.
    Reset { freezes_used: u32 },
}

impl Streak {
    /// Counts `today` as a practiced day and applies the gap rules.
    pub fn mark_practiced(&mut self, today: NaiveDate) -> StreakUpdate {
        let update = match self.last_active_date {
            None => {
                self.current = 1;
                StreakUpdate::Started
            }
            Some(last) if last >= today => return StreakUpdate::AlreadyCounted,
            Some(last) => {
                let gap = (today - last).num_days();
                if gap == 1 {
                    self.current += 1;
                    StreakUpdate::Extended
                } else {
                    let missed = (gap - 1) as u32;
                    let used = missed.min(self.freezes);
                    self.freezes -= used;
                    if used == missed {
                        self.current += 1;
                        StreakUpdate::Protected { freezes_used: used }
                    } else {
                        self.current = 1;
                        StreakUpdate::Reset { freezes_used: used }
                    }
                }
            }
        };
        self.best = self.best.max(self.current);
        self.last_active_date = Some(today);
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_practice_starts_streak() {
        let mut s = Streak::default();
        assert_eq!(s.mark_practiced(day("2026-03-02")), StreakUpdate::Started);
        assert_eq!(s.current, 1);
        assert_eq!(s.best, 1);
    }

    #[test]
    fn test_same_day_counts_once() {
        let mut s = Streak::default();
        s.mark_practiced(day("2026-03-02"));
        assert_eq!(s.mark_practiced(day("2026-03-02")), StreakUpdate::AlreadyCounted);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn test_consecutive_days_extend() {
        let mut s = Streak::default();
        s.mark_practiced(day("2026-03-02"));
        s.mark_practiced(day("2026-03-03"));
        assert_eq!(s.mark_practiced(day("2026-03-04")), StreakUpdate::Extended);
        assert_eq!(s.current, 3);
        assert_eq!(s.best, 3);
    }

    #[test]
    fn test_covered_gap_keeps_streak_running() {
        let mut s = Streak::default();
        s.freezes = 2;
        s.mark_practiced(day("2026-03-02"));
        s.mark_practiced(day("2026-03-03"));
        // Two missed days, two credits
        let update = s.mark_practiced(day("2026-03-06"));
        assert_eq!(update, StreakUpdate::Protected { freezes_used: 2 });
        assert_eq!(s.current, 3);
        assert_eq!(s.freezes, 0);
    }

    #[test]
    fn test_partial_cover_consumes_credits_and_still_resets() {
        // Last active 3 days ago, 1 credit, 2 missed days: the credit is
        // spent even though it cannot save the streak.
        let mut s = Streak::default();
        s.freezes = 1;
        for d in ["2026-03-01", "2026-03-02", "2026-03-03"] {
            s.mark_practiced(day(d));
        }
        let update = s.mark_practiced(day("2026-03-06"));
        assert_eq!(update, StreakUpdate::Reset { freezes_used: 1 });
        assert_eq!(s.current, 1);
        assert_eq!(s.freezes, 0);
    }

    #[test]
    fn test_best_never_decreases() {
        let mut s = Streak::default();
        for d in ["2026-03-01", "2026-03-02", "2026-03-03"] {
            s.mark_practiced(day(d));
        }
        assert_eq!(s.best, 3);
        s.mark_practiced(day("2026-03-10"));
        assert_eq!(s.current, 1);
        assert_eq!(s.best, 3);
    }
}
