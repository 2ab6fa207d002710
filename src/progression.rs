//! Streak and leveling arithmetic.
//!
//! Everything here is pure: completion history and the current calendar
//! date come in as parameters, so handlers decide what "today" means
//! (UTC calendar date) and tests can pin it.

use chrono::NaiveDate;

use crate::constants::XP_PER_LEVEL;

/// Level derived from accumulated experience: 100 xp per level, unbounded.
/// Total for all non-negative xp; level 1 at 0 xp.
pub fn level_for_xp(xp: i64) -> i64 {
    xp / XP_PER_LEVEL + 1
}

/// Experience required to reach the given level from level 1
pub fn xp_for_level(level: i64) -> i64 {
    level * XP_PER_LEVEL
}

/// Result of applying an experience delta to a user's progression state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub xp: i64,
    pub level: i64,
    pub leveled_up: bool,
}

/// Add `delta` experience, recompute the level, and report whether the
/// new level exceeds the old one. Deterministic; the caller invokes this
/// exactly once per completion event.
pub fn apply_experience(xp: i64, level: i64, delta: i64) -> ProgressUpdate {
    let new_xp = xp + delta;
    let new_level = level_for_xp(new_xp);
    ProgressUpdate {
        xp: new_xp,
        level: new_level,
        leveled_up: new_level > level,
    }
}

/// Number of consecutive calendar days with a completion, counting back
/// from `today`. A day without a record ends the count; in particular an
/// unchecked `today` yields 0. Input order is irrelevant.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut sorted: Vec<NaiveDate> = days.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut streak = 0;
    let mut expected = today;
    for day in sorted {
        if day > expected {
            // Future-dated records never extend a streak ending today
            continue;
        }
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Length of the longest run of consecutive calendar days in the history.
/// A gap of exactly one day continues a run; any larger gap resets it to 1.
/// Input order is irrelevant.
pub fn longest_streak(days: &[NaiveDate]) -> u32 {
    let mut sorted: Vec<NaiveDate> = days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in sorted {
        run = match prev {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn days_back(today: NaiveDate, offsets: &[u64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|&n| today - chrono::Days::new(n))
            .collect()
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(199), 2);
        assert_eq!(level_for_xp(200), 3);
        assert_eq!(level_for_xp(1000), 11);
    }

    #[test]
    fn test_level_matches_formula_for_all_small_xp() {
        for xp in 0..10_000 {
            assert_eq!(level_for_xp(xp), xp / 100 + 1);
        }
    }

    #[test]
    fn test_xp_for_level() {
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(5), 500);
    }

    #[test]
    fn test_apply_experience_no_level_up() {
        let update = apply_experience(40, 1, 10);
        assert_eq!(update.xp, 50);
        assert_eq!(update.level, 1);
        assert!(!update.leveled_up);
    }

    #[test]
    fn test_apply_experience_level_up() {
        let update = apply_experience(90, 1, 10);
        assert_eq!(update.xp, 100);
        assert_eq!(update.level, 2);
        assert!(update.leveled_up);
    }

    #[test]
    fn test_apply_experience_exact_boundary_stays() {
        // Already exactly on a boundary; a zero delta changes nothing
        let update = apply_experience(100, 2, 0);
        assert_eq!(update.level, 2);
        assert!(!update.leveled_up);
    }

    #[test]
    fn test_apply_experience_deterministic() {
        assert_eq!(apply_experience(150, 2, 10), apply_experience(150, 2, 10));
    }

    #[test]
    fn test_current_streak_empty() {
        let today = d("2025-03-10");
        assert_eq!(current_streak(&[], today), 0);
    }

    #[test]
    fn test_current_streak_today_unchecked_is_zero() {
        let today = d("2025-03-10");
        let days = days_back(today, &[1, 2, 3]);
        assert_eq!(current_streak(&days, today), 0);
    }

    #[test]
    fn test_current_streak_three_days() {
        // today, today-1, today-2 checked; gap at today-3
        let today = d("2025-03-10");
        let days = days_back(today, &[0, 1, 2, 4, 5]);
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn test_current_streak_only_today() {
        let today = d("2025-03-10");
        assert_eq!(current_streak(&[today], today), 1);
    }

    #[test]
    fn test_current_streak_order_independent() {
        let today = d("2025-03-10");
        let days = vec![
            d("2025-03-08"),
            d("2025-03-10"),
            d("2025-03-09"),
        ];
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn test_current_streak_ignores_future_dates() {
        let today = d("2025-03-10");
        let days = vec![d("2025-03-11"), today, d("2025-03-09")];
        assert_eq!(current_streak(&days, today), 2);
    }

    #[test]
    fn test_current_streak_crosses_month_boundary() {
        let today = d("2025-03-01");
        let days = vec![today, d("2025-02-28"), d("2025-02-27")];
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn test_longest_streak_empty() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_longest_streak_with_gap() {
        // {today-5, today-4, today-2, today-1, today}: the gap at today-3
        // splits the history into runs of 2 and 3
        let today = d("2025-03-10");
        let days = days_back(today, &[5, 4, 2, 1, 0]);
        assert_eq!(longest_streak(&days), 3);
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn test_longest_streak_in_the_past() {
        // The longest run need not touch today
        let today = d("2025-03-10");
        let days = days_back(today, &[0, 9, 8, 7, 6]);
        assert_eq!(longest_streak(&days), 4);
        assert_eq!(current_streak(&days, today), 1);
    }

    #[test]
    fn test_longest_streak_order_independent() {
        let shuffled = vec![
            d("2025-03-05"),
            d("2025-03-03"),
            d("2025-03-04"),
            d("2025-03-01"),
        ];
        assert_eq!(longest_streak(&shuffled), 3);
    }

    #[test]
    fn test_longest_streak_single_day() {
        assert_eq!(longest_streak(&[d("2025-03-10")]), 1);
    }

    #[test]
    fn test_longest_streak_all_isolated() {
        let days = vec![d("2025-03-01"), d("2025-03-03"), d("2025-03-05")];
        assert_eq!(longest_streak(&days), 1);
    }
}
