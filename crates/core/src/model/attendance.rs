use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{diff_days, is_consecutive};

/// Maximum number of check-in dates retained in the history.
pub const HISTORY_LIMIT: usize = 60;

/// Every streak length divisible by this earns a bonus.
pub const BONUS_STREAK_PERIOD: u32 = 7;

/// Extra snacks awarded on a bonus day.
pub const STREAK_BONUS_SNACKS: u32 = 3;

/// Snacks awarded for every successful check-in.
pub const DAILY_SNACKS: u32 = 1;

/// A buddy becomes distressed once this many days pass without a check-in.
pub const DISTRESS_AFTER_DAYS: i64 = 3;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttendanceError {
    #[error("streak is {streak} but no check-in date is recorded")]
    StreakWithoutCheckIn { streak: u32 },

    #[error("a check-in date is recorded but the streak is zero")]
    CheckInWithoutStreak,
}

//
// ─── BUDDY ─────────────────────────────────────────────────────────────────────
//

/// The companion character the learner looks after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Buddy {
    Cat,
    Dog,
}

/// What a buddy eats when given a snack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Treat {
    Fish,
    Meat,
}

impl Buddy {
    #[must_use]
    pub fn treat(self) -> Treat {
        match self {
            Buddy::Cat => Treat::Fish,
            Buddy::Dog => Treat::Meat,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Buddy::Cat => "cat",
            Buddy::Dog => "dog",
        }
    }
}

/// Read-time projection of how the buddy feels about recent attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Content,
    Distressed,
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// The check-in was recorded.
    Recorded {
        streak: u32,
        bonus: u32,
        snacks: u32,
    },
    /// Today already has a check-in; nothing changed.
    AlreadyCheckedInToday,
}

impl CheckInOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Result of feeding the buddy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnackOutcome {
    Given { remaining: u32 },
    NoSnacks,
}

impl SnackOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Given { .. })
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Daily check-in, streak and snack state for the single local learner.
///
/// Invariants held by every constructor and transition:
/// - `streak == 0` iff `last_check_in` is `None`
/// - `last_check_in`, when present, is the newest entry of `history`
/// - `history` is strictly ascending and holds at most [`HISTORY_LIMIT`] dates
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttendanceState {
    buddy: Option<Buddy>,
    snacks: u32,
    streak: u32,
    last_check_in: Option<NaiveDate>,
    history: Vec<NaiveDate>,
}

impl AttendanceState {
    /// Fresh state: no buddy, no snacks, no check-ins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from persisted fields.
    ///
    /// The history is normalized (sorted, de-duplicated, bounded, and made to
    /// include `last_check_in`) rather than rejected. Dates after
    /// `last_check_in` are left over from a clock that moved backwards and are
    /// dropped, as [`check_in`](Self::check_in) does.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceError` if the streak and last check-in disagree.
    pub fn from_persisted(
        buddy: Option<Buddy>,
        snacks: u32,
        streak: u32,
        last_check_in: Option<NaiveDate>,
        history: Vec<NaiveDate>,
    ) -> Result<Self, AttendanceError> {
        match (streak, last_check_in) {
            (0, Some(_)) => return Err(AttendanceError::CheckInWithoutStreak),
            (streak, None) if streak > 0 => {
                return Err(AttendanceError::StreakWithoutCheckIn { streak });
            }
            _ => {}
        }

        let mut history = history;
        if let Some(last) = last_check_in {
            history.retain(|date| *date < last);
            history.push(last);
        }
        normalize_history(&mut history);

        Ok(Self {
            buddy,
            snacks,
            streak,
            last_check_in,
            history,
        })
    }

    #[must_use]
    pub fn buddy(&self) -> Option<Buddy> {
        self.buddy
    }

    #[must_use]
    pub fn snacks(&self) -> u32 {
        self.snacks
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_check_in(&self) -> Option<NaiveDate> {
        self.last_check_in
    }

    #[must_use]
    pub fn history(&self) -> &[NaiveDate] {
        &self.history
    }

    /// Set (or replace) the buddy. Streak and snacks are untouched.
    pub fn choose_buddy(&mut self, buddy: Buddy) {
        self.buddy = Some(buddy);
    }

    #[must_use]
    pub fn can_check_in(&self, today: NaiveDate) -> bool {
        self.last_check_in != Some(today)
    }

    #[must_use]
    pub fn checked_in_on(&self, date: NaiveDate) -> bool {
        self.history.binary_search(&date).is_ok()
    }

    /// Record a check-in for `today`.
    ///
    /// The streak grows only when `today` directly follows the last check-in;
    /// any other date restarts it at 1.
    pub fn check_in(&mut self, today: NaiveDate) -> CheckInOutcome {
        if !self.can_check_in(today) {
            return CheckInOutcome::AlreadyCheckedInToday;
        }

        let streak = match self.last_check_in {
            Some(prev) if is_consecutive(prev, today) => self.streak.saturating_add(1),
            _ => 1,
        };
        let bonus = if streak % BONUS_STREAK_PERIOD == 0 {
            STREAK_BONUS_SNACKS
        } else {
            0
        };

        self.streak = streak;
        self.snacks = self.snacks.saturating_add(DAILY_SNACKS + bonus);
        self.last_check_in = Some(today);

        // A clock that moved backwards leaves later dates behind; drop them so
        // `today` stays the newest entry.
        self.history.retain(|date| *date < today);
        self.history.push(today);
        normalize_history(&mut self.history);

        CheckInOutcome::Recorded {
            streak,
            bonus,
            snacks: self.snacks,
        }
    }

    /// Spend one snack on the buddy.
    pub fn give_snack(&mut self) -> SnackOutcome {
        if self.snacks == 0 {
            return SnackOutcome::NoSnacks;
        }
        self.snacks -= 1;
        SnackOutcome::Given {
            remaining: self.snacks,
        }
    }

    /// Mood as of `today`. Never stored: the gap grows with wall-clock time alone.
    #[must_use]
    pub fn mood_on(&self, today: NaiveDate) -> Mood {
        match self.last_check_in {
            Some(last) if diff_days(last, today) >= DISTRESS_AFTER_DAYS => Mood::Distressed,
            _ => Mood::Content,
        }
    }
}

fn normalize_history(history: &mut Vec<NaiveDate>) {
    history.sort_unstable();
    history.dedup();
    if history.len() > HISTORY_LIMIT {
        let excess = history.len() - HISTORY_LIMIT;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::add_days;

    fn day(n: i64) -> NaiveDate {
        add_days(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), n)
    }

    #[test]
    fn first_check_in_starts_streak() {
        let mut state = AttendanceState::new();
        let outcome = state.check_in(day(0));

        assert_eq!(
            outcome,
            CheckInOutcome::Recorded {
                streak: 1,
                bonus: 0,
                snacks: 1
            }
        );
        assert_eq!(state.last_check_in(), Some(day(0)));
        assert_eq!(state.history(), &[day(0)]);
    }

    #[test]
    fn second_check_in_same_day_is_noop() {
        let mut state = AttendanceState::new();
        state.check_in(day(0));
        let before = state.clone();

        let outcome = state.check_in(day(0));
        assert_eq!(outcome, CheckInOutcome::AlreadyCheckedInToday);
        assert!(!outcome.is_ok());
        assert_eq!(state, before);
    }

    #[test]
    fn gap_resets_streak() {
        let mut state = AttendanceState::new();
        state.check_in(day(0));
        state.check_in(day(1));
        assert_eq!(state.streak(), 2);

        state.check_in(day(3));
        assert_eq!(state.streak(), 1);
        assert_eq!(state.snacks(), 3);
    }

    #[test]
    fn seventh_day_pays_bonus() {
        let mut state = AttendanceState::new();
        for n in 0..6 {
            state.check_in(day(n));
        }
        let outcome = state.check_in(day(6));
        assert_eq!(
            outcome,
            CheckInOutcome::Recorded {
                streak: 7,
                bonus: 3,
                snacks: 10
            }
        );

        let outcome = state.check_in(day(7));
        assert_eq!(
            outcome,
            CheckInOutcome::Recorded {
                streak: 8,
                bonus: 0,
                snacks: 11
            }
        );
    }

    #[test]
    fn backwards_check_in_resets_streak_and_keeps_last_newest() {
        let mut state = AttendanceState::new();
        state.check_in(day(10));
        state.check_in(day(11));

        let outcome = state.check_in(day(5));
        assert!(outcome.is_ok());
        assert_eq!(state.streak(), 1);
        assert_eq!(state.last_check_in(), Some(day(5)));
        assert_eq!(state.history().last(), Some(&day(5)));
    }

    #[test]
    fn history_is_bounded_and_ascending() {
        let mut state = AttendanceState::new();
        for n in 0..75 {
            state.check_in(day(n * 2));
        }
        let history = state.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert!(history.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(history.last(), Some(&day(148)));
        assert_eq!(history.first(), Some(&day(30)));
    }

    #[test]
    fn give_snack_never_goes_negative() {
        let mut state = AttendanceState::new();
        assert_eq!(state.give_snack(), SnackOutcome::NoSnacks);

        state.check_in(day(0));
        assert_eq!(state.give_snack(), SnackOutcome::Given { remaining: 0 });
        assert_eq!(state.give_snack(), SnackOutcome::NoSnacks);
        assert_eq!(state.snacks(), 0);
    }

    #[test]
    fn choose_buddy_leaves_counters_alone() {
        let mut state = AttendanceState::new();
        state.check_in(day(0));
        state.choose_buddy(Buddy::Dog);
        state.choose_buddy(Buddy::Dog);

        assert_eq!(state.buddy(), Some(Buddy::Dog));
        assert_eq!(state.streak(), 1);
        assert_eq!(state.snacks(), 1);
        assert_eq!(Buddy::Dog.treat(), Treat::Meat);
        assert_eq!(Buddy::Cat.treat(), Treat::Fish);
    }

    #[test]
    fn mood_turns_after_three_days() {
        let mut state = AttendanceState::new();
        assert_eq!(state.mood_on(day(100)), Mood::Content);

        state.check_in(day(0));
        assert_eq!(state.mood_on(day(2)), Mood::Content);
        assert_eq!(state.mood_on(day(3)), Mood::Distressed);
    }

    #[test]
    fn from_persisted_rejects_inconsistent_streak() {
        let err = AttendanceState::from_persisted(None, 0, 2, None, vec![]).unwrap_err();
        assert_eq!(err, AttendanceError::StreakWithoutCheckIn { streak: 2 });

        let err =
            AttendanceState::from_persisted(None, 0, 0, Some(day(0)), vec![day(0)]).unwrap_err();
        assert_eq!(err, AttendanceError::CheckInWithoutStreak);
    }

    #[test]
    fn from_persisted_repairs_history() {
        let state = AttendanceState::from_persisted(
            Some(Buddy::Cat),
            4,
            2,
            Some(day(5)),
            vec![day(4), day(1), day(4)],
        )
        .unwrap();
        assert_eq!(state.history(), &[day(1), day(4), day(5)]);
        assert!(state.checked_in_on(day(4)));
        assert!(!state.checked_in_on(day(3)));
    }

    #[test]
    fn from_persisted_drops_dates_after_last_check_in() {
        let state = AttendanceState::from_persisted(
            Some(Buddy::Cat),
            42,
            1,
            Some(day(2)),
            vec![day(0), day(2), day(4)],
        )
        .unwrap();
        assert_eq!(state.history(), &[day(0), day(2)]);
        assert_eq!(state.last_check_in(), Some(day(2)));
        assert_eq!(state.snacks(), 42);
        assert_eq!(state.buddy(), Some(Buddy::Cat));
    }
}
