use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Offset of the reference civil timezone (Asia/Seoul, UTC+09:00, no DST).
pub const REFERENCE_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Returns the fixed offset every calendar date is computed in.
///
/// # Panics
///
/// Panics if `REFERENCE_UTC_OFFSET_SECS` is outside +/- 24h, which it is not.
#[must_use]
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_UTC_OFFSET_SECS).expect("reference offset should be valid")
}

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Current calendar date in the reference timezone.
    ///
    /// The host's local timezone never participates.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        civil_date(self.now())
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock represents real time.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Clock::Default)
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Projects an instant onto the reference-zone calendar.
#[must_use]
pub fn civil_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&reference_offset()).date_naive()
}

//
// ─── CALENDAR ARITHMETIC ───────────────────────────────────────────────────────
//

/// Shifts `date` by `delta` whole days.
///
/// Saturates at `NaiveDate::MIN` / `NaiveDate::MAX` instead of overflowing.
#[must_use]
pub fn add_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let magnitude = Days::new(delta.unsigned_abs());
    if delta >= 0 {
        date.checked_add_days(magnitude).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(magnitude).unwrap_or(NaiveDate::MIN)
    }
}

/// Returns `b - a` in whole days.
#[must_use]
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// True iff `date` is exactly the day after `prev`.
#[must_use]
pub fn is_consecutive(prev: NaiveDate, date: NaiveDate) -> bool {
    prev != NaiveDate::MAX && add_days(prev, 1) == date
}

//
// ─── TEST HELPERS ──────────────────────────────────────────────────────────────
//

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z,
/// which is 2023-11-15 in the reference zone).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

/// Returns a `Clock` fixed at noon of `date` in the reference zone.
///
/// # Panics
///
/// Panics if noon of `date` is not representable in the reference zone.
#[must_use]
pub fn clock_on(date: NaiveDate) -> Clock {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("noon is a valid time"));
    let local = reference_offset()
        .from_local_datetime(&noon)
        .single()
        .expect("fixed offsets have no gaps");
    Clock::fixed(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_uses_reference_zone_not_utc() {
        // 2023-11-14T22:13:20Z is already the 15th in Seoul.
        assert_eq!(fixed_clock().today(), date(2023, 11, 15));

        let just_before_midnight = Utc.with_ymd_and_hms(2024, 3, 1, 14, 59, 59).unwrap();
        assert_eq!(Clock::fixed(just_before_midnight).today(), date(2024, 3, 1));
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(Clock::fixed(midnight).today(), date(2024, 3, 2));
    }

    #[test]
    fn add_days_crosses_month_and_leap_boundaries() {
        assert_eq!(add_days(date(2024, 2, 28), 1), date(2024, 2, 29));
        assert_eq!(add_days(date(2024, 2, 29), 1), date(2024, 3, 1));
        assert_eq!(add_days(date(2023, 12, 31), 1), date(2024, 1, 1));
        assert_eq!(add_days(date(2024, 1, 1), -1), date(2023, 12, 31));
        assert_eq!(add_days(date(2024, 1, 1), 0), date(2024, 1, 1));
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
    }

    #[test]
    fn diff_days_is_signed() {
        assert_eq!(diff_days(date(2024, 1, 1), date(2024, 1, 4)), 3);
        assert_eq!(diff_days(date(2024, 1, 4), date(2024, 1, 1)), -3);
        assert_eq!(diff_days(date(2024, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn consecutive_only_for_next_day() {
        assert!(is_consecutive(date(2024, 2, 28), date(2024, 2, 29)));
        assert!(!is_consecutive(date(2024, 2, 28), date(2024, 3, 1)));
        assert!(!is_consecutive(date(2024, 2, 28), date(2024, 2, 28)));
        assert!(!is_consecutive(date(2024, 2, 28), date(2024, 2, 27)));
        assert!(!is_consecutive(NaiveDate::MAX, NaiveDate::MAX));
    }

    #[test]
    fn clock_on_lands_on_requested_date() {
        let mut clock = clock_on(date(2024, 5, 10));
        assert_eq!(clock.today(), date(2024, 5, 10));
        clock.advance(Duration::days(1));
        assert_eq!(clock.today(), date(2024, 5, 11));
    }

    #[test]
    fn default_clock_is_not_fixed() {
        let clock = Clock::default_clock();
        assert!(clock.is_default());
        assert!(!clock.is_fixed());
    }
}
