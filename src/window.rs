//! Half-open time windows anchored to an explicit time zone.
//!
//! Calendar boundaries ("today", "this week") depend on which zone the
//! caller lives in. Nothing here falls back to the machine's local zone or
//! to UTC: every constructor that works with calendar dates takes the zone
//! as a parameter.

use chrono::{
    DateTime, Datelike as _, Days, NaiveDate, NaiveTime, Offset as _, TimeDelta, TimeZone, Utc,
};
use serde::Serialize;

/// Half-open interval `[start, end)` of UTC instants.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// A window containing every instant.
    #[inline]
    #[must_use]
    pub const fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A window between two instants. Empty when `end <= start`.
    #[inline]
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// From local midnight of `start` up to (excluding) local midnight of
    /// `end`, both evaluated in `tz`.
    #[inline]
    #[must_use]
    pub fn from_dates<Tz: TimeZone>(start: NaiveDate, end: NaiveDate, tz: &Tz) -> Self {
        Self::between(local_midnight(start, tz), local_midnight(end, tz))
    }

    /// The calendar day `date` in `tz`.
    #[inline]
    #[must_use]
    pub fn day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        Self::from_dates(date, next_day(date), tz)
    }

    /// The calendar day containing `now` in `tz`.
    #[inline]
    #[must_use]
    pub fn today<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        Self::day(local_date(now, tz), tz)
    }

    /// The Monday-to-Sunday week containing `now` in `tz`.
    #[inline]
    #[must_use]
    pub fn week_of<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let date = local_date(now, tz);
        let monday = date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            .unwrap_or(date);
        let next_monday = monday.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        Self::from_dates(monday, next_monday, tz)
    }

    /// The calendar month containing `now` in `tz`.
    #[inline]
    #[must_use]
    pub fn month_of<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let date = local_date(now, tz);
        let first = date.with_day(1).unwrap_or(date);
        let next = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self::from_dates(first, next, tz)
    }

    /// Returns `true` if `instant` lies within the window.
    #[inline]
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| *instant >= start)
            && self.end.is_none_or(|end| *instant < end)
    }

    /// Returns `true` if no instant can fall inside the window.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.zip(self.end).is_some_and(|(start, end)| end <= start)
    }
}

/// Calendar date of `instant` as seen in `tz`.
#[inline]
#[must_use]
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// UTC instant of local midnight on `date` in `tz`.
///
/// An ambiguous midnight (clocks falling back) resolves to the earlier
/// instant. A midnight skipped by a forward jump resolves to the instant the
/// local clock jumps past it. Dates whose midnight falls outside the
/// representable range clamp to `DateTime::<Utc>::MIN_UTC` or
/// `DateTime::<Utc>::MAX_UTC`.
#[must_use]
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => {
            // Inside a DST gap: the old offset maps midnight onto the jump.
            // At the ends of the calendar the instant saturates instead.
            let before = naive.checked_sub_signed(TimeDelta::days(1)).unwrap_or(naive);
            let offset = tz.offset_from_utc_datetime(&before).fix();
            let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            naive.checked_sub_signed(shift).map_or_else(
                || {
                    if shift > TimeDelta::zero() {
                        DateTime::<Utc>::MIN_UTC
                    } else {
                        DateTime::<Utc>::MAX_UTC
                    }
                },
                |shifted| Utc.from_utc_datetime(&shifted),
            )
        }
    }
}

/// The day after `date`, saturating at the calendar maximum.
fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_is_half_open() {
        let window = TimeWindow::day(date(2024, 4, 15), &Utc);
        assert!(window.contains(&utc("2024-04-15T00:00:00Z")));
        assert!(window.contains(&utc("2024-04-15T23:59:59Z")));
        assert!(!window.contains(&utc("2024-04-16T00:00:00Z")));
        assert!(!window.contains(&utc("2024-04-14T23:59:59Z")));
    }

    #[test]
    fn today_depends_on_zone() {
        let now = utc("2024-04-15T18:00:00Z");
        let hanoi = FixedOffset::east_opt(7 * 3600).unwrap();

        let utc_today = TimeWindow::today(now, &Utc);
        assert_eq!(utc_today.start, Some(utc("2024-04-15T00:00:00Z")));

        // 18:00Z is already 01:00 on the 16th in UTC+7.
        let hanoi_today = TimeWindow::today(now, &hanoi);
        assert_eq!(hanoi_today.start, Some(utc("2024-04-15T17:00:00Z")));
        assert_eq!(hanoi_today.end, Some(utc("2024-04-16T17:00:00Z")));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-04-17 is a Wednesday.
        let window = TimeWindow::week_of(utc("2024-04-17T12:00:00Z"), &Utc);
        assert_eq!(window.start, Some(utc("2024-04-15T00:00:00Z")));
        assert_eq!(window.end, Some(utc("2024-04-22T00:00:00Z")));
    }

    #[test]
    fn month_covers_whole_month() {
        let window = TimeWindow::month_of(utc("2024-02-10T12:00:00Z"), &Utc);
        assert_eq!(window.start, Some(utc("2024-02-01T00:00:00Z")));
        assert_eq!(window.end, Some(utc("2024-03-01T00:00:00Z")));
    }

    #[test]
    fn all_time_contains_everything() {
        let window = TimeWindow::all_time();
        assert!(window.contains(&DateTime::<Utc>::MIN_UTC));
        assert!(window.contains(&DateTime::<Utc>::MAX_UTC));
        assert!(!window.is_empty());
    }

    #[test]
    fn inverted_window_is_empty() {
        let window = TimeWindow::from_dates(date(2024, 4, 16), date(2024, 4, 15), &Utc);
        assert!(window.is_empty());
        assert!(!window.contains(&utc("2024-04-15T12:00:00Z")));
    }

    #[test]
    fn midnight_inside_dst_gap_resolves_to_the_jump() {
        // Clocks went from 00:00 -03 straight to 01:00 -02.
        assert_eq!(
            local_midnight(date(2018, 11, 4), &chrono_tz::America::Sao_Paulo),
            utc("2018-11-04T03:00:00Z")
        );
        // Clocks went from 00:00 +02 straight to 01:00 +03.
        assert_eq!(
            local_midnight(date(2024, 3, 31), &chrono_tz::Asia::Beirut),
            utc("2024-03-30T22:00:00Z")
        );
    }

    #[test]
    fn day_across_dst_gap_is_short() {
        let window = TimeWindow::day(date(2024, 3, 31), &chrono_tz::Asia::Beirut);
        assert_eq!(window.start, Some(utc("2024-03-30T22:00:00Z")));
        assert_eq!(window.end, Some(utc("2024-03-31T21:00:00Z")));
    }

    #[test]
    fn local_midnight_clamps_at_calendar_edges() {
        let east = FixedOffset::east_opt(7 * 3600).unwrap();
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(local_midnight(NaiveDate::MIN, &east), DateTime::<Utc>::MIN_UTC);

        let everything = TimeWindow::from_dates(NaiveDate::MIN, NaiveDate::MAX, &west);
        assert!(everything.contains(&utc("2024-04-15T12:00:00Z")));
        assert!(!everything.is_empty());

        let open_start = TimeWindow::from_dates(NaiveDate::MIN, date(2024, 1, 1), &east);
        assert!(open_start.contains(&utc("1970-01-01T00:00:00Z")));
        assert!(!open_start.contains(&utc("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn local_midnight_in_negative_offset() {
        let new_york_winter = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            local_midnight(date(2024, 1, 10), &new_york_winter),
            utc("2024-01-10T05:00:00Z")
        );
    }
}
