//! In-universe calendar model.
//!
//! # Responsibility
//! - Define the fixed calendar shape (month names, weekday names, month length).
//! - Provide total day-step arithmetic and weekday derivation over that shape.
//!
//! # Invariants
//! - Every `CalendarDate` satisfies `1 <= month <= MONTH_COUNT` and
//!   `1 <= day <= DAYS_PER_MONTH`; any `i64` year is accepted.
//! - Day stepping saturates at the ends of the `i64` year range: the last
//!   representable day advances to itself and the first retreats to itself.
//! - All months have the same length, so rollover never needs per-month data.
//! - Weekday depends on `day` only. Month and year never shift it.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ordered month names; index `0` is month `1`.
pub const MONTH_NAMES: [&str; 10] = [
    "Martius",
    "Aprilis",
    "Maius",
    "Junius",
    "Quintilis",
    "Sextilis",
    "September",
    "October",
    "November",
    "December",
];

/// Ordered weekday names as they appear in the rendered header row.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Solinday",
    "Lunaday",
    "Terraday",
    "Aquaday",
    "Aerinday",
    "Liberae",
    "Morticaday",
];

pub const MONTH_COUNT: u32 = MONTH_NAMES.len() as u32;
pub const WEEKDAY_COUNT: u32 = WEEKDAY_NAMES.len() as u32;
/// Four full weeks per month.
pub const DAYS_PER_MONTH: u32 = WEEKDAY_COUNT * 4;

/// Day of month used to anchor the weekday rotation.
const CALIBRATION_DAY: u32 = 11;
/// Weekday index (`Aerinday`) the calibration day must land on.
const CALIBRATION_WEEKDAY: u32 = 4;

/// Rotation applied to `day - 1` so the calibration day hits its weekday.
pub const OFFSET_BASE: u32 = (CALIBRATION_WEEKDAY + WEEKDAY_COUNT
    - (CALIBRATION_DAY - 1) % WEEKDAY_COUNT)
    % WEEKDAY_COUNT;

/// Validation failure for month/day input outside the fixed calendar bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDate { month: u32, day: u32 },
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { month, day } => write!(
                f,
                "invalid date: month {month} (1-{MONTH_COUNT}), day {day} (1-{DAYS_PER_MONTH})"
            ),
        }
    }
}

impl Error for CalendarError {}

/// Returns whether `month`/`day` fall inside the fixed calendar bounds.
pub fn validate(month: u32, day: u32) -> bool {
    (1..=MONTH_COUNT).contains(&month) && (1..=DAYS_PER_MONTH).contains(&day)
}

/// Immutable in-universe date.
///
/// Field order is `year, month, day` so the derived `Ord` is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i64,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Builds a date after checking the month/day bounds.
    ///
    /// # Errors
    /// - `CalendarError::InvalidDate` when `validate(month, day)` is false.
    pub fn new(year: i64, month: u32, day: u32) -> Result<Self, CalendarError> {
        if !validate(month, day) {
            return Err(CalendarError::InvalidDate { month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Returns the following day, rolling over month and year.
    pub fn advance(self) -> Self {
        if self.day < DAYS_PER_MONTH {
            return Self {
                day: self.day + 1,
                ..self
            };
        }
        if self.month < MONTH_COUNT {
            return Self {
                month: self.month + 1,
                day: 1,
                ..self
            };
        }
        match self.year.checked_add(1) {
            Some(year) => Self {
                year,
                month: 1,
                day: 1,
            },
            None => self,
        }
    }

    /// Returns the previous day. Stepping back over a month boundary lands on
    /// the last day of the previous month.
    pub fn retreat(self) -> Self {
        if self.day > 1 {
            return Self {
                day: self.day - 1,
                ..self
            };
        }
        if self.month > 1 {
            return Self {
                month: self.month - 1,
                day: DAYS_PER_MONTH,
                ..self
            };
        }
        match self.year.checked_sub(1) {
            Some(year) => Self {
                year,
                month: MONTH_COUNT,
                day: DAYS_PER_MONTH,
            },
            None => self,
        }
    }

    /// First day of the month after this one.
    ///
    /// In the last month of the largest year this is the first day of that
    /// same month.
    pub fn next_month_start(self) -> Self {
        if self.month == MONTH_COUNT {
            match self.year.checked_add(1) {
                Some(year) => Self {
                    year,
                    month: 1,
                    day: 1,
                },
                None => Self { day: 1, ..self },
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        }
    }

    /// Weekday index in `[0, WEEKDAY_COUNT)`.
    ///
    /// Only `day` participates; every month starts on the same weekday.
    pub fn weekday_index(&self) -> usize {
        ((self.day - 1 + OFFSET_BASE) % WEEKDAY_COUNT) as usize
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday_index()]
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Title line drawn under the calendar image.
    pub fn format_title(&self) -> String {
        format!(
            "Year: {} | Month: {} ({}) | Day: {}",
            self.year,
            self.month_name(),
            self.month,
            self.day
        )
    }

    /// Short `day month_name year` form used in chat messages.
    pub fn format_short(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.month, self.year)
    }
}

/// Looks up the name of a 1-based month.
///
/// Callers pass months that already passed `validate`; out-of-range values
/// fall back to `"?"` instead of panicking.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::{validate, CalendarDate, CalendarError, DAYS_PER_MONTH, MONTH_COUNT, OFFSET_BASE};

    fn date(year: i64, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn calendar_shape_constants() {
        assert_eq!(MONTH_COUNT, 10);
        assert_eq!(DAYS_PER_MONTH, 28);
        assert_eq!(OFFSET_BASE, 1);
    }

    #[test]
    fn validate_checks_both_bounds() {
        assert!(!validate(0, 1));
        assert!(!validate(11, 1));
        assert!(!validate(1, 0));
        assert!(!validate(1, 29));
        assert!(validate(1, 1));
        assert!(validate(10, 28));
    }

    #[test]
    fn new_rejects_out_of_range_dates() {
        let err = CalendarDate::new(1784, 11, 3).unwrap_err();
        assert_eq!(err, CalendarError::InvalidDate { month: 11, day: 3 });
        assert!(CalendarDate::new(-20, 1, 1).is_ok());
    }

    #[test]
    fn stepping_saturates_at_year_range_ends() {
        let last = date(i64::MAX, MONTH_COUNT, DAYS_PER_MONTH);
        assert_eq!(last.advance(), last);
        assert_eq!(last.retreat(), date(i64::MAX, MONTH_COUNT, DAYS_PER_MONTH - 1));
        assert_eq!(last.next_month_start(), date(i64::MAX, MONTH_COUNT, 1));

        let first = date(i64::MIN, 1, 1);
        assert_eq!(first.retreat(), first);
        assert_eq!(first.advance(), date(i64::MIN, 1, 2));
    }

    #[test]
    fn advance_rolls_over_month_and_year() {
        assert_eq!(date(1784, 2, 11).advance(), date(1784, 2, 12));
        assert_eq!(date(1784, 2, 28).advance(), date(1784, 3, 1));
        assert_eq!(date(1784, 10, 28).advance(), date(1785, 1, 1));
    }

    #[test]
    fn retreat_lands_on_last_day_of_previous_month() {
        assert_eq!(date(1784, 2, 12).retreat(), date(1784, 2, 11));
        assert_eq!(date(1784, 3, 1).retreat(), date(1784, 2, 28));
        assert_eq!(date(1784, 1, 1).retreat(), date(1783, 10, 28));
    }

    #[test]
    fn calibration_day_is_aerinday() {
        let calibrated = date(1784, 2, 11);
        assert_eq!(calibrated.weekday_index(), 4);
        assert_eq!(calibrated.weekday_name(), "Aerinday");
    }

    #[test]
    fn weekday_ignores_month_and_year_intentionally() {
        // Every month starts on the same weekday under this calendar.
        assert_eq!(date(1, 1, 5).weekday_index(), date(9000, 7, 5).weekday_index());
        assert_eq!(date(1784, 2, 1).weekday_name(), "Lunaday");
    }

    #[test]
    fn next_month_start_wraps_year() {
        assert_eq!(date(1784, 4, 17).next_month_start(), date(1784, 5, 1));
        assert_eq!(date(1784, 10, 3).next_month_start(), date(1785, 1, 1));
    }

    #[test]
    fn formats_title_and_short_form() {
        let value = date(1784, 2, 11);
        assert_eq!(value.format_title(), "Year: 1784 | Month: Aprilis (2) | Day: 11");
        assert_eq!(value.format_short(), "11 Aprilis 1784");
        assert_eq!(value.to_string(), "11/2/1784");
    }
}
