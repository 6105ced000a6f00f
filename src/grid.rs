//! Month grid construction: turns a month plus the vendor's blocked dates,
//! weekly days off, pending selection, and bookings into an ordered sequence
//! of day cells, Sunday-first, ready to be laid out seven to a row.
use crate::bookings::BookingsByDate;
use crate::dayoff::DayOffPattern;
use crate::selection::Selection;
use std::collections::BTreeSet;
use std::fmt;
use std::iter::successors;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, Duration, Month, macros::format_description};

/// A calendar month.  Every value has a representable first day, so the
/// accessors below never fail.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct CalendarMonth {
    first: Date,
}

impl CalendarMonth {
    pub(crate) fn new(year: i32, month: Month) -> Result<CalendarMonth, InvalidMonthError> {
        Date::from_calendar_date(year, month, 1)
            .map(|first| CalendarMonth { first })
            .map_err(|_| InvalidMonthError::Year(year))
    }

    /// Construct from a 0-based month index (January = 0)
    pub(crate) fn from_index0(year: i32, index: u8) -> Result<CalendarMonth, InvalidMonthError> {
        let month = index
            .checked_add(1)
            .and_then(|m| Month::try_from(m).ok())
            .ok_or(InvalidMonthError::Index(index))?;
        CalendarMonth::new(year, month)
    }

    pub(crate) fn containing(date: Date) -> CalendarMonth {
        CalendarMonth {
            first: date - Duration::days(i64::from(date.day()) - 1),
        }
    }

    pub(crate) fn year(self) -> i32 {
        self.first.year()
    }

    pub(crate) fn month(self) -> Month {
        self.first.month()
    }

    pub(crate) fn first_day(self) -> Date {
        self.first
    }

    /// Iterate over every date in the month in ascending order
    pub(crate) fn days(self) -> impl Iterator<Item = Date> {
        let month = self.first.month();
        successors(Some(self.first_day()), |d| d.next_day()).take_while(move |d| d.month() == month)
    }

    pub(crate) fn days_in_month(self) -> usize {
        self.days().count()
    }

    /// Weekday of the first day of the month, counted from Sunday = 0
    pub(crate) fn first_weekday_offset(self) -> u8 {
        self.first.weekday().number_days_from_sunday()
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Returns the given day of the month, or the month's last day if `day`
    /// is past the end.  Day 0 is treated as day 1.
    pub(crate) fn day_clamped(self, day: u8) -> Date {
        self.days()
            .take(usize::from(day.max(1)))
            .last()
            .unwrap_or(self.first)
    }

    /// The `YYYY-MM-` prefix shared by the ISO strings of every day in the
    /// month
    pub(crate) fn iso_prefix(self) -> String {
        format!("{:04}-{:02}-", self.year(), u8::from(self.month()))
    }

    pub(crate) fn next(self) -> Result<CalendarMonth, OutOfTimeError> {
        let last = self.days().last().unwrap_or(self.first);
        last.next_day()
            .map(|first| CalendarMonth { first })
            .ok_or(OutOfTimeError)
    }

    pub(crate) fn previous(self) -> Result<CalendarMonth, OutOfTimeError> {
        self.first
            .previous_day()
            .map(CalendarMonth::containing)
            .ok_or(OutOfTimeError)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), u8::from(self.month()))
    }
}

impl FromStr for CalendarMonth {
    type Err = ParseMonthError;

    /// Parse a month in the form `YYYY-MM`
    fn from_str(s: &str) -> Result<CalendarMonth, ParseMonthError> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| ParseMonthError::Format(s.to_owned()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParseMonthError::Format(s.to_owned()));
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| ParseMonthError::Format(s.to_owned()))?;
        let month = month
            .parse::<u8>()
            .map_err(|_| ParseMonthError::Format(s.to_owned()))?;
        let month = Month::try_from(month).map_err(|_| ParseMonthError::Format(s.to_owned()))?;
        Ok(CalendarMonth::new(year, month)?)
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum InvalidMonthError {
    #[error("month index {0} is not in 0..=11")]
    Index(u8),
    #[error("year {0} is outside the supported date range")]
    Year(i32),
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum ParseMonthError {
    #[error("invalid month {0:?}; expected YYYY-MM")]
    Format(String),
    #[error(transparent)]
    Invalid(#[from] InvalidMonthError),
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

/// Format a date as a zero-padded `YYYY-MM-DD` string
pub(crate) fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parse a `YYYY-MM-DD` string.  Returns `None` for anything else.
pub(crate) fn parse_iso_date(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum DayStatus {
    Available,
    Blocked,
    DayOff,
    Selected,
}

/// The facts about a single date that decide its status
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct DayFacts {
    selected: bool,
    blocked: bool,
    day_off: bool,
}

/// Status rules in precedence order.  The first rule that applies wins;
/// a date no rule applies to is `Available`.
const STATUS_RULES: [(DayStatus, fn(&DayFacts) -> bool); 3] = [
    (DayStatus::Selected, |f: &DayFacts| f.selected),
    (DayStatus::Blocked, |f: &DayFacts| f.blocked),
    (DayStatus::DayOff, |f: &DayFacts| f.day_off),
];

impl DayStatus {
    fn classify(facts: &DayFacts) -> DayStatus {
        STATUS_RULES
            .iter()
            .find(|(_, applies)| applies(facts))
            .map_or(DayStatus::Available, |&(status, _)| status)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum DayCell {
    /// Filler before the first of the month so that weekdays line up
    Padding,
    Date(DateCell),
}

impl DayCell {
    pub(crate) fn as_date(&self) -> Option<&DateCell> {
        match self {
            DayCell::Padding => None,
            DayCell::Date(cell) => Some(cell),
        }
    }

    /// Whether the cell may be toggled into the selection
    pub(crate) fn is_interactable(&self) -> bool {
        self.as_date().is_some_and(|cell| cell.status != DayStatus::DayOff)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DateCell {
    pub(crate) date: Date,
    pub(crate) iso: String,
    pub(crate) status: DayStatus,
    pub(crate) has_bookings: bool,
}

/// Build the cells for `month`: `first_weekday_offset()` padding cells
/// followed by one cell per day in ascending order.  No trailing padding is
/// added.
///
/// Entries in `blocked`, `selected`, or `bookings` that are not well-formed
/// `YYYY-MM-DD` strings never match a day and are otherwise ignored.
pub(crate) fn build_month_grid(
    month: CalendarMonth,
    blocked: &BTreeSet<String>,
    days_off: &DayOffPattern,
    selected: &Selection,
    bookings: &BookingsByDate,
) -> Vec<DayCell> {
    let offset = usize::from(month.first_weekday_offset());
    let mut cells = Vec::with_capacity(offset + 31);
    cells.extend(std::iter::repeat(DayCell::Padding).take(offset));
    cells.extend(month.days().map(|date| {
        let iso = iso_date(date);
        let facts = DayFacts {
            selected: selected.contains(&iso),
            blocked: blocked.contains(&iso),
            day_off: days_off.is_day_off(date.weekday()),
        };
        DayCell::Date(DateCell {
            date,
            status: DayStatus::classify(&facts),
            has_bookings: bookings.has_bookings(&iso),
            iso,
        })
    }));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::Booking;
    use crate::selection::SelectionAction;
    use assert_matches::assert_matches;
    use time::{Weekday, macros::date};

    fn set(dates: &[&str]) -> BTreeSet<String> {
        dates.iter().map(|&s| s.to_owned()).collect()
    }

    fn selection(dates: &[&str]) -> Selection {
        dates.iter().fold(Selection::new(), |sel, &d| {
            sel.apply(SelectionAction::Toggle(d.to_owned()))
        })
    }

    fn days_off(weekdays: &[Weekday]) -> DayOffPattern {
        weekdays.iter().copied().collect()
    }

    fn booking_on(iso: &str) -> Booking {
        Booking::new(iso)
    }

    fn date_cells(cells: &[DayCell]) -> Vec<&DateCell> {
        cells.iter().filter_map(DayCell::as_date).collect()
    }

    fn cell_for<'a>(cells: &'a [DayCell], iso: &str) -> &'a DateCell {
        date_cells(cells)
            .into_iter()
            .find(|c| c.iso == iso)
            .expect("date should be in the grid")
    }

    #[test]
    fn test_month_from_index0() {
        let month = CalendarMonth::from_index0(2024, 1).expect("February is valid");
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), Month::February);
        assert_eq!(month.first_day(), date!(2024 - 02 - 01));
        assert_eq!(
            CalendarMonth::from_index0(2024, 12),
            Err(InvalidMonthError::Index(12))
        );
        assert_eq!(
            CalendarMonth::from_index0(2024, 255),
            Err(InvalidMonthError::Index(255))
        );
        assert_matches!(
            CalendarMonth::from_index0(123_456, 0),
            Err(InvalidMonthError::Year(123_456))
        );
    }

    #[test]
    fn test_month_containing() {
        assert_eq!(
            CalendarMonth::containing(date!(2024 - 02 - 29)).first_day(),
            date!(2024 - 02 - 01)
        );
        assert_eq!(
            CalendarMonth::containing(date!(2023 - 12 - 01)).first_day(),
            date!(2023 - 12 - 01)
        );
    }

    #[test]
    fn test_month_navigation() {
        let dec = CalendarMonth::containing(date!(2023 - 12 - 25));
        let jan = dec.next().expect("January 2024 exists");
        assert_eq!(jan.first_day(), date!(2024 - 01 - 01));
        assert_eq!(jan.previous(), Ok(dec));
        let end = CalendarMonth::containing(Date::MAX);
        assert_eq!(end.next(), Err(OutOfTimeError));
        let start = CalendarMonth::containing(Date::MIN);
        assert_eq!(start.previous(), Err(OutOfTimeError));
    }

    #[test]
    fn test_day_clamped() {
        let feb = CalendarMonth::containing(date!(2023 - 02 - 10));
        assert_eq!(feb.day_clamped(31), date!(2023 - 02 - 28));
        assert_eq!(feb.day_clamped(15), date!(2023 - 02 - 15));
        assert_eq!(feb.day_clamped(0), date!(2023 - 02 - 01));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            "2024-02".parse::<CalendarMonth>(),
            CalendarMonth::new(2024, Month::February)
                .map_err(ParseMonthError::from)
        );
        assert_matches!(
            "2024-13".parse::<CalendarMonth>(),
            Err(ParseMonthError::Format(_))
        );
        assert_matches!(
            "2024-2".parse::<CalendarMonth>(),
            Err(ParseMonthError::Format(_))
        );
        assert_matches!(
            "February".parse::<CalendarMonth>(),
            Err(ParseMonthError::Format(_))
        );
        let month = CalendarMonth::containing(date!(2031 - 07 - 04));
        assert_eq!(month.to_string(), "2031-07");
        assert_eq!(month.iso_prefix(), "2031-07-");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date(date!(2024 - 02 - 05)), "2024-02-05");
        assert_eq!(parse_iso_date("2024-02-05"), Some(date!(2024 - 02 - 05)));
        assert_eq!(parse_iso_date("2024-2-5"), None);
        assert_eq!(parse_iso_date("2024-02-30"), None);
        assert_eq!(parse_iso_date("tomorrow"), None);
    }

    #[test]
    fn test_grid_length_every_month() {
        for year in [1900, 2000, 2023, 2024, 2100] {
            for index in 0..12 {
                let month = CalendarMonth::from_index0(year, index).expect("valid month");
                let cells = build_month_grid(
                    month,
                    &BTreeSet::new(),
                    &DayOffPattern::default(),
                    &Selection::new(),
                    &BookingsByDate::default(),
                );
                let offset = usize::from(month.first_weekday_offset());
                let days = month.days_in_month();
                assert!(offset <= 6, "offset {offset} out of range for {month}");
                assert!(
                    (28..=31).contains(&days),
                    "{days} days in {month} is not a real month length"
                );
                assert_eq!(cells.len(), offset + days, "wrong cell count for {month}");
                assert!(
                    cells[..offset].iter().all(|c| *c == DayCell::Padding),
                    "padding expected at the start of {month}"
                );
                let dates = date_cells(&cells);
                assert_eq!(dates.len(), days);
                for (day, cell) in std::iter::zip(1u8.., dates) {
                    assert_eq!(cell.date.day(), day);
                    assert_eq!(cell.iso, iso_date(cell.date));
                }
            }
        }
    }

    #[test]
    fn test_february_lengths() {
        let days = |year| {
            CalendarMonth::new(year, Month::February)
                .expect("valid month")
                .days_in_month()
        };
        assert_eq!(days(2024), 29);
        assert_eq!(days(2023), 28);
        assert_eq!(days(2000), 29);
        assert_eq!(days(1900), 28);
    }

    #[test]
    fn test_february_2024_scenario() {
        let month = CalendarMonth::from_index0(2024, 1).expect("valid month");
        let bookings = BookingsByDate::from_bookings([booking_on("2024-02-20")]);
        let cells = build_month_grid(
            month,
            &set(&["2024-02-14"]),
            &DayOffPattern::default(),
            &Selection::new(),
            &bookings,
        );
        assert_eq!(month.first_weekday_offset(), 4);
        assert_eq!(cells.len(), 4 + 29);
        let dates = date_cells(&cells);
        assert_eq!(dates.len(), 29);
        for cell in dates {
            match cell.iso.as_str() {
                "2024-02-14" => {
                    assert_eq!(cell.status, DayStatus::Blocked);
                    assert!(!cell.has_bookings);
                }
                "2024-02-20" => {
                    assert_eq!(cell.status, DayStatus::Available);
                    assert!(cell.has_bookings);
                }
                _ => {
                    assert_eq!(cell.status, DayStatus::Available, "{}", cell.iso);
                    assert!(!cell.has_bookings, "{}", cell.iso);
                }
            }
        }
    }

    #[test]
    fn test_sunday_day_off() {
        let month = CalendarMonth::from_index0(2024, 1).expect("valid month");
        let days_off = days_off(&[Weekday::Sunday]);
        let cells = build_month_grid(
            month,
            &BTreeSet::new(),
            &days_off,
            &Selection::new(),
            &BookingsByDate::default(),
        );
        for (i, cell) in cells.iter().enumerate() {
            match cell {
                DayCell::Padding => assert!(!cell.is_interactable()),
                DayCell::Date(dc) if dc.date.weekday() == Weekday::Sunday => {
                    assert_eq!(dc.status, DayStatus::DayOff);
                    assert!(!cell.is_interactable(), "{} should not toggle", dc.iso);
                    assert_eq!(i % 7, 0, "Sundays belong in the first column");
                }
                DayCell::Date(dc) => {
                    assert_eq!(dc.status, DayStatus::Available);
                    assert!(cell.is_interactable());
                }
            }
        }
        assert_eq!(cell_for(&cells, "2024-02-04").status, DayStatus::DayOff);
    }

    #[test]
    fn test_status_precedence() {
        // 2024-02-04 is a Sunday
        let iso = "2024-02-04";
        let month = CalendarMonth::containing(date!(2024 - 02 - 04));
        for selected in [false, true] {
            for blocked in [false, true] {
                for day_off in [false, true] {
                    let sel = if selected { selection(&[iso]) } else { Selection::new() };
                    let blk = if blocked { set(&[iso]) } else { BTreeSet::new() };
                    let off = if day_off {
                        days_off(&[Weekday::Sunday])
                    } else {
                        DayOffPattern::default()
                    };
                    let cells = build_month_grid(month, &blk, &off, &sel, &BookingsByDate::default());
                    let expected = if selected {
                        DayStatus::Selected
                    } else if blocked {
                        DayStatus::Blocked
                    } else if day_off {
                        DayStatus::DayOff
                    } else {
                        DayStatus::Available
                    };
                    assert_eq!(
                        cell_for(&cells, iso).status,
                        expected,
                        "selected={selected} blocked={blocked} day_off={day_off}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_blocked_and_selected_dates_are_interactable() {
        let month = CalendarMonth::containing(date!(2024 - 02 - 01));
        let cells = build_month_grid(
            month,
            &set(&["2024-02-10"]),
            &DayOffPattern::default(),
            &selection(&["2024-02-11"]),
            &BookingsByDate::default(),
        );
        let blocked = cells
            .iter()
            .find(|c| c.as_date().is_some_and(|dc| dc.iso == "2024-02-10"))
            .expect("blocked date present");
        assert!(blocked.is_interactable());
        assert_eq!(cell_for(&cells, "2024-02-11").status, DayStatus::Selected);
    }

    #[test]
    fn test_has_bookings_independent_of_status() {
        let month = CalendarMonth::containing(date!(2024 - 02 - 01));
        let bookings = BookingsByDate::from_bookings([
            booking_on("2024-02-03"),
            booking_on("2024-02-04"),
            booking_on("2024-02-05"),
        ]);
        let cells = build_month_grid(
            month,
            &set(&["2024-02-03"]),
            &days_off(&[Weekday::Sunday]),
            &selection(&["2024-02-05"]),
            &bookings,
        );
        let blocked = cell_for(&cells, "2024-02-03");
        assert_eq!(blocked.status, DayStatus::Blocked);
        assert!(blocked.has_bookings);
        let day_off = cell_for(&cells, "2024-02-04");
        assert_eq!(day_off.status, DayStatus::DayOff);
        assert!(day_off.has_bookings);
        let selected = cell_for(&cells, "2024-02-05");
        assert_eq!(selected.status, DayStatus::Selected);
        assert!(selected.has_bookings);
        assert!(!cell_for(&cells, "2024-02-06").has_bookings);
    }

    #[test]
    fn test_malformed_entries_never_match() {
        let month = CalendarMonth::containing(date!(2024 - 02 - 01));
        let bookings = BookingsByDate::from_bookings([booking_on("2024-2-9")]);
        let cells = build_month_grid(
            month,
            &set(&["2024-2-14", "Feb 14", ""]),
            &DayOffPattern::default(),
            &selection(&["02/15/2024"]),
            &bookings,
        );
        for cell in date_cells(&cells) {
            assert_eq!(cell.status, DayStatus::Available);
            assert!(!cell.has_bookings);
        }
    }

    #[test]
    fn test_idempotent() {
        let month = CalendarMonth::containing(date!(2024 - 03 - 01));
        let blocked = set(&["2024-03-08", "2024-03-09"]);
        let days_off = days_off(&[Weekday::Monday, Weekday::Saturday]);
        let selected = selection(&["2024-03-20", "2024-03-08"]);
        let bookings = BookingsByDate::from_bookings([booking_on("2024-03-12")]);
        let first = build_month_grid(month, &blocked, &days_off, &selected, &bookings);
        let second = build_month_grid(month, &blocked, &days_off, &selected, &bookings);
        assert_eq!(first, second);
    }
}
