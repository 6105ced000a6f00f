use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::successors;
use time::Weekday;

/// Weekday names as they appear in vendor settings, indexed by
/// `Weekday::number_days_from_sunday()`
static DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub(crate) fn day_name(wd: Weekday) -> &'static str {
    DAY_NAMES[usize::from(wd.number_days_from_sunday())]
}

/// All seven weekdays, Sunday first
pub(crate) fn weekdays() -> impl Iterator<Item = Weekday> {
    successors(Some(Weekday::Sunday), |wd| match wd.next() {
        Weekday::Sunday => None,
        wd2 => Some(wd2),
    })
}

/// Recurring weekly closures, keyed by three-letter weekday name.  A missing
/// key or a `null` value means the vendor works that day.  Keys other than
/// `Sun`..`Sat` are preserved but never match.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct DayOffPattern(BTreeMap<String, Option<bool>>);

impl DayOffPattern {
    pub(crate) fn is_day_off(&self, wd: Weekday) -> bool {
        self.0.get(day_name(wd)).copied().flatten().unwrap_or(false)
    }

    /// The weekdays off, Sunday first
    pub(crate) fn days_off(&self) -> impl Iterator<Item = Weekday> + '_ {
        weekdays().filter(|&wd| self.is_day_off(wd))
    }
}

impl FromIterator<Weekday> for DayOffPattern {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> DayOffPattern {
        DayOffPattern(
            iter.into_iter()
                .map(|wd| (day_name(wd).to_owned(), Some(true)))
                .collect(),
        )
    }
}
