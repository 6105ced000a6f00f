use crate::grid::CalendarMonth;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A booking as supplied by the bookings collaborator.  Only `event_date` is
/// used for calendar placement; the other fields are for display, and any
/// fields not named here are carried through untouched.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    pub(crate) event_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[cfg(test)]
impl Booking {
    pub(crate) fn new(event_date: &str) -> Booking {
        Booking {
            id: None,
            event_date: event_date.to_owned(),
            client_name: None,
            status: None,
            extra: Map::new(),
        }
    }

    pub(crate) fn client(mut self, name: &str) -> Booking {
        self.client_name = Some(name.to_owned());
        self
    }
}

/// Bookings grouped by the ISO string of their event date.  Within a date,
/// bookings keep the order in which they were supplied.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct BookingsByDate(BTreeMap<String, Vec<Booking>>);

impl BookingsByDate {
    pub(crate) fn from_bookings<I: IntoIterator<Item = Booking>>(bookings: I) -> BookingsByDate {
        let mut by_date = BTreeMap::<String, Vec<Booking>>::new();
        for b in bookings {
            by_date.entry(b.event_date.clone()).or_default().push(b);
        }
        BookingsByDate(by_date)
    }

    /// Bucket the bookings whose event date falls in `month`
    pub(crate) fn for_month(bookings: &[Booking], month: CalendarMonth) -> BookingsByDate {
        let prefix = month.iso_prefix();
        BookingsByDate::from_bookings(
            bookings
                .iter()
                .filter(|b| b.event_date.starts_with(&prefix))
                .cloned(),
        )
    }

    pub(crate) fn get(&self, iso: &str) -> &[Booking] {
        self.0.get(iso).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn count(&self, iso: &str) -> usize {
        self.get(iso).len()
    }

    pub(crate) fn has_bookings(&self, iso: &str) -> bool {
        self.count(iso) > 0
    }

    /// Total number of bookings across all dates
    pub(crate) fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
