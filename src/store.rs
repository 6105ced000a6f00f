//! The vendor's settings, blocked dates, and bookings, kept in a single JSON
//! document on disk.
use crate::bookings::Booking;
use crate::dayoff::{DayOffPattern, day_name};
use crate::grid::parse_iso_date;
use crate::selection::Selection;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct VendorSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) days_off: DayOffPattern,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct BlockedDate {
    pub(crate) date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
struct VendorData {
    #[serde(default, deserialize_with = "null_as_default")]
    settings: VendorSettings,
    #[serde(default, deserialize_with = "null_as_default")]
    blocked_dates: Vec<BlockedDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    bookings: Vec<Booking>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct VendorStore {
    path: PathBuf,
    data: VendorData,
}

impl VendorStore {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<VendorStore, StoreError> {
        let path = path.as_ref().to_path_buf();
        let src = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let data = serde_json::from_str::<VendorData>(&src).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        for bd in &data.blocked_dates {
            if parse_iso_date(&bd.date).is_none() {
                warn!(date = %bd.date, "Blocked date is not YYYY-MM-DD and will never match a day");
            }
        }
        for b in &data.bookings {
            if parse_iso_date(&b.event_date).is_none() {
                warn!(
                    event_date = %b.event_date,
                    id = b.id.as_deref(),
                    "Booking date is not YYYY-MM-DD and will never match a day"
                );
            }
        }
        info!(
            path = %path.display(),
            blocked = data.blocked_dates.len(),
            bookings = data.bookings.len(),
            days_off = ?data.settings.days_off.days_off().map(day_name).collect::<Vec<_>>(),
            "Loaded vendor data"
        );
        Ok(VendorStore { path, data })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn days_off(&self) -> &DayOffPattern {
        &self.data.settings.days_off
    }

    pub(crate) fn bookings(&self) -> &[Booking] {
        &self.data.bookings
    }

    /// A fresh snapshot of the blocked dates' ISO strings
    pub(crate) fn blocked_set(&self) -> BTreeSet<String> {
        self.data
            .blocked_dates
            .iter()
            .map(|bd| bd.date.clone())
            .collect()
    }

    pub(crate) fn blocked(&self, iso: &str) -> Option<&BlockedDate> {
        self.data.blocked_dates.iter().find(|bd| bd.date == iso)
    }

    /// Mark `iso` as blocked.  Returns `false` if it already was, in which
    /// case its existing reason is kept.
    pub(crate) fn block(&mut self, iso: &str, reason: Option<&str>) -> Result<bool, StoreError> {
        if parse_iso_date(iso).is_none() {
            return Err(StoreError::InvalidDate(iso.to_owned()));
        }
        if self.blocked(iso).is_some() {
            return Ok(false);
        }
        self.data.blocked_dates.push(BlockedDate {
            date: iso.to_owned(),
            reason: reason.map(ToOwned::to_owned),
        });
        Ok(true)
    }

    /// Returns `false` if `iso` was not blocked
    pub(crate) fn unblock(&mut self, iso: &str) -> bool {
        let before = self.data.blocked_dates.len();
        self.data.blocked_dates.retain(|bd| bd.date != iso);
        self.data.blocked_dates.len() != before
    }

    /// Block every selected date and save.  Returns the number of dates that
    /// were not already blocked.  On error, nothing is blocked.
    pub(crate) fn commit_selection(
        &mut self,
        selection: &Selection,
        reason: Option<&str>,
    ) -> Result<usize, StoreError> {
        if let Some(bad) = selection.iter().find(|iso| parse_iso_date(iso).is_none()) {
            return Err(StoreError::InvalidDate(bad.to_owned()));
        }
        let previous = self.data.blocked_dates.clone();
        let mut added = 0;
        for iso in selection.iter() {
            if self.block(iso, reason)? {
                added += 1;
            }
        }
        if let Err(e) = self.save() {
            self.data.blocked_dates = previous;
            return Err(e);
        }
        info!(
            selected = selection.len(),
            added,
            reason,
            "Blocked selected dates"
        );
        Ok(added)
    }

    /// Unblock `iso` and save.  Returns `false` (without saving) if it was
    /// not blocked.  On error, the date stays blocked.
    pub(crate) fn commit_unblock(&mut self, iso: &str) -> Result<bool, StoreError> {
        let previous = self.data.blocked_dates.clone();
        if !self.unblock(iso) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            self.data.blocked_dates = previous;
            return Err(e);
        }
        info!(date = iso, "Unblocked date");
        Ok(true)
    }

    /// Write the document to a temporary file beside the data file and then
    /// rename it into place
    pub(crate) fn save(&self) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(&self.data).map_err(StoreError::Encode)?;
        json.push('\n');
        let tmp = temp_path(&self.path);
        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            if let Err(e) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %e, "Failed to remove temporary file");
            }
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }
        info!(
            path = %self.path.display(),
            blocked = self.data.blocked_dates.len(),
            "Saved vendor data"
        );
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("vendor"), ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to read {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize vendor data")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),
}
