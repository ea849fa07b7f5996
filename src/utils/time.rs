// src/utils/time.rs

use chrono::{DateTime, NaiveDateTime, Utc};

/// Current UTC wall-clock time, naive (what the store columns hold).
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Converts epoch seconds into a NaiveDateTime. None if out of range.
pub fn from_epoch(epoch: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|dt| dt.naive_utc())
}
