use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Calendar window a read view is bounded to
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimeRange {
    Daily,
    #[default]
    Monthly,
    Yearly,
    AllTime,
}

impl TimeRange {
    /// Start of the window containing `now`, at UTC midnight.
    /// `None` for all-time.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = match self {
            TimeRange::Daily => now.date_naive(),
            TimeRange::Monthly => NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?,
            TimeRange::Yearly => NaiveDate::from_ymd_opt(now.year(), 1, 1)?,
            TimeRange::AllTime => return None,
        };
        date.and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
    }
}

/// `(year, month)` for the month `back` months before the given one
pub fn months_before(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
