pub mod config;
pub mod init;
pub mod run;
pub mod usage;

use chrono::NaiveDate;

/// `--today` when given, otherwise the local calendar date.
pub fn today_or_local(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(|| chrono::Local::now().date_naive())
}
