use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::month::MonthKey;

/// The current UTC offset of a canonical timezone, e.g. "Asia/Jakarta".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The calendar month it currently is in `offset`.
pub fn current_month(offset: UtcOffset) -> MonthKey {
    MonthKey::from_date(OffsetDateTime::now_utc().to_offset(offset).date())
}
