use chrono::{Local, NaiveDateTime};

/// Current wall-clock time in the business's local timezone.
///
/// Operating hours and slot boundaries are local wall-clock concepts, so all
/// calendar math downstream works on naive local timestamps.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}
