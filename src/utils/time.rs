use chrono::{Local, NaiveDateTime, TimeZone};

/// Unix seconds to local wall-clock time.
pub fn local_from_timestamp(ts: i64) -> Option<NaiveDateTime> {
    Local.timestamp_opt(ts, 0).single().map(|dt| dt.naive_local())
}

/// Local wall-clock time to unix seconds. Times skipped by a DST jump are
/// read as UTC rather than dropped.
pub fn timestamp_from_local(local: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| local.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_local_round_trip() {
        let noon = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(local_from_timestamp(timestamp_from_local(noon)), Some(noon));
    }
}
