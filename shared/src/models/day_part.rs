//! Day-part bucketing: morning / afternoon / night symbols per forecast day

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Coarse period of a local day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// Local hours [6, 12)
    Morning,
    /// Local hours [12, 18)
    Afternoon,
    /// Everything else
    Night,
}

impl DayPeriod {
    pub fn from_local_hour(hour: u32) -> Self {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Night => "Night",
        }
    }
}

/// Elapsed-day offset and local period of one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPart {
    pub day_offset: i64,
    pub period: DayPeriod,
}

/// Representative symbol per period of one forecast day.
///
/// Field order is the serialization order: morning, afternoon, night.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayBucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night: Option<String>,
}

impl DayBucket {
    pub fn get(&self, period: DayPeriod) -> Option<&str> {
        match period {
            DayPeriod::Morning => self.morning.as_deref(),
            DayPeriod::Afternoon => self.afternoon.as_deref(),
            DayPeriod::Night => self.night.as_deref(),
        }
    }

    /// Fill `period` unless it already holds a symbol. Returns whether it was filled.
    pub fn fill(&mut self, period: DayPeriod, symbol: String) -> bool {
        let slot = match period {
            DayPeriod::Morning => &mut self.morning,
            DayPeriod::Afternoon => &mut self.afternoon,
            DayPeriod::Night => &mut self.night,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(symbol);
        true
    }

    /// Filled periods in display order
    pub fn periods(&self) -> impl Iterator<Item = (DayPeriod, &str)> {
        [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Night]
            .into_iter()
            .filter_map(move |p| self.get(p).map(|s| (p, s)))
    }
}

/// Buckets timestamps against a reference start at a fixed civil UTC offset
#[derive(Debug, Clone, Copy)]
pub struct DayPartBucketer {
    offset: FixedOffset,
    max_day_offset: i64,
}

impl DayPartBucketer {
    /// Bucketer for `local_utc_offset_hours`, keeping days `1..=max_day_offset`.
    ///
    /// Returns `None` when the offset is not a valid civil offset.
    pub fn new(local_utc_offset_hours: i32, max_day_offset: i64) -> Option<Self> {
        let offset = FixedOffset::east_opt(local_utc_offset_hours.checked_mul(3600)?)?;
        Some(Self {
            offset,
            max_day_offset,
        })
    }

    /// Day offset and period of `timestamp`, without range filtering
    pub fn bucket(&self, timestamp: DateTime<Utc>, reference_start: DateTime<Utc>) -> DayPart {
        let elapsed: Duration = timestamp - reference_start;
        let day_offset = elapsed.num_seconds().div_euclid(SECONDS_PER_DAY);
        let local_hour = timestamp.with_timezone(&self.offset).hour();
        DayPart {
            day_offset,
            period: DayPeriod::from_local_hour(local_hour),
        }
    }

    /// Like [`Self::bucket`] but `None` for day 0, earlier days, and days past the horizon
    pub fn bucket_in_range(
        &self,
        timestamp: DateTime<Utc>,
        reference_start: DateTime<Utc>,
    ) -> Option<DayPart> {
        let part = self.bucket(timestamp, reference_start);
        (1..=self.max_day_offset)
            .contains(&part.day_offset)
            .then_some(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_period_hours() {
        assert_eq!(DayPeriod::from_local_hour(5), DayPeriod::Night);
        assert_eq!(DayPeriod::from_local_hour(6), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_local_hour(11), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_local_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_local_hour(17), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_local_hour(18), DayPeriod::Night);
        assert_eq!(DayPeriod::from_local_hour(0), DayPeriod::Night);
    }

    #[test]
    fn test_thirty_six_hours_ahead_afternoon() {
        // UTC hour 14 at offset 0
        let bucketer = DayPartBucketer::new(0, 8).unwrap();
        let start = utc(1, 2);
        let part = bucketer.bucket(start + Duration::hours(36), start);
        assert_eq!(part.day_offset, 1);
        assert_eq!(part.period, DayPeriod::Afternoon);
    }

    #[test]
    fn test_local_offset_shifts_period() {
        let bucketer = DayPartBucketer::new(-7, 8).unwrap();
        // 21:00 UTC is 14:00 at UTC-7
        let part = bucketer.bucket(utc(2, 21), utc(1, 0));
        assert_eq!(part.period, DayPeriod::Afternoon);
        // 03:00 UTC is 20:00 the previous local day
        let part = bucketer.bucket(utc(3, 3), utc(1, 0));
        assert_eq!(part.period, DayPeriod::Night);
        assert_eq!(part.day_offset, 2);
    }

    #[test]
    fn test_offset_is_elapsed_not_calendar() {
        let bucketer = DayPartBucketer::new(0, 8).unwrap();
        let start = utc(1, 23);
        // next calendar day but only one hour later
        assert_eq!(bucketer.bucket(utc(2, 0), start).day_offset, 0);
        assert_eq!(bucketer.bucket(utc(2, 23), start).day_offset, 1);
    }

    #[test]
    fn test_range_filter() {
        let bucketer = DayPartBucketer::new(0, 8).unwrap();
        let start = utc(1, 0);
        assert!(bucketer.bucket_in_range(utc(1, 12), start).is_none());
        assert!(bucketer.bucket_in_range(utc(2, 0), start).is_some());
        assert!(bucketer.bucket_in_range(utc(9, 23), start).is_some());
        assert!(bucketer.bucket_in_range(utc(10, 0), start).is_none());
        assert!(bucketer.bucket_in_range(start - Duration::hours(30), start).is_none());
    }

    #[test]
    fn test_invalid_offset() {
        assert!(DayPartBucketer::new(30, 8).is_none());
    }

    #[test]
    fn test_bucket_first_fill_wins() {
        let mut bucket = DayBucket::default();
        assert!(bucket.fill(DayPeriod::Night, "fog".to_string()));
        assert!(!bucket.fill(DayPeriod::Night, "rain".to_string()));
        assert_eq!(bucket.get(DayPeriod::Night), Some("fog"));
    }

    #[test]
    fn test_bucket_serializes_in_period_order() {
        let mut bucket = DayBucket::default();
        bucket.fill(DayPeriod::Night, "rain".to_string());
        bucket.fill(DayPeriod::Morning, "fog".to_string());
        let json = serde_json::to_string(&bucket).unwrap();
        assert_eq!(json, r#"{"morning":"fog","night":"rain"}"#);
        let order: Vec<_> = bucket.periods().map(|(p, _)| p).collect();
        assert_eq!(order, vec![DayPeriod::Morning, DayPeriod::Night]);
    }
}
