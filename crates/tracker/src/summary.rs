//! Human-readable rendering of finished activities.

use std::fmt;

use crate::models::ActivityRecord;

/// `"1h 2m 3s"`, `"2m 3s"` or `"3s"`, dropping leading zero units.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// One-line summary shown to the user after a walk has been saved.
#[derive(Debug, Clone, Copy)]
pub struct ActivitySummary<'a> {
    record: &'a ActivityRecord,
}

impl<'a> ActivitySummary<'a> {
    pub fn new(record: &'a ActivityRecord) -> Self {
        Self { record }
    }
}

impl fmt::Display for ActivitySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Distance: {:.2} km | Time: {} | Calories burned: {} kcal",
            self.record.distance_km,
            format_duration(self.record.duration_seconds),
            self.record.calories_burned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::SessionFinalizer;
    use time::macros::date;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(725), "12m 5s");
        assert_eq!(format_duration(3600), "1h 0m 0s");
        assert_eq!(format_duration(3723), "1h 2m 3s");
    }

    #[test]
    fn test_summary_line() {
        let record = SessionFinalizer::build_record(Vec::new(), 2.346, 725, date!(2024 - 05 - 01));
        assert_eq!(
            ActivitySummary::new(&record).to_string(),
            "Distance: 2.35 km | Time: 12m 5s | Calories burned: 117 kcal"
        );
    }
}
