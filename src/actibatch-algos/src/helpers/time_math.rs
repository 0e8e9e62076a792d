use chrono::{NaiveTime, Timelike as _};

/// Whole minutes since midnight; seconds are dropped.
pub fn minute_of_day(time: &NaiveTime) -> i64 {
    time.hour() as i64 * 60 + time.minute() as i64
}

/// Minute on the doubled day line: hours at or before the pivot belong to
/// the following day.
pub fn pivot_minutes(time: &NaiveTime, pivot: u32) -> i64 {
    let minutes = minute_of_day(time);
    if time.hour() > pivot {
        minutes
    } else {
        minutes + 1440
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_of_day_drops_seconds() {
        // 23:50:59 -> 23*60 + 50 = 1430
        let t = NaiveTime::from_hms_opt(23, 50, 59).unwrap();
        assert_eq!(minute_of_day(&t), 1430);
    }

    #[test]
    fn pivot_minutes_keeps_late_hours() {
        // 23:50 with pivot 12 -> hour 23 > 12 -> stays at 1430
        let t = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
        assert_eq!(pivot_minutes(&t, 12), 1430);
    }

    #[test]
    fn pivot_minutes_shifts_early_hours() {
        // 00:10 with pivot 12 -> hour 0 <= 12 -> 10 + 1440 = 1450
        let t = NaiveTime::from_hms_opt(0, 10, 0).unwrap();
        assert_eq!(pivot_minutes(&t, 12), 1450);
    }

    #[test]
    fn pivot_hour_itself_shifts() {
        // The comparison is strict, so the pivot hour moves to the next day
        let t = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_eq!(pivot_minutes(&t, 14), 840 + 1440);
    }

    #[test]
    fn mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn mean_basic() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
    }
}
