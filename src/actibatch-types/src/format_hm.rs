use chrono::{NaiveTime, TimeDelta, Timelike as _};

pub trait FormatHM {
    fn format_hm(&self) -> String;
}

/// Elapsed time as total hours and minutes, not wrapped at midnight.
impl FormatHM for TimeDelta {
    fn format_hm(&self) -> String {
        let minutes = self.num_minutes();
        format!("{}:{:02}", minutes / 60, minutes % 60)
    }
}

/// Minutes re-expressed as a clock time, wrapping at midnight.
impl FormatHM for f64 {
    fn format_hm(&self) -> String {
        let minutes = self % 1440.0;
        let h = (minutes / 60.0) as i32;
        let m = (minutes % 60.0) as i32;
        format!("{:02}:{:02}", h, m)
    }
}

impl FormatHM for NaiveTime {
    fn format_hm(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}
