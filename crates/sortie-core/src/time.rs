//! Simulated time helpers.
//!
//! Campaign time is an `f64` count of seconds since the campaign epoch
//! (midnight of the first campaign day).

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3_600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn minutes(n: f64) -> f64 {
    n * SECONDS_PER_MINUTE
}

pub fn hours(n: f64) -> f64 {
    n * SECONDS_PER_HOUR
}

/// Round a timestamp down to a whole minute.
pub fn to_full_minutes(time: f64) -> f64 {
    (time / SECONDS_PER_MINUTE).floor() * SECONDS_PER_MINUTE
}

/// Seconds elapsed since the start of the current day.
pub fn time_of_day(time: f64) -> f64 {
    time.rem_euclid(SECONDS_PER_DAY)
}

/// Timestamp of `day_start_hour` on the day following `time`.
pub fn next_day_start(time: f64, day_start_hour: f64) -> f64 {
    let day = (time / SECONDS_PER_DAY).floor();
    (day + 1.0) * SECONDS_PER_DAY + hours(day_start_hour)
}

/// Format a timestamp as `HH:MM` time of day.
pub fn format_clock(time: f64) -> String {
    let total_minutes = (time_of_day(time) / SECONDS_PER_MINUTE).floor() as u64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_minutes_truncate() {
        assert_eq!(to_full_minutes(119.9), 60.0);
        assert_eq!(to_full_minutes(120.0), 120.0);
    }

    #[test]
    fn next_day_start_skips_to_morning() {
        let evening = hours(20.0);
        assert_eq!(next_day_start(evening, 8.0), SECONDS_PER_DAY + hours(8.0));
        assert_eq!(format_clock(hours(32.5)), "08:30");
    }
}
