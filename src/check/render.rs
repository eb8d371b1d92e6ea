//! Human readable rendering of ages, durations and percentages.

/// Render an age in seconds, e.g. `"42 sec"`, `"12 min"`, `"2.5 days"`.
pub fn age(secs: f64) -> String {
    if secs < 0.0 {
        return format!("-{}", age(-secs));
    }
    if secs < 240.0 {
        return format!("{} sec", secs.trunc());
    }
    let mins = (secs / 60.0).trunc();
    if mins < 360.0 {
        return format!("{} min", mins);
    }
    let hours = (mins / 60.0).trunc();
    if hours < 48.0 {
        return format!("{} hours", hours);
    }
    let days = hours / 24.0;
    if days < 6.0 {
        let text = format!("{:.1}", days);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{} days", text)
    } else {
        format!("{:.0} days", days)
    }
}

/// Render a duration that may be well below a second.
pub fn timespan(secs: f64) -> String {
    if secs.abs() < 1.0 {
        format!("{:.2} ms", secs * 1000.0)
    } else {
        age(secs)
    }
}

pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age() {
        assert_eq!(age(0.0), "0 sec");
        assert_eq!(age(239.9), "239 sec");
        assert_eq!(age(240.0), "4 min");
        assert_eq!(age(3600.0), "60 min");
        assert_eq!(age(6.0 * 3600.0), "6 hours");
        assert_eq!(age(48.0 * 3600.0), "2 days");
        assert_eq!(age(60.0 * 3600.0), "2.5 days");
        assert_eq!(age(10.0 * 86400.0), "10 days");
        assert_eq!(age(-30.0), "-30 sec");
    }

    #[test]
    fn test_timespan() {
        assert_eq!(timespan(0.25), "250.00 ms");
        assert_eq!(timespan(2.0), "2 sec");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(95.0), "95.0%");
        assert_eq!(percent(12.345), "12.3%");
    }
}
