use chrono::{DateTime, Utc};

/// Source of wall-clock time. Elapsed time is always derived from this,
/// never from counting ticks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The host system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole seconds from `from` to `to`, rounded to the nearest second.
/// Negative spans (clock moved backwards) count as zero.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let millis = to.signed_duration_since(from).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    ((millis + 500) / 1000) as u64
}

/// Format seconds as a stopwatch readout "HH:MM:SS"
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format seconds as "Xh Ym" (omits 0 values, "0m" for under a minute)
pub fn format_duration(total_seconds: u64) -> String {
    let total_minutes = total_seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 && minutes > 0 {
        format!("{}h {}m", hours, minutes)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Parse a user-entered duration: "90" (minutes), "1h30m", "45m", "30s", "1:30:00"
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains(':') {
        let parts: Vec<&str> = input.split(':').collect();
        let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
        return match numbers?.as_slice() {
            [h, m, s] => h
                .checked_mul(3600)?
                .checked_add(m.checked_mul(60)?)?
                .checked_add(*s),
            [m, s] => m.checked_mul(60)?.checked_add(*s),
            _ => None,
        };
    }

    if let Ok(minutes) = input.parse::<u64>() {
        return minutes.checked_mul(60);
    }

    let mut total = 0u64;
    let mut number = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        let value: u64 = number.parse().ok()?;
        number.clear();
        let seconds = match c.to_ascii_lowercase() {
            'h' => value.checked_mul(3600)?,
            'm' => value.checked_mul(60)?,
            's' => value,
            _ => return None,
        };
        total = total.checked_add(seconds)?;
    }

    // Trailing digits without a unit are not accepted in compound form
    if !number.is_empty() {
        return None;
    }
    Some(total)
}
