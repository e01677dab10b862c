use std::time::Duration;

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Countdown format, rounded up so the clock shows 0:01 until time is out
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_millis().div_ceil(1000);
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Short response-time format, e.g. "1.25s"
pub fn format_secs(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[2., 4.]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[2., 4., 4., 4., 5., 5., 7., 9.]), Some(2.0));
        assert_eq!(std_dev(&[3.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn clock_rounds_up_partial_seconds() {
        assert_eq!(format_clock(Duration::from_secs(60)), "1:00");
        assert_eq!(format_clock(Duration::from_millis(59_100)), "1:00");
        assert_eq!(format_clock(Duration::from_millis(100)), "0:01");
        assert_eq!(format_clock(Duration::ZERO), "0:00");
        assert_eq!(format_clock(Duration::from_secs(125)), "2:05");
    }

    #[test]
    fn secs_format() {
        assert_eq!(format_secs(Duration::from_millis(1250)), "1.25s");
    }
}
