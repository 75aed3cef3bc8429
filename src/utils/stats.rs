/// Rounds half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Unrounded `part / whole * 100`; 0 when `whole` is 0.
pub fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// `ratio` to one decimal.
pub fn percentage(part: u64, whole: u64) -> f64 {
    round1(ratio(part, whole))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round1(7.66), 7.7);
        assert_eq!(round1(7.64), 7.6);
        assert_eq!(round1(8.0), 8.0);
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(2, 3), 66.7);
        assert!((ratio(2, 3) - 66.666_666).abs() < 1e-3);
        assert_eq!(ratio(1, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[8.0, 6.0]), Some(7.0));
    }
}
