//! Score parsing and formatting for sorted sets.
//!
//! Scores are rendered like C's `%.15g`: at most 15 significant digits, trailing zeros dropped,
//! scientific notation for very large or very small magnitudes.

const PRECISION: i32 = 15;

/// Parses a score. `NaN` is rejected since it cannot be ordered.
pub fn parse_score(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|score| !score.is_nan())
}

pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "nan".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if score == 0.0 {
        return if score.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent is taken after rounding to the target precision, like `%g` does.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, score);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return score.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return score.to_string();
    };

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, score)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_integral_scores() {
        assert_eq!(format_score(4.0), "4");
        assert_eq!(format_score(-2.0), "-2");
        assert_eq!(format_score(1500.0), "1500");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn format_fractional_scores() {
        assert_eq!(format_score(3.5), "3.5");
        assert_eq!(format_score(99.9), "99.9");
        assert_eq!(format_score(0.1 + 0.2), "0.3");
        assert_eq!(format_score(0.0001), "0.0001");
    }

    #[test]
    fn format_extreme_scores() {
        assert_eq!(format_score(1e15), "1e+15");
        assert_eq!(format_score(123456789012345.0), "123456789012345");
        assert_eq!(format_score(0.00001), "1e-05");
        assert_eq!(format_score(-2.5e-7), "-2.5e-07");
        assert_eq!(format_score(f64::INFINITY), "inf");
        assert_eq!(format_score(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn formatted_scores_parse_back() {
        for score in [4.5, 3.0, -17.25, 1e300, 6.02214076e23, 1.0 / 3.0] {
            let parsed = parse_score(&format_score(score)).unwrap();
            assert!((parsed - score).abs() <= score.abs() * 1e-14);
        }
    }

    #[test]
    fn parse_scores() {
        assert_eq!(parse_score("4.5"), Some(4.5));
        assert_eq!(parse_score("-3"), Some(-3.0));
        assert_eq!(parse_score("inf"), Some(f64::INFINITY));
        assert_eq!(parse_score("nan"), None);
        assert_eq!(parse_score("abc"), None);
        assert_eq!(parse_score(""), None);
    }
}
