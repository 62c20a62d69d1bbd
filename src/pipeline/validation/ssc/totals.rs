use std::sync::LazyLock;

use regex::Regex;

use crate::models::MarksheetRecord;
use crate::pipeline::validation::anomaly::AnomalyReport;
use crate::pipeline::validation::verify::{
    contains_number_literal, first_two_digit_decimal, totals_window,
};

/// The only grand totals an SSC marksheet prints.
const VALID_TOTALS: &[i64] = &[400, 500, 600];

static LABELLED_TOTAL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)TOTAL.*?([0-9]{3})",
        r"(?i)GRAND.*?([0-9]{3})",
        r"(?i)MAX.*?MARKS.*?([0-9]{3})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static THREE_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{3})\b").expect("valid regex"));

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([1-9][0-9]{2})\b").expect("valid regex"));

static WHOLE_PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([1-9][0-9])(?:\s|%|\z)").expect("valid regex"));

fn capture_int(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Grand maximum (400/500/600) from the totals window: a labelled total
/// first, else the first valid bare three-digit number.
pub fn total_max_marks(window: &str) -> Option<i64> {
    LABELLED_TOTAL_RES
        .iter()
        .filter_map(|re| capture_int(re, window))
        .find(|v| VALID_TOTALS.contains(v))
        .or_else(|| {
            THREE_DIGITS_RE
                .captures_iter(window)
                .filter_map(|c| c.get(1)?.as_str().parse::<i64>().ok())
                .find(|v| VALID_TOTALS.contains(v))
        })
}

/// Highest three-digit value in `[max / 2, max)`.
pub fn total_marks_obtained(window: &str, max: i64) -> Option<i64> {
    SCORE_RE
        .captures_iter(window)
        .filter_map(|c| c.get(1)?.as_str().parse::<i64>().ok())
        .filter(|&v| v < max && v * 2 >= max)
        .max()
}

/// Percentage printed in the totals window: a two-digit decimal, else a
/// whole number between 30 and 99.
pub fn percentage(window: &str) -> Option<f64> {
    first_two_digit_decimal(window)
        .filter(|p| (0.0..=100.0).contains(p))
        .or_else(|| {
            WHOLE_PERCENT_RE
                .captures_iter(window)
                .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
                .find(|p| (30.0..=100.0).contains(p))
        })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Re-derive totals and percentage from the text; model values survive only
/// when the text agrees with them.
pub fn verify_totals(record: &mut MarksheetRecord, raw_text: &str, report: &mut AnomalyReport) {
    let window = totals_window(raw_text);

    let max = total_max_marks(window);
    report.track("total_max_marks", &record.total_max_marks, &max);
    record.total_max_marks = max;

    let obtained = max.and_then(|m| total_marks_obtained(window, m));
    report.track("total_marks_obtained", &record.total_marks_obtained, &obtained);
    record.total_marks_obtained = obtained;

    let literal = record
        .percentage
        .filter(|p| (0.0..=100.0).contains(p))
        .filter(|p| contains_number_literal(window, &format!("{p:.2}")));
    let pct = literal.or_else(|| percentage(window)).map(round2);
    report.track("percentage", &record.percentage, &pct);
    record.percentage = pct;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIL: &str = "\
73 SOCIAL SCIENCES 100 079 SEVENTYNINE\n\
R8 WATER SECURITY A\n\
TOTAL MARKS 500 412 FOUR HUNDRED TWELVE\n\
PERCENTAGE 82.40 RESULT PASS\n";

    #[test]
    fn max_marks_only_valid_totals() {
        assert_eq!(total_max_marks("TOTAL 500 412"), Some(500));
        assert_eq!(total_max_marks("Grand total 450 then 600"), Some(600));
        assert_eq!(total_max_marks("TOTAL 450 412"), None);
        assert_eq!(total_max_marks("nothing"), None);
    }

    #[test]
    fn obtained_is_highest_in_range() {
        assert_eq!(total_marks_obtained("500 412 255 300", 500), Some(412));
        assert_eq!(total_marks_obtained("500 499", 500), Some(499));
        assert_eq!(total_marks_obtained("500 200", 500), None);
    }

    #[test]
    fn percentage_fallbacks() {
        assert_eq!(percentage("PERCENTAGE 82.40"), Some(82.40));
        assert_eq!(percentage("PERCENT 75%"), Some(75.0));
        assert_eq!(percentage("seat 12 pct 28"), None);
    }

    #[test]
    fn verify_rewrites_model_totals() {
        let mut record = MarksheetRecord {
            total_max_marks: Some(450),
            total_marks_obtained: Some(999),
            percentage: Some(91.0),
            ..Default::default()
        };
        let mut report = AnomalyReport::new();
        verify_totals(&mut record, TAIL, &mut report);

        assert_eq!(record.total_max_marks, Some(500));
        assert_eq!(record.total_marks_obtained, Some(412));
        assert_eq!(record.percentage, Some(82.4));
        assert_eq!(report.corrections().count(), 3);
    }

    #[test]
    fn literal_percentage_is_kept() {
        let mut record = MarksheetRecord {
            percentage: Some(82.4),
            ..Default::default()
        };
        let mut report = AnomalyReport::new();
        verify_totals(&mut record, TAIL, &mut report);
        assert_eq!(record.percentage, Some(82.4));
        assert!(report.warnings().iter().all(|w| !w.context.starts_with("percentage")));
    }

    #[test]
    fn obtained_null_without_max() {
        let mut record = MarksheetRecord {
            total_marks_obtained: Some(412),
            ..Default::default()
        };
        let mut report = AnomalyReport::new();
        verify_totals(&mut record, "SOCIAL SCIENCES 100 070\n412 83.10", &mut report);
        assert_eq!(record.total_max_marks, None);
        assert_eq!(record.total_marks_obtained, None);
        assert_eq!(record.percentage, Some(83.1));
    }
}
