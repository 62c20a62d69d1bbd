//! Marathi income certificate repair.
//!
//! Honorifics are stripped from names, a missing student name is recovered
//! from the certificate wording, and every income amount or amount-in-words
//! the model reports must be traceable to the OCR text or it is nulled.

use std::sync::LazyLock;

use regex::Regex;

use super::anomaly::AnomalyReport;
use super::verify::{fuzzy_number_match, normalize_digits, normalize_number};
use crate::models::{IncomeCertificateRecord, WarningKind};

static PARENT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?:श्री॰\s*|श्री\s*)").expect("valid regex"));

static PARENT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:यांना|यांची|यांचा|राहणार)\n?\z").expect("valid regex")
});

static STUDENT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?:कुमारी\s*|कुमार\s*)").expect("valid regex"));

static STUDENT_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:यांना|याना)\n?\z").expect("valid regex"));

static RECOVERED_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:यांचा|यांची|यांना|राहणार).*\z").expect("valid regex")
});

static LONG_DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9०-९]{5,}").expect("valid regex"));

/// Phrases meaning the certificate names a son or daughter.
const STUDENT_INDICATORS: &[&str] = &[
    "मुलगा कुमार",
    "मुलगी कुमारी",
    "मुलगा",
    "मुलगी",
    "यांचा मुलगा",
    "यांची मुलगी",
];

/// Student-name patterns, most specific first.
const STUDENT_NAME_PATTERNS: &[&str] = &[
    r"यांची\s+मुलगी\s+कुमारी\s+([^\n]{3,80})\n?\z",
    r"यांचा\s+मुलगा\s+कुमार\s+([^\n]{3,80})\n?\z",
    r"कुमारी\s+([^\n]{3,80}?)(?:\s+यांना|\s+शैक्षणिक|\n?\z)",
    r"कुमार\s+([^\n]{3,80}?)(?:\s+यांना|\s+शैक्षणिक|\n?\z)",
    r"यांचा\s+मुलगा\s+कुमार\s+([^\n]{3,80}?)\s+यांना",
    r"यांची\s+मुलगी\s+कुमारी\s+([^\n]{3,80}?)\s+यांना",
    r"यांचा\s+मुलगा\s+कुमार\s+(.{3,100}?)\s+यांना",
    r"यांची\s+मुलगी\s+कुमारी\s+(.{3,100}?)\s+यांना",
    // "यांचा" fused with the father's name
    r"[ाी]चा\s+मुलगा\s+कुमार\s+(.{3,100}?)\s+यांना",
    r"[ाी]ची\s+मुलगी\s+कुमारी\s+(.{3,100}?)\s+यांना",
    r"मुलगा\s+कुमार\s+(.{3,100}?)\s+यांना",
    r"मुलगी\s+कुमारी\s+(.{3,100}?)\s+यांना",
    r"यांची\s+मुलगी\s+कुमारी\s+([^\n]{3,80}?)(?:\s+यांना|\s+(?:यांच|शैक्षणिक))",
    r"यांचा\s+मुलगा\s+कुमार\s+([^\n]{3,80}?)(?:\s+यांना|\s+(?:यांच|शैक्षणिक))",
    r"यांचा\s+मुलगा\s+(.{3,100}?)\s+यांना",
    r"यांची\s+मुलगी\s+(.{3,100}?)\s+यांना",
    r"मुलगा\s+(.{3,100}?)\s+यांना",
    r"मुलगी\s+(.{3,100}?)\s+यांना",
];

static STUDENT_NAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STUDENT_NAME_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

/// Financial-year line of the income table, e.g. "२०२३-२०२४ १,००,००० ...".
static YEAR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"२०२[३४५].*?२०२[४५६]?[^\n]{0,100}").expect("valid regex"));

static NUMBER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[०-९0-9,.\-]+").expect("valid regex"));

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[०-९0-9,.\s]+").expect("valid regex"));

/// Share of an amount-in-words' tokens that must appear in the OCR text.
const WORD_MATCH_RATIO: f64 = 0.7;

/// Repair an income certificate in place against its OCR text.
pub fn validate_income_certificate(
    record: &mut IncomeCertificateRecord,
    raw_text: &str,
    report: &mut AnomalyReport,
) {
    // 1. Honorifics
    let parent = record
        .parent_name
        .as_deref()
        .and_then(|name| strip_affixes(name, &PARENT_PREFIX_RE, &PARENT_SUFFIX_RE));
    report.track("parent_name", &record.parent_name, &parent);
    record.parent_name = parent;

    let student = record
        .student_name
        .as_deref()
        .and_then(|name| strip_affixes(name, &STUDENT_PREFIX_RE, &STUDENT_SUFFIX_RE));
    report.track("student_name", &record.student_name, &student);
    record.student_name = student;

    if raw_text.is_empty() {
        return;
    }

    // 2. Student name the model missed
    if record.student_name.is_none() {
        if let Some(name) = recover_student_name(raw_text) {
            report.correction(WarningKind::StudentNameRecovered, name.clone());
            record.student_name = Some(name);
        }
    }

    // 3. Amounts
    let evidence = IncomeEvidence::new(raw_text);
    verify_amount("income_value", &mut record.income_value, &evidence, report);
    for (i, year) in record.income_years.iter_mut().enumerate() {
        let field = format!("income_years[{i}].income_value");
        verify_amount(&field, &mut year.income_value, &evidence, report);
    }

    // 4. Amounts in words
    verify_words("income_in_word", &mut record.income_in_word, raw_text, report);
    for (i, year) in record.income_years.iter_mut().enumerate() {
        let field = format!("income_years[{i}].income_in_words");
        verify_words(&field, &mut year.income_in_words, raw_text, report);
    }

    tracing::info!(
        years = record.income_years.len(),
        has_student = record.student_name.is_some(),
        has_income = record.income_value.is_some()
            || record.income_years.iter().any(|y| y.income_value.is_some()),
        "Income certificate validated"
    );
}

fn strip_affixes(name: &str, prefix: &Regex, suffix: &Regex) -> Option<String> {
    let name = prefix.replace(name, "");
    let name = suffix.replace(&name, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// First acceptable name captured by the ordered student-name patterns.
pub fn recover_student_name(raw_text: &str) -> Option<String> {
    if !STUDENT_INDICATORS.iter().any(|ind| raw_text.contains(ind)) {
        return None;
    }

    for (i, re) in STUDENT_NAME_RES.iter().enumerate() {
        let Some(captured) = re.captures(raw_text).and_then(|c| c.get(1)) else {
            continue;
        };
        let name = STUDENT_PREFIX_RE.replace(captured.as_str().trim(), "");
        let name = RECOVERED_TAIL_RE.replace(&name, "");
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.chars().count() >= 2 && !LONG_DIGIT_RUN_RE.is_match(&name) {
            tracing::debug!(pattern = i + 1, "Student name recovered from text");
            return Some(name);
        }
        tracing::debug!(pattern = i + 1, "Recovered student name rejected");
    }
    None
}

/// Normalised views of the OCR text that income amounts are checked against.
struct IncomeEvidence {
    text: String,
    year_line: Option<String>,
    year_numbers: Vec<String>,
}

impl IncomeEvidence {
    fn new(raw_text: &str) -> Self {
        // OCR reads Devanagari zero as a Latin o.
        let text = normalize_number(&raw_text.replace(['o', 'O'], "०"));

        let year_line = YEAR_LINE_RE.find(raw_text).map(|m| m.as_str());
        let year_numbers = year_line
            .map(|line| {
                NUMBER_TOKEN_RE
                    .find_iter(line)
                    .map(|m| normalize_digits(m.as_str()).replace([',', '.'], ""))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            text,
            year_line: year_line.map(normalize_number),
            year_numbers,
        }
    }

    fn supports(&self, value: &str) -> bool {
        if self.text.contains(value) {
            return true;
        }
        if self.year_line.as_deref().is_some_and(|line| line.contains(value)) {
            return true;
        }
        self.year_numbers.iter().any(|n| fuzzy_number_match(value, n))
    }
}

fn verify_amount(
    field: &str,
    value: &mut Option<String>,
    evidence: &IncomeEvidence,
    report: &mut AnomalyReport,
) {
    let Some(amount) = value.as_deref() else {
        return;
    };
    let normalized = normalize_number(amount);
    if !normalized.is_empty() && evidence.supports(&normalized) {
        return;
    }
    tracing::debug!(field, "Income amount not found in text");
    report.track(field, value, &None);
    *value = None;
}

fn verify_words(
    field: &str,
    value: &mut Option<String>,
    raw_text: &str,
    report: &mut AnomalyReport,
) {
    let Some(words) = value.as_deref() else {
        return;
    };

    let stripped = LEADING_NUMBER_RE.replace(words, "");
    let stripped = stripped.trim();
    let verified =
        (!stripped.is_empty() && words_in_text(stripped, raw_text)).then(|| stripped.to_string());
    report.track(field, value, &verified);
    *value = verified;
}

/// Words of two characters or fewer are not counted on either side of the ratio.
fn words_in_text(words: &str, raw_text: &str) -> bool {
    let significant: Vec<&str> = words
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .collect();
    if significant.is_empty() {
        return false;
    }
    let matches = significant.iter().filter(|w| raw_text.contains(**w)).count();
    matches as f64 >= significant.len() as f64 * WORD_MATCH_RATIO
}
