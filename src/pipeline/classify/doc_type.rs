//! Keyword-rule document type detection from OCR text.
//!
//! Produces the type hint handed to the language model when the OCR engine
//! could not name the document itself. Rules run in a fixed order and the
//! first match wins, so e.g. an Aadhaar card mentioning a bank is still Aadhaar.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::DocumentTypeLabel;

static AADHAAR_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}\s*\d{4}\s*\d{4}").expect("valid regex"));
static PAN_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{5}\d{4}[A-Z]").expect("valid regex"));
static SUBJECT_MARKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(mathematics|english|science|hindi|history|geography|physics|chemistry|biology|economics|commerce|accountancy)\s*[:|\s]\s*\d{1,3}\s*[/|\s]\s*\d{1,3}",
    )
    .expect("valid regex")
});
static MARKS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(marks?\s*obtained|total\s*marks?|maximum\s*marks?)").expect("valid regex")
});
static ACCOUNT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"account\s*no[:\s]*(\d{9,16})").expect("valid regex"));
static IFSC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ifsc[:\s]*[A-Z]{4}[0-9A-Z]{7}").expect("valid regex"));
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹?\s?[0-9०-९,]+").expect("valid regex"));
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9०-९]{4}").expect("valid regex"));
static MULTI_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"  +").expect("valid regex"));

const AADHAAR_INDICATORS: &[&str] = &[
    "government of india",
    "aadhaar",
    "aadhar",
    "आधार",
    "uidai",
    "मेरा आधार",
    "भारत सरकार",
];

const PAN_INDICATORS: &[&str] = &["income tax", "permanent account number", "pan", "आयकर"];

const MARKSHEET_INDICATORS: &[&str] = &[
    "marksheet", "mark sheet", "statement of marks", "marks card", "grade sheet", "transcript",
    "report card", "academic record", "examination", "result", "marks obtained",
    "maximum marks", "total marks", "percentage", "roll number", "roll no", "subject", "grade",
    "cgpa", "gpa", "pass", "fail", "board", "university", "semester", "class", "standard",
];

const PASSPORT_INDICATORS: &[&str] = &["passport", "republic of india", "nationality"];
const DRIVING_LICENSE_INDICATORS: &[&str] = &["driving licence", "driving license", "transport"];
const VOTER_ID_INDICATORS: &[&str] = &["election commission", "elector", "epic"];

const PASSBOOK_INDICATORS: &[&str] = &[
    "state bank of india",
    "state bank of indla",
    "bank",
    "passbook",
    "pass book",
    "pass-book",
    "saving account",
    "state bank",
    "bank of baroda",
    "ifsc",
    "micr",
    "account no",
    "a/c no",
    "account name",
    "branch name",
    "customer id",
    "joint name",
    "nominee",
];

const BANK_STATEMENT_INDICATORS: &[&str] =
    &["bank statement", "account statement", "transaction"];
const UTILITY_BILL_INDICATORS: &[&str] = &["electricity bill", "water bill", "gas bill"];

const INCOME_STRONG_KEYWORDS: &[&str] = &[
    "उत्पन्नाचे प्रमाणपत्र",
    "वर्षासाठी उत्पन्नाचे प्रमाणपत्र",
    "आय प्रमाणपत्र",
    "प्रमाणित करण्यात येते",
    "प्रमाणित किया जाता है",
];

const INCOME_MEDIUM_KEYWORDS: &[&str] = &[
    "उत्पन्न",
    "प्रमाणपत्र",
    "तलाठी",
    "तहसील",
    "जिल्हा",
    "महसूल",
    "अर्जदार",
    "कुटुंब",
];

const INCOME_CERTIFICATE_MIN_SCORE: u32 = 5;

/// Lowercased view plus the original text (some patterns are case-sensitive).
struct Sample<'a> {
    raw: &'a str,
    lower: String,
}

impl Sample<'_> {
    fn hits(&self, indicators: &[&str]) -> usize {
        indicators.iter().filter(|i| self.lower.contains(*i)).count()
    }
}

struct TypeRule {
    label: DocumentTypeLabel,
    matches: fn(&Sample) -> bool,
}

const TYPE_RULES: &[TypeRule] = &[
    TypeRule { label: DocumentTypeLabel::Aadhaar, matches: is_aadhaar },
    TypeRule { label: DocumentTypeLabel::Pan, matches: is_pan },
    TypeRule { label: DocumentTypeLabel::Marksheet, matches: is_marksheet },
    TypeRule { label: DocumentTypeLabel::Passport, matches: is_passport },
    TypeRule { label: DocumentTypeLabel::DrivingLicense, matches: is_driving_license },
    TypeRule { label: DocumentTypeLabel::VoterId, matches: is_voter_id },
    TypeRule { label: DocumentTypeLabel::PassBook, matches: is_passbook },
    TypeRule { label: DocumentTypeLabel::BankStatement, matches: is_bank_statement },
    TypeRule { label: DocumentTypeLabel::UtilityBill, matches: is_utility_bill },
];

fn is_aadhaar(s: &Sample) -> bool {
    s.hits(AADHAAR_INDICATORS) >= 2 && AADHAAR_NUMBER_RE.is_match(s.raw)
}

fn is_pan(s: &Sample) -> bool {
    s.hits(PAN_INDICATORS) >= 2 && PAN_NUMBER_RE.is_match(s.raw)
}

fn is_marksheet(s: &Sample) -> bool {
    s.hits(MARKSHEET_INDICATORS) >= 3
        || (SUBJECT_MARKS_RE.is_match(&s.lower) && MARKS_LABEL_RE.is_match(&s.lower))
}

fn is_passport(s: &Sample) -> bool {
    s.hits(PASSPORT_INDICATORS) >= 2
}

fn is_driving_license(s: &Sample) -> bool {
    s.hits(DRIVING_LICENSE_INDICATORS) >= 2
}

fn is_voter_id(s: &Sample) -> bool {
    s.hits(VOTER_ID_INDICATORS) >= 2
}

fn is_passbook(s: &Sample) -> bool {
    s.hits(PASSBOOK_INDICATORS) >= 1
        || (ACCOUNT_NUMBER_RE.is_match(&s.lower) && IFSC_RE.is_match(s.raw))
}

fn is_bank_statement(s: &Sample) -> bool {
    s.hits(BANK_STATEMENT_INDICATORS) >= 2
        && s.lower.contains("debit")
        && s.lower.contains("credit")
}

fn is_utility_bill(s: &Sample) -> bool {
    s.hits(UTILITY_BILL_INDICATORS) >= 2
}

/// Detect the document type from raw OCR text; `Unknown` when no rule matches.
pub fn detect_document_type(text: &str) -> DocumentTypeLabel {
    if text.trim().is_empty() {
        return DocumentTypeLabel::Unknown;
    }

    let sample = Sample {
        raw: text,
        lower: text.to_lowercase(),
    };

    let label = TYPE_RULES
        .iter()
        .find(|rule| (rule.matches)(&sample))
        .map(|rule| rule.label)
        .unwrap_or(DocumentTypeLabel::Unknown);

    tracing::debug!(document_type = %label, "Detected document type from text");
    label
}

/// Re-attach dependent vowel signs and viramas that a PDF text layer split off
/// with a space, then collapse runs of spaces.
pub fn normalize_devanagari(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' && chars.peek().is_some_and(|next| is_dependent_sign(*next)) {
            continue;
        }
        out.push(c);
    }
    MULTI_SPACE_RE.replace_all(&out, " ").into_owned()
}

fn is_dependent_sign(c: char) -> bool {
    matches!(
        c,
        '\u{0901}'..='\u{0903}' | '\u{093E}'..='\u{094D}'
    )
}

/// Score Devanagari text for income-certificate vocabulary.
///
/// Strong phrases are worth 3, medium words 1, an amount 2 and a year 1;
/// a score of 5 or more is treated as an income certificate.
pub fn income_certificate_score(text: &str) -> u32 {
    if text.trim().chars().count() < 50 {
        return 0;
    }
    let text = normalize_devanagari(text);

    let strong = INCOME_STRONG_KEYWORDS.iter().filter(|k| text.contains(*k)).count() as u32;
    let medium = INCOME_MEDIUM_KEYWORDS.iter().filter(|k| text.contains(*k)).count() as u32;

    let mut score = strong * 3 + medium;
    if AMOUNT_RE.is_match(&text) {
        score += 2;
    }
    if YEAR_RE.is_match(&text) {
        score += 1;
    }
    score
}

pub fn is_income_certificate_text(text: &str) -> bool {
    income_certificate_score(text) >= INCOME_CERTIFICATE_MIN_SCORE
}
