use std::sync::LazyLock;

use regex::Regex;

use super::anomaly::AnomalyReport;
use crate::models::{PassBookRecord, WarningKind};

/// Address-locality words that never occur in a person's name.
const LOCATION_KEYWORDS: &[&str] = &[
    "NAGAR", "COLONY", "STREET", "ROAD", "MARG", "CHAWL", "TOWNSHIP", "AREA", "SOCIETY", "COMPLEX",
    "FLOOR", "BUILDING", "APARTMENT", "CHS", "COMPOUND",
];

/// Names at least this long are rejected when found verbatim in the address.
const ADDRESS_OVERLAP_MIN_CHARS: usize = 11;
const MIN_NAME_CHARS: usize = 4;
const MAX_SPECIAL_CHAR_RATIO: f64 = 0.3;

static SPECIAL_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z\s]").expect("valid regex"));

static GARBAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{5,}|[^A-Za-z\s]{3,}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    LocationKeyword,
    InAddress,
    Corrupted,
}

impl Rejection {
    fn as_str(self) -> &'static str {
        match self {
            Self::LocationKeyword => "location keyword",
            Self::InAddress => "found in address",
            Self::Corrupted => "corrupted",
        }
    }
}

fn rejection(name: &str, address: Option<&str>) -> Option<Rejection> {
    let upper = name.to_uppercase();
    let len = name.chars().count();

    if LOCATION_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        return Some(Rejection::LocationKeyword);
    }

    if len >= ADDRESS_OVERLAP_MIN_CHARS
        && address.is_some_and(|addr| addr.to_uppercase().contains(&upper))
    {
        return Some(Rejection::InAddress);
    }

    let special = SPECIAL_CHAR_RE.find_iter(name).count();
    let ratio = special as f64 / len.max(1) as f64;
    if len < MIN_NAME_CHARS || ratio > MAX_SPECIAL_CHAR_RATIO || GARBAGE_RE.is_match(name) {
        return Some(Rejection::Corrupted);
    }
    None
}

/// Null a passbook parent name that is really an address fragment or OCR garbage.
pub fn validate_passbook(record: &mut PassBookRecord, report: &mut AnomalyReport) {
    let Some(raw) = record.parent_name.as_deref() else {
        return;
    };
    let name = raw.trim().to_string();

    if name.is_empty() {
        report.track("parent_name", &record.parent_name, &None);
        record.parent_name = None;
        return;
    }

    match rejection(&name, record.address.as_deref()) {
        Some(reason) => {
            tracing::debug!(reason = reason.as_str(), "Passbook parent name rejected");
            report.correction(
                WarningKind::ParentNameRejected,
                format!("{name}: {}", reason.as_str()),
            );
            record.parent_name = None;
        }
        None => {
            let trimmed = Some(name);
            report.track("parent_name", &record.parent_name, &trimmed);
            record.parent_name = trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passbook(parent: &str, address: Option<&str>) -> PassBookRecord {
        PassBookRecord {
            account_holder_name: Some("PRIYA DESHMUKH".into()),
            account_number: Some("12345678901".into()),
            parent_name: Some(parent.into()),
            address: address.map(str::to_string),
        }
    }

    fn run(record: &mut PassBookRecord) -> AnomalyReport {
        let mut report = AnomalyReport::new();
        validate_passbook(record, &mut report);
        report
    }

    #[test]
    fn plausible_name_is_kept_and_trimmed() {
        let mut record = passbook("  SURESH DESHMUKH ", Some("12 SHIVAJI NAGAR PUNE"));
        let report = run(&mut record);
        assert_eq!(record.parent_name.as_deref(), Some("SURESH DESHMUKH"));
        assert!(!report.has(WarningKind::ParentNameRejected));
    }

    #[test]
    fn locality_keywords_rejected() {
        for parent in ["Shivaji Nagar", "MG ROAD", "Sai Krupa CHS"] {
            let mut record = passbook(parent, None);
            let report = run(&mut record);
            assert!(record.parent_name.is_none(), "{parent}");
            assert!(report.has(WarningKind::ParentNameRejected));
        }
    }

    #[test]
    fn long_name_found_in_address_rejected() {
        let mut record = passbook("LAXMI PRASAD", Some("Flat 4, Laxmi Prasad, Pune 411001"));
        run(&mut record);
        assert!(record.parent_name.is_none());

        let mut short = passbook("RAM DAS", Some("RAM DAS LANE"));
        run(&mut short);
        assert_eq!(short.parent_name.as_deref(), Some("RAM DAS"));
    }

    #[test]
    fn corrupted_names_rejected() {
        for parent in ["ABC", "A.B.C.D.", "RAJU 123456", "RA#@!JU KUMAR"] {
            let mut record = passbook(parent, None);
            run(&mut record);
            assert!(record.parent_name.is_none(), "{parent}");
        }
    }

    #[test]
    fn blank_name_becomes_null() {
        let mut record = passbook("   ", None);
        let report = run(&mut record);
        assert!(record.parent_name.is_none());
        assert!(report.has(WarningKind::FieldNulled));
    }

    #[test]
    fn revalidation_is_idempotent() {
        let mut record = passbook(" SURESH DESHMUKH", None);
        run(&mut record);
        let first = record.clone();
        let report = run(&mut record);
        assert_eq!(record, first);
        assert!(report.warnings().is_empty());
    }
}
