use crate::models::BoardLabel;

const CBSE_INDICATORS: &[&str] = &[
    "CENTRAL BOARD OF SECONDARY EDUCATION",
    "CBSE",
    "CENTRAL BOARD OF: SECONDARY EDUCATION",
];

const ICSE_INDICATORS: &[&str] = &[
    "COUNCIL FOR THE INDIAN SCHOOL",
    "CISCE",
    "INDIAN SCHOOL CERTIFICATE",
];

const SSC_INDICATORS: &[&str] = &[
    "MAHARASHTRA STATE BOARD",
    "MSBSHSE",
    "MUMBAI DIVISIONAL BOARD",
    "PUNE DIVISIONAL BOARD",
    "NAGPUR DIVISIONAL BOARD",
    "DIVISIONAL BOARD",
];

/// Language-variant suffixes printed only on Maharashtra SSC marksheets.
/// Matched case-sensitively against the raw text.
const SSC_LANGUAGE_MARKERS: &[&str] = &["(1ST LANG)", "(2/3 LANG)"];

/// Detect the marksheet issuing board. Order is fixed: CBSE, then ICSE, then SSC.
pub fn detect_board(raw_text: &str) -> BoardLabel {
    let upper = raw_text.to_uppercase();
    let has_any = |indicators: &[&str]| indicators.iter().any(|i| upper.contains(i));

    let board = if has_any(CBSE_INDICATORS) {
        BoardLabel::Cbse
    } else if has_any(ICSE_INDICATORS) {
        BoardLabel::Icse
    } else if has_any(SSC_INDICATORS)
        || SSC_LANGUAGE_MARKERS.iter().any(|m| raw_text.contains(m))
    {
        BoardLabel::Ssc
    } else {
        BoardLabel::Unknown
    };

    tracing::debug!(board = %board, "Detected marksheet board");
    board
}
