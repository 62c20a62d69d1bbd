use std::sync::LazyLock;

use regex::Regex;

/// Printed subject code → canonical subject name, including OCR variants of
/// the codes ("72:", "725") and alternate codes of grade-only subjects.
const CODE_MAP: &[(&str, &str)] = &[
    ("01", "Marathi (1st Lang)"),
    ("02", "Hindi (1st Lang)"),
    ("03", "English (1st Lang)"),
    ("71", "Mathematics"),
    ("72", "Science & Technology"),
    ("73", "Social Sciences"),
    ("15", "Hindi (2/3 Lang)"),
    ("16", "Marathi (2/3 Lang)"),
    ("17", "English (2/3 Lang)"),
    ("27", "Sanskrit (2/3 Lang)"),
    ("72:", "Science & Technology"),
    ("725", "Science & Technology"),
    ("73:", "Social Sciences"),
    ("151", "Hindi (2/3 Lang)"),
    ("P1", "Health & Physical Education"),
    ("P2", "Scouting/Guiding"),
    ("P4", "Defence Studies"),
    ("P41", "Defence Studies"),
    ("PA", "Defence Studies"),
    ("R8", "Water Security"),
    ("RB", "Water Security"),
];

const V2_INDICATORS: &[&str] = &[
    "ACADEMIC YEAR 2025",
    "REVISED MARKSHEET",
    "FORMAT VERSION 2",
    "NEW PATTERN",
];

const KNOWN_LAYOUT_MARKERS: &[&str] = &["SOCIAL SCIENCES", "MATHEMATICS", "SEAT NO", "SEAT NUMBER"];

static SUSPICIOUS_FORMAT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"FORMAT\s+VERSION\s+[2-9]",
        r"REVISED\s+MARK",
        r"NEW\s+PATTERN",
        r"UPDATED\s+FORMAT",
        r"\b20(2[5-9]|[3-9][0-9])\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1,
    /// Detection hook for a future layout; shares the v1 code table.
    V2,
}

/// Pattern set for one SSC marksheet layout.
#[derive(Debug)]
pub struct SscRules {
    pub version: FormatVersion,
    /// Group 1 is the subject code.
    pub code_re: Regex,
    /// Group 1 is the marks obtained.
    pub marks_re: Regex,
    /// Group 1 is the grade letter.
    pub grade_re: Regex,
}

impl SscRules {
    fn build(version: FormatVersion, code: &str, marks: &str, grade: &str) -> Self {
        let alternation = CODE_MAP
            .iter()
            .map(|(code, _)| regex::escape(code))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            version,
            code_re: Regex::new(&code.replace("{codes}", &alternation)).expect("valid regex"),
            marks_re: Regex::new(marks).expect("valid regex"),
            grade_re: Regex::new(grade).expect("valid regex"),
        }
    }

    /// Canonical subject for a printed code; colon and stray-'5' OCR variants
    /// fall back to the cleaned code.
    pub fn subject_for_code(&self, code: &str) -> Option<&'static str> {
        lookup(code).or_else(|| lookup(&code.replace(':', "").replace('5', "")))
    }

    pub fn code_hits(&self, raw_text: &str) -> usize {
        self.code_re.find_iter(raw_text).count()
    }
}

fn lookup(code: &str) -> Option<&'static str> {
    CODE_MAP
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

static RULES_V1: LazyLock<SscRules> = LazyLock::new(|| {
    SscRules::build(
        FormatVersion::V1,
        r"\b({codes})\s+",
        r"100\s+0?([0-9]{2,3})\s+([A-Z]+)",
        r"([A-E])(?:\s|\z|[^A-Z])",
    )
});

static RULES_V2: LazyLock<SscRules> = LazyLock::new(|| {
    SscRules::build(
        FormatVersion::V2,
        r"(?:Code|CODE):\s*({codes})",
        r"Marks:\s*([0-9]{2,3})/100",
        r"Grade:\s*([A-E])",
    )
});

/// Pick the rule set for this marksheet's layout.
pub fn detect_format(raw_text: &str) -> &'static SscRules {
    let upper = raw_text.to_uppercase();

    if let Some(indicator) = V2_INDICATORS.iter().find(|i| upper.contains(*i)) {
        tracing::debug!(indicator, "SSC format v2 detected");
        return &RULES_V2;
    }

    tracing::debug!("Using SSC format v1");
    &RULES_V1
}

/// Heuristic for a layout these rules may no longer fit: suspicious
/// revision phrases or future years, too few known markers, or too few
/// subject codes.
pub fn possible_format_change(raw_text: &str, rules: &SscRules) -> bool {
    let upper = raw_text.to_uppercase();

    if SUSPICIOUS_FORMAT_RES.iter().any(|re| re.is_match(&upper)) {
        return true;
    }

    let markers = KNOWN_LAYOUT_MARKERS
        .iter()
        .filter(|m| upper.contains(*m))
        .count();
    if markers < 2 {
        return true;
    }

    rules.code_hits(raw_text) < 3
}
