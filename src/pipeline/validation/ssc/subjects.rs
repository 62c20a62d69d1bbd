use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::rules::SscRules;
use crate::models::SubjectRow;

/// Subjects graded with a letter only; their marks are always null.
pub(crate) const GRADE_ONLY_NAMES: &[&str] = &[
    "health & physical education",
    "scouting/guiding",
    "water security",
    "defence studies",
];

pub(crate) fn is_grade_only(name_key: &str) -> bool {
    GRADE_ONLY_NAMES.contains(&name_key)
}

static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.{10,50}?)\s+100\s+0?([0-9]{2,3})(?:\s+([A-Z]))?").expect("valid regex")
});

static TABLE_GRADE_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(HEALTH.*?PHYSICAL|SCOUT.*?GUID|WATER.*?SECURITY|DEFENCE.*?STUD)[A-Z]*(?:\s+EDUCATION)?\s+([A-E])(?:\s|\z)",
    )
    .expect("valid regex")
});

static NAME_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9\s&()]").expect("valid regex"));

static WINDOW_MARKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"100\s+0?([0-9]{2,3})").expect("valid regex"));

/// (keyword, canonical name); `None` means a language subject whose
/// 1st / 2nd-3rd variant is read from the surrounding text.
const FUZZY_KEYWORDS: &[(&str, Option<&str>)] = &[
    ("MATHEMATICS", Some("Mathematics")),
    ("SCIENCE", Some("Science & Technology")),
    ("SOCIAL", Some("Social Sciences")),
    ("MARATHI", None),
    ("HINDI", None),
    ("ENGLISH", None),
    ("SANSKRIT", Some("Sanskrit (2/3 Lang)")),
];

static FUZZY_KEYWORD_RES: LazyLock<Vec<(Regex, &'static str, Option<&'static str>)>> =
    LazyLock::new(|| {
        FUZZY_KEYWORDS
            .iter()
            .map(|&(keyword, canonical)| {
                let re = Regex::new(&format!(r"(?i)\b{keyword}\b")).expect("valid regex");
                (re, keyword, canonical)
            })
            .collect()
    });

const FUZZY_WINDOW_CHARS: usize = 100;

/// Reconstruct the subject table from raw text.
///
/// Strategies run in order and the first to yield at least `min_rows` rows
/// wins; `None` when all of them fall short.
pub fn extract_subjects(
    raw_text: &str,
    rules: &SscRules,
    min_rows: usize,
) -> Option<Vec<SubjectRow>> {
    let strategies: [(&str, &dyn Fn() -> Vec<SubjectRow>); 3] = [
        ("code_position", &|| by_code_position(raw_text, rules)),
        ("table_structure", &|| by_table_structure(raw_text)),
        ("fuzzy_keyword", &|| by_fuzzy_keywords(raw_text)),
    ];

    for (strategy, run) in strategies {
        let rows = run();
        if rows.len() >= min_rows {
            tracing::info!(strategy, rows = rows.len(), "SSC subjects extracted from text");
            return Some(rows);
        }
        tracing::debug!(strategy, rows = rows.len(), "SSC subject strategy fell short");
    }

    tracing::warn!("All SSC subject extraction strategies failed");
    None
}

/// Split the text at each known subject code and read marks or a grade from
/// the segment up to the next code.
pub fn by_code_position(raw_text: &str, rules: &SscRules) -> Vec<SubjectRow> {
    let hits: Vec<(&str, usize, usize)> = rules
        .code_re
        .captures_iter(raw_text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps.get(1)?.as_str(), whole.start(), whole.end()))
        })
        .collect();

    let mut rows = Vec::new();
    for (i, &(code, _, end)) in hits.iter().enumerate() {
        let segment_end = hits.get(i + 1).map_or(raw_text.len(), |next| next.1);
        let segment = raw_text[end..segment_end].trim();

        let Some(name) = rules.subject_for_code(code) else {
            continue;
        };

        if segment.contains("100") {
            let marks = rules
                .marks_re
                .captures(segment)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<i64>().ok());
            if let Some(marks) = marks {
                rows.push(SubjectRow::numeric(name, marks));
            }
        } else if let Some(grade) = rules.grade_re.captures(segment).and_then(|c| c.get(1)) {
            rows.push(SubjectRow::grade_only(name, grade.as_str()));
        }
    }
    rows
}

/// Map OCR text of a subject cell to its canonical name.
pub fn canonical_subject_name(text: &str) -> Option<&'static str> {
    let upper = text.trim().to_uppercase();
    let clean = NAME_NOISE_RE.replace_all(&upper, "");
    let has = |needle: &str| clean.contains(needle);
    let first_language = has("1ST") || has("FIRST") || has("1 LANG");

    let name = if has("MATH") {
        "Mathematics"
    } else if has("SOCIAL") {
        "Social Sciences"
    } else if has("SCIENCE") || has("SCI") || has("TECH") {
        "Science & Technology"
    } else if has("MARATHI") {
        if first_language {
            "Marathi (1st Lang)"
        } else {
            "Marathi (2/3 Lang)"
        }
    } else if has("HINDI") {
        if first_language {
            "Hindi (1st Lang)"
        } else {
            "Hindi (2/3 Lang)"
        }
    } else if has("ENGLISH") {
        if first_language {
            "English (1st Lang)"
        } else {
            "English (2/3 Lang)"
        }
    } else if has("SANSKRIT") {
        "Sanskrit (2/3 Lang)"
    } else if has("HEALTH") || has("PHYSICAL") {
        "Health & Physical Education"
    } else if has("SCOUT") || has("GUID") {
        "Scouting/Guiding"
    } else if has("WATER") || has("SECURITY") {
        "Water Security"
    } else if has("DEFENCE") || has("DEFENSE") {
        "Defence Studies"
    } else {
        return None;
    };
    Some(name)
}

/// Rows shaped `<name> 100 <marks> [grade]` anywhere in the text, plus
/// grade-only subject names followed by a bare letter.
pub fn by_table_structure(raw_text: &str) -> Vec<SubjectRow> {
    let mut rows = Vec::new();

    for caps in TABLE_ROW_RE.captures_iter(raw_text) {
        let (Some(cell), Some(marks)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Ok(marks) = marks.as_str().parse::<i64>() else {
            continue;
        };
        if marks > 100 {
            continue;
        }
        if let Some(name) = canonical_subject_name(cell.as_str()) {
            if !is_grade_only(&name.to_lowercase()) {
                rows.push(SubjectRow::numeric(name, marks));
            }
        }
    }

    for caps in TABLE_GRADE_ONLY_RE.captures_iter(raw_text) {
        let (Some(cell), Some(grade)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Some(name) = canonical_subject_name(cell.as_str()) {
            rows.push(SubjectRow::grade_only(name, &grade.as_str().to_uppercase()));
        }
    }

    rows
}

/// Last resort: find core subject keywords and look for `100 <marks>` shortly after.
pub fn by_fuzzy_keywords(raw_text: &str) -> Vec<SubjectRow> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (re, keyword, canonical) in FUZZY_KEYWORD_RES.iter() {
        for hit in re.find_iter(raw_text) {
            let window: String = raw_text[hit.start()..]
                .chars()
                .take(FUZZY_WINDOW_CHARS)
                .collect();

            let Some(marks) = WINDOW_MARKS_RE
                .captures(&window)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<i64>().ok())
            else {
                continue;
            };
            if marks > 100 {
                continue;
            }

            let name = match canonical {
                Some(name) => (*name).to_string(),
                None => {
                    let upper = window.to_uppercase();
                    let variant = if upper.contains("1ST") || upper.contains("FIRST") {
                        "1st Lang"
                    } else {
                        "2/3 Lang"
                    };
                    format!("{} ({variant})", title_case(keyword))
                }
            };

            if seen.insert(name.to_lowercase()) {
                rows.push(SubjectRow::numeric(&name, marks));
            }
        }
    }

    rows
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::rules::detect_format;
    use super::*;

    const SAMPLE: &str = "\
SECONDARY SCHOOL CERTIFICATE EXAMINATION\n\
SEAT NO M123456\n\
01 MARATHI (1ST LANG) 100 085 EIGHTYFIVE\n\
15 HINDI (2/3 LANG) 100 078 SEVENTYEIGHT\n\
17 ENGLISH (2/3 LANG) 100 081 EIGHTYONE\n\
71 MATHEMATICS 100 090 NINETY\n\
72 SCIENCE & TECHNOLOGY 100 088 EIGHTYEIGHT\n\
73 SOCIAL SCIENCES 100 079 SEVENTYNINE\n\
P1 HEALTH & PHYSICAL EDUCATION    A\n\
P2 SCOUTING/GUIDING B\n";

    #[test]
    fn code_position_reads_numeric_row() {
        let rules = detect_format("");
        let rows = by_code_position("71 MATHEMATICS 100 090 NINETY", rules);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Mathematics");
        assert_eq!(rows[0].marks_obtained, Some(90));
        assert_eq!(rows[0].max_marks, Some(100));
        assert!(rows[0].grade.is_none());
    }

    #[test]
    fn code_position_reads_grade_only_row() {
        let rules = detect_format("");
        let rows = by_code_position("P1 HEALTH & PHYSICAL EDUCATION    A", rules);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Health & Physical Education");
        assert!(rows[0].marks_obtained.is_none());
        assert!(rows[0].max_marks.is_none());
        assert_eq!(rows[0].grade.as_deref(), Some("A"));
    }

    #[test]
    fn code_position_full_table() {
        let rules = detect_format(SAMPLE);
        let rows = by_code_position(SAMPLE, rules);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Marathi (1st Lang)",
                "Hindi (2/3 Lang)",
                "English (2/3 Lang)",
                "Mathematics",
                "Science & Technology",
                "Social Sciences",
                "Health & Physical Education",
                "Scouting/Guiding",
            ]
        );
        assert_eq!(rows[7].grade.as_deref(), Some("B"));
    }

    #[test]
    fn chain_prefers_code_position() {
        let rows = extract_subjects(SAMPLE, detect_format(SAMPLE), 4).unwrap();
        assert_eq!(rows.len(), 8);
    }

    #[test]
    fn canonical_names_follow_priority() {
        assert_eq!(canonical_subject_name("MATHS"), Some("Mathematics"));
        assert_eq!(canonical_subject_name("SOCIAL SCIENCES"), Some("Social Sciences"));
        assert_eq!(canonical_subject_name("SCI & TECH"), Some("Science & Technology"));
        assert_eq!(canonical_subject_name("marathi first lang"), Some("Marathi (1st Lang)"));
        assert_eq!(canonical_subject_name("HINDI"), Some("Hindi (2/3 Lang)"));
        assert_eq!(canonical_subject_name("DEFENSE"), Some("Defence Studies"));
        assert_eq!(canonical_subject_name("DRAWING"), None);
    }

    #[test]
    fn table_structure_without_codes() {
        let text = "\
?? MARATHI (1ST LANG) 100 085 EIGHTYFIVE\n\
?? MATHEMATICS PART 100 090 NINETY\n\
?? SOCIAL SCIENCES 100 079 SEVENTYNINE\n\
?? ENGLISH (2/3 LANG) 100 101 BAD\n\
?? SCOUTING GUIDING A\n";
        let rows = by_table_structure(text);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Marathi (1st Lang)", "Mathematics", "Social Sciences", "Scouting/Guiding"]
        );
        assert_eq!(rows[3].grade.as_deref(), Some("A"));
    }

    #[test]
    fn fuzzy_scan_dedupes_and_detects_language_level() {
        let text = "ENGLISH FIRST LANGUAGE xx 100 071\nMATHEMATICS 100 090\nMATHEMATICS 100 045\nHINDI 100 066";
        let rows = by_fuzzy_keywords(text);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mathematics", "Hindi (2/3 Lang)", "English (1st Lang)"]);
        assert_eq!(rows[0].marks_obtained, Some(90));
    }

    #[test]
    fn chain_fails_below_threshold() {
        assert!(extract_subjects("71 MATHEMATICS 100 090", detect_format(""), 4).is_none());
    }
}
