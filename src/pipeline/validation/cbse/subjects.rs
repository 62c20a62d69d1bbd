use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::tables::{
    canonical_subject_name, is_additional_code, is_grade_only, is_valid_grade, marks_to_grade,
};
use crate::models::SubjectRow;

/// Code, name, theory, internal, total, total in words, grade.
static FULL_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]{3})\s+((?:[A-Z][A-Z0-9\s&./:'\(\)\-]+?)+?)\s+([0-9]{2,3})\s+([0-9]{2,3})\s+([0-9]{2,3})\s+([A-Z][A-Z\s]+?)\s+(A1|A2|B1|B2|C1|C2|D|E1|E2|E)\b",
    )
    .expect("valid regex")
});

/// Code, name, total, total in words, grade.
static TOTAL_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]{3})\s+((?:[A-Z][A-Z0-9\s&./:'\(\)\-]+?)+?)\s+([0-9]{2,3})\s+([A-Z][A-Z\s]+?)\s+(A1|A2|B1|B2|C1|C2|D|E1|E2|E)\b",
    )
    .expect("valid regex")
});

/// Code, name, grade (co-scholastic).
static GRADE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]{3})\s+((?:[A-Z][A-Z0-9\s&./:'\(\)\-]+?)+?)\s+(A\+?|B\+?|C\+?|[A-E])\b")
        .expect("valid regex")
});

static ADDITIONAL_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ADDITIONAL\s+SUBJECT").expect("valid regex"));

fn group<'t>(caps: &regex::Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn group_int(caps: &regex::Captures<'_>, i: usize) -> Option<i64> {
    group(caps, i).parse().ok()
}

fn scored_row(
    code: &str,
    name_raw: &str,
    total: Option<i64>,
    grade: &str,
    additional_section: bool,
) -> SubjectRow {
    let grade = grade.to_uppercase();
    let grade = if is_valid_grade(&grade) {
        grade
    } else {
        marks_to_grade(total.unwrap_or(0)).to_string()
    };
    SubjectRow {
        code: Some(code.to_string()),
        name: canonical_subject_name(Some(code), name_raw.trim()),
        marks_obtained: total,
        max_marks: Some(100),
        grade: Some(grade),
        is_additional: additional_section || is_additional_code(code),
        ..SubjectRow::default()
    }
}

/// Parse one trimmed line into a subject row, trying the full, total-only and
/// grade-only shapes in that order. The first shape that matches decides the
/// line: a repeated code or a graded row that is not co-scholastic drops it.
fn parse_line(
    line: &str,
    seen_codes: &mut HashSet<String>,
    additional_section: bool,
) -> Option<SubjectRow> {
    if let Some(caps) = FULL_ROW_RE.captures(line) {
        let code = group(&caps, 1);
        if !seen_codes.insert(code.to_string()) {
            return None;
        }
        let mut row = scored_row(
            code,
            group(&caps, 2),
            group_int(&caps, 5),
            group(&caps, 7),
            additional_section,
        );
        row.theory_marks = group_int(&caps, 3);
        row.internal_marks = group_int(&caps, 4);
        return Some(row);
    }

    if let Some(caps) = TOTAL_ROW_RE.captures(line) {
        let code = group(&caps, 1);
        if !seen_codes.insert(code.to_string()) {
            return None;
        }
        return Some(scored_row(
            code,
            group(&caps, 2),
            group_int(&caps, 3),
            group(&caps, 5),
            additional_section,
        ));
    }

    if let Some(caps) = GRADE_ROW_RE.captures(line) {
        let code = group(&caps, 1);
        let name = canonical_subject_name(Some(code), group(&caps, 2).trim());
        if !is_grade_only(&name) || !seen_codes.insert(code.to_string()) {
            return None;
        }
        return Some(SubjectRow {
            code: Some(code.to_string()),
            is_additional: true,
            ..SubjectRow::grade_only(&name, &group(&caps, 3).to_uppercase())
        });
    }

    None
}

/// Parse subject rows line by line from the OCR text.
///
/// An "ADDITIONAL SUBJECT" header flags every later row as additional.
/// `None` when fewer than `min_rows` rows were found.
pub fn extract_subjects(raw_text: &str, min_rows: usize) -> Option<Vec<SubjectRow>> {
    let mut rows = Vec::new();
    let mut seen_codes = HashSet::new();
    let mut additional_section = false;

    for line in raw_text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        if ADDITIONAL_HEADER_RE.is_match(line) {
            additional_section = true;
            continue;
        }
        if let Some(row) = parse_line(line, &mut seen_codes, additional_section) {
            rows.push(row);
        }
    }

    if rows.len() >= min_rows {
        tracing::info!(rows = rows.len(), "CBSE subjects parsed from text");
        Some(rows)
    } else {
        tracing::debug!(rows = rows.len(), "Too few CBSE subject rows in text");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
SUB CODE SUBJECT THEORY IA TOTAL IN WORDS GRADE\n\
184 ENGLISH LNG & LIT. 075 020 095 NINETY FIVE A1\n\
002 HINDI COURSE-B 070 019 089 EIGHTY NINE A2\n\
041 MATHEMATICS STANDARD 060 020 080 EIGHTY B1\n\
086 SCIENCE 068 020 088 EIGHTY EIGHT A2\n\
087 SOCIAL SCIENCE 072 020 092 NINETY TWO A1\n\
ADDITIONAL SUBJECT\n\
402 INFORMATION TECHNOLOGY 050 050 100 HUNDRED A1\n\
500 WORK EXPERIENCE A\n\
502 HEALTH & PHYSICAL EDUCATION A\n";

    #[test]
    fn parses_full_rows_and_sections() {
        let rows = extract_subjects(TABLE, 4).unwrap();
        assert_eq!(rows.len(), 8);

        let english = &rows[0];
        assert_eq!(english.code.as_deref(), Some("184"));
        assert_eq!(english.name, "English Language & Literature");
        assert_eq!(english.theory_marks, Some(75));
        assert_eq!(english.internal_marks, Some(20));
        assert_eq!(english.marks_obtained, Some(95));
        assert_eq!(english.grade.as_deref(), Some("A1"));
        assert!(!english.is_additional);

        assert_eq!(rows[5].name, "Information Technology");
        assert!(rows[5].is_additional);

        let work = &rows[6];
        assert_eq!(work.name, "Work Experience");
        assert!(work.marks_obtained.is_none());
        assert_eq!(work.grade.as_deref(), Some("A"));
        assert!(work.is_additional);
    }

    #[test]
    fn total_only_rows() {
        let text = "041 MATHEMATICS 080 EIGHTY B1\n086 SCIENCE 088 EIGHTY EIGHT A2\n087 SOCIAL SCIENCE 092 NINETY TWO A1\n184 ENGLISH 095 NINETY FIVE A1";
        let rows = extract_subjects(text, 4).unwrap();
        assert_eq!(rows[0].name, "Mathematics Standard");
        assert_eq!(rows[0].marks_obtained, Some(80));
        assert!(rows[0].theory_marks.is_none());
    }

    #[test]
    fn repeated_codes_and_scholastic_grade_rows_skipped() {
        let mut seen = HashSet::new();
        assert!(parse_line("041 MATHEMATICS 080 EIGHTY B1", &mut seen, false).is_some());
        assert!(parse_line("041 MATHEMATICS 081 EIGHTY ONE A2", &mut seen, false).is_none());
        assert!(parse_line("086 SCIENCE B", &mut seen, false).is_none());
        assert!(!seen.contains("086"));
        assert!(parse_line("no row here", &mut seen, false).is_none());
    }

    #[test]
    fn too_few_rows_is_none() {
        assert!(extract_subjects("041 MATHEMATICS 080 EIGHTY B1", 4).is_none());
    }
}
