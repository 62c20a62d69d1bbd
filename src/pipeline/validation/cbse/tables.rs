use std::sync::LazyLock;

use regex::Regex;

const CODE_TO_NAME: &[(&str, &str)] = &[
    ("001", "Hindi Course-A"),
    ("002", "Hindi Course-B"),
    ("003", "Urdu Course-A"),
    ("004", "Punjabi"),
    ("005", "Bengali"),
    ("006", "Tamil"),
    ("007", "Telugu"),
    ("008", "Sindhi"),
    ("009", "Marathi"),
    ("010", "Gujarati"),
    ("011", "Manipuri"),
    ("012", "Malayalam"),
    ("013", "Odia"),
    ("014", "Assamese"),
    ("015", "Kannada"),
    ("018", "French"),
    ("019", "German"),
    ("020", "Russian"),
    ("022", "Nepali"),
    ("031", "English Communicative"),
    ("041", "Mathematics Standard"),
    ("241", "Mathematics Basic"),
    ("042", "Science"),
    ("049", "Painting"),
    ("054", "Elements of Book Keeping & Accountancy"),
    ("064", "Home Science"),
    ("065", "Computer Applications"),
    ("066", "Elements of Business"),
    ("067", "Sanskrit"),
    ("084", "English Language & Literature"),
    ("085", "Hindi Course-B"),
    ("086", "Science"),
    ("087", "Social Science"),
    ("119", "Sanskrit (Communicative)"),
    ("122", "Sanskrit"),
    ("165", "Hindi Course-A"),
    ("184", "English Language & Literature"),
    ("402", "Information Technology"),
    ("404", "Artificial Intelligence"),
    ("417", "Artificial Intelligence"),
    ("436", "National Cadet Corps"),
];

/// Ordered (pattern, canonical name) aliases for OCR'd subject names.
const NAME_ALIASES: &[(&str, &str)] = &[
    (r"ENGLISH\s+L(?:NG|ANG(?:UAGE)?)\s*&\s*LIT\.?", "English Language & Literature"),
    (r"ENGLISH\s+COMMUNICATIVE", "English Communicative"),
    (r"ENGLISH", "English Language & Literature"),
    (r"HINDI\s+COURSE[-\s]*A", "Hindi Course-A"),
    (r"HINDI\s+COURSE[-\s]*B", "Hindi Course-B"),
    (r"HINDI", "Hindi Course-A"),
    (r"SANSKRIT\s*\(?COMMUNICATIVE\)?", "Sanskrit (Communicative)"),
    (r"SANSKRIT", "Sanskrit"),
    (r"MATHEMATICS?\s+STANDARD", "Mathematics Standard"),
    (r"MATHEMATICS?\s+BASIC", "Mathematics Basic"),
    (r"MATH(?:EMATICS?)?", "Mathematics Standard"),
    (r"SCIENCE\s*&?\s*TECHNOLOGY", "Science"),
    (r"SCIENCE", "Science"),
    (r"SOCIAL\s+SCIENCE", "Social Science"),
    (r"SST\b", "Social Science"),
    (r"INFORMATION\s+TECHNOLOGY", "Information Technology"),
    (r"IT\b", "Information Technology"),
    (r"ARTIFICIAL\s+INTELLIGENCE", "Artificial Intelligence"),
    (r"COMPUTER\s+APPLICATIONS?", "Computer Applications"),
    (r"HOME\s+SCIENCE", "Home Science"),
    (r"PAINTING", "Painting"),
    (r"FRENCH", "French"),
    (r"GERMAN", "German"),
    (r"URDU", "Urdu Course-A"),
    (r"PUNJABI", "Punjabi"),
    (r"BENGALI", "Bengali"),
    (r"MARATHI", "Marathi"),
    (r"GUJARATI", "Gujarati"),
    (r"KANNADA", "Kannada"),
    (r"TAMIL", "Tamil"),
    (r"TELUGU", "Telugu"),
    (r"MALAYALAM", "Malayalam"),
    (r"ELEMENTS?\s+OF\s+BOOK\s*KEEPING", "Elements of Book Keeping & Accountancy"),
    (r"ELEMENTS?\s+OF\s+BUSINESS", "Elements of Business"),
    (r"(?:NCC|NATIONAL\s+CADET\s+CORPS)", "National Cadet Corps"),
];

struct Alias {
    full: Regex,
    partial: Regex,
    name: &'static str,
}

static ALIASES: LazyLock<Vec<Alias>> = LazyLock::new(|| {
    NAME_ALIASES
        .iter()
        .map(|&(pattern, name)| Alias {
            full: Regex::new(&format!(r"(?i)\A(?:{pattern})\z")).expect("valid regex"),
            partial: Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
            name,
        })
        .collect()
});

/// Co-scholastic subjects graded with a letter only.
const GRADE_ONLY_SUBJECTS: &[&str] = &[
    "national cadet corps",
    "work experience",
    "art education",
    "health & physical education",
    "health and physical education",
];

/// Optional subjects reported separately from the main five.
const ADDITIONAL_CODES: &[&str] = &["402", "404", "417", "049", "064", "065", "066", "054", "436"];

/// Nine-point scale, inclusive bands.
const GRADE_BANDS: &[(i64, i64, &str)] = &[
    (91, 100, "A1"),
    (81, 90, "A2"),
    (71, 80, "B1"),
    (61, 70, "B2"),
    (51, 60, "C1"),
    (41, 50, "C2"),
    (33, 40, "D"),
    (21, 32, "E1"),
    (0, 20, "E2"),
];

const VALID_GRADES: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2", "D", "E1", "E2", "E"];

pub fn is_grade_only(canonical_name: &str) -> bool {
    GRADE_ONLY_SUBJECTS.contains(&canonical_name.to_lowercase().as_str())
}

pub fn is_additional_code(code: &str) -> bool {
    ADDITIONAL_CODES.contains(&code)
}

pub fn is_valid_grade(grade: &str) -> bool {
    VALID_GRADES.contains(&grade)
}

pub fn marks_to_grade(marks: i64) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&marks))
        .map_or("E2", |(_, _, grade)| grade)
}

pub fn grade_band(grade: &str) -> Option<(i64, i64)> {
    GRADE_BANDS
        .iter()
        .find(|(_, _, g)| *g == grade)
        .map(|&(lo, hi, _)| (lo, hi))
}

/// Canonical subject name: code table, then a full alias match, then a
/// partial alias match, then the OCR text title-cased.
pub fn canonical_subject_name(code: Option<&str>, ocr_name: &str) -> String {
    if let Some(name) = code.and_then(|c| CODE_TO_NAME.iter().find(|(k, _)| *k == c)) {
        return name.1.to_string();
    }

    let clean = ocr_name.trim();
    if let Some(alias) = ALIASES.iter().find(|a| a.full.is_match(clean)) {
        return alias.name.to_string();
    }
    if let Some(alias) = ALIASES.iter().find(|a| a.partial.is_match(clean)) {
        return alias.name.to_string();
    }
    title_case(clean)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands_cover_scale() {
        assert_eq!(marks_to_grade(95), "A1");
        assert_eq!(marks_to_grade(81), "A2");
        assert_eq!(marks_to_grade(40), "D");
        assert_eq!(marks_to_grade(0), "E2");
        assert_eq!(marks_to_grade(150), "E2");
        assert_eq!(grade_band("B2"), Some((61, 70)));
        assert_eq!(grade_band("E"), None);
    }

    #[test]
    fn code_table_wins() {
        assert_eq!(canonical_subject_name(Some("087"), "garbled"), "Social Science");
        assert_eq!(canonical_subject_name(Some("417"), ""), "Artificial Intelligence");
    }

    #[test]
    fn full_alias_before_partial() {
        assert_eq!(
            canonical_subject_name(None, "English Lng & Lit."),
            "English Language & Literature"
        );
        assert_eq!(canonical_subject_name(None, "Social Science"), "Social Science");
        assert_eq!(canonical_subject_name(None, "MATHS BASIC"), "Mathematics Standard");
        assert_eq!(canonical_subject_name(None, "MATHEMATICS BASIC"), "Mathematics Basic");
        assert_eq!(canonical_subject_name(Some("999"), "SST"), "Social Science");
    }

    #[test]
    fn unknown_names_are_title_cased() {
        assert_eq!(canonical_subject_name(None, "  WORK EXPERIENCE "), "Work Experience");
        assert_eq!(
            canonical_subject_name(None, "health & physical education"),
            "Health & Physical Education"
        );
    }

    #[test]
    fn canonical_names_are_stable() {
        for name in ["Mathematics Standard", "Science", "Hindi Course-A", "Sanskrit (Communicative)"] {
            assert_eq!(canonical_subject_name(None, name), name);
        }
    }

    #[test]
    fn sets() {
        assert!(is_grade_only("Work Experience"));
        assert!(!is_grade_only("Science"));
        assert!(is_additional_code("402"));
        assert!(!is_additional_code("041"));
        assert!(is_valid_grade("E"));
        assert!(!is_valid_grade("A+"));
    }
}
