use std::sync::LazyLock;

use regex::Regex;

static DEVANAGARI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{0900}-\x{097F}]+").expect("valid regex"));

/// A lowercase-initial word, a TitleCase word or a filler token, and the rest
/// of the final line after it.
static NAME_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:[a-z]\w*|[A-Z][a-z]\w*|\b(?:OR|AND|THE)\b)[^\n]*\n?\z")
        .expect("valid regex")
});

static STUDENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)certify\s+that\s+([A-Z][A-Za-z\s]{4,80}?)\s+Roll\s+No").expect("valid regex")
});

static MOTHER_NAME_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(
            r"(?i)Mother['\x{2019}]?s?\s+Name\s+([A-Z][A-Za-z\s]{1,60}?)(?:\s{2,}|\n|Father|Guardian|Date)",
        )
        .expect("valid regex"),
        Regex::new(r"(?i)Mother['\x{2019}]?s?\s+Name\s+([A-Z][A-Za-z\s]{1,50})")
            .expect("valid regex"),
    ]
});

static FATHER_NAME_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(
            r"(?i)(?:Father|Guardian)['\x{2019}]?s?\s*(?:/\s*(?:Guardian|Father)['\x{2019}]?s?)?\s+Name\s+([A-Z][A-Za-z\s]{1,60}?)(?:\s{2,}|\n|Date|School|\x{091C})",
        )
        .expect("valid regex"),
        Regex::new(r"(?i)(?:Father|Guardian)['\x{2019}]?s?\s+Name\s+([A-Z][A-Za-z\s]{1,60})")
            .expect("valid regex"),
    ]
});

static ROLL_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Roll\s+No\.?\s*[:\-]?\s*([0-9]{7,9})\b").expect("valid regex")
});

static EXAM_YEAR_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)SECONDARY\s+SCHOOL\s+EXAMINATION[,\s]+([0-9]{4})").expect("valid regex"),
        Regex::new(r"(?i)EXAMINATION[,\s]+([0-9]{4})").expect("valid regex"),
    ]
});

static RESULT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bResult\b\s+(PASS|FAIL|COMPARTMENT|ESSENTIAL\s+REPEAT)\b")
        .expect("valid regex")
});

static PASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPASS\b").expect("valid regex"));

static FAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFAIL\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Mother,
    Father,
}

/// Strip Devanagari bleed-through and trailing mixed-case noise, keeping only
/// ALL-CAPS name tokens.
pub fn clean_name(raw: &str) -> String {
    let cleaned = DEVANAGARI_RE.replace_all(raw, " ");
    let cleaned = NAME_NOISE_RE.replace(&cleaned, "");
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().all(|c| c.is_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    Some(re.captures(text)?.get(1)?.as_str())
}

/// Name from "This is to certify that NAME Roll No".
pub fn student_name(raw_text: &str) -> Option<String> {
    let name = clean_name(first_capture(&STUDENT_NAME_RE, raw_text)?);
    (name.chars().count() >= 3).then_some(name)
}

/// Mother's (first token only) or father's/guardian's name.
pub fn parent_name(raw_text: &str, parent: Parent) -> Option<String> {
    let patterns = match parent {
        Parent::Mother => &*MOTHER_NAME_RES,
        Parent::Father => &*FATHER_NAME_RES,
    };

    patterns.iter().find_map(|re| {
        let name = clean_name(first_capture(re, raw_text)?);
        if name.chars().count() < 2 {
            return None;
        }
        match parent {
            Parent::Mother => name.split_whitespace().next().map(str::to_string),
            Parent::Father => Some(name),
        }
    })
}

pub fn roll_number(raw_text: &str) -> Option<String> {
    first_capture(&ROLL_NUMBER_RE, raw_text).map(str::to_string)
}

pub fn exam_year(raw_text: &str) -> Option<String> {
    EXAM_YEAR_RES
        .iter()
        .find_map(|re| first_capture(re, raw_text))
        .map(str::to_string)
}

/// Result from the "Result" line, else any PASS/FAIL token; PASS by default.
pub fn result(raw_text: &str) -> String {
    if let Some(result) = first_capture(&RESULT_LINE_RE, raw_text) {
        return result.trim().to_uppercase();
    }
    if FAIL_RE.is_match(raw_text) && !PASS_RE.is_match(raw_text) {
        return "FAIL".to_string();
    }
    "PASS".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
CENTRAL BOARD OF SECONDARY EDUCATION\n\
SECONDARY SCHOOL EXAMINATION, 2024\n\
This is to certify that RIYA SHARMA Roll No. 12345678\n\
Mother\u{2019}s Name SUNITA DEVI\n\
Father\u{2019}s/Guardian\u{2019}s Name RAJESH KUMAR SHARMA\n\
Date of Birth 01/01/2008\n\
Result PASS\n";

    #[test]
    fn clean_name_strips_bleed_and_noise() {
        assert_eq!(clean_name("RIYA SHARMA रिया शर्मा"), "RIYA SHARMA");
        assert_eq!(clean_name("RAJESH KUMAR School Name here"), "RAJESH KUMAR");
        assert_eq!(clean_name("OM PRAKASH AND SONS"), "OM PRAKASH");
        assert_eq!(clean_name("RIYA"), "RIYA");
        assert_eq!(clean_name("riya sharma"), "");
    }

    #[test]
    fn header_fields() {
        assert_eq!(student_name(HEADER).as_deref(), Some("RIYA SHARMA"));
        assert_eq!(parent_name(HEADER, Parent::Mother).as_deref(), Some("SUNITA"));
        assert_eq!(
            parent_name(HEADER, Parent::Father).as_deref(),
            Some("RAJESH KUMAR SHARMA")
        );
        assert_eq!(roll_number(HEADER).as_deref(), Some("12345678"));
        assert_eq!(exam_year(HEADER).as_deref(), Some("2024"));
        assert_eq!(result(HEADER), "PASS");
    }

    #[test]
    fn result_fallbacks() {
        assert_eq!(result("Result   compartment"), "COMPARTMENT");
        assert_eq!(result("Result ESSENTIAL REPEAT"), "ESSENTIAL REPEAT");
        assert_eq!(result("status FAIL"), "FAIL");
        assert_eq!(result("nothing printed"), "PASS");
    }

    #[test]
    fn missing_fields_are_none() {
        assert!(student_name("no certificate text").is_none());
        assert!(roll_number("Roll No. 12345").is_none());
        assert!(exam_year("no year").is_none());
    }
}
