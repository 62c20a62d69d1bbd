//! Cross-text verification helpers shared by the field validators.
//!
//! Model output is only accepted when it can be found in the OCR text, so
//! these helpers normalise both sides (digit scripts, separators) before
//! looking for literal or near-literal occurrences.

/// Zero code points of the Indic digit blocks OCR engines emit.
const INDIC_ZEROS: &[u32] = &[
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
];

/// Trailing subject-table markers; totals are printed after the last of them.
const TOTALS_MARKERS: &[&str] = &[
    "WATER SECURITY",
    "SCOUTING",
    "HEALTH & PHYSICAL",
    "SOCIAL SCIENCES",
    "DEFENCE STUDIES",
];

fn ascii_digit(c: char) -> Option<char> {
    let cp = c as u32;
    INDIC_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&cp))
        .and_then(|&zero| char::from_digit(cp - zero, 10))
}

/// Map every Indic digit to its ASCII counterpart; other characters are kept.
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

/// Drop grouping separators: `,`, `.` and spaces.
pub fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, ',' | '.' | ' ')).collect()
}

/// Digit-normalised, separator-free form used for numeric comparisons.
pub fn normalize_number(text: &str) -> String {
    strip_separators(&normalize_digits(text))
}

/// Slice of `raw_text` starting at the last trailing-subject marker.
///
/// Falls back to the whole text when no marker is found (or the only hit is
/// at offset 0).
pub fn totals_window(raw_text: &str) -> &str {
    let upper = raw_text.to_ascii_uppercase();
    let start = TOTALS_MARKERS
        .iter()
        .filter_map(|marker| upper.rfind(marker))
        .max()
        .unwrap_or(0);
    if start > 0 {
        &raw_text[start..]
    } else {
        raw_text
    }
}

/// True when `needle` occurs in `haystack` not followed by a digit or a `.`.
pub fn contains_number_literal(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, _)| {
        !matches!(
            haystack[idx + needle.len()..].chars().next(),
            Some(c) if c.is_ascii_digit() || c == '.'
        )
    })
}

/// First `NN.N` / `NN.NN` decimal not embedded in a longer digit run.
pub fn first_two_digit_decimal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    for i in 0..bytes.len() {
        if i > 0 && digit(i - 1) {
            continue;
        }
        if !(digit(i) && digit(i + 1) && bytes.get(i + 2) == Some(&b'.') && digit(i + 3)) {
            continue;
        }
        let end = if digit(i + 4) {
            if digit(i + 5) {
                continue;
            }
            i + 5
        } else {
            i + 4
        };
        if let Ok(value) = text[i..end].parse::<f64>() {
            return Some(value);
        }
    }
    None
}

/// Loose numeric agreement between a normalised value and a normalised
/// candidate from the text: equal, contained either way, or sharing the first
/// five digits. Candidates of three digits or fewer never match.
pub fn fuzzy_number_match(value: &str, candidate: &str) -> bool {
    if candidate.chars().count() <= 3 {
        return false;
    }
    value == candidate
        || candidate.contains(value)
        || value.contains(candidate)
        || prefix5(value) == prefix5(candidate)
}

fn prefix5(s: &str) -> &str {
    match s.char_indices().nth(5) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
