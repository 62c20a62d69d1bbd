//! Script and gibberish classification for primary OCR output.
//!
//! Decides whether the primary (English) OCR text is usable or whether the
//! document should be re-read by the alternate (Devanagari) OCR channel.
//! Marksheets are always kept on the primary channel. The checks run as an
//! ordered rule list; the first rule that fires decides the verdict.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Marksheet vocabulary, matched as substrings of the lowercased text.
const MARKSHEET_KEYWORDS: &[&str] = &[
    "statement of marks",
    "secondary school certificate",
    "certificate examination",
    "seat no",
    "centre no",
    "month & year of exam",
    "subject name",
    "marks obtained",
    "marks in figures",
    "marks in words",
    "mathematics",
    "science",
    "english",
    "marathi",
    "hindi",
    "social sciences",
    "ssc",
    "hsc",
];

const MARKSHEET_MIN_HITS: usize = 3;

/// Words typical of bank/financial documents; enough of them means "real document".
const FINANCIAL_KEYWORDS: &[&str] = &[
    "bank", "account", "name", "address", "branch", "code", "number", "customer", "date",
    "mobile", "email", "ifsc", "micr", "nominee", "occupation", "student", "manager",
    "details", "contact", "mumbai", "maharashtra", "india", "canara", "opened", "building",
    "floor",
];

const COMMON_WORDS: &[&str] = &[
    "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can", "this",
    "that", "these", "those", "and", "or", "but", "if", "because", "of", "at", "by", "for",
    "with", "about", "to", "from", "in", "on", "off",
];

/// Tokens the English OCR engine produces when it reads Marathi/Hindi script.
const DEVANAGARI_OCR_ARTIFACTS: &[&str] = &[
    "THIOT", "REUIR", "foleel", "Ridle", "mocal", "HGRIa", "JUCR", "HPIFT", "fholdd", "gyfa",
    "Vobdet", "chFIG4aiCI", "yuda", "yiarra", "aypfias", "VIUITT", "prIdt", "gradt", "3TET",
    "3TEIRIGR", "gefle", "asardo", "shHich", "gAo", "dethes", "CRUIIT", "geitldleryald",
    "fucerferprta", "Meeldsiferbr", "pRloe", "Rasooce", "Saat", "Rasta", "Guruji", "chooece",
    "GrTgqut", "HGRAT", "GrGOT", "chFIG", "yarda",
];

const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

static ENGLISH_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("valid regex"));
static DIGIT_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]+[a-zA-Z]+|[a-zA-Z]+[0-9]+)\b").expect("valid regex")
});
static CAPS_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]+\b").expect("valid regex"));
static SINGLE_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]\b").expect("valid regex"));

/// Outcome of script classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptVerdict {
    pub is_marksheet: bool,
    pub needs_alternate_ocr: bool,
    /// Name of the rule that decided the verdict, for logging.
    pub rule: &'static str,
}

/// Precomputed token statistics shared by all rules.
struct TextProfile<'a> {
    text: &'a str,
    lower: String,
    char_count: usize,
    /// Alphabetic words of 3+ letters.
    words: Vec<&'a str>,
    unique_words: HashSet<String>,
    /// Whitespace-separated tokens.
    token_count: usize,
}

impl<'a> TextProfile<'a> {
    fn new(raw: &'a str) -> Self {
        let text = raw.trim();
        let words: Vec<&str> = ENGLISH_WORD_RE.find_iter(text).map(|m| m.as_str()).collect();
        let unique_words = words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            text,
            lower: text.to_lowercase(),
            char_count: text.chars().count(),
            words,
            unique_words,
            token_count: text.split_whitespace().count(),
        }
    }

    fn per_token(&self, count: usize) -> f64 {
        count as f64 / self.token_count.max(1) as f64
    }

    fn per_word(&self, count: usize) -> f64 {
        count as f64 / self.words.len().max(1) as f64
    }
}

struct Rule {
    name: &'static str,
    needs_alternate_ocr: bool,
    fires: fn(&TextProfile) -> bool,
}

/// Evaluated top-down; the first rule whose predicate fires decides.
const RULES: &[Rule] = &[
    Rule { name: "too_short", needs_alternate_ocr: true, fires: too_short },
    Rule { name: "devanagari_ratio", needs_alternate_ocr: true, fires: devanagari_heavy },
    Rule { name: "too_few_words", needs_alternate_ocr: true, fires: too_few_words },
    Rule { name: "ocr_artifacts", needs_alternate_ocr: true, fires: has_ocr_artifacts },
    Rule { name: "digit_letter_mixing", needs_alternate_ocr: true, fires: digit_letter_mixing },
    Rule { name: "financial_keywords", needs_alternate_ocr: false, fires: financial_document },
    Rule { name: "too_few_common_words", needs_alternate_ocr: true, fires: too_few_common_words },
    Rule { name: "unusual_capitals", needs_alternate_ocr: true, fires: unusual_capitals },
    Rule { name: "consonant_clusters", needs_alternate_ocr: true, fires: consonant_clusters },
    Rule { name: "single_letters", needs_alternate_ocr: true, fires: scattered_single_letters },
    Rule { name: "word_length", needs_alternate_ocr: true, fires: odd_word_length },
];

fn too_short(p: &TextProfile) -> bool {
    p.char_count < 50
}

fn devanagari_heavy(p: &TextProfile) -> bool {
    devanagari_count(p.text) as f64 / p.char_count as f64 > 0.05
}

fn too_few_words(p: &TextProfile) -> bool {
    p.words.len() < 20
}

fn has_ocr_artifacts(p: &TextProfile) -> bool {
    DEVANAGARI_OCR_ARTIFACTS
        .iter()
        .filter(|a| p.text.contains(*a))
        .count()
        >= 3
}

fn digit_letter_mixing(p: &TextProfile) -> bool {
    p.per_token(DIGIT_LETTER_RE.find_iter(p.text).count()) > 0.25
}

fn financial_document(p: &TextProfile) -> bool {
    distinct_hits(p, FINANCIAL_KEYWORDS) >= 3
}

fn too_few_common_words(p: &TextProfile) -> bool {
    distinct_hits(p, COMMON_WORDS) < 5
}

// Long ALL-CAPS runs outside the dictionaries are a gibberish signal; short acronyms are not.
fn unusual_capitals(p: &TextProfile) -> bool {
    let unusual = CAPS_WORD_RE
        .find_iter(p.text)
        .map(|m| m.as_str())
        .filter(|w| w.len() > 4 && !is_dictionary_word(&w.to_lowercase()))
        .count();
    p.per_word(unusual) > 0.20
}

fn consonant_clusters(p: &TextProfile) -> bool {
    let clustered = p.words.iter().filter(|w| max_consonant_run(w) >= 5).count();
    p.per_word(clustered) > 0.30
}

fn scattered_single_letters(p: &TextProfile) -> bool {
    p.per_token(SINGLE_LETTER_RE.find_iter(p.text).count()) > 0.15
}

fn odd_word_length(p: &TextProfile) -> bool {
    let total: usize = p.words.iter().map(|w| w.len()).sum();
    let avg = total as f64 / p.words.len().max(1) as f64;
    !(2.5..=12.0).contains(&avg)
}

fn distinct_hits(p: &TextProfile, vocabulary: &[&str]) -> usize {
    vocabulary
        .iter()
        .filter(|k| p.unique_words.contains(**k))
        .count()
}

/// Count marksheet vocabulary hits in the text.
pub fn marksheet_keyword_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    count_marksheet_hits(&lower)
}

fn count_marksheet_hits(lower: &str) -> usize {
    MARKSHEET_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

pub fn is_marksheet(text: &str) -> bool {
    marksheet_keyword_hits(text) >= MARKSHEET_MIN_HITS
}

/// Classify primary OCR text. Pure; choosing the OCR engine is the caller's job.
pub fn classify_script(text: &str) -> ScriptVerdict {
    let profile = TextProfile::new(text);

    let hits = count_marksheet_hits(&profile.lower);
    if hits >= MARKSHEET_MIN_HITS {
        tracing::debug!(hits, "Marksheet vocabulary detected, keeping primary OCR");
        return ScriptVerdict {
            is_marksheet: true,
            needs_alternate_ocr: false,
            rule: "marksheet",
        };
    }

    let (name, needs_alternate_ocr) = RULES
        .iter()
        .find(|rule| (rule.fires)(&profile))
        .map(|rule| (rule.name, rule.needs_alternate_ocr))
        .unwrap_or(("clean_english", false));

    tracing::debug!(
        rule = name,
        needs_alternate_ocr,
        chars = profile.char_count,
        words = profile.words.len(),
        "Script classification"
    );

    ScriptVerdict {
        is_marksheet: false,
        needs_alternate_ocr,
        rule: name,
    }
}

fn devanagari_count(text: &str) -> usize {
    text.chars()
        .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
        .count()
}

fn is_dictionary_word(lower: &str) -> bool {
    COMMON_WORDS.contains(&lower) || FINANCIAL_KEYWORDS.contains(&lower)
}

fn max_consonant_run(word: &str) -> usize {
    let mut run = 0;
    let mut longest = 0;
    for c in word.chars().flat_map(char::to_lowercase) {
        if CONSONANTS.contains(c) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}
