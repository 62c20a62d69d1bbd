//! State-board (SSC) marksheet repair.
//!
//! The subject table, totals and percentage are always re-derived from the
//! OCR text; model values survive only where the text cannot be parsed.

pub mod rules;
pub mod subjects;
pub mod totals;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::anomaly::AnomalyReport;
use crate::config::PipelineConfig;
use crate::models::{ExtractionMethod, MarksheetRecord, SubjectRow, WarningKind};
use subjects::is_grade_only;

const VALID_GRADE_LETTERS: &[&str] = &["A", "B", "C", "D", "E"];

/// (text marker, canonical subject) for grade-only rows the model tends to drop.
const GRADE_ONLY_INJECTION: &[(&str, &str)] = &[
    ("P1", "Health & Physical Education"),
    ("HEALTH & PHYSICAL", "Health & Physical Education"),
    ("P2", "Scouting/Guiding"),
    ("SCOUTING", "Scouting/Guiding"),
    ("R8", "Water Security"),
    ("WATER SECURITY", "Water Security"),
    ("RB", "Water Security"),
    ("P4", "Defence Studies"),
    ("PA", "Defence Studies"),
    ("P41", "Defence Studies"),
    ("DEFENCE STUDIES", "Defence Studies"),
];

static INJECTION_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    GRADE_ONLY_INJECTION
        .iter()
        .map(|&(marker, name)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(marker))).expect("valid regex");
            (re, name)
        })
        .collect()
});

/// Repair an SSC marksheet in place against its OCR text.
pub fn validate_ssc(
    record: &mut MarksheetRecord,
    raw_text: &str,
    config: &PipelineConfig,
    report: &mut AnomalyReport,
) -> ExtractionMethod {
    // 1. Names
    fix_names(record, report);

    // 2. Subjects
    let rules = rules::detect_format(raw_text);
    let method = match subjects::extract_subjects(raw_text, rules, config.min_subject_rows) {
        Some(rows) => {
            record.subjects = rows;
            ExtractionMethod::Regex
        }
        None => {
            report.anomaly(WarningKind::SubjectExtractionFailed);
            let rows = std::mem::take(&mut record.subjects);
            record.subjects = dedupe_model_subjects(rows, report);
            ExtractionMethod::LlmFallback
        }
    };

    // 3. Per-subject rules
    for subject in &mut record.subjects {
        enforce_subject_shape(subject, report);
    }

    // 4. Grade-only subjects the model dropped
    inject_missing_grade_only(&mut record.subjects, raw_text, report);

    // 5. Totals
    totals::verify_totals(record, raw_text, report);

    // 6. Anomalies
    if rules::possible_format_change(raw_text, rules) {
        report.anomaly(WarningKind::PossibleFormatChange);
    }
    if record.student_name.is_none() {
        report.anomaly(WarningKind::MissingStudentName);
    }
    if record.subjects.len() < config.min_reported_subjects {
        report.anomaly(WarningKind::InsufficientSubjects);
    }
    if record.percentage.is_none() {
        report.anomaly(WarningKind::MissingPercentage);
    }

    tracing::info!(
        method = %method,
        subjects = record.subjects.len(),
        total_max_marks = ?record.total_max_marks,
        total_marks_obtained = ?record.total_marks_obtained,
        percentage = ?record.percentage,
        "SSC marksheet validated"
    );
    method
}

fn fix_names(record: &mut MarksheetRecord, report: &mut AnomalyReport) {
    let mother = record
        .mother_name
        .as_deref()
        .and_then(|name| name.split_whitespace().next())
        .map(str::to_string);
    report.track("mother_name", &record.mother_name, &mother);
    record.mother_name = mother;

    // Marksheets print SURNAME GIVEN FATHER MOTHER; keep the first three.
    let shortened = record.student_name.as_deref().and_then(|name| {
        let words: Vec<&str> = name.split_whitespace().collect();
        (words.len() > 3).then(|| words[..3].join(" "))
    });
    if let Some(student) = shortened {
        let student = Some(student);
        report.track("student_name", &record.student_name, &student);
        record.student_name = student;
    }
}

/// Drop repeated numeric subjects from the model's table, keeping the row
/// with the higher marks. Grade-only rows are never deduplicated.
fn dedupe_model_subjects(rows: Vec<SubjectRow>, report: &mut AnomalyReport) -> Vec<SubjectRow> {
    let mut kept: Vec<SubjectRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = row.name_key();
        if is_grade_only(&key) {
            kept.push(row);
            continue;
        }

        match kept.iter().position(|existing| existing.name_key() == key) {
            Some(idx) => {
                let existing_marks = kept[idx].marks_obtained.unwrap_or(0);
                let marks = row.marks_obtained.unwrap_or(0);
                if marks > existing_marks {
                    report.correction(
                        WarningKind::DuplicateSubjectDropped,
                        format!("{}: kept {marks} over {existing_marks}", row.name),
                    );
                    kept.remove(idx);
                    kept.push(row);
                } else {
                    report.correction(
                        WarningKind::DuplicateSubjectDropped,
                        format!("{}: dropped {marks}", row.name),
                    );
                }
            }
            None => kept.push(row),
        }
    }
    kept
}

/// Grade-only rows carry a letter and no marks; numeric rows carry marks out
/// of 100 and no grade.
fn enforce_subject_shape(subject: &mut SubjectRow, report: &mut AnomalyReport) {
    if is_grade_only(&subject.name_key()) {
        if subject.marks_obtained.is_some() || subject.max_marks.is_some() {
            report.correction(
                WarningKind::FieldCorrected,
                format!("{}: marks removed from grade-only subject", subject.name),
            );
        }
        subject.marks_obtained = None;
        subject.max_marks = None;

        let grade = subject
            .grade
            .as_deref()
            .map(|g| g.trim().to_uppercase())
            .filter(|g| VALID_GRADE_LETTERS.contains(&g.as_str()))
            .unwrap_or_else(|| "A".to_string());
        if subject.grade.as_deref() != Some(grade.as_str()) {
            report.track(&format!("{} grade", subject.name), &subject.grade, &Some(grade.clone()));
        }
        subject.grade = Some(grade);
    } else {
        if subject.grade.is_some() {
            report.track(&format!("{} grade", subject.name), &subject.grade, &None);
        }
        subject.grade = None;
        subject.max_marks = Some(100);
    }
}

fn inject_missing_grade_only(
    subjects: &mut Vec<SubjectRow>,
    raw_text: &str,
    report: &mut AnomalyReport,
) {
    let upper = raw_text.to_uppercase();
    let mut present: HashSet<String> = subjects.iter().map(SubjectRow::name_key).collect();

    for (re, name) in INJECTION_RES.iter() {
        let key = name.to_lowercase();
        if present.contains(&key) || !re.is_match(&upper) {
            continue;
        }
        report.correction(
            WarningKind::GradeOnlySubjectInjected,
            format!("{name} (marker {})", re.as_str()),
        );
        subjects.push(SubjectRow::grade_only(name, "A"));
        present.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKSHEET: &str = "\
MAHARASHTRA STATE BOARD OF SECONDARY AND HIGHER SECONDARY EDUCATION\n\
SECONDARY SCHOOL CERTIFICATE EXAMINATION MARCH 2024\n\
SEAT NO M123456\n\
01 MARATHI (1ST LANG) 100 085 EIGHTYFIVE\n\
15 HINDI (2/3 LANG) 100 078 SEVENTYEIGHT\n\
17 ENGLISH (2/3 LANG) 100 081 EIGHTYONE\n\
71 MATHEMATICS 100 090 NINETY\n\
72 SCIENCE & TECHNOLOGY 100 088 EIGHTYEIGHT\n\
73 SOCIAL SCIENCES 100 079 SEVENTYNINE\n\
P1 HEALTH & PHYSICAL EDUCATION    A\n\
P2 SCOUTING/GUIDING B\n\
TOTAL MARKS 600 501 FIVE HUNDRED ONE\n\
PERCENTAGE 83.50 RESULT PASS\n";

    fn model_record() -> MarksheetRecord {
        MarksheetRecord {
            student_name: Some("YADAV JANVI AJIT SUNITA".into()),
            mother_name: Some("SUNITA AJIT".into()),
            subjects: vec![SubjectRow::numeric("Mathematics", 68)],
            total_max_marks: Some(650),
            total_marks_obtained: Some(501),
            percentage: Some(83.5),
            ..Default::default()
        }
    }

    #[test]
    fn full_marksheet_is_rebuilt_from_text() {
        let mut record = model_record();
        let mut report = AnomalyReport::new();
        let method = validate_ssc(&mut record, MARKSHEET, &PipelineConfig::default(), &mut report);

        assert_eq!(method, ExtractionMethod::Regex);
        assert_eq!(record.student_name.as_deref(), Some("YADAV JANVI AJIT"));
        assert_eq!(record.mother_name.as_deref(), Some("SUNITA"));
        assert_eq!(record.subjects.len(), 8);
        assert_eq!(record.subjects[3].marks_obtained, Some(90));
        assert_eq!(record.total_max_marks, Some(600));
        assert_eq!(record.total_marks_obtained, Some(501));
        assert_eq!(record.percentage, Some(83.5));
        assert!(!report.needs_manual_review(), "{:?}", report.anomaly_names());
    }

    #[test]
    fn short_student_names_are_left_alone() {
        let mut record = MarksheetRecord {
            student_name: Some("YADAV  JANVI AJIT".into()),
            mother_name: Some("SUNITA".into()),
            ..Default::default()
        };
        let mut report = AnomalyReport::new();
        fix_names(&mut record, &mut report);
        assert_eq!(record.student_name.as_deref(), Some("YADAV  JANVI AJIT"));
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn revalidation_is_idempotent() {
        let mut record = model_record();
        let config = PipelineConfig::default();
        validate_ssc(&mut record, MARKSHEET, &config, &mut AnomalyReport::new());
        let first = record.clone();
        validate_ssc(&mut record, MARKSHEET, &config, &mut AnomalyReport::new());
        assert_eq!(record, first);
    }

    #[test]
    fn fallback_dedupes_and_shapes_model_subjects() {
        let mut record = MarksheetRecord {
            student_name: Some("RAVI".into()),
            subjects: vec![
                SubjectRow::numeric("Mathematics", 70),
                SubjectRow::numeric("mathematics ", 85),
                SubjectRow::numeric("Science & Technology", 60),
                SubjectRow {
                    grade: Some("B2".into()),
                    ..SubjectRow::numeric("Health & Physical Education", 40)
                },
                SubjectRow {
                    grade: Some("A1".into()),
                    ..SubjectRow::numeric("Social Sciences", 91)
                },
            ],
            ..Default::default()
        };
        let mut report = AnomalyReport::new();
        let method = validate_ssc(
            &mut record,
            "illegible text",
            &PipelineConfig::default(),
            &mut report,
        );

        assert_eq!(method, ExtractionMethod::LlmFallback);
        let names: Vec<_> = record.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "mathematics ",
                "Science & Technology",
                "Health & Physical Education",
                "Social Sciences"
            ]
        );
        assert_eq!(record.subjects[0].marks_obtained, Some(85));

        let hpe = &record.subjects[2];
        assert!(hpe.marks_obtained.is_none() && hpe.max_marks.is_none());
        assert_eq!(hpe.grade.as_deref(), Some("A"));
        assert!(record.subjects[3].grade.is_none());
        assert_eq!(record.subjects[3].max_marks, Some(100));

        assert!(report.has(WarningKind::SubjectExtractionFailed));
        assert!(report.has(WarningKind::InsufficientSubjects));
        assert!(report.has(WarningKind::MissingPercentage));
        assert!(report.has(WarningKind::PossibleFormatChange));
        assert!(report.has(WarningKind::DuplicateSubjectDropped));
        assert!(!report.has(WarningKind::MissingStudentName));
    }

    #[test]
    fn dropped_grade_only_subjects_are_injected() {
        let mut subjects = vec![SubjectRow::numeric("Mathematics", 90)];
        let mut report = AnomalyReport::new();
        inject_missing_grade_only(
            &mut subjects,
            "R8 water security A\nP41 Defence Studies B\nPA extra",
            &mut report,
        );
        let names: Vec<_> = subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Mathematics", "Water Security", "Defence Studies"]);
        assert!(subjects[1..].iter().all(|s| s.grade.as_deref() == Some("A")));
        assert_eq!(
            report
                .warnings()
                .iter()
                .filter(|w| w.kind == WarningKind::GradeOnlySubjectInjected)
                .count(),
            2
        );
    }

    #[test]
    fn total_max_marks_never_outside_valid_set() {
        for (text, model) in [
            ("TOTAL 450 400", Some(450)),
            ("SOCIAL SCIENCES\nTOTAL 500 420 84.00", Some(500)),
            ("no totals", Some(600)),
        ] {
            let mut record = MarksheetRecord {
                total_max_marks: model,
                ..Default::default()
            };
            validate_ssc(&mut record, text, &PipelineConfig::default(), &mut AnomalyReport::new());
            assert!(matches!(record.total_max_marks, None | Some(400) | Some(500) | Some(600)));
        }
    }
}
