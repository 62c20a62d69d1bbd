//! CBSE Class 10 marksheet repair.
//!
//! Scalars are re-read from the certificate wording, the subject table is
//! parsed line by line, and optional subjects are split out into
//! `additional_subjects`. Totals, percentage and date of birth are not
//! printed on CBSE marksheets and are always null.

pub mod fields;
pub mod subjects;
pub mod tables;

use std::collections::HashSet;

use super::anomaly::AnomalyReport;
use crate::config::PipelineConfig;
use crate::models::{ExtractionMethod, MarksheetRecord, SubjectRow, WarningKind};
use fields::Parent;
use tables::{canonical_subject_name, grade_band, is_additional_code, is_grade_only, is_valid_grade, marks_to_grade};

pub const BOARD_NAME: &str = "CBSE";

/// Repair a CBSE marksheet in place against its OCR text.
pub fn validate_cbse(
    record: &mut MarksheetRecord,
    raw_text: &str,
    config: &PipelineConfig,
    report: &mut AnomalyReport,
) -> ExtractionMethod {
    // 1. Scalar fields
    fix_scalars(record, raw_text, report);

    // 2. Fields not printed on CBSE marksheets
    for (field, value) in [
        ("total_marks_obtained", record.total_marks_obtained.take()),
        ("total_max_marks", record.total_max_marks.take()),
    ] {
        report.track(field, &value, &None);
    }
    report.track("percentage", &record.percentage.take(), &None);
    report.track("date_of_birth", &record.date_of_birth.take(), &None);

    // 3. Subjects
    let method = match subjects::extract_subjects(raw_text, config.min_subject_rows) {
        Some(rows) => {
            record.subjects = rows;
            ExtractionMethod::Regex
        }
        None => {
            report.anomaly(WarningKind::SubjectExtractionFailed);
            let mut rows = std::mem::take(&mut record.subjects);
            rows.extend(record.additional_subjects.take().into_iter().flatten().map(|mut row| {
                row.is_additional = true;
                row
            }));
            record.subjects = clean_model_subjects(rows, report);
            ExtractionMethod::LlmFallback
        }
    };

    // 4. Main vs additional
    let (additional, main): (Vec<_>, Vec<_>) = std::mem::take(&mut record.subjects)
        .into_iter()
        .partition(|row| row.is_additional || is_additional_code(row.code_str()));
    record.subjects = main;
    record.additional_subjects = Some(additional);

    if record.student_name.is_none() {
        report.anomaly(WarningKind::MissingStudentName);
    }

    tracing::info!(
        method = %method,
        subjects = record.subjects.len(),
        additional = record.additional_subjects.as_ref().map_or(0, Vec::len),
        result = ?record.result,
        "CBSE marksheet validated"
    );
    method
}

fn fix_scalars(record: &mut MarksheetRecord, raw_text: &str, report: &mut AnomalyReport) {
    let student = fields::student_name(raw_text).or_else(|| {
        let cleaned = fields::clean_name(record.student_name.as_deref().unwrap_or(""));
        (!cleaned.is_empty()).then_some(cleaned)
    });
    report.track("student_name", &record.student_name, &student);
    record.student_name = student;

    let mother = fields::parent_name(raw_text, Parent::Mother).or_else(|| {
        fields::clean_name(record.mother_name.as_deref().unwrap_or(""))
            .split_whitespace()
            .next()
            .map(str::to_string)
    });
    report.track("mother_name", &record.mother_name, &mother);
    record.mother_name = mother;

    let father = fields::parent_name(raw_text, Parent::Father).or_else(|| {
        let cleaned = fields::clean_name(record.father_name.as_deref().unwrap_or(""));
        (!cleaned.is_empty()).then_some(cleaned)
    });
    report.track("father_name", &record.father_name, &father);
    record.father_name = father;

    if let Some(roll) = fields::roll_number(raw_text) {
        report.track("roll_number", &record.roll_number, &Some(roll.clone()));
        record.roll_number = Some(roll);
    }

    if let Some(year) = fields::exam_year(raw_text) {
        report.track("exam_year", &record.exam_year, &Some(year.clone()));
        record.exam_year = Some(year);
    }

    let result = Some(fields::result(raw_text));
    report.track("result", &record.result, &result);
    record.result = result;

    let board = Some(BOARD_NAME.to_string());
    report.track("board", &record.board, &board);
    record.board = board;
}

/// Canonicalise and deduplicate the model's subject rows (first occurrence
/// wins) and make marks and grades agree.
fn clean_model_subjects(rows: Vec<SubjectRow>, report: &mut AnomalyReport) -> Vec<SubjectRow> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(rows.len());

    for mut row in rows {
        let code = row.code.clone();
        row.name = canonical_subject_name(code.as_deref(), &row.name);
        if !seen.insert(row.name.to_lowercase()) {
            report.correction(WarningKind::DuplicateSubjectDropped, row.name.clone());
            continue;
        }

        if is_grade_only(&row.name) {
            row.marks_obtained = None;
            row.max_marks = None;
            if !row.grade.as_deref().is_some_and(is_valid_grade) {
                report.track(&format!("{} grade", row.name), &row.grade, &Some("A".to_string()));
                row.grade = Some("A".to_string());
            }
        } else {
            row.max_marks = Some(100);
            if !row.grade.as_deref().is_some_and(is_valid_grade) {
                let computed = row.marks_obtained.map(|m| marks_to_grade(m).to_string());
                report.track(&format!("{} grade", row.name), &row.grade, &computed);
                row.grade = computed;
            }
            align_marks_with_grade(&mut row, report);
        }

        row.is_additional = row.is_additional || is_additional_code(row.code_str());
        cleaned.push(row);
    }
    cleaned
}

/// Marks outside the band of the printed grade are a misread digit; replace
/// them with the band midpoint.
fn align_marks_with_grade(row: &mut SubjectRow, report: &mut AnomalyReport) {
    let (Some(marks), Some((lo, hi))) = (row.marks_obtained, row.grade.as_deref().and_then(grade_band))
    else {
        return;
    };
    if (lo..=hi).contains(&marks) {
        return;
    }
    let midpoint = (lo + hi) / 2;
    report.correction(
        WarningKind::MarksAdjustedToGrade,
        format!(
            "{}: {marks} outside {} band [{lo}-{hi}] -> {midpoint}",
            row.name,
            row.grade.as_deref().unwrap_or("")
        ),
    );
    row.marks_obtained = Some(midpoint);
}
