use serde::{Deserialize, Serialize};

use super::lenient::{opt_int, opt_string, string_or_empty};

/// One row of a marksheet's subject table.
///
/// Numeric rows carry `marks_obtained`/`max_marks`; grade-only (co-scholastic)
/// rows carry a letter `grade` and null marks. CBSE scholastic rows keep the
/// printed band grade next to the marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubjectRow {
    #[serde(
        rename = "subject_code",
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    #[serde(rename = "subject_name", default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "opt_int")]
    pub marks_obtained: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub max_marks: Option<i64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub grade: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub theory_marks: Option<i64>,
    #[serde(
        alias = "ia_pr_marks",
        default,
        deserialize_with = "opt_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_marks: Option<i64>,
    #[serde(skip)]
    pub is_additional: bool,
}

impl SubjectRow {
    /// Numeric subject out of 100 with no grade.
    pub fn numeric(name: &str, marks: i64) -> Self {
        Self {
            name: name.to_string(),
            marks_obtained: Some(marks),
            max_marks: Some(100),
            ..Self::default()
        }
    }

    /// Co-scholastic subject carrying only a letter grade.
    pub fn grade_only(name: &str, grade: &str) -> Self {
        Self {
            name: name.to_string(),
            grade: Some(grade.to_string()),
            ..Self::default()
        }
    }

    /// Lowercased, trimmed name used for set membership and dedupe.
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn code_str(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_use_subject_prefix() {
        let row = SubjectRow::numeric("Mathematics", 90);
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["subject_name"], "Mathematics");
        assert_eq!(value["marks_obtained"], 90);
        assert_eq!(value["max_marks"], 100);
        assert!(value["grade"].is_null());
        assert!(value.get("subject_code").is_none());
        assert!(value.get("is_additional").is_none());
    }

    #[test]
    fn model_row_deserializes_loosely() {
        let row: SubjectRow = serde_json::from_value(json!({
            "subject_code": 41,
            "subject_name": "MATHS",
            "marks_obtained": "95",
            "max_marks": "100",
            "grade": "null",
            "ia_pr_marks": 20
        }))
        .unwrap();
        assert_eq!(row.code.as_deref(), Some("41"));
        assert_eq!(row.marks_obtained, Some(95));
        assert_eq!(row.max_marks, Some(100));
        assert!(row.grade.is_none());
        assert_eq!(row.internal_marks, Some(20));
        assert!(!row.is_additional);
    }

    #[test]
    fn missing_name_defaults_to_empty() {
        let row: SubjectRow = serde_json::from_value(json!({ "grade": "A" })).unwrap();
        assert_eq!(row.name, "");
        assert_eq!(row.name_key(), "");
    }
}
