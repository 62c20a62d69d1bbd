use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a wire string does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(DocumentTypeLabel {
    Aadhaar => "aadhaar",
    Pan => "pan",
    Marksheet => "marksheet",
    PassBook => "pass_book",
    IncomeCertificate => "income_certificate",
    BankStatement => "bank_statement",
    Passport => "passport",
    DrivingLicense => "driving_license",
    VoterId => "voter_id",
    UtilityBill => "utility_bill",
    Unknown => "unknown",
});

impl DocumentTypeLabel {
    /// Lenient parse for labels coming from OCR hints or model output.
    /// Accepts case/whitespace noise and the `passbook` spelling.
    pub fn parse_loose(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "passbook" => Some(Self::PassBook),
            other => other.parse().ok(),
        }
    }

    /// Like [`parse_loose`](Self::parse_loose) but unknown strings map to `Unknown`.
    pub fn from_hint(value: &str) -> Self {
        Self::parse_loose(value).unwrap_or(Self::Unknown)
    }
}

str_enum!(BoardLabel {
    Ssc => "ssc",
    Cbse => "cbse",
    Icse => "icse",
    Unknown => "unknown",
});

str_enum!(ExtractionMethod {
    Regex => "regex",
    LlmFallback => "llm_fallback",
});

str_enum!(OcrChannel {
    Primary => "primary",
    Alternate => "alternate",
});

str_enum!(WarningKind {
    MissingStudentName => "missing_student_name",
    InsufficientSubjects => "insufficient_subjects",
    MissingPercentage => "missing_percentage",
    PossibleFormatChange => "possible_format_change",
    SubjectExtractionFailed => "subject_extraction_failed",
    FieldCorrected => "field_corrected",
    FieldNulled => "field_nulled",
    MarksAdjustedToGrade => "marks_adjusted_to_grade",
    DuplicateSubjectDropped => "duplicate_subject_dropped",
    GradeOnlySubjectInjected => "grade_only_subject_injected",
    ParentNameRejected => "parent_name_rejected",
    StudentNameRecovered => "student_name_recovered",
});

impl WarningKind {
    /// Anomalies force manual review; everything else is an audit-trail correction.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Self::MissingStudentName
                | Self::InsufficientSubjects
                | Self::MissingPercentage
                | Self::PossibleFormatChange
                | Self::SubjectExtractionFailed
        )
    }
}
