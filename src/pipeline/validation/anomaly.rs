use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::WarningKind;

/// One warning raised while repairing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub context: String,
}

/// Ordered warnings for one document.
///
/// Anomalies flag the record for manual review; corrections only keep an
/// audit trail of fields that were overwritten or nulled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyReport {
    warnings: Vec<ValidationWarning>,
}

impl AnomalyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: WarningKind, context: impl Into<String>) {
        let context = context.into();
        if kind.is_anomaly() {
            tracing::warn!(kind = %kind, context = %context, "Extraction anomaly");
        } else {
            tracing::info!(kind = %kind, "Field corrected");
            tracing::debug!(kind = %kind, context = %context, "Correction detail");
        }
        self.warnings.push(ValidationWarning { kind, context });
    }

    pub fn anomaly(&mut self, kind: WarningKind) {
        self.push(kind, "");
    }

    pub fn correction(&mut self, kind: WarningKind, context: impl Into<String>) {
        self.push(kind, context);
    }

    /// Record a correction when a field's value changed: `field_nulled` when it
    /// became null, `field_corrected` otherwise.
    pub fn track<T: PartialEq + std::fmt::Debug>(
        &mut self,
        field: &str,
        before: &Option<T>,
        after: &Option<T>,
    ) {
        if before == after {
            return;
        }
        match (before, after) {
            (Some(old), None) => {
                self.correction(WarningKind::FieldNulled, format!("{field}: {old:?}"))
            }
            _ => self.correction(
                WarningKind::FieldCorrected,
                format!("{field}: {before:?} -> {after:?}"),
            ),
        }
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(|w| w.kind.is_anomaly())
    }

    pub fn corrections(&self) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(|w| !w.kind.is_anomaly())
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn needs_manual_review(&self) -> bool {
        self.anomalies().next().is_some()
    }

    /// Anomaly names in the order they were raised, without repeats.
    pub fn anomaly_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for warning in self.anomalies() {
            let name = warning.kind.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Attach `_extraction_warnings` and `_needs_manual_review` when any anomaly exists.
    pub fn attach(&self, output: &mut Map<String, Value>) {
        if !self.needs_manual_review() {
            return;
        }
        let names = self
            .anomaly_names()
            .into_iter()
            .map(|n| Value::String(n.to_string()))
            .collect();
        output.insert("_extraction_warnings".to_string(), Value::Array(names));
        output.insert("_needs_manual_review".to_string(), Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrections_alone_do_not_need_review() {
        let mut report = AnomalyReport::new();
        report.correction(WarningKind::FieldNulled, "income_value");
        report.correction(WarningKind::MarksAdjustedToGrade, "Science: 68 -> 95");
        assert!(!report.needs_manual_review());
        assert_eq!(report.corrections().count(), 2);

        let mut output = Map::new();
        report.attach(&mut output);
        assert!(output.is_empty());
    }

    #[test]
    fn anomalies_attach_names_and_flag() {
        let mut report = AnomalyReport::new();
        report.anomaly(WarningKind::SubjectExtractionFailed);
        report.correction(WarningKind::FieldCorrected, "total_max_marks");
        report.anomaly(WarningKind::MissingPercentage);

        let mut output = Map::new();
        report.attach(&mut output);
        assert_eq!(
            output["_extraction_warnings"],
            serde_json::json!(["subject_extraction_failed", "missing_percentage"])
        );
        assert_eq!(output["_needs_manual_review"], Value::Bool(true));
    }

    #[test]
    fn track_distinguishes_nulled_from_corrected() {
        let mut report = AnomalyReport::new();
        report.track("percentage", &Some(82.4), &Some(82.4));
        assert!(report.warnings().is_empty());

        report.track("total_max_marks", &Some(450), &Some(500));
        report.track("income_value", &Some("1,20,000".to_string()), &None);
        report.track("roll_number", &None, &Some("12345678".to_string()));

        let kinds: Vec<_> = report.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::FieldCorrected,
                WarningKind::FieldNulled,
                WarningKind::FieldCorrected
            ]
        );
        assert!(!report.needs_manual_review());
    }

    #[test]
    fn anomaly_names_are_deduplicated() {
        let mut report = AnomalyReport::new();
        report.anomaly(WarningKind::InsufficientSubjects);
        report.anomaly(WarningKind::InsufficientSubjects);
        assert_eq!(report.anomaly_names(), vec!["insufficient_subjects"]);
        assert_eq!(report.warnings().len(), 2);
        assert!(report.has(WarningKind::InsufficientSubjects));
        assert!(!report.has(WarningKind::MissingStudentName));
    }
}
