use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::DocumentTypeLabel;
use super::lenient::{opt_float, opt_int, opt_string, vec_lenient};
use super::subject::SubjectRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AadhaarRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub aadhaar_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub father_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PanRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub pan_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub father_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarksheetRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub father_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub exam_year: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub roll_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub board: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "vec_lenient")]
    pub subjects: Vec<SubjectRow>,
    /// Present only once a board validator has split optional subjects out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_subjects: Option<Vec<SubjectRow>>,
    #[serde(default, deserialize_with = "opt_int")]
    pub total_marks_obtained: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub total_max_marks: Option<i64>,
    #[serde(default, deserialize_with = "opt_float")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PassBookRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub account_holder_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub parent_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub address: Option<String>,
}

/// One row of the income table: a financial year and the amount printed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IncomeYear {
    #[serde(default, deserialize_with = "opt_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub income_value: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub income_in_words: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IncomeCertificateRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub parent_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub student_name: Option<String>,
    #[serde(default, deserialize_with = "vec_lenient")]
    pub income_years: Vec<IncomeYear>,
    #[serde(default, deserialize_with = "opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub validity_date: Option<String>,
    // Single-year layout some models still answer with.
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub income_value: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub income_in_word: Option<String>,
}

/// Document types with no documented schema keep the model's fields verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    pub label: DocumentTypeLabel,
    pub fields: Map<String, Value>,
}

/// Typed extraction result, one variant per document schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedRecord {
    Aadhaar(AadhaarRecord),
    Pan(PanRecord),
    Marksheet(MarksheetRecord),
    PassBook(PassBookRecord),
    IncomeCertificate(IncomeCertificateRecord),
    Other(GenericRecord),
}

impl ExtractedRecord {
    /// Build the typed variant for `label` from a JSON object.
    ///
    /// The `document_type` key is dropped (it is carried by the variant) and the
    /// `fathers_name` spelling is folded into `father_name`.
    pub fn from_object(
        label: DocumentTypeLabel,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.remove("document_type");
        if let Some(fathers) = fields.remove("fathers_name") {
            fields.entry("father_name").or_insert(fathers);
        }

        let record = match label {
            DocumentTypeLabel::Aadhaar => {
                Self::Aadhaar(serde_json::from_value(Value::Object(fields))?)
            }
            DocumentTypeLabel::Pan => Self::Pan(serde_json::from_value(Value::Object(fields))?),
            DocumentTypeLabel::Marksheet => {
                Self::Marksheet(serde_json::from_value(Value::Object(fields))?)
            }
            DocumentTypeLabel::PassBook => {
                Self::PassBook(serde_json::from_value(Value::Object(fields))?)
            }
            DocumentTypeLabel::IncomeCertificate => {
                Self::IncomeCertificate(serde_json::from_value(Value::Object(fields))?)
            }
            other => Self::Other(GenericRecord {
                label: other,
                fields,
            }),
        };
        Ok(record)
    }

    pub fn document_type(&self) -> DocumentTypeLabel {
        match self {
            Self::Aadhaar(_) => DocumentTypeLabel::Aadhaar,
            Self::Pan(_) => DocumentTypeLabel::Pan,
            Self::Marksheet(_) => DocumentTypeLabel::Marksheet,
            Self::PassBook(_) => DocumentTypeLabel::PassBook,
            Self::IncomeCertificate(_) => DocumentTypeLabel::IncomeCertificate,
            Self::Other(generic) => generic.label,
        }
    }

    /// JSON object for the record, always carrying `document_type`.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        let mut value = match self {
            Self::Aadhaar(r) => serde_json::to_value(r)?,
            Self::Pan(r) => serde_json::to_value(r)?,
            Self::Marksheet(r) => serde_json::to_value(r)?,
            Self::PassBook(r) => serde_json::to_value(r)?,
            Self::IncomeCertificate(r) => serde_json::to_value(r)?,
            Self::Other(r) => Value::Object(r.fields.clone()),
        };
        if let Value::Object(map) = &mut value {
            map.insert(
                "document_type".to_string(),
                Value::String(self.document_type().as_str().to_string()),
            );
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn marksheet_from_model_object() {
        let record = ExtractedRecord::from_object(
            DocumentTypeLabel::Marksheet,
            object(json!({
                "document_type": "marksheet",
                "student_name": "YADAV JANVI AJIT",
                "fathers_name": "AJIT",
                "subjects": [{"subject_name": "Mathematics", "marks_obtained": "90"}],
                "total_max_marks": "500",
                "percentage": "85.60"
            })),
        )
        .unwrap();

        let ExtractedRecord::Marksheet(m) = record else {
            panic!("expected marksheet");
        };
        assert_eq!(m.father_name.as_deref(), Some("AJIT"));
        assert_eq!(m.subjects.len(), 1);
        assert_eq!(m.total_max_marks, Some(500));
        assert_eq!(m.percentage, Some(85.6));
        assert!(m.additional_subjects.is_none());
    }

    #[test]
    fn father_name_wins_over_fathers_name() {
        let record = ExtractedRecord::from_object(
            DocumentTypeLabel::Pan,
            object(json!({ "father_name": "RAMESH", "fathers_name": "OTHER" })),
        )
        .unwrap();
        let ExtractedRecord::Pan(p) = record else {
            panic!("expected pan");
        };
        assert_eq!(p.father_name.as_deref(), Some("RAMESH"));
    }

    #[test]
    fn undocumented_type_keeps_fields() {
        let record = ExtractedRecord::from_object(
            DocumentTypeLabel::Passport,
            object(json!({ "document_type": "passport", "extracted_data": {"no": "K123"} })),
        )
        .unwrap();
        assert_eq!(record.document_type(), DocumentTypeLabel::Passport);
        let json = record.to_json().unwrap();
        assert_eq!(json["document_type"], "passport");
        assert_eq!(json["extracted_data"]["no"], "K123");
    }

    #[test]
    fn to_json_always_has_document_type() {
        let record = ExtractedRecord::PassBook(PassBookRecord::default());
        let json = record.to_json().unwrap();
        assert_eq!(json["document_type"], "pass_book");
        assert!(json["parent_name"].is_null());
    }

    #[test]
    fn income_years_parse_leniently() {
        let record = ExtractedRecord::from_object(
            DocumentTypeLabel::IncomeCertificate,
            object(json!({
                "income_years": [
                    {"year": "२०२३ २०२४", "income_value": "१,००,०००", "income_in_words": "एक लाख"},
                    "garbage"
                ]
            })),
        )
        .unwrap();
        let ExtractedRecord::IncomeCertificate(c) = record else {
            panic!("expected income certificate");
        };
        assert_eq!(c.income_years.len(), 1);
        assert_eq!(c.income_years[0].income_value.as_deref(), Some("१,००,०००"));
        let json = ExtractedRecord::IncomeCertificate(c).to_json().unwrap();
        assert!(json.get("income_value").is_none());
    }
}
