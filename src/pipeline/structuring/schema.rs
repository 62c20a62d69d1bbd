use crate::models::DocumentTypeLabel;

const PASS_BOOK_FIELDS: &[&str] = &[
    "account_holder_name",
    "account_number",
    "parent_name",
    "address",
];

const AADHAAR_FIELDS: &[&str] = &[
    "document_type",
    "aadhaar_number",
    "name",
    "father_name",
    "mother_name",
    "date_of_birth",
    "gender",
    "address",
];

const PAN_FIELDS: &[&str] = &[
    "document_type",
    "pan_number",
    "name",
    "father_name",
    "date_of_birth",
];

const INCOME_CERTIFICATE_FIELDS: &[&str] = &[
    "document_type",
    "parent_name",
    "student_name",
    "income_years",
    "address",
    "validity_date",
];

const MARKSHEET_FIELDS: &[&str] = &[
    "document_type",
    "student_name",
    "mother_name",
    "father_name",
    "exam_year",
    "subjects",
    "total_marks_obtained",
    "total_max_marks",
    "percentage",
    "result",
];

const GENERIC_FIELDS: &[&str] = &["document_type", "extracted_data"];

/// Ordered field names the model is asked to fill for a document type.
///
/// Order matters: an array-shaped response is mapped onto these names by position.
pub fn schema_fields(document_type: DocumentTypeLabel) -> &'static [&'static str] {
    match document_type {
        DocumentTypeLabel::PassBook => PASS_BOOK_FIELDS,
        DocumentTypeLabel::Aadhaar => AADHAAR_FIELDS,
        DocumentTypeLabel::Pan => PAN_FIELDS,
        DocumentTypeLabel::IncomeCertificate => INCOME_CERTIFICATE_FIELDS,
        DocumentTypeLabel::Marksheet => MARKSHEET_FIELDS,
        _ => GENERIC_FIELDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_book_has_no_document_type_slot() {
        let fields = schema_fields(DocumentTypeLabel::PassBook);
        assert_eq!(fields[0], "account_holder_name");
        assert!(!fields.contains(&"document_type"));
    }

    #[test]
    fn marksheet_order() {
        let fields = schema_fields(DocumentTypeLabel::Marksheet);
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[5], "subjects");
        assert_eq!(fields[9], "result");
    }

    #[test]
    fn undocumented_types_use_generic_schema() {
        for label in [
            DocumentTypeLabel::Passport,
            DocumentTypeLabel::BankStatement,
            DocumentTypeLabel::Unknown,
        ] {
            assert_eq!(schema_fields(label), &["document_type", "extracted_data"]);
        }
    }
}
