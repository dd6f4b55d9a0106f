//! Submission payload sent to the analysis service.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::upload::UploadedFile;

/// Questionnaire answers. Values are passed through as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalFields {
    pub age: String,
    pub gender: String,
    pub skin_type: String,
    pub location: String,
    pub lesion_size: String,
    pub duration: String,
    pub family_history: String,
    pub sun_exposure: String,
    pub additional_notes: String,
}

/// Everything the service needs for one analysis, assembled at submit time.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub file: UploadedFile,
    pub fields: ClinicalFields,
    pub symptoms: BTreeSet<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SubmissionPayload {
    #[must_use]
    pub fn new(
        file: UploadedFile,
        fields: ClinicalFields,
        symptoms: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            file,
            fields,
            symptoms: symptoms.into_iter().collect(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Symptoms encoded as a JSON array string.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn symptoms_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.symptoms)
    }

    /// Text fields in wire order, with `symptoms` JSON-encoded.
    ///
    /// # Errors
    /// Returns error if the symptom list cannot be serialized.
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let f = &self.fields;
        Ok(vec![
            ("age", f.age.clone()),
            ("gender", f.gender.clone()),
            ("skinType", f.skin_type.clone()),
            ("location", f.location.clone()),
            ("lesionSize", f.lesion_size.clone()),
            ("duration", f.duration.clone()),
            ("familyHistory", f.family_history.clone()),
            ("sunExposure", f.sun_exposure.clone()),
            ("symptoms", self.symptoms_json()?),
            ("additionalNotes", f.additional_notes.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(symptoms: &[&str]) -> SubmissionPayload {
        SubmissionPayload::new(
            UploadedFile::new("mole.jpg", "image/jpeg", vec![1, 2, 3]),
            ClinicalFields {
                age: "45".to_string(),
                gender: "Male".to_string(),
                ..Default::default()
            },
            symptoms.iter().map(|s| s.to_string()),
        )
    }

    #[test]
    fn test_symptoms_encode_as_json_array() {
        let p = payload(&["Itching", "Bleeding", "Itching"]);
        assert_eq!(p.symptoms.len(), 2);
        assert_eq!(p.symptoms_json().expect("json"), r#"["Bleeding","Itching"]"#);
    }

    #[test]
    fn test_empty_symptoms_encode_as_empty_array() {
        assert_eq!(payload(&[]).symptoms_json().expect("json"), "[]");
    }

    #[test]
    fn test_text_fields_use_wire_names() {
        let fields = payload(&["Bleeding"]).text_fields().expect("fields");
        let names: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            [
                "age",
                "gender",
                "skinType",
                "location",
                "lesionSize",
                "duration",
                "familyHistory",
                "sunExposure",
                "symptoms",
                "additionalNotes"
            ]
        );
        assert_eq!(fields[0].1, "45");
        assert_eq!(fields[8].1, r#"["Bleeding"]"#);
    }
}
