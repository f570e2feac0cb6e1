use serde::{Deserialize, Serialize};

pub const RESOURCE_TYPE: &str = "Observation";
pub const STATUS_FINAL: &str = "final";
pub const CATEGORY_SYSTEM: &str = "http://hl7.org/fhir/observation-category";
pub const CATEGORY_VITAL_SIGNS: &str = "vital-signs";
pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const LOINC_ECG: &str = "85354-9";
pub const LOINC_ECG_DISPLAY: &str = "ECG";
pub const SUBJECT_REFERENCE: &str = "Patient/1";
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
pub const MILLIVOLT: &str = "mV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
    pub system: String,
    pub code: String,
}

/// FHIR `Observation` carrying one ECG sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub resource_type: String,
    pub id: String,
    pub status: String,
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub effective_date_time: String,
    pub value_quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,
}

impl Observation {
    /// Only `id`, `effective_date_time`, the value and the optional sampling
    /// rate vary between records.
    pub fn ecg(
        id: impl Into<String>,
        effective_date_time: impl Into<String>,
        value: f64,
        sampling_rate: Option<f64>,
    ) -> Self {
        Self {
            resource_type: RESOURCE_TYPE.to_string(),
            id: id.into(),
            status: STATUS_FINAL.to_string(),
            category: vec![CodeableConcept {
                coding: vec![Coding {
                    system: CATEGORY_SYSTEM.to_string(),
                    code: CATEGORY_VITAL_SIGNS.to_string(),
                    display: None,
                }],
            }],
            code: CodeableConcept {
                coding: vec![Coding {
                    system: LOINC_SYSTEM.to_string(),
                    code: LOINC_ECG.to_string(),
                    display: Some(LOINC_ECG_DISPLAY.to_string()),
                }],
            },
            subject: Reference {
                reference: SUBJECT_REFERENCE.to_string(),
            },
            effective_date_time: effective_date_time.into(),
            value_quantity: Quantity {
                value,
                unit: MILLIVOLT.to_string(),
                system: UCUM_SYSTEM.to_string(),
                code: MILLIVOLT.to_string(),
            },
            sampling_rate,
        }
    }
}
