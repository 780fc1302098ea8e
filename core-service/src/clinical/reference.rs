//! Clinical Reference - per-disease guidance
//!
//! Static, process-wide data: risk tier, description, patient message and
//! the two recommendation lists for each label. A label without an entry
//! resolves to [`DiseaseInfo::unknown`], never to an error.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Coarse severity attached to a label, independent of model confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub patient_message: String,
    #[serde(default)]
    pub doctor_recommendations: Vec<String>,
    #[serde(default)]
    pub patient_recommendations: Vec<String>,
}

impl DiseaseInfo {
    /// Fallback for labels the reference does not know
    pub fn unknown() -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            description: String::new(),
            patient_message: String::new(),
            doctor_recommendations: Vec::new(),
            patient_recommendations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicalReference {
    entries: BTreeMap<String, DiseaseInfo>,
}

impl ClinicalReference {
    pub fn new(entries: BTreeMap<String, DiseaseInfo>) -> Self {
        Self { entries }
    }

    /// Compiled-in guidance for the five blood panel classes.
    pub fn builtin() -> &'static ClinicalReference {
        &BUILTIN_REFERENCE
    }

    pub fn get(&self, label: &str) -> Option<&DiseaseInfo> {
        self.entries.get(label)
    }

    /// Entry for `label`, or the Unknown fallback.
    pub fn describe(&self, label: &str) -> DiseaseInfo {
        self.get(label).cloned().unwrap_or_else(DiseaseInfo::unknown)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

static BUILTIN_REFERENCE: Lazy<ClinicalReference> = Lazy::new(|| {
    let mut entries = BTreeMap::new();

    entries.insert(
        "Healthy".to_string(),
        DiseaseInfo {
            risk_level: RiskLevel::Low,
            description: "Blood parameters are within normal ranges".to_string(),
            patient_message: "Your blood test results look good! Continue maintaining a healthy lifestyle.".to_string(),
            doctor_recommendations: strings(&[
                "Continue regular health monitoring",
                "Maintain current lifestyle and diet",
                "Schedule routine check-up in 6-12 months",
            ]),
            patient_recommendations: strings(&[
                "Maintain a balanced diet rich in fruits and vegetables",
                "Exercise regularly (at least 30 minutes daily)",
                "Stay hydrated and get adequate sleep",
                "Continue regular health check-ups",
            ]),
        },
    );

    entries.insert(
        "Anemia".to_string(),
        DiseaseInfo {
            risk_level: RiskLevel::Medium,
            description: "Low hemoglobin or red blood cell count detected".to_string(),
            patient_message: "Some blood parameters need attention. Please consult your doctor.".to_string(),
            doctor_recommendations: strings(&[
                "Check iron, B12, and folate levels",
                "Consider iron supplementation if deficient",
                "Investigate underlying causes (bleeding, malabsorption)",
                "Monitor hemoglobin levels regularly",
                "Refer to hematologist if severe or persistent",
            ]),
            patient_recommendations: strings(&[
                "Increase iron-rich foods (red meat, spinach, lentils)",
                "Take vitamin C to enhance iron absorption",
                "Avoid tea/coffee with meals",
                "Consult your doctor about supplements",
                "Schedule follow-up blood tests",
            ]),
        },
    );

    entries.insert(
        "Diabetes".to_string(),
        DiseaseInfo {
            risk_level: RiskLevel::High,
            description: "Elevated glucose and HbA1c levels detected".to_string(),
            patient_message: "Your blood sugar levels require medical attention. Please consult your doctor soon.".to_string(),
            doctor_recommendations: strings(&[
                "Confirm diagnosis with fasting glucose and OGTT",
                "Start or adjust diabetes medication",
                "Refer to endocrinologist",
                "Monitor HbA1c every 3 months",
                "Screen for diabetic complications",
                "Provide diabetes education and lifestyle counseling",
            ]),
            patient_recommendations: strings(&[
                "Monitor blood sugar levels regularly",
                "Follow a low-glycemic diet",
                "Exercise regularly to improve insulin sensitivity",
                "Maintain healthy weight",
                "Take prescribed medications as directed",
                "Schedule regular check-ups with your doctor",
            ]),
        },
    );

    entries.insert(
        "Thalasse".to_string(),
        DiseaseInfo {
            risk_level: RiskLevel::Medium,
            description: "Abnormal red blood cell indices suggesting thalassemia".to_string(),
            patient_message: "Your blood test shows some abnormalities. Please consult your doctor for further evaluation.".to_string(),
            doctor_recommendations: strings(&[
                "Perform hemoglobin electrophoresis",
                "Check family history for thalassemia",
                "Refer to hematologist for genetic counseling",
                "Monitor for complications (iron overload, bone changes)",
                "Consider transfusion therapy if severe",
                "Genetic testing for family members",
            ]),
            patient_recommendations: strings(&[
                "Consult a hematologist for proper diagnosis",
                "Avoid iron supplements unless prescribed",
                "Maintain regular medical follow-ups",
                "Consider genetic counseling if planning family",
                "Stay informed about your condition",
            ]),
        },
    );

    entries.insert(
        "Thromboc".to_string(),
        DiseaseInfo {
            risk_level: RiskLevel::High,
            description: "Low platelet count detected (thrombocytopenia)".to_string(),
            patient_message: "Your platelet count is low. Please see your doctor immediately for evaluation.".to_string(),
            doctor_recommendations: strings(&[
                "Investigate cause (medications, infections, autoimmune)",
                "Check for bleeding symptoms",
                "Avoid antiplatelet drugs and NSAIDs",
                "Consider platelet transfusion if severe (<10,000)",
                "Refer to hematologist urgently",
                "Monitor platelet count closely",
            ]),
            patient_recommendations: strings(&[
                "Avoid activities that may cause injury or bleeding",
                "Report any unusual bleeding or bruising immediately",
                "Avoid medications that affect platelets (aspirin, ibuprofen)",
                "Follow up with your doctor urgently",
                "Attend all scheduled blood tests",
            ]),
        },
    );

    ClinicalReference::new(entries)
});
