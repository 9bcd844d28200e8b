use serde::{Deserialize, Serialize};

/// A single extracted medicine record.
///
/// The assistant replies with `"Medicine"` / `"Use"` keys; lowercase and
/// long-form spellings are tolerated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(rename = "Medicine", alias = "medicine", alias = "name", alias = "Name")]
    pub name: String,

    #[serde(rename = "Use", alias = "use", alias = "indication", alias = "Indication")]
    pub indication: String,
}

/// The full parsed result of one prescription analysis.
///
/// The assistant usually emits a bare array of medicines, but richer replies
/// wrap the array in an object carrying prescription metadata; both shapes
/// deserialize into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub medicines: Vec<Medicine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl Prescription {
    /// Build a prescription from a bare medicine list.
    pub fn from_medicines(medicines: Vec<Medicine>) -> Self {
        Self {
            medicines,
            ..Default::default()
        }
    }
}
