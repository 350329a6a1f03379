use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::core::errors::ApiError;

/// The raw corpus file: one array of records per category.
///
/// Records are kept as untyped JSON so a malformed element surfaces as a
/// per-record skip during rendering instead of failing the whole file.
#[derive(Debug, Default, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub product_catalog: Vec<Value>,
    #[serde(default)]
    pub technical_documents: Vec<Value>,
    #[serde(default)]
    pub building_codes: Vec<Value>,
    #[serde(default)]
    pub installation_guides: Vec<Value>,
    #[serde(default)]
    pub safety_documents: Vec<Value>,
    #[serde(default)]
    pub material_alternatives: Vec<Value>,
    #[serde(default)]
    pub typical_queries: Vec<Value>,
}

impl Corpus {
    pub fn sections(&self) -> [(RecordKind, &[Value]); 7] {
        [
            (RecordKind::Product, self.product_catalog.as_slice()),
            (
                RecordKind::TechnicalDocument,
                self.technical_documents.as_slice(),
            ),
            (RecordKind::BuildingCode, self.building_codes.as_slice()),
            (
                RecordKind::InstallationGuide,
                self.installation_guides.as_slice(),
            ),
            (RecordKind::SafetyDocument, self.safety_documents.as_slice()),
            (
                RecordKind::MaterialAlternative,
                self.material_alternatives.as_slice(),
            ),
            (RecordKind::TypicalQuery, self.typical_queries.as_slice()),
        ]
    }

    pub fn record_count(&self) -> usize {
        self.sections().iter().map(|(_, records)| records.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Product,
    TechnicalDocument,
    BuildingCode,
    InstallationGuide,
    SafetyDocument,
    MaterialAlternative,
    TypicalQuery,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Product => "product",
            RecordKind::TechnicalDocument => "technical_document",
            RecordKind::BuildingCode => "building_code",
            RecordKind::InstallationGuide => "installation_guide",
            RecordKind::SafetyDocument => "safety_document",
            RecordKind::MaterialAlternative => "material_alternative",
            RecordKind::TypicalQuery => "typical_query",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn load_corpus(path: &Path) -> Result<Corpus, ApiError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        ApiError::Internal(format!(
            "Failed to read corpus at '{}': {}",
            path.display(),
            err
        ))
    })?;

    serde_json::from_str(&contents).map_err(|err| {
        ApiError::BadRequest(format!("Invalid corpus at '{}': {}", path.display(), err))
    })
}
