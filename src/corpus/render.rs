//! Record-to-document rendering.
//!
//! Each corpus category has a fixed textual template and a metadata
//! extractor. Rendering is deterministic so re-ingesting an unchanged
//! corpus reproduces identical document content.

use std::fmt;

use serde_json::{json, Value};

use super::records::{Corpus, RecordKind};

/// A flat text document derived from one corpus record.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: Value,
}

/// A record that could not be rendered, with the field that sank it.
///
/// Skips never abort the batch; the builder reports them so a partial
/// corpus is observable rather than silent.
#[derive(Debug)]
pub struct RecordSkip {
    pub kind: RecordKind,
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for RecordSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record {}: {}", self.kind, self.position, self.reason)
    }
}

#[derive(Debug, Default)]
pub struct BuiltDocuments {
    pub documents: Vec<Document>,
    pub skipped: Vec<RecordSkip>,
}

/// Render every record in the corpus, collecting per-record skips.
pub fn build_documents(corpus: &Corpus) -> BuiltDocuments {
    let mut built = BuiltDocuments::default();

    for (kind, records) in corpus.sections() {
        for (position, record) in records.iter().enumerate() {
            match render_record(kind, record, position) {
                Ok(document) => built.documents.push(document),
                Err(skip) => built.skipped.push(skip),
            }
        }
    }

    built
}

pub fn render_record(
    kind: RecordKind,
    record: &Value,
    position: usize,
) -> Result<Document, RecordSkip> {
    let rendered = match kind {
        RecordKind::Product => render_product(record),
        RecordKind::TechnicalDocument => render_titled(record, kind, "id", "doc_id", "content"),
        RecordKind::InstallationGuide => {
            render_titled(record, kind, "guide_id", "guide_id", "content")
        }
        RecordKind::SafetyDocument => render_titled(record, kind, "doc_id", "doc_id", "content"),
        RecordKind::BuildingCode => render_building_code(record),
        RecordKind::MaterialAlternative => render_material_alternative(record),
        RecordKind::TypicalQuery => render_typical_query(record, position),
    };

    rendered.map_err(|reason| RecordSkip {
        kind,
        position,
        reason,
    })
}

fn render_product(record: &Value) -> Result<Document, String> {
    let id = required_key(record, "id")?;
    let name = required_str(record, "name")?;
    let category = required_str(record, "category")?;
    let manufacturer = required_str(record, "manufacturer")?;
    let specifications = required_pretty(record, "specifications")?;
    let applications = required_list(record, "applications")?;
    let technical_details = required_pretty(record, "technical_details")?;
    let price_history = optional_pretty(record, "price_history", json!([]));
    let current_stock = optional_pretty(record, "current_stock", json!({}));

    let content = format!(
        "Product Information\n\
         Name: {name}\n\
         Category: {category}\n\
         Manufacturer: {manufacturer}\n\
         ID: {id}\n\n\
         Specifications:\n{specifications}\n\n\
         Applications:\n{applications}\n\n\
         Technical Details:\n{technical_details}\n\n\
         Price History:\n{price_history}\n\n\
         Current Stock:\n{current_stock}"
    );

    let metadata = json!({
        "doc_type": "product",
        "product_id": id,
        "category": category,
        "manufacturer": manufacturer,
    });

    Ok(Document {
        id: format!("product-{id}"),
        content,
        metadata,
    })
}

// Shared shape for technical documents, installation guides, and safety
// documents: a title line, a product reference, and a body.
fn render_titled(
    record: &Value,
    kind: RecordKind,
    key_field: &str,
    metadata_key: &str,
    body_field: &str,
) -> Result<Document, String> {
    let key = required_key(record, key_field)?;
    let title = required_str(record, "title")?;
    let body = required_str(record, body_field)?;
    let product_id = record
        .get("product_id")
        .and_then(Value::as_str)
        .unwrap_or("N/A");

    let content = format!(
        "{title}\nProduct ID: {product_id}\n\n{}",
        body.trim()
    );

    let mut metadata = json!({
        "doc_type": kind.as_str(),
        "product_id": product_id,
    });
    if let Some(map) = metadata.as_object_mut() {
        map.insert(metadata_key.to_string(), json!(key));
    }

    Ok(Document {
        id: format!("{}-{}", kind.as_str(), key),
        content,
        metadata,
    })
}

fn render_building_code(record: &Value) -> Result<Document, String> {
    let code_id = required_key(record, "code_id")?;
    let title = required_str(record, "title")?;
    let jurisdiction = required_str(record, "jurisdiction")?;
    let summary = required_str(record, "summary")?;
    let applicable_products = record
        .get("applicable_products")
        .cloned()
        .unwrap_or(json!([]));

    let content = format!(
        "{title}\nJurisdiction: {jurisdiction}\n\n{}",
        summary.trim()
    );

    let metadata = json!({
        "doc_type": "building_code",
        "code_id": code_id,
        "jurisdiction": jurisdiction,
        "applicable_products": applicable_products,
    });

    Ok(Document {
        id: format!("building_code-{code_id}"),
        content,
        metadata,
    })
}

fn render_material_alternative(record: &Value) -> Result<Document, String> {
    let primary = required_key(record, "primary_product_id")?;
    let alternatives = record
        .get("alternatives")
        .ok_or("missing field `alternatives`")?;
    let alternatives = serde_json::to_string_pretty(alternatives).unwrap_or_default();

    let content = format!(
        "Material Alternatives for Product ID: {primary}\n\nAlternatives:\n{alternatives}"
    );

    let metadata = json!({
        "doc_type": "material_alternative",
        "product_id": primary,
    });

    Ok(Document {
        id: format!("material_alternative-{primary}"),
        content,
        metadata,
    })
}

fn render_typical_query(record: &Value, position: usize) -> Result<Document, String> {
    let query = required_str(record, "query")?;
    let context = required_str(record, "context")?;

    let content = format!(
        "Query: {query}\n\
         Context: {context}\n\
         Relevant Products: {}\n\
         Relevant Codes: {}\n\
         Relevant Documents: {}\n\
         Considerations: {}\n\
         Key Points: {}",
        join_list(record, "relevant_products"),
        join_list(record, "relevant_codes"),
        join_list(record, "relevant_documents"),
        join_list(record, "considerations"),
        join_list(record, "key_points"),
    );

    let metadata = json!({
        "doc_type": "typical_query",
        "relevant_products": record.get("relevant_products").cloned().unwrap_or(json!([])),
        "relevant_codes": record.get("relevant_codes").cloned().unwrap_or(json!([])),
        "relevant_documents": record.get("relevant_documents").cloned().unwrap_or(json!([])),
    });

    Ok(Document {
        id: format!("typical_query-{position}"),
        content,
        metadata,
    })
}

/// An identifying key: accepts string or numeric JSON, rendered as text.
fn required_key(record: &Value, field: &str) -> Result<String, String> {
    match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(format!("field `{field}` is not usable as a key")),
        None => Err(format!("missing field `{field}`")),
    }
}

fn required_str<'a>(record: &'a Value, field: &str) -> Result<&'a str, String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing field `{field}`"))
}

fn required_pretty(record: &Value, field: &str) -> Result<String, String> {
    let value = record
        .get(field)
        .ok_or_else(|| format!("missing field `{field}`"))?;
    Ok(serde_json::to_string_pretty(value).unwrap_or_default())
}

fn required_list(record: &Value, field: &str) -> Result<String, String> {
    record
        .get(field)
        .and_then(Value::as_array)
        .map(|_| join_list(record, field))
        .ok_or_else(|| format!("missing field `{field}`"))
}

fn optional_pretty(record: &Value, field: &str, default: Value) -> String {
    let value = record.get(field).cloned().unwrap_or(default);
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

fn join_list(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}
