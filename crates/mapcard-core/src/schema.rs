//! Schema.org JSON-LD emission for rendered location cards.
//!
//! The collector is created per render pass and drained by the page-assembly
//! step; nothing here is shared across passes, so concurrent renders cannot
//! bleed schema entries into each other.

use serde_json::{json, Value};

use crate::location::LocationAttributes;

/// Builds the Schema.org object for one card.
///
/// `block_id` distinguishes multiple cards on the same page; `base_url` is
/// the site origin used for the stable `@id`.
#[must_use]
pub fn location_schema(attrs: &LocationAttributes, block_id: &str, base_url: &str) -> Value {
    let name = attrs
        .schema_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&attrs.address);

    let mut obj = serde_json::Map::new();
    obj.insert("@context".to_string(), json!("https://schema.org"));
    obj.insert("@type".to_string(), json!(attrs.schema_type.as_str()));
    obj.insert("@id".to_string(), json!(format!("{base_url}#{block_id}")));
    obj.insert("name".to_string(), json!(name));
    obj.insert(
        "geo".to_string(),
        json!({
            "@type": "GeoCoordinates",
            "latitude": attrs.latitude,
            "longitude": attrs.longitude,
        }),
    );
    obj.insert(
        "address".to_string(),
        json!({
            "@type": "PostalAddress",
            "streetAddress": attrs.address,
        }),
    );

    if let Some(description) = non_empty(attrs.schema_description.as_deref()) {
        obj.insert("description".to_string(), json!(description));
    }
    if let Some(telephone) = non_empty(attrs.schema_telephone.as_deref()) {
        obj.insert("telephone".to_string(), json!(telephone));
    }
    if let Some(website) = non_empty(attrs.schema_website.as_deref()) {
        obj.insert("url".to_string(), json!(website));
    }
    if let Some(hours) = non_empty(attrs.schema_opening_hours.as_deref()) {
        obj.insert(
            "openingHoursSpecification".to_string(),
            json!({
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": hours,
            }),
        );
    }

    Value::Object(obj)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Per-render-pass accumulator for card schemas.
///
/// Owned by a single render pass: push one entry per rendered card, then
/// drain once when assembling the page output.
#[derive(Debug, Default)]
pub struct SchemaCollector {
    entries: Vec<Value>,
}

impl SchemaCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the schema for one card. Cards without a usable name or with
    /// no committed location are skipped rather than emitted half-empty.
    pub fn push(&mut self, attrs: &LocationAttributes, block_id: &str, base_url: &str) {
        let has_name = attrs
            .schema_name
            .as_deref()
            .is_some_and(|n| !n.is_empty())
            || !attrs.address.is_empty();
        if !has_name || !attrs.is_set {
            return;
        }
        self.entries.push(location_schema(attrs, block_id, base_url));
    }

    /// Hands the accumulated entries to the page-assembly step, leaving the
    /// collector empty.
    pub fn drain(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
