use crate::record::model::Record;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use uuid::Uuid;

/// Untyped field map handed to the sanitizer.
///
/// JSON items are wrapped as-is; the markup and outline parsers build one
/// field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    fields: Map<String, Value>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-object values carry no fields.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.fields.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&Record> for RawFields {
    fn from(record: &Record) -> Self {
        Self::new()
            .with("id", record.id.as_str())
            .with("name", record.name.as_str())
            .with("type", record.record_type.as_str())
            .with("source", record.source.as_str())
            .with("description", record.description.as_str())
    }
}

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup pattern is a valid regex"))
}

/// Removes `<...>` sequences. Entities are left untouched.
pub fn strip_markup(text: &str) -> String {
    markup_pattern().replace_all(text, "").into_owned()
}

/// Best-effort string coercion of a raw field value.
fn field_text(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return String::new(),
    };

    strip_markup(&text).trim().to_string()
}

/// Coerce a raw field map into a [`Record`]. Never fails.
pub fn sanitize(raw: &RawFields) -> Record {
    let id = match field_text(raw.get("id")) {
        id if id.is_empty() => generate_id(),
        id => id,
    };

    Record {
        id,
        name: field_text(raw.get("name")),
        record_type: field_text(raw.get("type")),
        source: field_text(raw.get("source")),
        description: field_text(raw.get("description")),
        details: None,
    }
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<b>Bold</b> move"), "Bold move");
        assert_eq!(strip_markup("a &amp; b"), "a &amp; b");
        assert_eq!(strip_markup("no tags"), "no tags");
        assert_eq!(strip_markup("3 < 4"), "3 < 4");
    }

    #[test]
    fn test_sanitize_strips_and_trims() {
        let raw = RawFields::from_value(json!({
            "id": "goblin-1",
            "name": "  <em>Goblin</em>  ",
            "type": "<span> Monster </span>",
            "source": "srd",
            "description": "<p>Small and\nsneaky.</p>\n",
        }));

        let record = sanitize(&raw);
        assert_eq!(record.id, "goblin-1");
        assert_eq!(record.name, "Goblin");
        assert_eq!(record.record_type, "Monster");
        assert_eq!(record.source, "srd");
        assert_eq!(record.description, "Small and\nsneaky.");
        assert!(record.details.is_none());
    }

    #[test]
    fn test_sanitize_defaults_missing_fields() {
        let record = sanitize(&RawFields::from_value(json!({})));
        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.name, "");
        assert_eq!(record.record_type, "");
        assert_eq!(record.source, "");
        assert_eq!(record.description, "");

        let record = sanitize(&RawFields::from_value(json!(42)));
        assert!(!record.id.is_empty());
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_sanitize_coerces_scalars() {
        let raw = RawFields::from_value(json!({
            "id": 7,
            "name": true,
            "type": ["not", "a", "string"],
            "description": null,
        }));

        let record = sanitize(&raw);
        assert_eq!(record.id, "7");
        assert_eq!(record.name, "true");
        assert_eq!(record.record_type, "");
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_blank_id_is_regenerated() {
        let record = sanitize(&RawFields::new().with("id", "   ").with("name", "Orc"));
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            json!({"name": " <i>Owlbear</i> ", "type": "Beast ", "source": "<b>mm</b>"}),
            json!({"id": "x", "name": "<<b>>Trap", "description": "  a <br/> b  "}),
            json!({"name": "plain"}),
        ];

        for input in inputs {
            let once = sanitize(&RawFields::from_value(input));
            let twice = sanitize(&RawFields::from(&once));
            assert_eq!(once, twice);
        }
    }
}
