use crate::error::{TomeError, Result};
use crate::parser::RecordParser;
use crate::pipeline::context::ExtractionContext;
use crate::record::variants::promote;
use crate::record::{RawFields, Record};
use serde_json::Value;
use tracing::debug;

/// Parser for machine-readable record files: one object or an array of them.
#[derive(Debug, Default)]
pub struct StructuredDataParser {
    typed_details: bool,
}

impl StructuredDataParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach variant payloads to records whose type names a variant.
    pub fn with_typed_details(mut self, enabled: bool) -> Self {
        self.typed_details = enabled;
        self
    }
}

impl RecordParser for StructuredDataParser {
    fn source_tag(&self) -> Option<&'static str> {
        None
    }

    fn parse(&self, content: &str, ctx: &mut ExtractionContext<'_>) -> Result<Vec<Record>> {
        let data: Value = serde_json::from_str(content).map_err(|e| TomeError::Format {
            message: e.to_string(),
        })?;

        let items = match data {
            Value::Array(items) => items,
            single => vec![single],
        };
        let total = items.len();
        debug!(total, "parsed structured data");

        let mut records = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            if ctx.stop_requested() {
                break;
            }

            let raw = RawFields::from_value(item);
            let mut record = ctx.admit(&raw);
            if self.typed_details {
                record = promote(record, &raw);
            }
            ctx.report_progress(index, total, &record, "items");
            records.push(record);
        }

        Ok(records)
    }
}
