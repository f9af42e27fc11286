use crate::error::Result;
use crate::parser::RecordParser;
use crate::pipeline::context::ExtractionContext;
use crate::record::{RawFields, Record};
use regex::Regex;
use tracing::debug;

pub const MARKDOWN_SOURCE: &str = "markdown-import";

/// Parser for heading-delimited outline documents.
///
/// Every `#`, `##` or `###` heading starts a new entity; text before the first
/// heading counts as an entity of its own.
pub struct OutlineParser {
    heading: Regex,
    type_label: Regex,
    description_label: Regex,
}

impl std::fmt::Debug for OutlineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineParser").finish_non_exhaustive()
    }
}

impl OutlineParser {
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"(?m)^#{1,3}\s+").expect("heading pattern is a valid regex"),
            type_label: Regex::new(r"(?i)Type:\s*([^\n]+)").expect("type pattern is a valid regex"),
            description_label: Regex::new(r"(?i)Description:\s*([^\n]+)")
                .expect("description pattern is a valid regex"),
        }
    }

    /// Non-blank segments between headings, in document order.
    pub fn segments<'t>(&self, content: &'t str) -> Vec<&'t str> {
        self.heading
            .split(content)
            .filter(|segment| !segment.trim().is_empty())
            .collect()
    }

    fn raw_fields(&self, segment: &str) -> RawFields {
        let mut lines = segment.trim().lines();
        let name = lines.next().unwrap_or_default().trim();

        let record_type = self
            .type_label
            .captures(segment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or("unknown");

        let description = match self
            .description_label
            .captures(segment)
            .and_then(|caps| caps.get(1))
        {
            Some(m) => m.as_str().to_string(),
            None => lines.collect::<Vec<_>>().join(" ").trim().to_string(),
        };

        RawFields::new()
            .with("name", name)
            .with("type", record_type)
            .with("source", MARKDOWN_SOURCE)
            .with("description", description)
    }
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for OutlineParser {
    fn source_tag(&self) -> Option<&'static str> {
        Some(MARKDOWN_SOURCE)
    }

    fn parse(&self, content: &str, ctx: &mut ExtractionContext<'_>) -> Result<Vec<Record>> {
        let segments = self.segments(content);
        let total = segments.len();
        debug!(total, "split outline into segments");

        let mut records = Vec::with_capacity(total);

        for (index, segment) in segments.iter().enumerate() {
            if ctx.stop_requested() {
                break;
            }

            let record = ctx.admit(&self.raw_fields(segment));
            ctx.report_progress(index, total, &record, "Markdown sections");
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::{ProgressEvent, RunLedger};
    use crate::ui::signals::CancellationSignal;

    fn parse(content: &str) -> Vec<Record> {
        let signal = CancellationSignal::new();
        let mut ledger = RunLedger::new();
        let mut ctx = ExtractionContext::new(&signal, &mut ledger);
        OutlineParser::new().parse(content, &mut ctx).unwrap()
    }

    #[test]
    fn test_single_labelled_entry() {
        let records = parse("# Fireball\nType: Spell\nDescription: A burst of flame");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Fireball");
        assert_eq!(records[0].record_type, "Spell");
        assert_eq!(records[0].description, "A burst of flame");
        assert_eq!(records[0].source, "markdown-import");
    }

    #[test]
    fn test_description_falls_back_to_body() {
        let records = parse("## Longsword\nA versatile blade.\n\nFavoured by knights.\n");

        assert_eq!(records[0].name, "Longsword");
        assert_eq!(records[0].record_type, "unknown");
        assert_eq!(records[0].description, "A versatile blade.  Favoured by knights.");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let records = parse("# Mimic\nTYPE: Monstrosity\ndescription:   Looks like a chest");

        assert_eq!(records[0].record_type, "Monstrosity");
        assert_eq!(records[0].description, "Looks like a chest");
    }

    #[test]
    fn test_heading_levels() {
        let content = "# One\n## Two\n### Three\n#### Not a split\n#NoSpace\n";
        let records = parse(content);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert_eq!(records[2].description, "#### Not a split #NoSpace");
    }

    #[test]
    fn test_preamble_and_blank_segments() {
        let parser = OutlineParser::new();
        assert_eq!(parser.segments("\n\n# A\n#   \n# B").len(), 2);

        let records = parse("Bestiary notes\n# Goblin\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Bestiary notes");
        assert_eq!(records[1].name, "Goblin");
    }

    #[test]
    fn test_markup_in_outline_is_stripped() {
        let records = parse("# <span>Owlbear</span>\nType: <b>Beast</b>\n");
        assert_eq!(records[0].name, "Owlbear");
        assert_eq!(records[0].record_type, "Beast");
    }

    #[test]
    fn test_stop_after_first_section() {
        let signal = CancellationSignal::new();
        let mut ledger = RunLedger::new();
        let remote = signal.clone();
        let callback = move |_: &ProgressEvent<'_>| remote.request_stop();

        let records = {
            let mut ctx = ExtractionContext::new(&signal, &mut ledger).with_progress(&callback);
            OutlineParser::new()
                .parse("# A\n# B\n# C\n", &mut ctx)
                .unwrap()
        };

        // index 0 is on the default stride, so the callback fires after "A"
        assert_eq!(records.len(), 1);
        assert_eq!(ledger.log().messages().last(), Some("Processing stopped by user"));
    }
}
