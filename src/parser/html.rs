use crate::config::MarkupConfig;
use crate::error::{TomeError, Result};
use crate::parser::RecordParser;
use crate::pipeline::context::ExtractionContext;
use crate::record::{RawFields, Record};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub const HTML_SOURCE: &str = "html-import";

/// Parser for documents whose entities live in tagged sections.
pub struct MarkupParser {
    block: Selector,
    name: Selector,
    kind: Selector,
    description: Selector,
}

impl std::fmt::Debug for MarkupParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupParser").finish_non_exhaustive()
    }
}

fn compile(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TomeError::Config {
        message: format!("Invalid {} selector '{}': {:?}", field, css, e),
    })
}

fn first_text(block: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

impl MarkupParser {
    pub fn new(config: &MarkupConfig) -> Result<Self> {
        Ok(Self {
            block: compile("block", &config.block_selector)?,
            name: compile("name", &config.name_selector)?,
            kind: compile("type", &config.type_selector)?,
            description: compile("description", &config.description_selector)?,
        })
    }

    fn raw_fields(&self, block: &ElementRef<'_>) -> Option<RawFields> {
        let name = first_text(block, &self.name)?;

        let record_type = first_text(block, &self.kind)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let description = first_text(block, &self.description).unwrap_or_default();

        Some(
            RawFields::new()
                .with("name", name)
                .with("type", record_type)
                .with("source", HTML_SOURCE)
                .with("description", description),
        )
    }
}

impl RecordParser for MarkupParser {
    fn source_tag(&self) -> Option<&'static str> {
        Some(HTML_SOURCE)
    }

    fn parse(&self, content: &str, ctx: &mut ExtractionContext<'_>) -> Result<Vec<Record>> {
        let document = Html::parse_document(content);
        let blocks: Vec<ElementRef<'_>> = document.select(&self.block).collect();
        let total = blocks.len();
        debug!(total, "selected candidate blocks");

        let mut records = Vec::new();

        for block in &blocks {
            if ctx.stop_requested() {
                break;
            }

            let Some(raw) = self.raw_fields(block) else {
                continue;
            };

            let record = ctx.admit(&raw);
            ctx.report_progress(records.len(), total, &record, "HTML elements");
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::{ProgressEvent, RunLedger};
    use crate::pipeline::log::Severity;
    use crate::ui::signals::CancellationSignal;

    fn parser() -> MarkupParser {
        MarkupParser::new(&MarkupConfig::default()).unwrap()
    }

    fn parse(content: &str) -> (Vec<Record>, RunLedger) {
        let signal = CancellationSignal::new();
        let mut ledger = RunLedger::new();
        let records = {
            let mut ctx = ExtractionContext::new(&signal, &mut ledger);
            parser().parse(content, &mut ctx).unwrap()
        };
        (records, ledger)
    }

    #[test]
    fn test_extracts_sections_in_document_order() {
        let html = r#"
            <html><body>
              <article>
                <h2>Goblin</h2>
                <span class="type">Monster</span>
                <p>Small, green and <b>mean</b>.</p>
              </article>
              <div class="entity">
                <span class="name">Bag of Holding</span>
                <div class="description">Bigger inside.</div>
              </div>
            </body></html>
        "#;

        let (records, _) = parse(html);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name, "Goblin");
        assert_eq!(records[0].record_type, "Monster");
        assert_eq!(records[0].description, "Small, green and mean.");
        assert_eq!(records[0].source, "html-import");

        assert_eq!(records[1].name, "Bag of Holding");
        assert_eq!(records[1].record_type, "unknown");
        assert_eq!(records[1].description, "Bigger inside.");
    }

    #[test]
    fn test_data_type_attribute_element() {
        let html = r#"<section><h1>Shield</h1><em data-type="spell">Spell</em></section>"#;
        let (records, _) = parse(html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, "Spell");
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_block_without_name_is_skipped() {
        let html = r#"
            <section><p>Just some prose with no heading.</p></section>
            <section><h3>Named</h3></section>
        "#;

        let (records, ledger) = parse(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Named");
        assert_eq!(ledger.log().count(Severity::Error), 0);
    }

    #[test]
    fn test_document_without_blocks_yields_nothing() {
        let (records, ledger) = parse("<html><body><h1>Loose heading</h1></body></html>");
        assert!(records.is_empty());
        assert!(ledger.log().is_empty());
    }

    #[test]
    fn test_progress_counts_named_blocks() {
        let mut html = String::from("<section><p>no name</p></section>");
        for i in 0..12 {
            html.push_str(&format!("<article><h2>Entry {}</h2></article>", i));
        }

        let (records, ledger) = parse(&html);
        assert_eq!(records.len(), 12);

        let progress: Vec<_> = ledger
            .log()
            .entries()
            .iter()
            .filter(|e| e.severity == Severity::Progress)
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(
            progress,
            vec![
                "Processing HTML elements: 1/13".to_string(),
                "Processing HTML elements: 11/13".to_string(),
            ]
        );
    }

    #[test]
    fn test_stop_mid_document() {
        let html = "<article><h1>A</h1></article><article><h1>B</h1></article><article><h1>C</h1></article>";
        let signal = CancellationSignal::new();
        let mut ledger = RunLedger::new();
        let remote = signal.clone();
        let callback = move |event: &ProgressEvent<'_>| {
            if event.processed == 2 {
                remote.request_stop();
            }
        };

        let records = {
            let mut ctx = ExtractionContext::new(&signal, &mut ledger)
                .with_stride(1)
                .with_progress(&callback);
            parser().parse(html, &mut ctx).unwrap()
        };

        assert_eq!(records.len(), 2);
        assert_eq!(
            ledger.log().messages().filter(|m| m.contains("stopped by user")).count(),
            1
        );
    }

    #[test]
    fn test_custom_selectors() {
        let config = MarkupConfig {
            block_selector: "li.monster".to_string(),
            name_selector: "strong".to_string(),
            type_selector: "i".to_string(),
            description_selector: "span".to_string(),
        };
        let parser = MarkupParser::new(&config).unwrap();

        let signal = CancellationSignal::new();
        let mut ledger = RunLedger::new();
        let mut ctx = ExtractionContext::new(&signal, &mut ledger);
        let records = parser
            .parse(
                r#"<ul><li class="monster"><strong>Kobold</strong> <i>Humanoid</i> <span>Trap lover</span></li><li>skip</li></ul>"#,
                &mut ctx,
            )
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kobold");
        assert_eq!(records[0].record_type, "Humanoid");
        assert_eq!(records[0].description, "Trap lover");
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let config = MarkupConfig {
            block_selector: "article[".to_string(),
            ..MarkupConfig::default()
        };
        assert!(matches!(MarkupParser::new(&config), Err(TomeError::Config { .. })));
    }
}
