pub mod html;
pub mod json;
pub mod markdown;

pub use html::MarkupParser;
pub use json::StructuredDataParser;
pub use markdown::OutlineParser;

use crate::error::Result;
use crate::pipeline::context::ExtractionContext;
use crate::record::Record;

/// Turns one file's text into records.
pub trait RecordParser {
    /// Provenance tag written into `source`, when the parser sets one.
    fn source_tag(&self) -> Option<&'static str>;

    fn parse(&self, content: &str, ctx: &mut ExtractionContext<'_>) -> Result<Vec<Record>>;
}

/// Supported input kinds, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    StructuredData,
    Markup,
    Outline,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "json" => Some(Self::StructuredData),
            "html" | "htm" => Some(Self::Markup),
            "md" | "markdown" => Some(Self::Outline),
            _ => None,
        }
    }

    pub fn all_extensions() -> &'static [&'static str] {
        &["json", "html", "htm", "md", "markdown"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredData => "json",
            Self::Markup => "html",
            Self::Outline => "markdown",
        }
    }
}

/// One parser per [`FileKind`], built once per run.
pub struct ParserSet {
    structured: StructuredDataParser,
    markup: MarkupParser,
    outline: OutlineParser,
}

impl ParserSet {
    pub fn new(structured: StructuredDataParser, markup: MarkupParser) -> Self {
        Self {
            structured,
            markup,
            outline: OutlineParser::new(),
        }
    }

    pub fn for_kind(&self, kind: FileKind) -> &dyn RecordParser {
        match kind {
            FileKind::StructuredData => &self.structured,
            FileKind::Markup => &self.markup,
            FileKind::Outline => &self.outline,
        }
    }
}
