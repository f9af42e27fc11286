use crate::error::{TomeError, Result};
use crate::pipeline::{FileFailure, FileProgress, ProgressLog, RunState};
use crate::record::variants::infer_kind;
use crate::record::Record;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Aggregate view of a published data set.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub by_type: Vec<CategoryCount>,
    pub by_source: Vec<CategoryCount>,
    /// Records whose type names a known variant (character, spell, item).
    pub by_kind: IndexMap<String, usize>,
    pub preview: Vec<Record>,
}

impl DatasetSummary {
    pub fn from_records(records: &[Record], preview_rows: usize) -> Self {
        let mut by_kind = IndexMap::new();
        for kind in records.iter().filter_map(|r| infer_kind(&r.record_type)) {
            *by_kind.entry(kind.as_str().to_string()).or_insert(0) += 1;
        }

        Self {
            total_records: records.len(),
            by_type: count_by(records, |r| &r.record_type),
            by_source: count_by(records, |r| &r.source),
            by_kind,
            preview: records.iter().take(preview_rows).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Sorted by count descending, then by name.
fn count_by<F>(records: &[Record], field: F) -> Vec<CategoryCount>
where
    F: Fn(&Record) -> &String,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let key = field(record);
        let key = if key.is_empty() { "unspecified" } else { key.as_str() };
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub summary: DatasetSummary,
    pub files: IndexMap<String, FileProgress>,
    pub processed: usize,
    pub elapsed_ms: u64,
    pub errors: Vec<FileFailure>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<ProgressLog>,
}

impl ExtractionReport {
    pub fn from_state(state: &RunState, preview_rows: usize) -> Self {
        Self {
            summary: DatasetSummary::from_records(state.records(), preview_rows),
            files: state.file_progress().clone(),
            processed: state.ledger().processed(),
            elapsed_ms: state.elapsed().as_millis() as u64,
            errors: state.failures().to_vec(),
            generated_at: Utc::now(),
            log: None,
        }
    }

    pub fn with_log(mut self, log: &ProgressLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn succeeded_files(&self) -> usize {
        self.files.values().filter(|p| !p.is_failed()).count()
    }

    pub fn failed_files(&self) -> usize {
        self.files.values().filter(|p| p.is_failed()).count()
    }
}

/// Plain-text rendering of records for pasting into a language-model prompt.
pub fn format_for_llm(records: &[Record]) -> String {
    records
        .iter()
        .map(|record| {
            let description = if record.has_description() {
                record.description.as_str()
            } else {
                "No description available"
            };

            format!(
                "Name: {}\nType: {}\nDescription: {}\nSource: {}\n---\n",
                record.name, record.record_type, description, record.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_dataset<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(records).map_err(|e| TomeError::Export {
        path: path.display().to_string(),
        message: format!("Failed to serialize data set: {}", e),
    })?;

    write_text(path, &content)
}

pub fn write_llm_context<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    write_text(path.as_ref(), &format_for_llm(records))
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TomeError::Export {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }

    fs::write(path, content).map_err(|e| TomeError::Export {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{sanitize, RawFields};
    use tempfile::TempDir;

    fn record(name: &str, record_type: &str, source: &str, description: &str) -> Record {
        sanitize(
            &RawFields::new()
                .with("name", name)
                .with("type", record_type)
                .with("source", source)
                .with("description", description),
        )
    }

    fn sample() -> Vec<Record> {
        vec![
            record("Fireball", "Spell", "markdown-import", "A burst of flame"),
            record("Shield", "Spell", "srd", ""),
            record("Goblin", "Monster", "html-import", "Small and mean"),
            record("Rope", "Item", "srd", ""),
            record("Elminster", "NPC", "srd", ""),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = DatasetSummary::from_records(&sample(), DEFAULT_PREVIEW_ROWS);

        assert_eq!(summary.total_records, 5);
        assert_eq!(
            summary.by_type[0],
            CategoryCount {
                name: "Spell".to_string(),
                count: 2
            }
        );
        let type_names: Vec<_> = summary.by_type.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(type_names, vec!["Spell", "Item", "Monster", "NPC"]);

        let source_names: Vec<_> = summary.by_source.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(source_names, vec!["srd", "html-import", "markdown-import"]);

        assert_eq!(summary.by_kind.get("spell"), Some(&2));
        assert_eq!(summary.by_kind.get("item"), Some(&1));
        assert_eq!(summary.by_kind.get("character"), Some(&1));
    }

    #[test]
    fn test_preview_is_capped() {
        let summary = DatasetSummary::from_records(&sample(), 2);
        assert_eq!(summary.preview.len(), 2);
        assert_eq!(summary.preview[1].name, "Shield");

        let empty = DatasetSummary::from_records(&[], 10);
        assert!(empty.is_empty());
        assert!(empty.by_type.is_empty());
    }

    #[test]
    fn test_empty_source_is_grouped() {
        let records = vec![record("A", "x", "", ""), record("B", "x", "", "")];
        let summary = DatasetSummary::from_records(&records, 10);
        assert_eq!(summary.by_source[0].name, "unspecified");
        assert_eq!(summary.by_source[0].count, 2);
    }

    #[test]
    fn test_format_for_llm() {
        let text = format_for_llm(&sample()[..2]);

        assert_eq!(
            text,
            "Name: Fireball\nType: Spell\nDescription: A burst of flame\nSource: markdown-import\n---\n\n\
             Name: Shield\nType: Spell\nDescription: No description available\nSource: srd\n---\n"
        );
        assert_eq!(format_for_llm(&[]), "");
    }

    #[test]
    fn test_write_dataset_and_context() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = temp_dir.path().join("out").join("dataset.json");
        let context_path = temp_dir.path().join("context.txt");

        write_dataset(&sample(), &data_path).unwrap();
        write_llm_context(&sample(), &context_path).unwrap();

        let parsed: Vec<Record> =
            serde_json::from_str(&fs::read_to_string(&data_path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0].record_type, "Spell");

        let context = fs::read_to_string(&context_path).unwrap();
        assert_eq!(context.matches("---").count(), 5);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_dataset(&sample(), blocker.join("dataset.json")).unwrap_err();
        assert!(matches!(err, TomeError::Export { .. }));
    }

    #[test]
    fn test_report_from_state() {
        let state = RunState::new();
        let report = ExtractionReport::from_state(&state, 10);

        assert_eq!(report.processed, 0);
        assert_eq!(report.succeeded_files(), 0);
        assert!(report.log.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("log").is_none());
        assert_eq!(json["summary"]["total_records"], 0);
    }
}
