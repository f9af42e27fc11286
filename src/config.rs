use crate::error::{TomeError, Result};
use crate::parser::FileKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub filters: FilterConfig,
    pub processing: ProcessingConfig,
    pub markup: MarkupConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub progress_stride: usize,
    /// Attach variant payloads to structured-data records whose type names one.
    pub typed_details: bool,
}

/// CSS selectors used by the markup-document parser.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub block_selector: String,
    pub name_selector: String,
    pub type_selector: String,
    pub description_selector: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub preview_rows: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "json".to_string(),
                "html".to_string(),
                "htm".to_string(),
                "md".to_string(),
                "markdown".to_string(),
            ],
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_depth: 4,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            progress_stride: 10,
            typed_details: false,
        }
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            block_selector: "article, section, .entity".to_string(),
            name_selector: "h1, h2, h3, .name".to_string(),
            type_selector: ".type, [data-type]".to_string(),
            description_selector: ".description, p".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { preview_rows: 10 }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TomeError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| TomeError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TomeError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["tome-extract.toml", ".tome-extract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref formats) = cli_args.formats {
            self.filters.extensions = formats
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(stride) = cli_args.progress_stride {
            self.processing.progress_stride = stride;
        }

        if let Some(rows) = cli_args.preview_rows {
            self.output.preview_rows = rows;
        }

        if cli_args.typed_details {
            self.processing.typed_details = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.extensions.is_empty() {
            return Err(TomeError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if let Some(unknown) = self
            .filters
            .extensions
            .iter()
            .find(|ext| FileKind::from_extension(ext).is_none())
        {
            return Err(TomeError::Config {
                message: format!(
                    "Extension '{}' has no parser (supported: {})",
                    unknown,
                    FileKind::all_extensions().join(", ")
                ),
            });
        }

        if self.filters.max_file_size == 0 {
            return Err(TomeError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.filters.max_depth == 0 {
            return Err(TomeError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.processing.progress_stride == 0 {
            return Err(TomeError::Config {
                message: "Progress stride must be greater than 0".to_string(),
            });
        }

        // Compiling the selectors is the only way to validate them.
        crate::parser::MarkupParser::new(&self.markup)?;

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub formats: Option<String>,
    pub max_file_size: Option<u64>,
    pub progress_stride: Option<usize>,
    pub preview_rows: Option<usize>,
    pub typed_details: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: Option<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_progress_stride(mut self, stride: Option<usize>) -> Self {
        self.progress_stride = stride;
        self
    }

    pub fn with_preview_rows(mut self, rows: Option<usize>) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_typed_details(mut self, enabled: bool) -> Self {
        self.typed_details = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.filters.extensions.contains(&"json".to_string()));
        assert_eq!(config.processing.progress_stride, 10);
        assert_eq!(config.output.preview_rows, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.filters.extensions.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filters.extensions = vec!["pdf".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processing.progress_stride = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.markup.name_selector = "h1[".to_string();
        assert!(matches!(config.validate(), Err(TomeError::Config { .. })));
    }

    #[test]
    fn test_config_file_operations() {
        let sample = Config::create_sample_config().replace("preview_rows = 10", "preview_rows = 25");
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), sample).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.output.preview_rows, 25);
        assert_eq!(loaded_config.markup, Config::default().markup);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[processing]\nprogress_stride = 3\n").unwrap();
        assert_eq!(config.processing.progress_stride, 3);
        assert_eq!(config.filters.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.markup, MarkupConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_formats(Some("JSON, .md".to_string()))
            .with_progress_stride(Some(5))
            .with_max_file_size(Some(2048));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.filters.extensions, vec!["json", "md"]);
        assert_eq!(config.processing.progress_stride, 5);
        assert_eq!(config.filters.max_file_size, 2048);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[processing]"));
        assert!(sample.contains("[markup]"));
        assert!(sample.contains("[output]"));
    }
}
