use thiserror::Error;

#[derive(Error, Debug)]
pub enum TomeError {
    #[error("Invalid structured-data format: {message}")]
    Format { message: String },

    #[error("Unsupported file type: {extension}")]
    UnsupportedType { extension: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("No valid files selected")]
    NoValidFiles { accepted_extensions: Vec<String> },

    #[error("No valid data could be extracted from the files")]
    NoDataExtracted { failed_files: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to write {path}: {message}")]
    Export { path: String, message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for TomeError {
    fn user_message(&self) -> String {
        match self {
            TomeError::Format { message } => {
                format!("Invalid structured-data format: {}", message)
            }
            TomeError::UnsupportedType { extension } => {
                format!("Unsupported file type: {}", extension)
            }
            TomeError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            TomeError::NoValidFiles { accepted_extensions } => {
                format!(
                    "No valid files selected. Accepted extensions: {}",
                    accepted_extensions.join(", ")
                )
            }
            TomeError::NoDataExtracted { failed_files } if *failed_files > 0 => {
                format!(
                    "No valid data could be extracted from the files ({} failed)",
                    failed_files
                )
            }
            TomeError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TomeError::Format { .. } => Some(
                "Check that the file contains a JSON object or an array of objects.".to_string()
            ),
            TomeError::NoValidFiles { .. } => Some(
                "Please select JSON, HTML, or Markdown files (e.g., tome-extract spells.json monsters.md).".to_string()
            ),
            TomeError::NoDataExtracted { .. } => Some(
                "Run with --show-log to see why each file produced no records.".to_string()
            ),
            TomeError::FileTooLarge { .. } => Some(
                "Increase the maximum file size limit with --max-size.".to_string()
            ),
            TomeError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all selectors are valid CSS.".to_string()
            ),
            TomeError::Export { .. } => Some(
                "Ensure the output directory exists and is writable.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for TomeError {
    fn from(error: toml::de::Error) -> Self {
        TomeError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TomeError>;

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = TomeError::NoValidFiles {
            accepted_extensions: vec!["json".to_string(), "md".to_string()],
        };
        assert!(error.user_message().contains("json, md"));
        assert!(error.suggestion().is_some());

        let error = TomeError::NoDataExtracted { failed_files: 2 };
        assert!(error.user_message().contains("2 failed"));

        let error = TomeError::NoDataExtracted { failed_files: 0 };
        assert_eq!(
            error.user_message(),
            "No valid data could be extracted from the files"
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(500), "500 B");
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = = valid").unwrap_err();
        let error = TomeError::from(toml_error);
        assert!(matches!(error, TomeError::Config { .. }));
    }
}
