use crate::config::FilterConfig;
use crate::parser::FileKind;
use std::path::Path;

/// Decides which selected files reach a parser.
pub struct FileFilter {
    extensions: Vec<String>,
    max_file_size: u64,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_size: config.max_file_size,
        }
    }

    /// The parser kind for `path`, if its extension is both supported and allowed.
    pub fn accepted_kind(&self, path: &Path) -> Option<FileKind> {
        let extension = path.extension().and_then(|s| s.to_str())?.to_lowercase();

        if !self.extensions.contains(&extension) {
            return None;
        }

        FileKind::from_extension(&extension)
    }

    pub fn should_visit(&self, path: &Path) -> bool {
        match path.file_name().and_then(|s| s.to_str()) {
            Some(name) => !(name.starts_with('.') && name != "." && name != ".."),
            None => true,
        }
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn get_max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
