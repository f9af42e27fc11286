pub mod file_filter;
pub mod selection;

pub use file_filter::FileFilter;
pub use selection::{FileSelector, SelectedFile};
